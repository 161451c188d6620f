//! Directive legality analysis: does this directive, with this many
//! arguments and this block-or-statement shape, make sense in the context
//! it was found in?
//!
//! Walks the directive tree matching each directive's name against its
//! parent block, generalized into a catalog lookup driven by
//! [`crate::catalog`] so context AND arity are checked together from the
//! same table the parser's inline checks use.

use crate::ast::Position;
use crate::catalog::{self, ContextMask};
use crate::error::ParseError;

/// Controls which legality dimensions [`analyze`] enforces for one directive.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    /// Reject directive names absent from the catalog entirely.
    pub strict: bool,
    /// Check that the directive's context is one its catalog entry admits.
    pub check_ctx: bool,
    /// Check that the directive's argument count/shape is admitted.
    pub check_args: bool,
}

/// Analyze one directive occurrence against the catalog.
///
/// `name` is the directive name, `arg_count` the number of arguments it was
/// given, `is_block` whether it opened a `{ ... }` body, `context` the
/// context mask it appears in, and `position` where to attribute any error.
pub fn analyze(
    name: &str,
    arg_count: usize,
    is_block: bool,
    context: ContextMask,
    position: Position,
    options: AnalyzeOptions,
) -> Result<(), ParseError> {
    let Some(entry) = catalog::lookup(name) else {
        if options.strict {
            return Err(ParseError::UnknownDirective {
                name: name.to_string(),
                position,
            });
        }
        return Ok(());
    };

    if options.check_ctx && !entry.admits_context(context) {
        return Err(ParseError::DirectiveNotAllowedHere {
            name: name.to_string(),
            position,
        });
    }

    if options.check_args {
        if entry.admits(context, arg_count, is_block) {
            return Ok(());
        }
        // Distinguish "wrong number of arguments" from "wrong shape" so the
        // error points the user at the more useful fix. Check shape alone
        // (ignoring arity) against every context-matching variant first.
        let shape_ok_somewhere = entry
            .variants
            .iter()
            .filter(|v| v.contexts & context != 0)
            .any(|v| {
                let wants_block = matches!(v.arity.shape, catalog::BlockShape::Required);
                wants_block == is_block
            });

        if !shape_ok_somewhere {
            let reason = if is_block {
                "must not open a block here".to_string()
            } else {
                "must open a block here".to_string()
            };
            return Err(ParseError::DirectiveShapeMismatch {
                name: name.to_string(),
                reason,
                position,
            });
        }

        return Err(ParseError::InvalidArgumentCount {
            name: name.to_string(),
            position,
        });
    }

    Ok(())
}
