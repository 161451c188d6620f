//! A lossless, bidirectional parser and emitter for nginx configuration files.
//!
//! ```no_run
//! use nginx_conf_parser::{parse_file, ParseOptions};
//!
//! let outcome = parse_file(std::path::Path::new("nginx.conf"), &ParseOptions::default())?;
//! for directive in outcome.config.directives() {
//!     println!("{}", directive.name);
//! }
//! # Ok::<(), nginx_conf_parser::error::ParseError>(())
//! ```
//!
//! The crate is organized around the stages a configuration file passes
//! through on its way to a structured tree and back:
//!
//! - [`lexer`] turns source text into a token stream.
//! - [`catalog`] and [`analyzer`] know which directives are legal where.
//! - [`parser`] turns tokens into an [`ast::Config`], expanding `include`
//!   directives via [`include`] unless asked not to.
//! - [`builder`] turns a tree back into source text, either faithfully or
//!   re-indented ("pretty").
//! - [`payload`] is the stable JSON wire format used by the CLI and any
//!   other consumer that wants a plain data representation.

pub mod analyzer;
pub mod ast;
pub mod builder;
pub mod catalog;
pub mod error;
pub mod include;
pub mod lexer;
pub mod parser;
pub mod payload;

use std::path::Path;

pub use error::{ParseError, ParseResult};
pub use parser::{ParseOptions, ParseOutcome};

/// Parse a single file's contents, without following any `include` directives.
///
/// Use [`parse_tree`] when the caller wants `include` expansion.
pub fn parse_file(path: &Path, options: &ParseOptions) -> ParseResult<ParseOutcome> {
    let source = std::fs::read_to_string(path).map_err(|e| ParseError::IoError(e.to_string()))?;
    parser::parse_string(&source, options)
}

/// Parse `source` directly, without following any `include` directives.
pub fn parse_string(source: &str, options: &ParseOptions) -> ParseResult<ParseOutcome> {
    parser::parse_string(source, options)
}

/// Parse a root file and, unless `options.single` is set, every file it pulls
/// in transitively through `include`, breadth-first and deduplicated by
/// canonical path.
///
/// Returns one [`include::IncludedFile`] per visited file, root first, each
/// carrying the full [`ParseOutcome`] (tree and any errors `catch_errors`
/// recovered from) rather than just the tree, so recovered errors still
/// reach the caller. A per-file parse failure does not abort the walk: it is
/// recorded on that file's entry and files it would have included are simply
/// not visited.
pub fn parse_tree(root_path: &Path, options: &ParseOptions) -> Vec<include::IncludedFile> {
    let root_result = parse_file(root_path, options);

    if options.single {
        return vec![include::IncludedFile { path: root_path.to_path_buf(), config: root_result }];
    }

    include::collect_included_files(root_path, root_result, |path| parse_file(path, options))
}

/// Reconstruct source text from a parsed tree: faithful replay of the
/// original whitespace/quoting, or uniform "pretty" re-indentation.
pub fn build(config: &ast::Config, pretty: Option<&builder::PrettyOptions>) -> String {
    match pretty {
        Some(options) => builder::build_pretty(config, options),
        None => builder::build_faithful(config),
    }
}
