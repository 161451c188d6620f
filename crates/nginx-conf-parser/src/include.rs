//! Filesystem resolution of `include` directives.
//!
//! A pattern is made absolute against the including file's directory,
//! backslashes are normalized, and the result is expanded with [`glob`],
//! falling back to a literal path when the pattern contains no glob
//! metacharacters `glob` itself would reject as malformed.
//!
//! This module resolves directly against [`ast::Config`] and performs the
//! breadth-first, cycle-safe multi-file walk itself, since include
//! expansion is a parser-level concern here rather than a lint-runner
//! concern layered on top of an already-built tree.

use crate::error::{ParseError, ParseResult};
use crate::parser::ParseOutcome;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Expand the `pattern` argument of an `include` directive found in `parent_dir`
/// into the list of files it matches, sorted for determinism.
///
/// Falls back to treating `pattern` as a literal path if it cannot be parsed
/// as a glob (nginx config globs are simple shell-style patterns; anything
/// `glob` rejects is almost certainly meant literally).
pub fn resolve_include_pattern(pattern: &str, parent_dir: &Path) -> Vec<PathBuf> {
    let normalized = pattern.replace('\\', "/");
    let absolute = if Path::new(&normalized).is_absolute() {
        normalized
    } else {
        parent_dir.join(&normalized).to_string_lossy().into_owned()
    };

    match glob::glob(&absolute) {
        Ok(paths) => {
            let mut matched: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
            matched.sort();
            matched
        }
        Err(_) => {
            let literal = PathBuf::from(&absolute);
            if literal.is_file() {
                vec![literal]
            } else {
                Vec::new()
            }
        }
    }
}

/// One file pulled into a multi-file parse, in the order it was first visited.
///
/// Carries the full [`ParseOutcome`] on success, not just the tree: under
/// `catch_errors` a file can parse `Ok` while still having recovered errors
/// attached, and those need to survive into the payload.
pub struct IncludedFile {
    pub path: PathBuf,
    pub config: ParseResult<ParseOutcome>,
}

/// Breadth-first include-expansion over a parsed root file.
///
/// `parse_one` is supplied by the caller (the core parser, with whatever
/// [`crate::parser::ParseOptions`] are in effect) so that this module stays
/// free of a circular dependency on the parser itself.
///
/// Returns the root file's entry first, followed by every distinct included
/// file in breadth-first discovery order, deduplicated by canonicalized path.
/// A path that cannot be canonicalized (already missing) is still visited
/// once, so the caller sees its parse error rather than a silent skip.
pub fn collect_included_files(
    root_path: &Path,
    root_result: ParseResult<ParseOutcome>,
    mut parse_one: impl FnMut(&Path) -> ParseResult<ParseOutcome>,
) -> Vec<IncludedFile> {
    let mut out = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    if let Ok(canonical) = root_path.canonicalize() {
        visited.insert(canonical);
    }

    // FIFO queue: files discovered earlier are visited (and therefore parsed
    // and scanned for their own includes) before files discovered later.
    let mut queue: std::collections::VecDeque<(PathBuf, ParseResult<ParseOutcome>)> =
        std::collections::VecDeque::new();
    queue.push_back((root_path.to_path_buf(), root_result));

    while let Some((path, parse_result)) = queue.pop_front() {
        let parent_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

        if let Ok(outcome) = &parse_result {
            let mut next_includes = Vec::new();
            for directive in outcome.config.all_directives() {
                if !directive.is("include") {
                    continue;
                }
                let Some(pattern) = directive.first_arg() else {
                    continue;
                };
                for matched_path in resolve_include_pattern(pattern, &parent_dir) {
                    let key = matched_path.canonicalize().unwrap_or_else(|_| matched_path.clone());
                    if !visited.insert(key) {
                        continue;
                    }
                    next_includes.push(matched_path);
                }
            }
            for included_path in next_includes {
                let parsed = parse_one(&included_path);
                queue.push_back((included_path, parsed));
            }
        }

        out.push(IncludedFile { path, config: parse_result });
    }

    out
}

/// Errors encountered while resolving `include` arguments into concrete paths,
/// independent of what happens when those files are parsed.
pub fn validate_include_argument(arg_count: usize, position: crate::ast::Position) -> ParseResult<()> {
    if arg_count != 1 {
        return Err(ParseError::IncludeArity { position });
    }
    Ok(())
}
