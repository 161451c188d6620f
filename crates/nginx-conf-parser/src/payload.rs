//! The stable JSON wire surface: a top-level `status`/`errors`/`config`
//! envelope with one entry per file
//! visited (root plus every file pulled in through `include`).
//!
//! This is a deliberately thin projection over [`crate::ast::Config`] and
//! [`crate::error::ParseError`] — the rich internal error enum is collapsed
//! to `{file, line, error}` records here so the wire format stays stable
//! even as internal error variants are added.

use crate::ast::{ArgumentValue, Config, ConfigItem};
use crate::error::ParseError;
use crate::include::IncludedFile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A parsed directive as it appears on the wire: flattened, with nested
/// blocks recursively represented as `block`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectiveRecord {
    pub directive: String,
    pub line: usize,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<Vec<DirectiveRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Indices into the top-level `config` array this `include` resolved to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub includes: Option<Vec<usize>>,
}

/// One recorded error, projected from a [`ParseError`] down to file/line/message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub error: String,
}

impl ErrorRecord {
    pub fn from_parse_error(file: &Path, err: &ParseError) -> Self {
        Self {
            file: file.display().to_string(),
            line: err.position().map(|p| p.line),
            error: err.to_string(),
        }
    }
}

/// One file's parse result within a multi-file payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub file: String,
    pub status: Status,
    pub errors: Vec<ErrorRecord>,
    pub parsed: Vec<DirectiveRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Failed,
}

/// The full multi-file payload returned by the `parse` CLI subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    pub status: Status,
    pub errors: Vec<ErrorRecord>,
    pub config: Vec<FileConfig>,
}

/// Per-file context needed to resolve an `include` directive's argument back
/// to indices into the flat `config` array, mirroring the resolution
/// [`crate::include::collect_included_files`] already performed once to
/// discover these files in the first place.
struct IncludeCtx<'a> {
    index_of: &'a HashMap<PathBuf, usize>,
    parent_dir: PathBuf,
}

/// Build a [`Payload`] from the file list produced by
/// [`crate::include::collect_included_files`].
pub fn build_payload(files: &[IncludedFile], comments: bool) -> Payload {
    let mut index_of = HashMap::with_capacity(files.len());
    for (i, file) in files.iter().enumerate() {
        let key = file.path.canonicalize().unwrap_or_else(|_| file.path.clone());
        index_of.insert(key, i);
    }

    let mut file_configs = Vec::with_capacity(files.len());
    let mut all_errors = Vec::new();
    let mut overall_status = Status::Ok;

    for file in files {
        let file_display = file.path.display().to_string();
        match &file.config {
            Ok(outcome) => {
                let ctx = IncludeCtx {
                    index_of: &index_of,
                    parent_dir: file.path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(".")),
                };
                let records: Vec<ErrorRecord> = outcome
                    .errors
                    .iter()
                    .map(|err| ErrorRecord::from_parse_error(&file.path, err))
                    .collect();
                if !records.is_empty() {
                    overall_status = Status::Failed;
                    all_errors.extend(records.iter().cloned());
                }
                file_configs.push(FileConfig {
                    file: file_display,
                    status: if records.is_empty() { Status::Ok } else { Status::Failed },
                    errors: records,
                    parsed: directive_records(&outcome.config, comments, &ctx),
                });
            }
            Err(err) => {
                overall_status = Status::Failed;
                let record = ErrorRecord::from_parse_error(&file.path, err);
                all_errors.push(record.clone());
                file_configs.push(FileConfig {
                    file: file_display,
                    status: Status::Failed,
                    errors: vec![record],
                    parsed: Vec::new(),
                });
            }
        }
    }

    Payload { status: overall_status, errors: all_errors, config: file_configs }
}

/// Post-process a [`Payload`] into `combine` mode: one synthetic file whose
/// `parsed` is the concatenation of every visited file's directives in
/// include-expansion order, with `include` directives themselves elided
/// (their resolved contents already appear in the concatenation, flattened
/// at top level rather than spliced back into the nesting depth the
/// original `include` sat at — see DESIGN.md).
pub fn combine(payload: Payload) -> Payload {
    let file = payload.config.first().map(|fc| fc.file.clone()).unwrap_or_default();
    let mut parsed = Vec::new();
    let mut errors = Vec::new();
    for fc in &payload.config {
        errors.extend(fc.errors.iter().cloned());
        parsed.extend(strip_includes(fc.parsed.clone()));
    }
    let combined = FileConfig { file, status: payload.status, errors, parsed };
    Payload { status: payload.status, errors: payload.errors, config: vec![combined] }
}

fn strip_includes(records: Vec<DirectiveRecord>) -> Vec<DirectiveRecord> {
    records
        .into_iter()
        .filter(|r| r.directive != "include")
        .map(|mut r| {
            if let Some(block) = r.block.take() {
                r.block = Some(strip_includes(block));
            }
            r
        })
        .collect()
}

fn directive_records(config: &Config, comments: bool, ctx: &IncludeCtx) -> Vec<DirectiveRecord> {
    config.items.iter().flat_map(|item| config_item_records(item, comments, ctx)).collect()
}

/// Projects one tree node to its wire form(s). A directive with a trailing
/// same-line comment surfaces that comment as its own sibling `#` record
/// immediately after it, matching how a standalone comment line surfaces —
/// `comment` is only ever populated on a `#`-sentinel record, never folded
/// into the directive it followed. Blank lines carry no wire representation;
/// they only matter for faithful source reconstruction.
fn config_item_records(item: &ConfigItem, comments: bool, ctx: &IncludeCtx) -> Vec<DirectiveRecord> {
    match item {
        ConfigItem::Directive(d) => {
            let mut out = vec![directive_record(d, comments, ctx)];
            if comments {
                if let Some(c) = &d.trailing_comment {
                    out.push(comment_record(c));
                }
            }
            out
        }
        ConfigItem::Comment(c) => vec![comment_record(c)],
        ConfigItem::BlankLine(_) => Vec::new(),
    }
}

fn comment_record(c: &crate::ast::Comment) -> DirectiveRecord {
    DirectiveRecord {
        directive: "#".to_string(),
        line: c.span.start.line,
        args: Vec::new(),
        block: None,
        comment: Some(c.text.strip_prefix('#').unwrap_or(&c.text).to_string()),
        includes: None,
    }
}

fn directive_record(d: &crate::ast::Directive, comments: bool, ctx: &IncludeCtx) -> DirectiveRecord {
    let includes = if d.is("include") {
        d.first_arg().and_then(|pattern| {
            let matched = crate::include::resolve_include_pattern(pattern, &ctx.parent_dir);
            let indices: Vec<usize> = matched
                .iter()
                .filter_map(|p| {
                    let key = p.canonicalize().unwrap_or_else(|_| p.clone());
                    ctx.index_of.get(&key).copied()
                })
                .collect();
            if indices.is_empty() { None } else { Some(indices) }
        })
    } else {
        None
    };

    DirectiveRecord {
        directive: d.name.clone(),
        line: d.name_span.start.line,
        args: d.args.iter().map(arg_display).collect(),
        block: d
            .block
            .as_ref()
            .map(|b| b.items.iter().flat_map(|item| config_item_records(item, comments, ctx)).collect()),
        comment: None,
        includes,
    }
}

fn arg_display(arg: &crate::ast::Argument) -> String {
    match &arg.value {
        ArgumentValue::Variable(name) => format!("${name}"),
        ArgumentValue::Literal(s) | ArgumentValue::QuotedString(s) | ArgumentValue::SingleQuotedString(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_string, ParseOptions};
    use std::path::PathBuf;

    #[test]
    fn builds_payload_from_single_ok_file() {
        let outcome = parse_string("worker_processes 4;\n", &ParseOptions::default()).unwrap();
        let files = vec![IncludedFile { path: PathBuf::from("nginx.conf"), config: Ok(outcome) }];
        let payload = build_payload(&files, false);
        assert_eq!(payload.status, Status::Ok);
        assert_eq!(payload.config.len(), 1);
        assert_eq!(payload.config[0].parsed[0].directive, "worker_processes");
        assert_eq!(payload.config[0].parsed[0].args, vec!["4"]);
    }

    #[test]
    fn records_nested_block_directives() {
        let outcome = parse_string("http { server { listen 80; } }\n", &ParseOptions::default()).unwrap();
        let files = vec![IncludedFile { path: PathBuf::from("nginx.conf"), config: Ok(outcome) }];
        let payload = build_payload(&files, false);
        let http = &payload.config[0].parsed[0];
        let server = &http.block.as_ref().unwrap()[0];
        assert_eq!(server.directive, "server");
        assert_eq!(server.block.as_ref().unwrap()[0].directive, "listen");
    }

    #[test]
    fn trailing_comment_surfaces_as_sibling_sentinel_when_comments_enabled() {
        let options = ParseOptions { comments: true, ..ParseOptions::default() };
        let outcome = parse_string("worker_processes 4; # workers\n", &options).unwrap();
        let files = vec![IncludedFile { path: PathBuf::from("nginx.conf"), config: Ok(outcome) }];
        let payload = build_payload(&files, true);
        let parsed = &payload.config[0].parsed;
        assert_eq!(parsed[0].directive, "worker_processes");
        assert!(parsed[0].comment.is_none());
        assert_eq!(parsed[1].directive, "#");
        assert_eq!(parsed[1].comment.as_deref(), Some(" workers"));
    }

    #[test]
    fn trailing_comment_dropped_when_comments_disabled() {
        let outcome = parse_string("worker_processes 4; # workers\n", &ParseOptions::default()).unwrap();
        let files = vec![IncludedFile { path: PathBuf::from("nginx.conf"), config: Ok(outcome) }];
        let payload = build_payload(&files, false);
        assert_eq!(payload.config[0].parsed.len(), 1);
    }

    #[test]
    fn include_directive_carries_resolved_file_indices() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("extra.conf"), "worker_rlimit_nofile 1024;\n").unwrap();
        std::fs::write(dir.path().join("nginx.conf"), "worker_processes 1;\ninclude extra.conf;\n").unwrap();

        let files = crate::parse_tree(&dir.path().join("nginx.conf"), &ParseOptions::default());
        let payload = build_payload(&files, false);
        let include_record = &payload.config[0].parsed[1];
        assert_eq!(include_record.directive, "include");
        assert_eq!(include_record.includes, Some(vec![1]));
    }

    #[test]
    fn combine_concatenates_files_and_elides_include_directives() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("extra.conf"), "worker_rlimit_nofile 1024;\n").unwrap();
        std::fs::write(dir.path().join("nginx.conf"), "worker_processes 1;\ninclude extra.conf;\n").unwrap();

        let files = crate::parse_tree(&dir.path().join("nginx.conf"), &ParseOptions::default());
        let combined = combine(build_payload(&files, false));
        assert_eq!(combined.config.len(), 1);
        let names: Vec<&str> = combined.config[0].parsed.iter().map(|r| r.directive.as_str()).collect();
        assert_eq!(names, vec!["worker_processes", "worker_rlimit_nofile"]);
    }

    #[test]
    fn failed_file_surfaces_in_both_error_lists() {
        let err = ParseError::UnexpectedEof { position: crate::ast::Position { line: 3, column: 1, offset: 0 } };
        let files = vec![IncludedFile { path: PathBuf::from("broken.conf"), config: Err(err) }];
        let payload = build_payload(&files, false);
        assert_eq!(payload.status, Status::Failed);
        assert_eq!(payload.errors.len(), 1);
        assert_eq!(payload.errors[0].line, Some(3));
    }

    #[test]
    fn recovered_errors_under_catch_errors_surface_as_failed_status() {
        // `listen` is illegal at the top level; under the default
        // catch_errors=true this is recorded on the outcome rather than
        // aborting the parse, so the file itself still parses `Ok`. That
        // recorded error still has to reach the payload.
        let outcome = parse_string("listen 80;\nworker_processes 1;\n", &ParseOptions::default()).unwrap();
        assert_eq!(outcome.errors.len(), 1);
        let files = vec![IncludedFile { path: PathBuf::from("nginx.conf"), config: Ok(outcome) }];
        let payload = build_payload(&files, false);
        assert_eq!(payload.status, Status::Failed);
        assert_eq!(payload.errors.len(), 1);
        assert_eq!(payload.config[0].status, Status::Failed);
        assert_eq!(payload.config[0].errors.len(), 1);
        assert_eq!(payload.config[0].parsed.len(), 1);
        assert_eq!(payload.config[0].parsed[0].directive, "worker_processes");
    }
}
