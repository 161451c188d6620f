//! Turning a [`Config`] back into nginx configuration source text.
//!
//! Two modes:
//!
//! - **Faithful** — reconstructs the original whitespace and quoting exactly,
//!   delegating to [`Config::to_source`], which already replays the
//!   leading/trailing whitespace the parser captured on every node.
//! - **Pretty** — ignores captured whitespace and re-indents uniformly with
//!   a configurable indent unit, applying a fixed quote policy to arguments
//!   instead of preserving their original quoting.
//!
//! Built on the whitespace-preserving `write_source` methods already
//! present on [`Config`]/[`Directive`]/[`Block`] in `ast.rs`.

use crate::ast::{ArgumentValue, Config, ConfigItem, Directive};

/// Options controlling pretty-mode re-emission.
#[derive(Debug, Clone, Copy)]
pub struct PrettyOptions {
    /// Number of spaces (or tab stops, if `use_tabs`) per nesting level.
    pub indent_width: usize,
    pub use_tabs: bool,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self { indent_width: 4, use_tabs: false }
    }
}

/// Reconstruct the original source text exactly, whitespace and quoting included.
pub fn build_faithful(config: &Config) -> String {
    config.to_source()
}

/// Re-emit the tree with uniform indentation and canonical argument quoting.
pub fn build_pretty(config: &Config, options: &PrettyOptions) -> String {
    let mut out = String::new();
    for item in &config.items {
        write_item_pretty(item, 0, options, &mut out);
    }
    out
}

fn indent_str(depth: usize, options: &PrettyOptions) -> String {
    if options.use_tabs {
        "\t".repeat(depth)
    } else {
        " ".repeat(depth * options.indent_width)
    }
}

fn write_item_pretty(item: &ConfigItem, depth: usize, options: &PrettyOptions, out: &mut String) {
    match item {
        ConfigItem::Directive(d) => write_directive_pretty(d, depth, options, out),
        ConfigItem::Comment(c) => {
            out.push_str(&indent_str(depth, options));
            out.push_str(c.text.trim_end());
            out.push('\n');
        }
        // Pretty mode collapses runs of blank lines the faithful tree kept
        // as markers; a single blank line between items is enough.
        ConfigItem::BlankLine(_) => out.push('\n'),
    }
}

fn write_directive_pretty(directive: &Directive, depth: usize, options: &PrettyOptions, out: &mut String) {
    out.push_str(&indent_str(depth, options));
    out.push_str(&directive.name);
    for arg in &directive.args {
        out.push(' ');
        out.push_str(&quote_argument(&arg.value));
    }

    match &directive.block {
        Some(block) if block.is_raw() => {
            out.push_str(" {\n");
            if let Some(raw) = &block.raw_content {
                for line in raw.lines() {
                    out.push_str(&indent_str(depth + 1, options));
                    out.push_str(line.trim_end());
                    out.push('\n');
                }
            }
            out.push_str(&indent_str(depth, options));
            out.push_str("}\n");
        }
        Some(block) => {
            out.push_str(" {\n");
            for item in &block.items {
                write_item_pretty(item, depth + 1, options, out);
            }
            out.push_str(&indent_str(depth, options));
            out.push_str("}\n");
        }
        None => out.push_str(";\n"),
    }
}

/// Canonical quoting: bare tokens stay bare. Anything containing whitespace,
/// a `;`, `{`, `}`, `#`, or a quote character is wrapped in quotes, with
/// single quotes preferred over double — a value with no quote characters
/// in it at all falls back to whichever kind it was originally written with.
/// Variables are always printed as `$name` regardless of how they were
/// captured.
fn quote_argument(value: &ArgumentValue) -> String {
    match value {
        ArgumentValue::Variable(name) => format!("${name}"),
        ArgumentValue::Literal(s) => quote_if_needed(s, QuotePreference::Single),
        ArgumentValue::QuotedString(s) => quote_if_needed(s, QuotePreference::Double),
        ArgumentValue::SingleQuotedString(s) => quote_if_needed(s, QuotePreference::Single),
    }
}

/// Which quote character to fall back to when `s` contains neither `'` nor
/// `"` and so either would do — the tiebreaker is how the value was
/// originally quoted, not a fixed default.
#[derive(Debug, Clone, Copy)]
enum QuotePreference {
    Single,
    Double,
}

fn quote_if_needed(s: &str, preference: QuotePreference) -> String {
    if !needs_quoting(s) {
        return s.to_string();
    }
    let has_single = s.contains('\'');
    let has_double = s.contains('"');
    if has_single {
        // Contains a single quote, so single-quoting would need escaping it;
        // double quotes sidestep that whether or not a `"` is also present.
        return quote_double(s);
    }
    if has_double {
        // Contains a double quote but no single quote: single-quoting needs
        // no escaping at all.
        return quote_single(s);
    }
    match preference {
        QuotePreference::Single => quote_single(s),
        QuotePreference::Double => quote_double(s),
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty() || s.chars().any(|c| matches!(c, ' ' | '\t' | ';' | '{' | '}' | '#' | '"' | '\''))
}

fn quote_single(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    quoted.push_str(s);
    quoted.push('\'');
    quoted
}

fn quote_double(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 2);
    escaped.push('"');
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            other => escaped.push(other),
        }
    }
    escaped.push('"');
    escaped
}

/// Stable textual token dump, one token per line, used by the `lex` CLI
/// subcommand and any tooling that wants the raw lexical stream without
/// building a full tree.
pub fn lex_dump(source: &str) -> crate::error::ParseResult<String> {
    let mut lexer = crate::lexer::Lexer::new(source);
    let tokens = lexer.tokenize()?;
    let mut out = String::new();
    for token in &tokens {
        if matches!(token.kind, crate::lexer::TokenKind::Eof) {
            break;
        }
        out.push_str(&format!(
            "{}:{}\t{}\t{:?}\n",
            token.span.start.line,
            token.span.start.column,
            token.kind.display_name(),
            token.raw
        ));
    }
    Ok(out)
}
