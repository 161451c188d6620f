//! Recursive-descent parser: token stream to [`ast::Config`].
//!
//! Tracks a context stack so each directive can be checked against
//! [`crate::analyzer`], enforces a recursion-depth guard, and supports a
//! `catch_errors` recovery mode that skips to the next statement/block
//! boundary instead of aborting the whole parse.

use crate::analyzer::{self, AnalyzeOptions};
use crate::ast::{
    Argument, ArgumentValue, BlankLine, Block, Comment, Config, ConfigItem, Directive, Position, Span,
};
use crate::catalog::{self, ContextMask, MAIN};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, Token, TokenKind};

/// The deepest a block may nest before the parser gives up. nginx itself has
/// no documented limit; this exists to turn a pathological or adversarial
/// input into a clean error instead of a stack overflow.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Knobs controlling parse-time behavior, named after the flags a config
/// linter typically exposes on its parse entry point.
///
/// `combine` (concatenating every visited file into one synthetic file with
/// `include` directives elided) isn't a member here: it only makes sense
/// once every file's tree has been flattened to its wire form, so it's a
/// post-process over a [`crate::payload::Payload`] — see
/// [`crate::payload::combine`].
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Record errors and keep parsing past them instead of aborting on the first one.
    pub catch_errors: bool,
    /// Directive names to silently accept in any context/arity (extension directives).
    pub ignore: Vec<String>,
    /// Disable `include` expansion entirely; `include` is parsed but never followed.
    pub single: bool,
    /// Reject directive names absent from the catalog.
    pub strict: bool,
    /// Enforce that each directive's context is one its catalog entry admits.
    pub check_ctx: bool,
    /// Enforce that each directive's argument count/shape is admitted.
    pub check_args: bool,
    /// Keep comments in the resulting tree (faithful emission needs this; a
    /// pure-data consumer may prefer to drop them).
    pub comments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            catch_errors: true,
            ignore: Vec::new(),
            single: false,
            strict: false,
            check_ctx: true,
            check_args: true,
            comments: false,
        }
    }
}

/// The result of parsing one file: the tree plus any errors collected under
/// `catch_errors`. Non-`catch_errors` parses either return `Ok` with no
/// errors or stop at the first `Err`, so `errors` is only ever non-empty
/// when `catch_errors` was set.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub config: Config,
    pub errors: Vec<ParseError>,
}

/// Parse a single configuration file's source text, without following `include`.
pub fn parse_string(source: &str, options: &ParseOptions) -> ParseResult<ParseOutcome> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize()?;
    let mut parser = Parser::new(tokens, options);
    let items = parser.parse_items(false, MAIN)?;
    Ok(ParseOutcome {
        config: Config { items, include_context: Vec::new() },
        errors: parser.errors,
    })
}

/// Directives whose argument shape the generic per-token argument loop
/// cannot parse correctly, each routed to a dedicated micro-parser before
/// the generic loop runs. Adding a directive only needs a new arm here and
/// a matching arm in [`Parser::parse_directive`]'s dispatch on
/// [`special_form`].
///
/// `return`/`rewrite` aren't entries here even though the grammar singles
/// them out: their requirement is that quoting on the textual argument
/// survive, which the generic loop already gets for free by keeping each
/// argument's [`ArgumentValue`] variant (`Literal` vs `QuotedString` vs
/// `SingleQuotedString`) distinct. `*_by_lua_block`'s raw-body capture lives
/// in [`catalog::is_raw_block_directive`]/`read_raw_block`, since that's a
/// block-body concern rather than an argument-shape one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialForm {
    /// `if (...)`: the parenthesized condition is one logical argument even
    /// though it contains whitespace.
    ParenCondition,
    /// `set $var value`: `value` is captured verbatim up to the terminator
    /// instead of being split and arity-checked token by token.
    VerbatimValue,
}

fn special_form(name: &str) -> Option<SpecialForm> {
    match name {
        "if" => Some(SpecialForm::ParenCondition),
        "set" => Some(SpecialForm::VerbatimValue),
        _ => None,
    }
}

struct Parser<'o> {
    tokens: Vec<Token>,
    pos: usize,
    options: &'o ParseOptions,
    errors: Vec<ParseError>,
    block_depth: usize,
}

impl<'o> Parser<'o> {
    fn new(tokens: Vec<Token>, options: &'o ParseOptions) -> Self {
        Self { tokens, pos: 0, options, errors: Vec::new(), block_depth: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Record or propagate an error depending on `catch_errors`, then skip
    /// forward to the next likely statement boundary (`;` or `}`) so parsing
    /// can resume. Returns `Err` immediately when not in recovery mode.
    fn recover(&mut self, err: ParseError) -> ParseResult<()> {
        if !self.options.catch_errors {
            return Err(err);
        }
        self.errors.push(err);
        loop {
            match self.current().kind {
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                TokenKind::CloseBrace | TokenKind::Eof => break,
                TokenKind::OpenBrace => {
                    // Skip the whole mismatched block rather than stopping mid-way.
                    let mut depth = 1;
                    self.advance();
                    while depth > 0 && !matches!(self.current().kind, TokenKind::Eof) {
                        match self.current().kind {
                            TokenKind::OpenBrace => depth += 1,
                            TokenKind::CloseBrace => depth -= 1,
                            _ => {}
                        }
                        self.advance();
                    }
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }
        Ok(())
    }

    fn parse_items(&mut self, in_block: bool, context: ContextMask) -> ParseResult<Vec<ConfigItem>> {
        let mut items = Vec::new();
        let mut consecutive_newlines = 0u32;

        loop {
            match &self.current().kind {
                TokenKind::Eof => {
                    if in_block {
                        return Err(ParseError::UnclosedBlock { position: self.current().span.start });
                    }
                    break;
                }
                TokenKind::CloseBrace => {
                    if in_block {
                        break;
                    }
                    let position = self.current().span.start;
                    self.recover(ParseError::UnmatchedCloseBrace { position })?;
                    continue;
                }
                TokenKind::Newline => {
                    consecutive_newlines += 1;
                    if consecutive_newlines >= 2 {
                        let tok = self.current().clone();
                        items.push(ConfigItem::BlankLine(BlankLine { span: tok.span, content: String::new() }));
                    }
                    self.advance();
                    continue;
                }
                TokenKind::Comment(text) => {
                    consecutive_newlines = 0;
                    let text = text.clone();
                    let tok = self.advance();
                    let mut trailing_whitespace = String::new();
                    if matches!(self.current().kind, TokenKind::Newline) {
                        trailing_whitespace = self.current().leading_whitespace.clone();
                        self.advance();
                    }
                    if self.options.comments {
                        items.push(ConfigItem::Comment(Comment {
                            text,
                            span: tok.span,
                            leading_whitespace: tok.leading_whitespace,
                            trailing_whitespace,
                        }));
                    }
                    continue;
                }
                TokenKind::Ident(_) | TokenKind::Argument(_) | TokenKind::SingleQuotedString(_) | TokenKind::DoubleQuotedString(_) => {
                    consecutive_newlines = 0;
                    match self.parse_directive(context) {
                        Ok(directive) => items.push(ConfigItem::Directive(Box::new(directive))),
                        Err(err) => self.recover(err)?,
                    }
                }
                other => {
                    let position = self.current().span.start;
                    let found = other.display_name().to_string();
                    self.recover(ParseError::UnexpectedToken {
                        expected: "directive, comment, or '}'".to_string(),
                        found,
                        position,
                    })?;
                }
            }
        }

        Ok(items)
    }

    fn parse_directive(&mut self, context: ContextMask) -> ParseResult<Directive> {
        let leading_whitespace = self.current().leading_whitespace.clone();
        let name_start = self.current().span.start;
        let name = match &self.current().kind {
            TokenKind::Ident(s) | TokenKind::Argument(s) | TokenKind::SingleQuotedString(s) | TokenKind::DoubleQuotedString(s) => s.clone(),
            _ => return Err(ParseError::ExpectedDirectiveName { position: name_start }),
        };
        let name_tok = self.advance();
        let name_span = Span::new(name_start, name_tok.span.end);

        let mut args = Vec::new();
        match special_form(&name) {
            Some(SpecialForm::ParenCondition) => self.parse_paren_condition_arg(&mut args),
            Some(SpecialForm::VerbatimValue) => self.parse_verbatim_value_args(&mut args),
            None => {}
        }
        loop {
            match &self.current().kind {
                TokenKind::Semicolon => {
                    let semi_pos = self.current().span.start;
                    let space_before_terminator = self.current().leading_whitespace.clone();
                    // Checked while the semicolon is still current so a failed
                    // check leaves recovery scanning from this statement's own
                    // boundary instead of consuming the next one too.
                    self.check_legality(&name, &args, false, context, name_start)?;
                    self.advance();
                    let mut trailing_comment = None;
                    let mut trailing_whitespace = String::new();
                    if let TokenKind::Comment(text) = &self.current().kind {
                        let text = text.clone();
                        let tok = self.advance();
                        trailing_comment = Some(Comment {
                            text,
                            span: tok.span,
                            leading_whitespace: tok.leading_whitespace,
                            trailing_whitespace: String::new(),
                        });
                    }
                    if matches!(self.current().kind, TokenKind::Newline) {
                        trailing_whitespace = self.current().leading_whitespace.clone();
                    }

                    return Ok(Directive {
                        name,
                        name_span,
                        args,
                        block: None,
                        span: Span::new(name_start, semi_pos),
                        trailing_comment,
                        leading_whitespace,
                        space_before_terminator,
                        trailing_whitespace,
                    });
                }
                TokenKind::OpenBrace => {
                    let space_before_terminator = self.current().leading_whitespace.clone();
                    let brace_pos = self.current().span.start;
                    // Checked before consuming '{' so recovery's depth-aware
                    // skip sees the brace and discards the whole block.
                    self.check_legality(&name, &args, true, context, name_start)?;
                    self.advance();

                    let block = if catalog::is_raw_block_directive(&name) {
                        let (raw_content, end_pos) = self.read_raw_block(brace_pos)?;
                        Block {
                            items: Vec::new(),
                            span: Span::new(brace_pos, end_pos),
                            raw_content: Some(raw_content),
                            closing_brace_leading_whitespace: String::new(),
                            trailing_whitespace: String::new(),
                        }
                    } else {
                        let child_context = catalog::child_context(&name, context);
                        self.block_depth += 1;
                        if self.block_depth > MAX_NESTING_DEPTH {
                            self.block_depth -= 1;
                            return Err(ParseError::RecursionLimitExceeded { position: brace_pos });
                        }
                        let items = self.parse_items(true, child_context);
                        self.block_depth -= 1;
                        let items = items?;
                        let closing_brace_leading_whitespace = self.current().leading_whitespace.clone();
                        let end_pos = self.current().span.end;
                        if !matches!(self.current().kind, TokenKind::CloseBrace) {
                            return Err(ParseError::UnclosedBlock { position: brace_pos });
                        }
                        self.advance();
                        Block {
                            items,
                            span: Span::new(brace_pos, end_pos),
                            raw_content: None,
                            closing_brace_leading_whitespace,
                            trailing_whitespace: String::new(),
                        }
                    };

                    let directive_end = block.span.end;
                    return Ok(Directive {
                        name,
                        name_span,
                        args,
                        block: Some(block),
                        span: Span::new(name_start, directive_end),
                        trailing_comment: None,
                        leading_whitespace,
                        space_before_terminator,
                        trailing_whitespace: String::new(),
                    });
                }
                TokenKind::Ident(s) | TokenKind::Argument(s) => {
                    let value = ArgumentValue::Literal(s.clone());
                    self.push_argument(&mut args, value);
                }
                TokenKind::DoubleQuotedString(s) => {
                    let value = ArgumentValue::QuotedString(s.clone());
                    self.push_argument(&mut args, value);
                }
                TokenKind::SingleQuotedString(s) => {
                    let value = ArgumentValue::SingleQuotedString(s.clone());
                    self.push_argument(&mut args, value);
                }
                TokenKind::Variable(s) => {
                    let value = ArgumentValue::Variable(s.clone());
                    self.push_argument(&mut args, value);
                }
                TokenKind::Comment(_) | TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Eof => {
                    return Err(ParseError::UnexpectedEof { position: self.current().span.start });
                }
                TokenKind::CloseBrace => {
                    return Err(ParseError::MissingSemicolon { position: self.current().span.start });
                }
            }
        }
    }

    fn push_argument(&mut self, args: &mut Vec<Argument>, value: ArgumentValue) {
        let tok = self.advance();
        args.push(Argument { value, span: tok.span, raw: tok.raw });
    }

    /// `if`'s condition is a parenthesized expression lexed by the generic
    /// tokenizer as several whitespace-separated tokens (`(`/`=`/etc. are
    /// ordinary characters to it, not delimiters). Re-lex it here: starting
    /// from an opening `(`, consume tokens until parenthesis depth returns
    /// to zero, joining their raw text with single spaces into one literal
    /// argument. A malformed `if` with no leading `(` is left alone so the
    /// generic loop (and then legality/arity checking) reports it normally.
    fn parse_paren_condition_arg(&mut self, args: &mut Vec<Argument>) {
        let starts_with_paren = matches!(
            &self.current().kind,
            TokenKind::Argument(s) | TokenKind::Ident(s) if s.starts_with('(')
        );
        if !starts_with_paren {
            return;
        }

        let start_span = self.current().span.start;
        let mut depth = 0i32;
        let mut joined = String::new();
        let mut end_span = start_span;

        while !matches!(self.current().kind, TokenKind::Eof) {
            let tok = self.advance();
            // Re-collapse the original gap to at most one space, rather than
            // always inserting one, so tokens lexed with no gap (`(` hugging
            // the variable that follows it) stay hugged together.
            if !joined.is_empty() && !tok.leading_whitespace.is_empty() {
                joined.push(' ');
            }
            depth += tok.raw.matches('(').count() as i32;
            depth -= tok.raw.matches(')').count() as i32;
            joined.push_str(&tok.raw);
            end_span = tok.span.end;
            if depth <= 0 {
                break;
            }
        }

        args.push(Argument {
            value: ArgumentValue::Literal(joined.clone()),
            span: Span::new(start_span, end_span),
            raw: joined,
        });
    }

    /// `set $var value`: the variable is one ordinary argument, but `value`
    /// is captured verbatim up to the statement terminator rather than
    /// split into further arguments and arity-checked piece by piece —
    /// the catalog expects `set` to take exactly two arguments regardless
    /// of how many whitespace-separated tokens the value spans.
    fn parse_verbatim_value_args(&mut self, args: &mut Vec<Argument>) {
        match &self.current().kind {
            TokenKind::Variable(_)
            | TokenKind::Ident(_)
            | TokenKind::Argument(_)
            | TokenKind::DoubleQuotedString(_)
            | TokenKind::SingleQuotedString(_) => {
                let value = match &self.current().kind {
                    TokenKind::Variable(s) => ArgumentValue::Variable(s.clone()),
                    TokenKind::DoubleQuotedString(s) => ArgumentValue::QuotedString(s.clone()),
                    TokenKind::SingleQuotedString(s) => ArgumentValue::SingleQuotedString(s.clone()),
                    TokenKind::Ident(s) | TokenKind::Argument(s) => ArgumentValue::Literal(s.clone()),
                    _ => unreachable!(),
                };
                self.push_argument(args, value);
            }
            _ => return,
        }

        let start_span = self.current().span.start;
        let mut end_span = start_span;
        let mut joined = String::new();
        while !matches!(self.current().kind, TokenKind::Semicolon | TokenKind::OpenBrace | TokenKind::Eof) {
            let tok = self.advance();
            if !joined.is_empty() && !tok.leading_whitespace.is_empty() {
                joined.push(' ');
            }
            joined.push_str(&tok.raw);
            end_span = tok.span.end;
        }
        if !joined.is_empty() {
            args.push(Argument {
                value: ArgumentValue::Literal(joined.clone()),
                span: Span::new(start_span, end_span),
                raw: joined,
            });
        }
    }

    fn check_legality(
        &self,
        name: &str,
        args: &[Argument],
        is_block: bool,
        context: ContextMask,
        position: Position,
    ) -> ParseResult<()> {
        if self.options.ignore.iter().any(|n| n == name) {
            return Ok(());
        }
        if name == "include" {
            crate::include::validate_include_argument(args.len(), position)?;
            return Ok(());
        }
        analyzer::analyze(
            name,
            args.len(),
            is_block,
            context,
            position,
            AnalyzeOptions {
                strict: self.options.strict,
                check_ctx: self.options.check_ctx,
                check_args: self.options.check_args,
            },
        )
    }

    fn read_raw_block(&mut self, block_start: Position) -> ParseResult<(String, Position)> {
        let mut depth = 1usize;
        let mut content = String::new();
        let mut last_was_boundary = true;

        loop {
            match &self.current().kind {
                TokenKind::Eof => return Err(ParseError::UnclosedBlock { position: block_start }),
                TokenKind::OpenBrace => {
                    depth += 1;
                    content.push('{');
                    self.advance();
                    last_was_boundary = false;
                }
                TokenKind::CloseBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let end = self.current().span.end;
                        self.advance();
                        return Ok((content.trim().to_string(), end));
                    }
                    content.push('}');
                    self.advance();
                    last_was_boundary = false;
                }
                TokenKind::Newline => {
                    content.push('\n');
                    self.advance();
                    last_was_boundary = true;
                }
                TokenKind::Semicolon => {
                    content.push(';');
                    self.advance();
                    last_was_boundary = false;
                }
                _ => {
                    let tok = self.advance();
                    if !last_was_boundary && !content.is_empty() {
                        content.push(' ');
                    }
                    content.push_str(&tok.raw);
                    last_was_boundary = false;
                }
            }
        }
    }
}
