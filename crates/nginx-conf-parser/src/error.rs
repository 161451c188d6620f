//! Error types for the nginx configuration parser.
//!
//! Errors are split into two stages:
//!
//! - [`LexerError`] — failures during tokenization (unterminated strings, unexpected characters).
//! - [`ParseError`] — failures during parsing (unexpected tokens, unclosed blocks, missing semicolons).
//!
//! Both carry a [`Position`] so that error messages can
//! point to the exact line and column in the source.

use crate::ast::Position;
use std::fmt;
use thiserror::Error;

/// An error that occurs during tokenization (lexing).
#[derive(Debug, Clone, Error)]
pub enum LexerError {
    /// A quoted string was opened but never closed before end-of-file.
    #[error("Unterminated string starting at line {}, column {}", .position.line, .position.column)]
    UnterminatedString { position: Position },

    /// A backslash escape sequence was not recognized.
    #[error("Invalid escape sequence '\\{ch}' at line {}, column {}", .position.line, .position.column)]
    InvalidEscapeSequence { ch: char, position: Position },

    /// A character was encountered that is not valid in any token position.
    #[error("Unexpected character '{ch}' at line {}, column {}", .position.line, .position.column)]
    UnexpectedChar { ch: char, position: Position },
}

impl LexerError {
    /// Returns the source position where this error occurred.
    pub fn position(&self) -> Position {
        match self {
            LexerError::UnterminatedString { position } => *position,
            LexerError::InvalidEscapeSequence { position, .. } => *position,
            LexerError::UnexpectedChar { position, .. } => *position,
        }
    }
}

/// An error that occurs during parsing.
///
/// Includes both parse-level errors and forwarded [`LexerError`]s.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// A tokenization error propagated from the lexer.
    #[error("{0}")]
    Lexer(#[from] LexerError),

    /// The parser found a different token than expected.
    #[error("Expected '{expected}' but found '{found}' at line {}, column {}", .position.line, .position.column)]
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },

    /// The input ended while the parser still expected more tokens.
    #[error("Unexpected end of file at line {}, column {}", .position.line, .position.column)]
    UnexpectedEof { position: Position },

    /// An identifier was expected at the start of a directive but not found.
    #[error("Expected directive name at line {}, column {}", .position.line, .position.column)]
    ExpectedDirectiveName { position: Position },

    /// A directive was not terminated with `;`.
    #[error("Missing semicolon at line {}, column {}", .position.line, .position.column)]
    MissingSemicolon { position: Position },

    /// A `}` was found without a matching `{`.
    #[error("Unmatched closing brace at line {}, column {}", .position.line, .position.column)]
    UnmatchedCloseBrace { position: Position },

    /// A `{` was opened but never closed before end-of-file.
    #[error("Unclosed block starting at line {}, column {}", .position.line, .position.column)]
    UnclosedBlock { position: Position },

    /// A file could not be read from disk.
    #[error("Failed to read file: {0}")]
    IoError(String),

    /// A directive name absent from the catalog was used under `strict`.
    #[error("unknown directive \"{name}\" at line {}, column {}", .position.line, .position.column)]
    UnknownDirective { name: String, position: Position },

    /// A directive appeared in a block context its catalog entry does not admit.
    #[error("\"{name}\" directive is not allowed here at line {}, column {}", .position.line, .position.column)]
    DirectiveNotAllowedHere { name: String, position: Position },

    /// A directive was given a number of arguments no catalog variant accepts.
    #[error("invalid number of arguments in \"{name}\" directive at line {}, column {}", .position.line, .position.column)]
    InvalidArgumentCount { name: String, position: Position },

    /// A directive that must be a block (or must not be) was used the other way.
    #[error("directive \"{name}\" {} at line {}, column {}", .reason, .position.line, .position.column)]
    DirectiveShapeMismatch {
        name: String,
        reason: String,
        position: Position,
    },

    /// `include` was given zero or more than one argument.
    #[error("\"include\" directive requires exactly one argument at line {}, column {}", .position.line, .position.column)]
    IncludeArity { position: Position },

    /// The root file passed to the parser could not be opened.
    #[error("could not open root file \"{path}\": {reason}")]
    RootFileNotFound { path: String, reason: String },

    /// Too many distinct files were pulled in through `include` expansion.
    #[error("include cycle limit exceeded while resolving \"{pattern}\"")]
    IncludeCycleLimit { pattern: String },

    /// Block nesting went past the depth the parser is willing to recurse into.
    #[error("block nesting exceeds the recursion limit at line {}, column {}", .position.line, .position.column)]
    RecursionLimitExceeded { position: Position },
}

impl ParseError {
    /// Returns the source position where this error occurred, if available.
    ///
    /// Returns `None` for errors that are not tied to a single file position
    /// (e.g. [`RootFileNotFound`](ParseError::RootFileNotFound)).
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Lexer(e) => Some(e.position()),
            ParseError::UnexpectedToken { position, .. } => Some(*position),
            ParseError::UnexpectedEof { position } => Some(*position),
            ParseError::ExpectedDirectiveName { position } => Some(*position),
            ParseError::MissingSemicolon { position } => Some(*position),
            ParseError::UnmatchedCloseBrace { position } => Some(*position),
            ParseError::UnclosedBlock { position } => Some(*position),
            ParseError::IoError(_) => None,
            ParseError::UnknownDirective { position, .. } => Some(*position),
            ParseError::DirectiveNotAllowedHere { position, .. } => Some(*position),
            ParseError::InvalidArgumentCount { position, .. } => Some(*position),
            ParseError::DirectiveShapeMismatch { position, .. } => Some(*position),
            ParseError::IncludeArity { position } => Some(*position),
            ParseError::RootFileNotFound { .. } => None,
            ParseError::IncludeCycleLimit { .. } => None,
            ParseError::RecursionLimitExceeded { position } => Some(*position),
        }
    }
}

/// Result type alias for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Display implementation for user-friendly error messages
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
