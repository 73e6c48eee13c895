//! Error types for parsing, serialization and date conversion.
//!
//! Each direction of the codec has its own error type so callers can match on
//! exactly the failures a given call can produce. [`Error`] unifies them for
//! code that mixes directions.

use std::fmt;

use thiserror::Error;

/// Errors that can occur anywhere in mfjson-core.
#[derive(Error, Debug)]
pub enum Error {
    /// The input text was not valid JSON.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A native value could not be written as JSON.
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// A date/time string did not match the wire format.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A type descriptor could not be registered.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Mapping a parsed tree onto a concrete type failed.
    #[error("mapping error: {0}")]
    Mapping(#[from] serde_json::Error),
}

/// Convenience alias used throughout mfjson-core.
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed JSON text.
///
/// `offset` is the byte offset of the offending token; `line` and `column`
/// are 1-based and count characters, not bytes.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("parse error at line {line}, column {column}: {kind}")]
pub struct ParseError {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Build an error for `offset` in `input`, computing line and column.
    pub(crate) fn at(input: &str, offset: usize, kind: ParseErrorKind) -> Self {
        let offset = offset.min(input.len());
        let mut line = 1;
        let mut column = 1;
        for (i, ch) in input.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            offset,
            line,
            column,
            kind,
        }
    }
}

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// A character that cannot start or continue the current token.
    UnexpectedCharacter(char),
    /// The input ended in the middle of a value.
    UnexpectedEnd,
    /// A value was required (e.g. after `:` or `,`).
    ExpectedValue,
    /// An object key must be a string.
    ExpectedKey,
    /// A key must be followed by `:`.
    ExpectedColon,
    /// Array elements must be separated by `,` or closed by `]`.
    ExpectedCommaOrBracket,
    /// Object members must be separated by `,` or closed by `}`.
    ExpectedCommaOrBrace,
    /// A string literal without its closing quote.
    UnterminatedString,
    /// A raw control character inside a string literal.
    ControlCharacter(u8),
    /// A backslash followed by an unknown escape letter.
    InvalidEscape(char),
    /// `\u` not followed by four hex digits.
    InvalidUnicodeEscape,
    /// A `\u` surrogate without its partner.
    LoneSurrogate(u16),
    /// Malformed number literal.
    InvalidNumber,
    /// A number too large to be represented as a double.
    NumberOutOfRange,
    /// A misspelled `true`, `false` or `null`.
    InvalidLiteral,
    /// Content after the top-level value.
    TrailingCharacters,
    /// Containers nested deeper than the configured limit.
    NestingTooDeep(usize),
    /// Input longer than the configured limit.
    InputTooLarge { len: usize, max: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character {:?}", c),
            Self::UnexpectedEnd => f.write_str("unexpected end of input"),
            Self::ExpectedValue => f.write_str("expected a value"),
            Self::ExpectedKey => f.write_str("expected a string key"),
            Self::ExpectedColon => f.write_str("expected ':' after object key"),
            Self::ExpectedCommaOrBracket => f.write_str("expected ',' or ']'"),
            Self::ExpectedCommaOrBrace => f.write_str("expected ',' or '}'"),
            Self::UnterminatedString => f.write_str("unterminated string"),
            Self::ControlCharacter(b) => {
                write!(f, "unescaped control character 0x{:02x} in string", b)
            }
            Self::InvalidEscape(c) => write!(f, "invalid escape sequence '\\{}'", c),
            Self::InvalidUnicodeEscape => f.write_str("invalid \\u escape"),
            Self::LoneSurrogate(u) => write!(f, "unpaired surrogate \\u{:04x}", u),
            Self::InvalidNumber => f.write_str("invalid number"),
            Self::NumberOutOfRange => f.write_str("number out of range"),
            Self::InvalidLiteral => f.write_str("invalid literal"),
            Self::TrailingCharacters => f.write_str("trailing characters after value"),
            Self::NestingTooDeep(max) => write!(f, "nesting deeper than {} levels", max),
            Self::InputTooLarge { len, max } => {
                write!(f, "input of {} bytes exceeds limit of {} bytes", len, max)
            }
        }
    }
}

/// Failure raised by a record member getter.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct AccessError(pub String);

impl AccessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A native value that cannot be written as JSON.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializeError {
    /// A member getter failed.
    #[error("failed to read member '{member}' of {type_name}: {source}")]
    Member {
        type_name: String,
        member: String,
        #[source]
        source: AccessError,
    },

    /// A record was reached again while it was still being written.
    #[error("cycle detected while writing {type_name}")]
    Cycle { type_name: String },

    /// The resolver has no descriptor for the record's concrete type.
    #[error("no type descriptor registered for {type_name}")]
    UnresolvedType { type_name: String },

    /// The resolver returned an empty member list.
    #[error("type {type_name} has no serializable members")]
    NoMembers { type_name: String },

    /// A member's runtime shape disagrees with its declared kind.
    #[error("member '{member}' of {type_name} declared as {expected} but produced {found}")]
    KindMismatch {
        type_name: String,
        member: String,
        expected: &'static str,
        found: &'static str,
    },

    /// NaN and infinities have no JSON representation.
    #[error("non-finite float {0} cannot be written as JSON")]
    NonFiniteFloat(f64),

    /// A timestamp whose year does not fit the fixed-width wire format.
    #[error("timestamp {0} is outside the four-digit year range")]
    DateOutOfRange(String),

    /// Containers nested deeper than the configured limit.
    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// Date/time text that does not match the expected wire format.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid date/time {input:?}: {reason}")]
pub struct FormatError {
    pub input: String,
    pub reason: &'static str,
}

impl FormatError {
    pub(crate) fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// A type descriptor whose inheritance chain cannot be flattened.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// An abstract member with no override in the concrete type.
    #[error("{type_name} does not implement abstract member '{member}'")]
    AbstractMember { type_name: String, member: String },

    /// An override whose base slot is missing or not overridable.
    #[error("{type_name} overrides '{member}', which is not an abstract or virtual member of a base type")]
    InvalidOverride { type_name: String, member: String },

    /// The same member name declared twice.
    #[error("{type_name} declares member '{member}' more than once")]
    DuplicateMember { type_name: String, member: String },
}
