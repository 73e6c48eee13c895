//! Recursive-descent JSON parser.
//!
//! One rule per value kind, one token of lookahead, no backtracking. The
//! parser is strict RFC 8259: no comments, no trailing commas, nothing after
//! the top-level value except whitespace. Any value kind may appear at the
//! top level.

use tracing::{debug, trace};

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token};
use crate::limits::Limits;
use crate::value::Value;

/// Parse JSON text into a [`Value`] using [`Limits::default`].
///
/// # Examples
///
/// ```
/// use mfjson_core::{parse, Value};
///
/// let v = parse(r#"[-1,null,24.565657576,"blah",false]"#).unwrap();
/// assert_eq!(v.len(), 5);
/// assert_eq!(v[0], Value::Integer(-1));
/// assert_eq!(v[2], Value::Float(24.565657576));
/// ```
pub fn parse(text: &str) -> Result<Value, ParseError> {
    parse_with_limits(text, Limits::default())
}

/// Parse JSON text into a [`Value`] with explicit limits.
pub fn parse_with_limits(text: &str, limits: Limits) -> Result<Value, ParseError> {
    trace!(len = text.len(), "parse start");
    let result = Parser::new(text, limits).and_then(|mut parser| parser.parse());
    match &result {
        Ok(value) => trace!(kind = value.type_name(), "parse finished"),
        Err(err) => debug!(offset = err.offset, error = %err, "parse failed"),
    }
    result
}

/// JSON parser holding the lexer and the current lookahead token.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    current_offset: usize,
    limits: Limits,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser and read the first token.
    pub fn new(input: &'a str, limits: Limits) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);

        if let Some(max) = limits.max_input_len {
            if input.len() > max {
                return Err(lexer.error_at(
                    0,
                    ParseErrorKind::InputTooLarge {
                        len: input.len(),
                        max,
                    },
                ));
            }
        }

        let (current, current_offset) = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            current_offset,
            limits,
            depth: 0,
        })
    }

    /// Parse exactly one value followed by end of input.
    pub fn parse(&mut self) -> Result<Value, ParseError> {
        let value = self.parse_value()?;
        if self.current != Token::Eof {
            return Err(self.error(ParseErrorKind::TrailingCharacters));
        }
        Ok(value)
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, offset) = self.lexer.next_token()?;
        self.current = token;
        self.current_offset = offset;
        Ok(())
    }

    /// Error at the current token. At end of input every "expected" error
    /// collapses to `UnexpectedEnd`.
    fn error(&self, kind: ParseErrorKind) -> ParseError {
        let kind = if self.current == Token::Eof && kind != ParseErrorKind::TrailingCharacters {
            ParseErrorKind::UnexpectedEnd
        } else {
            kind
        };
        self.lexer.error_at(self.current_offset, kind)
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let value = match &mut self.current {
            Token::Null => Value::Null,
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::Integer(n) => Value::Integer(*n),
            Token::Float(f) => Value::Float(*f),
            Token::String(s) => Value::String(std::mem::take(s)),
            Token::LeftBracket => return self.parse_array(),
            Token::LeftBrace => return self.parse_object(),
            _ => return Err(self.error(ParseErrorKind::ExpectedValue)),
        };
        self.advance()?;
        Ok(value)
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(self.error(ParseErrorKind::NestingTooDeep(self.limits.max_depth)));
        }
        Ok(())
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        self.enter()?;
        self.advance()?;

        let mut items = Vec::new();

        if self.current == Token::RightBracket {
            self.advance()?;
            self.depth -= 1;
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.parse_value()?);

            match self.current {
                Token::Comma => self.advance()?,
                Token::RightBracket => {
                    self.advance()?;
                    break;
                }
                _ => return Err(self.error(ParseErrorKind::ExpectedCommaOrBracket)),
            }
        }

        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn parse_object(&mut self) -> Result<Value, ParseError> {
        self.enter()?;
        self.advance()?;

        let mut pairs = Vec::new();

        if self.current == Token::RightBrace {
            self.advance()?;
            self.depth -= 1;
            return Ok(Value::Object(pairs));
        }

        loop {
            let key = match &mut self.current {
                Token::String(s) => std::mem::take(s),
                _ => return Err(self.error(ParseErrorKind::ExpectedKey)),
            };
            self.advance()?;

            if self.current != Token::Colon {
                return Err(self.error(ParseErrorKind::ExpectedColon));
            }
            self.advance()?;

            let value = self.parse_value()?;
            pairs.push((key, value));

            match self.current {
                Token::Comma => self.advance()?,
                Token::RightBrace => {
                    self.advance()?;
                    break;
                }
                _ => return Err(self.error(ParseErrorKind::ExpectedCommaOrBrace)),
            }
        }

        self.depth -= 1;
        Ok(Value::Object(pairs))
    }
}
