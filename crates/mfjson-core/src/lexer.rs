//! JSON tokenizer.
//!
//! Turns text into a stream of [`Token`]s for the parser. All string and
//! number grammar lives here: escapes are decoded eagerly and numbers are
//! classified as integer or float while they are scanned.

use crate::error::{ParseError, ParseErrorKind};

/// Token types produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    Null,
    True,
    False,
    /// String contents with escapes already decoded.
    String(String),
    /// A number with no fraction or exponent that fits in `i64`.
    Integer(i64),
    /// Any other number.
    Float(f64),
    Eof,
}

/// Byte-oriented JSON lexer over a UTF-8 string.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Build an error located at `offset` in this lexer's input.
    pub fn error_at(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError::at(self.input, offset, kind)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Read the next token, returning it with the byte offset where it starts.
    pub fn next_token(&mut self) -> Result<(Token, usize), ParseError> {
        self.skip_whitespace();
        let start = self.pos;

        let token = match self.peek() {
            None => Token::Eof,
            Some(b'{') => self.single(Token::LeftBrace),
            Some(b'}') => self.single(Token::RightBrace),
            Some(b'[') => self.single(Token::LeftBracket),
            Some(b']') => self.single(Token::RightBracket),
            Some(b':') => self.single(Token::Colon),
            Some(b',') => self.single(Token::Comma),
            Some(b'"') => self.read_string()?,
            Some(b'-' | b'0'..=b'9') => self.read_number()?,
            Some(b't') => self.read_literal("true", Token::True)?,
            Some(b'f') => self.read_literal("false", Token::False)?,
            Some(b'n') => self.read_literal("null", Token::Null)?,
            Some(_) => return Err(self.unexpected_char(start)),
        };

        Ok((token, start))
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn unexpected_char(&self, offset: usize) -> ParseError {
        match self.input[offset..].chars().next() {
            Some(c) => self.error_at(offset, ParseErrorKind::UnexpectedCharacter(c)),
            None => self.error_at(offset, ParseErrorKind::UnexpectedEnd),
        }
    }

    /// Read a string literal. The opening quote is at the current position.
    fn read_string(&mut self) -> Result<Token, ParseError> {
        let open = self.pos;
        self.pos += 1;
        let mut out = String::new();

        loop {
            // Copy the longest run that needs no decoding in one go.
            let run_start = self.pos;
            while let Some(b) = self.peek() {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            out.push_str(&self.input[run_start..self.pos]);

            match self.peek() {
                None => return Err(self.error_at(open, ParseErrorKind::UnterminatedString)),
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(Token::String(out));
                }
                Some(b'\\') => {
                    let escape_start = self.pos;
                    self.pos += 1;
                    let ch = self.read_escape(escape_start)?;
                    out.push(ch);
                }
                Some(b) => {
                    return Err(self.error_at(self.pos, ParseErrorKind::ControlCharacter(b)));
                }
            }
        }
    }

    /// Decode the escape whose backslash sits at `escape_start`.
    fn read_escape(&mut self, escape_start: usize) -> Result<char, ParseError> {
        match self.advance() {
            None => Err(self.error_at(escape_start, ParseErrorKind::UnterminatedString)),
            Some(b'"') => Ok('"'),
            Some(b'\\') => Ok('\\'),
            Some(b'/') => Ok('/'),
            Some(b'b') => Ok('\u{8}'),
            Some(b'f') => Ok('\u{c}'),
            Some(b'n') => Ok('\n'),
            Some(b'r') => Ok('\r'),
            Some(b't') => Ok('\t'),
            Some(b'u') => self.read_unicode_escape(escape_start),
            Some(_) => {
                self.pos -= 1;
                let c = self.input[self.pos..].chars().next().unwrap_or('\u{fffd}');
                Err(self.error_at(escape_start, ParseErrorKind::InvalidEscape(c)))
            }
        }
    }

    /// Decode `\uXXXX`, combining a surrogate pair when one follows.
    fn read_unicode_escape(&mut self, escape_start: usize) -> Result<char, ParseError> {
        let unit = self.read_hex4(escape_start)?;

        match unit {
            0xD800..=0xDBFF => {
                if self.peek() != Some(b'\\') || self.bytes.get(self.pos + 1) != Some(&b'u') {
                    return Err(self.error_at(escape_start, ParseErrorKind::LoneSurrogate(unit)));
                }
                let low_start = self.pos;
                self.pos += 2;
                let low = self.read_hex4(low_start)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.error_at(escape_start, ParseErrorKind::LoneSurrogate(unit)));
                }
                let combined =
                    0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                char::from_u32(combined)
                    .ok_or_else(|| self.error_at(escape_start, ParseErrorKind::InvalidUnicodeEscape))
            }
            0xDC00..=0xDFFF => Err(self.error_at(escape_start, ParseErrorKind::LoneSurrogate(unit))),
            _ => char::from_u32(u32::from(unit))
                .ok_or_else(|| self.error_at(escape_start, ParseErrorKind::InvalidUnicodeEscape)),
        }
    }

    fn read_hex4(&mut self, escape_start: usize) -> Result<u16, ParseError> {
        let mut value: u16 = 0;
        for _ in 0..4 {
            let digit = match self.advance() {
                Some(b @ b'0'..=b'9') => b - b'0',
                Some(b @ b'a'..=b'f') => b - b'a' + 10,
                Some(b @ b'A'..=b'F') => b - b'A' + 10,
                _ => {
                    return Err(self.error_at(escape_start, ParseErrorKind::InvalidUnicodeEscape))
                }
            };
            value = (value << 4) | u16::from(digit);
        }
        Ok(value)
    }

    /// Read a number: `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`.
    fn read_number(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;

        if self.peek() == Some(b'-') {
            self.pos += 1;
        }

        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if let Some(b'0'..=b'9') = self.peek() {
                    return Err(self.error_at(start, ParseErrorKind::InvalidNumber));
                }
            }
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.error_at(start, ParseErrorKind::InvalidNumber)),
        }

        let mut is_float = false;

        if self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error_at(start, ParseErrorKind::InvalidNumber));
            }
            self.skip_digits();
        }

        if let Some(b'e' | b'E') = self.peek() {
            is_float = true;
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error_at(start, ParseErrorKind::InvalidNumber));
            }
            self.skip_digits();
        }

        let text = &self.input[start..self.pos];

        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Token::Integer(n));
            }
        }

        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Token::Float(f)),
            Ok(_) => Err(self.error_at(start, ParseErrorKind::NumberOutOfRange)),
            Err(_) => Err(self.error_at(start, ParseErrorKind::InvalidNumber)),
        }
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }

    fn read_literal(&mut self, word: &'static str, token: Token) -> Result<Token, ParseError> {
        let start = self.pos;
        if !self.input[start..].starts_with(word) {
            return Err(self.error_at(start, ParseErrorKind::InvalidLiteral));
        }
        self.pos += word.len();
        // `nullx` and `true1` are single malformed tokens, not a literal plus garbage.
        if let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                return Err(self.error_at(start, ParseErrorKind::InvalidLiteral));
            }
        }
        Ok(token)
    }
}
