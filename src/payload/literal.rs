//! Parser for the deprecated Python-literal payload serialization.
//!
//! Early producers persisted the display form of the response mapping
//! rather than JSON: single-quoted strings, `True`/`False`/`None`,
//! occasionally tuples. This is a minimal literal-expression parser
//! covering what those rows actually contain — dicts, lists, tuples,
//! strings, numbers and the three constants — producing a
//! [`serde_json::Value`] so the result validates through the same schema
//! as the strict path.

use std::fmt;

use serde_json::{Map, Number, Value};

/// Error raised when the input is not a supported literal expression.
#[derive(Debug, PartialEq, Eq)]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid literal at byte {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for LiteralError {}

/// Parses a complete literal expression.
///
/// Trailing non-whitespace content after the expression is an error.
pub fn parse(input: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser {
        input: input.as_bytes(),
        pos: 0,
    };
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos != parser.input.len() {
        return Err(parser.error("trailing content after literal"));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            Some(b'{') => self.parse_dict(),
            Some(b'[') => self.parse_sequence(b']').map(Value::Array),
            Some(b'(') => self.parse_sequence(b')').map(Value::Array),
            Some(b'\'') | Some(b'"') => self.parse_string().map(Value::String),
            Some(byte) if byte == b'-' || byte == b'+' || byte == b'.' || byte.is_ascii_digit() => {
                self.parse_number()
            }
            Some(byte) if byte.is_ascii_alphabetic() => self.parse_keyword(),
            Some(byte) => Err(self.error(format!("unexpected byte '{}'", byte as char))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_dict(&mut self) -> Result<Value, LiteralError> {
        self.bump(); // '{'
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.eat(b'}') {
                return Ok(Value::Object(map));
            }
            let key = self.parse_key()?;
            self.skip_whitespace();
            if !self.eat(b':') {
                return Err(self.error("expected ':' after dict key"));
            }
            self.skip_whitespace();
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_whitespace();
            if self.eat(b',') {
                continue;
            }
            if self.eat(b'}') {
                return Ok(Value::Object(map));
            }
            return Err(self.error("expected ',' or '}' in dict"));
        }
    }

    /// Dict keys are strings in practice, but integer keys occur; those
    /// are stringified since JSON objects only carry string keys.
    fn parse_key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some(b'\'') | Some(b'"') => self.parse_string(),
            Some(byte) if byte == b'-' || byte.is_ascii_digit() => {
                Ok(self.parse_number()?.to_string())
            }
            _ => Err(self.error("expected string or numeric dict key")),
        }
    }

    fn parse_sequence(&mut self, close: u8) -> Result<Vec<Value>, LiteralError> {
        self.bump(); // opener
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            if self.eat(b',') {
                continue;
            }
            if self.eat(close) {
                return Ok(items);
            }
            return Err(self.error("expected ',' or closing bracket in sequence"));
        }
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let quote = self.bump().expect("caller checked for a quote");
        let mut out: Vec<u8> = Vec::new();
        loop {
            let Some(byte) = self.bump() else {
                return Err(self.error("unterminated string"));
            };
            match byte {
                byte if byte == quote => {
                    return String::from_utf8(out).map_err(|_| self.error("invalid UTF-8 in string"));
                }
                b'\\' => self.parse_escape(&mut out)?,
                byte => out.push(byte),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut Vec<u8>) -> Result<(), LiteralError> {
        let Some(byte) = self.bump() else {
            return Err(self.error("unterminated escape"));
        };
        match byte {
            b'\\' => out.push(b'\\'),
            b'\'' => out.push(b'\''),
            b'"' => out.push(b'"'),
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'0' => out.push(0),
            b'x' => {
                let code = self.hex_digits(2)?;
                self.push_codepoint(code, out)?;
            }
            b'u' => {
                let code = self.hex_digits(4)?;
                self.push_codepoint(code, out)?;
            }
            b'U' => {
                let code = self.hex_digits(8)?;
                self.push_codepoint(code, out)?;
            }
            // Python leaves unrecognized escapes in place.
            other => {
                out.push(b'\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn push_codepoint(&self, code: u32, out: &mut Vec<u8>) -> Result<(), LiteralError> {
        let ch = char::from_u32(code)
            .ok_or_else(|| self.error(format!("escape U+{code:04X} is not a valid character")))?;
        let mut buf = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }

    fn hex_digits(&mut self, count: usize) -> Result<u32, LiteralError> {
        let mut code: u32 = 0;
        for _ in 0..count {
            let Some(byte) = self.bump() else {
                return Err(self.error("truncated hex escape"));
            };
            let digit = (byte as char)
                .to_digit(16)
                .ok_or_else(|| self.error("expected hex digit in escape"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.bump();
        }
        while matches!(
            self.peek(),
            Some(byte) if byte.is_ascii_digit()
                || byte == b'.'
                || byte == b'e'
                || byte == b'E'
                || (matches!(self.input.get(self.pos.wrapping_sub(1)).copied(), Some(b'e' | b'E'))
                    && (byte == b'+' || byte == b'-'))
        ) {
            self.bump();
        }
        let text = std::str::from_utf8(&self.input[start..self.pos]).expect("scanned ASCII only");

        if !text.contains(['.', 'e', 'E']) {
            if let Ok(int) = text.parse::<i64>() {
                return Ok(Value::from(int));
            }
        }
        let float = text
            .parse::<f64>()
            .map_err(|_| self.error(format!("invalid number '{text}'")))?;
        Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| self.error("number is not finite"))
    }

    fn parse_keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(byte) if byte.is_ascii_alphabetic()) {
            self.bump();
        }
        let word = std::str::from_utf8(&self.input[start..self.pos]).expect("scanned ASCII only");
        match word {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            other => Err(LiteralError {
                offset: start,
                message: format!("unknown keyword '{other}'"),
            }),
        }
    }
}
