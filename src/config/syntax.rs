//! Reader for the `pacwall.conf` grammar.
//!
//! A file is a list of settings. Each setting is `name = value` or
//! `name: value`, optionally ended by `;` or `,`. A value is one of:
//! - a scalar: `"string"`, `true`/`false`, an integer (`42`, `0x2A`, `42L`) or
//!   a float (`2e-5`, `.5`)
//! - a group: `{ settings }`
//! - an array of scalars: `[ 1, 2 ]`
//! - a list of any values: `( "a", { b = 1; } )`
//!
//! Comments run from `#` or `//` to the end of the line, or sit between `/*`
//! and `*/`. Adjacent string literals are joined into one string.
//!
//! The result is a [`Value`] tree: groups become mappings in file order,
//! arrays and lists become sequences. Every syntax error carries the line it
//! was found on.

use crate::error::{ResolveError, ResolveResult};
use serde_yaml::{Mapping, Value};

/// Parse configuration text into a tree whose root is a group.
///
/// An empty file (or one holding only comments) yields an empty group.
pub fn parse_tree(text: &str) -> ResolveResult<Value> {
    let mut parser = Parser::new(text);
    Ok(Value::Mapping(parser.parse_settings(None)?))
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ResolveError {
        ResolveError::ConfigMalformed {
            line: self.line,
            message: message.into(),
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> ResolveResult<()> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('#'), _) | (Some('/'), Some('/')) => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.line;
                    self.pos += 2;
                    loop {
                        match (self.peek(), self.peek_second()) {
                            (Some('*'), Some('/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => {
                                return Err(ResolveError::ConfigMalformed {
                                    line: start,
                                    message: "unterminated comment".to_string(),
                                });
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Settings up to `close`, or to the end of input for the top level.
    fn parse_settings(&mut self, close: Option<char>) -> ResolveResult<Mapping> {
        let mut group = Mapping::new();
        loop {
            self.skip_trivia()?;
            match (self.peek(), close) {
                (None, None) => return Ok(group),
                (None, Some(close)) => {
                    return Err(self.error(format!("unexpected end of file, expected '{close}'")));
                }
                (Some(c), Some(close)) if c == close => {
                    self.bump();
                    return Ok(group);
                }
                (Some('@'), _) => return Err(self.error("include directives are not supported")),
                _ => {}
            }

            let line = self.line;
            let name = self.parse_name()?;
            self.skip_trivia()?;
            match self.peek() {
                Some('=') | Some(':') => {
                    self.bump();
                }
                _ => {
                    return Err(self.error(format!("expected '=' or ':' after '{name}'")));
                }
            }
            self.skip_trivia()?;
            let value = self.parse_value()?;
            self.skip_trivia()?;
            if matches!(self.peek(), Some(';') | Some(',')) {
                self.bump();
            }

            if group.insert(Value::String(name.clone()), value).is_some() {
                return Err(ResolveError::ConfigMalformed {
                    line,
                    message: format!("duplicate setting name '{name}'"),
                });
            }
        }
    }

    fn parse_name(&mut self) -> ResolveResult<String> {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '*' => {}
            Some(c) => return Err(self.error(format!("unexpected '{c}', expected a setting name"))),
            None => return Err(self.error("unexpected end of file, expected a setting name")),
        }
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '*'))
        {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_value(&mut self) -> ResolveResult<Value> {
        match self.peek() {
            Some('{') => {
                self.bump();
                Ok(Value::Mapping(self.parse_settings(Some('}'))?))
            }
            Some('[') => {
                self.bump();
                self.parse_elements(']', true)
            }
            Some('(') => {
                self.bump();
                self.parse_elements(')', false)
            }
            Some('"') => self.parse_string(),
            Some(_) => self.parse_word(),
            None => Err(self.error("unexpected end of file, expected a value")),
        }
    }

    /// Comma separated values up to `close`. A trailing comma is allowed.
    fn parse_elements(&mut self, close: char, scalars_only: bool) -> ResolveResult<Value> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(close) {
                self.bump();
                return Ok(Value::Sequence(items));
            }

            let value = self.parse_value()?;
            if scalars_only && matches!(value, Value::Mapping(_) | Value::Sequence(_)) {
                return Err(self.error("arrays may only hold scalar values"));
            }
            items.push(value);

            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(c) if c == close => {}
                Some(c) => return Err(self.error(format!("unexpected '{c}', expected ',' or '{close}'"))),
                None => return Err(self.error(format!("unexpected end of file, expected '{close}'"))),
            }
        }
    }

    /// One or more adjacent string literals, joined.
    fn parse_string(&mut self) -> ResolveResult<Value> {
        let mut text = String::new();
        while self.peek() == Some('"') {
            self.parse_string_literal(&mut text)?;
            self.skip_trivia()?;
        }
        Ok(Value::String(text))
    }

    fn parse_string_literal(&mut self, out: &mut String) -> ResolveResult<()> {
        let start = self.line;
        self.bump();
        loop {
            match self.bump() {
                Some('"') => return Ok(()),
                Some('\\') => {
                    let unescaped = match self.bump() {
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('f') => '\u{c}',
                        Some('x') => self.parse_hex_escape()?,
                        Some(other) => {
                            return Err(self.error(format!("unknown escape sequence '\\{other}'")));
                        }
                        None => break,
                    };
                    out.push(unescaped);
                }
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(ResolveError::ConfigMalformed {
            line: start,
            message: "unterminated string".to_string(),
        })
    }

    /// The two digits of a `\xHH` escape. Only ASCII is accepted.
    fn parse_hex_escape(&mut self) -> ResolveResult<char> {
        let mut code = 0;
        for _ in 0..2 {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("expected two hex digits after '\\x'"))?;
            self.pos += 1;
            code = code * 16 + digit;
        }
        char::from_u32(code)
            .filter(char::is_ascii)
            .ok_or_else(|| self.error(format!("'\\x{code:02x}' is not an ASCII character")))
    }

    /// A bare scalar: boolean, integer or float.
    fn parse_word(&mut self) -> ResolveResult<Value> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.' | '_'))
        {
            self.pos += 1;
        }
        if start == self.pos {
            let found = self.peek().unwrap_or(' ');
            return Err(self.error(format!("unexpected '{found}', expected a value")));
        }

        let word: String = self.chars[start..self.pos].iter().collect();
        scalar_from_word(&word).ok_or_else(|| self.error(format!("'{word}' is not a valid value")))
    }
}

fn scalar_from_word(word: &str) -> Option<Value> {
    if word.eq_ignore_ascii_case("true") {
        return Some(Value::Bool(true));
    }
    if word.eq_ignore_ascii_case("false") {
        return Some(Value::Bool(false));
    }

    let (negative, unsigned) = match word.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, word.strip_prefix('+').unwrap_or(word)),
    };
    let digits = unsigned.trim_end_matches('L');
    let integer = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None if digits.bytes().all(|b| b.is_ascii_digit()) => digits.parse::<i64>().ok(),
        None => None,
    };
    if let Some(n) = integer {
        let n = if negative { -n } else { n };
        return Some(Value::Number(n.into()));
    }

    let float_chars = word
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if float_chars && word.chars().any(|c| c.is_ascii_digit()) {
        return word.parse::<f64>().ok().map(|f| Value::Number(f.into()));
    }
    None
}
