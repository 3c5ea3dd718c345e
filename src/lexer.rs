use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::ast::Token;

/// Line/column of a character in the source, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors produced while splitting EDN text into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: Position },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("invalid escape sequence '\\{escape}' at {position}")]
    InvalidEscape { escape: String, position: Position },

    #[error("invalid number '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },

    #[error("invalid character literal '\\{text}' at {position}")]
    InvalidCharacter { text: String, position: Position },

    #[error("invalid keyword at {position}")]
    InvalidKeyword { position: Position },

    #[error("unsupported dispatch '#{ch}' at {position}")]
    UnsupportedDispatch { ch: char, position: Position },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

/// Characters that may appear inside a symbol or keyword name.
fn is_symbol_char(ch: char) -> bool {
    ch.is_alphanumeric() || ".*+!-_?$%&=<>/'#:".contains(ch)
}

/// Characters that may start a symbol.
fn is_symbol_start(ch: char) -> bool {
    ch.is_alphabetic() || ".*+!-_?$%&=<>/'".contains(ch)
}

fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || ch == ',' || "()[]{}\";".contains(ch)
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Position of the next unread character.
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += 1;
    }

    /// Skips whitespace, commas, and `;` line comments, so that
    /// [`Lexer::position`] points at the start of the next token.
    pub fn skip_trivia(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() || ch == ',' {
                self.advance();
            } else if ch == ';' {
                while let Some(c) = self.current_char() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_name(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_symbol_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads exactly four hex digits; on failure returns the digits seen.
    fn read_hex4(&mut self) -> Result<char, String> {
        let mut hex = String::new();
        for _ in 0..4 {
            match self.current_char() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|_| hex.len() == 4)
            .and_then(char::from_u32)
            .ok_or(hex)
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.position();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.position();
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('b') => result.push('\u{8}'),
                        Some('f') => result.push('\u{c}'),
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        Some('u') => {
                            self.advance();
                            let decoded = self.read_hex4().map_err(|hex| {
                                LexError::InvalidEscape {
                                    escape: format!("u{}", hex),
                                    position: escape_at,
                                }
                            })?;
                            result.push(decoded);
                            continue;
                        }
                        Some(other) => {
                            return Err(LexError::InvalidEscape {
                                escape: other.to_string(),
                                position: escape_at,
                            });
                        }
                        None => return Err(LexError::UnterminatedString { position: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    /// Body of `#"..."`. Escapes belong to the pattern and are kept verbatim;
    /// only `\"` stops the literal from ending.
    fn read_regex(&mut self, start: Position) -> Result<String, LexError> {
        self.advance(); // opening quote
        let mut pattern = String::new();

        while let Some(ch) = self.current_char() {
            self.advance();
            match ch {
                '"' => return Ok(pattern),
                '\\' => {
                    pattern.push(ch);
                    match self.current_char() {
                        Some(escaped) => {
                            pattern.push(escaped);
                            self.advance();
                        }
                        None => break,
                    }
                }
                _ => pattern.push(ch),
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    fn read_char_literal(&mut self) -> Result<Token, LexError> {
        let start = self.position();
        self.advance(); // backslash

        let first = match self.current_char() {
            Some(c) => c,
            None => {
                return Err(LexError::InvalidCharacter {
                    text: String::new(),
                    position: start,
                });
            }
        };
        self.advance();

        if !first.is_alphabetic() {
            return Ok(Token::Char(first));
        }

        let mut name = first.to_string();
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let ch = match name.as_str() {
            single if single.chars().count() == 1 => first,
            "newline" => '\n',
            "space" => ' ',
            "tab" => '\t',
            "return" => '\r',
            "formfeed" => '\u{c}',
            "backspace" => '\u{8}',
            hex if hex.len() == 5 && hex.starts_with('u') => u32::from_str_radix(&hex[1..], 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| LexError::InvalidCharacter {
                    text: name.clone(),
                    position: start,
                })?,
            _ => {
                return Err(LexError::InvalidCharacter {
                    text: name.clone(),
                    position: start,
                });
            }
        };
        Ok(Token::Char(ch))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position();
        let mut number = String::new();
        let mut is_float = false;

        if let Some(sign @ ('+' | '-')) = self.current_char() {
            number.push(sign);
            self.advance();
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.' && !is_float {
                is_float = true;
                number.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E') && !number.contains(['e', 'E']) {
                is_float = true;
                number.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char() {
                    number.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        let suffix = match self.current_char() {
            Some(s @ ('N' | 'M')) => {
                self.advance();
                Some(s)
            }
            _ => None,
        };

        let invalid = |text: String| LexError::InvalidNumber {
            text,
            position: start,
        };

        if let Some(c) = self.current_char() {
            if !is_delimiter(c) {
                number.push(c);
                return Err(invalid(number));
            }
        }

        match suffix {
            Some('M') => number
                .parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(&number))
                .map(Token::Decimal)
                .map_err(|_| invalid(format!("{}M", number))),
            Some(_) if is_float => Err(invalid(format!("{}N", number))),
            Some(_) => number
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| invalid(format!("{}N", number))),
            None if is_float => number
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| invalid(number)),
            None => number
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| invalid(number)),
        }
    }

    fn read_dispatch(&mut self) -> Result<Token, LexError> {
        let start = self.position();
        self.advance(); // '#'

        match self.current_char() {
            Some('{') => {
                self.advance();
                Ok(Token::SetOpen)
            }
            Some('_') => {
                self.advance();
                Ok(Token::Discard)
            }
            Some('(') => {
                self.advance();
                Ok(Token::AnonFnOpen)
            }
            Some('"') => Ok(Token::Regex(self.read_regex(start)?)),
            Some('#') => {
                self.advance();
                match self.read_name().as_str() {
                    "Inf" => Ok(Token::Float(f64::INFINITY)),
                    "-Inf" => Ok(Token::Float(f64::NEG_INFINITY)),
                    "NaN" => Ok(Token::Float(f64::NAN)),
                    _ => Err(LexError::UnsupportedDispatch { ch: '#', position: start }),
                }
            }
            Some(c) if c.is_alphabetic() => Ok(Token::Tag(self.read_name())),
            Some(c) => Err(LexError::UnsupportedDispatch { ch: c, position: start }),
            None => Err(LexError::UnexpectedChar {
                ch: '#',
                position: start,
            }),
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('[') => {
                self.advance();
                Token::LBracket
            }
            Some(']') => {
                self.advance();
                Token::RBracket
            }
            Some('{') => {
                self.advance();
                Token::LBrace
            }
            Some('}') => {
                self.advance();
                Token::RBrace
            }
            Some('#') => self.read_dispatch()?,
            Some('"') => Token::String(self.read_string()?),
            Some('\\') => self.read_char_literal()?,
            Some(':') => {
                let start = self.position();
                self.advance();
                match self.current_char() {
                    Some(c) if is_symbol_char(c) && c != ':' && c != '#' => {
                        Token::Keyword(self.read_name())
                    }
                    _ => return Err(LexError::InvalidKeyword { position: start }),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some('+' | '-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()?
            }
            Some(ch) if is_symbol_start(ch) => {
                let name = self.read_name();
                match name.as_str() {
                    "nil" => Token::Nil,
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    _ => Token::Symbol(name),
                }
            }
            Some(ch) => {
                return Err(LexError::UnexpectedChar {
                    ch,
                    position: self.position(),
                });
            }
        };

        Ok(token)
    }

    /// Reads every remaining token, stopping after [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[test]
fn test_literals() {
    let mut lexer = Lexer::new("nil true false");
    assert_eq!(lexer.next_token().unwrap(), Token::Nil);
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_query_vector() {
    let mut lexer = Lexer::new("[:find ?b :where [?b :block/refs #{\"TODO\"}]]");
    assert_eq!(lexer.next_token().unwrap(), Token::LBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::Keyword("find".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Symbol("?b".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Keyword("where".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::LBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::Symbol("?b".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Keyword("block/refs".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::SetOpen);
    assert_eq!(lexer.next_token().unwrap(), Token::String("TODO".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::RBrace);
    assert_eq!(lexer.next_token().unwrap(), Token::RBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::RBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}
