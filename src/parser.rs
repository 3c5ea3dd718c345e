use thiserror::Error;

use crate::{
    ast::Token,
    lexer::{LexError, Lexer, Position},
    output::to_edn,
    value::Value,
};

/// Nesting limit for collections, tagged literals and discards; deeper input
/// is rejected instead of exhausting the stack.
const MAX_DEPTH: usize = 256;

/// Errors produced while assembling tokens into values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found} at {position}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        position: Position,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("map literal starting at {position} has an odd number of forms")]
    OddMapEntries { position: Position },

    #[error("duplicate map key {key} at {position}")]
    DuplicateKey { key: String, position: Position },

    #[error("duplicate set element {element} at {position}")]
    DuplicateSetElement { element: String, position: Position },

    #[error("unexpected {found} after the first form at {position}")]
    TrailingInput { found: String, position: Position },

    #[error("expected a map of query components, found {found}")]
    NotAMap { found: String },

    #[error("component '{name}' is given more than once")]
    DuplicateComponent { name: String },

    #[error("input is empty")]
    EmptyInput,

    #[error("forms nested deeper than {MAX_DEPTH} levels at {position}")]
    TooDeep { position: Position },
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    /// Where `current_token` started.
    token_position: Position,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        lexer.skip_trivia();
        let token_position = lexer.position();
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            token_position,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.lexer.skip_trivia();
        self.token_position = self.lexer.position();
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn take_token(&mut self) -> Result<(Token, Position), ParseError> {
        let position = self.token_position;
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance()?;
        Ok((token, position))
    }

    /// Parses exactly one form; anything but whitespace after it is an error.
    pub fn parse(&mut self) -> Result<Value, ParseError> {
        if self.current_token == Token::Eof {
            return Err(ParseError::EmptyInput);
        }
        let value = self.parse_form()?;
        if self.current_token != Token::Eof {
            return Err(ParseError::TrailingInput {
                found: self.current_token.describe(),
                position: self.token_position,
            });
        }
        Ok(value)
    }

    /// Parses every form until the end of input.
    pub fn parse_all(&mut self) -> Result<Vec<Value>, ParseError> {
        let mut forms = Vec::new();
        loop {
            self.skip_discarded()?;
            if self.current_token == Token::Eof {
                return Ok(forms);
            }
            forms.push(self.parse_form()?);
        }
    }

    /// Drops `#_ form` pairs sitting at the current position.
    ///
    /// A discarded form may itself start with `#_`, so each one counts
    /// towards the nesting limit while it is read.
    fn skip_discarded(&mut self) -> Result<(), ParseError> {
        while self.current_token == Token::Discard {
            let position = self.token_position;
            self.advance()?;
            self.enter(position)?;
            self.parse_form()?;
            self.leave();
        }
        Ok(())
    }

    fn enter(&mut self, position: Position) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { position });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_form(&mut self) -> Result<Value, ParseError> {
        self.skip_discarded()?;

        let (token, position) = self.take_token()?;
        match token {
            Token::Nil => Ok(Value::Nil),
            Token::Boolean(b) => Ok(Value::Boolean(b)),
            Token::Integer(n) => Ok(Value::Integer(n)),
            Token::Float(n) => Ok(Value::Float(n)),
            Token::Decimal(d) => Ok(Value::Decimal(d)),
            Token::String(s) => Ok(Value::String(s)),
            Token::Char(c) => Ok(Value::Char(c)),
            Token::Symbol(s) => Ok(Value::Symbol(s)),
            Token::Keyword(k) => Ok(Value::Keyword(k)),

            Token::LParen => Ok(Value::List(self.parse_seq(Token::RParen, position)?)),
            Token::LBracket => Ok(Value::Vector(self.parse_seq(Token::RBracket, position)?)),
            Token::LBrace => self.parse_map(position),
            Token::SetOpen => self.parse_set(position),

            Token::AnonFnOpen => Ok(Value::AnonFn(self.parse_seq(Token::RParen, position)?)),
            Token::Regex(pattern) => Ok(Value::Regex(pattern)),

            Token::Tag(tag) => {
                self.enter(position)?;
                self.skip_discarded()?;
                if self.current_token == Token::Eof {
                    return Err(ParseError::UnexpectedEof {
                        expected: "a form after the tag",
                    });
                }
                let inner = self.parse_form()?;
                self.leave();
                Ok(Value::Tagged(tag, Box::new(inner)))
            }

            Token::Eof => Err(ParseError::UnexpectedEof { expected: "a form" }),
            token @ (Token::RParen | Token::RBracket | Token::RBrace | Token::Discard) => {
                Err(ParseError::UnexpectedToken {
                    expected: "a form",
                    found: token.describe(),
                    position,
                })
            }
        }
    }

    fn parse_seq(&mut self, close: Token, open_at: Position) -> Result<Vec<Value>, ParseError> {
        self.enter(open_at)?;

        let expected = match close {
            Token::RParen => "')'",
            Token::RBracket => "']'",
            _ => "'}'",
        };

        let mut items = Vec::new();
        loop {
            self.skip_discarded()?;
            if self.current_token == close {
                self.advance()?;
                break;
            }
            match &self.current_token {
                Token::Eof => return Err(ParseError::UnexpectedEof { expected }),
                Token::RParen | Token::RBracket | Token::RBrace => {
                    return Err(ParseError::UnexpectedToken {
                        expected,
                        found: self.current_token.describe(),
                        position: self.token_position,
                    });
                }
                _ => items.push(self.parse_form()?),
            }
        }

        self.leave();
        Ok(items)
    }

    fn parse_map(&mut self, open_at: Position) -> Result<Value, ParseError> {
        let forms = self.parse_seq(Token::RBrace, open_at)?;
        if forms.len() % 2 != 0 {
            return Err(ParseError::OddMapEntries { position: open_at });
        }

        let mut entries: Vec<(Value, Value)> = Vec::with_capacity(forms.len() / 2);
        let mut forms = forms.into_iter();
        while let (Some(key), Some(value)) = (forms.next(), forms.next()) {
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(ParseError::DuplicateKey {
                    key: to_edn(&key),
                    position: open_at,
                });
            }
            entries.push((key, value));
        }
        Ok(Value::Map(entries))
    }

    fn parse_set(&mut self, open_at: Position) -> Result<Value, ParseError> {
        let forms = self.parse_seq(Token::RBrace, open_at)?;
        let mut elements: Vec<Value> = Vec::with_capacity(forms.len());
        for form in forms {
            if elements.contains(&form) {
                return Err(ParseError::DuplicateSetElement {
                    element: to_edn(&form),
                    position: open_at,
                });
            }
            elements.push(form);
        }
        Ok(Value::Set(elements))
    }
}

/// Parses a single EDN form from `input`.
///
/// # Examples
///
/// ```
/// use advq::{parser::parse_str, Value};
///
/// let value = parse_str("[:find ?b]").unwrap();
/// assert_eq!(
///     value,
///     Value::Vector(vec![Value::keyword("find"), Value::symbol("?b")])
/// );
/// ```
pub fn parse_str(input: &str) -> Result<Value, ParseError> {
    Parser::new(Lexer::new(input))?.parse()
}
