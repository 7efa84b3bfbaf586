//! Recursive-descent parser for the two interchange statement shapes.
//!
//! A statement is either a node creation or a matched relationship
//! creation; anything else is rejected. Keywords match case-insensitively,
//! as the original exports they mirror allowed.

use super::ast::{EdgeCreate, MatchBinding, NodeCreate, Statement};
use super::lexer::{tokenize, Token};
use crate::graph::{PropertyMap, PropertyValue};
use thiserror::Error;

/// Parser errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated quoted identifier")]
    UnterminatedIdentifier,

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("unexpected end of statement, expected {0}")]
    UnexpectedEnd(String),

    #[error("unsupported statement: {0}")]
    UnsupportedStatement(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse one `;`-stripped statement into its typed form.
pub fn parse_statement(input: &str) -> ParseResult<Statement> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let statement = match parser.peek_keyword().as_deref() {
        Some("CREATE") => Statement::NodeCreate(parser.node_create()?),
        Some("MATCH") => Statement::EdgeCreate(parser.edge_create()?),
        _ => {
            let head: String = input.trim().chars().take(50).collect();
            return Err(ParseError::UnsupportedStatement(head));
        }
    };
    parser.expect_end()?;
    Ok(statement)
}

/// Parse a standalone value literal. This is the decoding half of the
/// property value codec.
pub(crate) fn parse_value_literal(input: &str) -> ParseResult<PropertyValue> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let value = parser.value()?;
    parser.expect_end()?;
    Ok(value)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self) -> Option<String> {
        match self.peek() {
            Some(Token::Ident(word)) => Some(word.to_ascii_uppercase()),
            _ => None,
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> ParseResult<()> {
        match self.bump() {
            Some(token) if token == *expected => Ok(()),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: what.to_string(),
                found: token.to_string(),
            }),
            None => Err(ParseError::UnexpectedEnd(what.to_string())),
        }
    }

    fn expect_keyword(&mut self, word: &str) -> ParseResult<()> {
        match self.bump() {
            Some(Token::Ident(found)) if found.eq_ignore_ascii_case(word) => Ok(()),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: format!("keyword {}", word),
                found: token.to_string(),
            }),
            None => Err(ParseError::UnexpectedEnd(format!("keyword {}", word))),
        }
    }

    fn ident(&mut self, what: &str) -> ParseResult<String> {
        match self.bump() {
            Some(Token::Ident(name)) => Ok(name),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: what.to_string(),
                found: token.to_string(),
            }),
            None => Err(ParseError::UnexpectedEnd(what.to_string())),
        }
    }

    fn expect_end(&mut self) -> ParseResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: "end of statement".to_string(),
                found: token.to_string(),
            }),
        }
    }

    /// `CREATE ( <var> : <label> {props}? )`
    fn node_create(&mut self) -> ParseResult<NodeCreate> {
        self.expect_keyword("CREATE")?;
        self.expect(&Token::LParen, "'('")?;
        let variable = self.ident("variable")?;
        self.expect(&Token::Colon, "':'")?;
        let label = self.ident("label")?;
        let properties = self.optional_property_block()?;
        self.expect(&Token::RParen, "')'")?;
        Ok(NodeCreate { variable, label, properties })
    }

    /// `MATCH <binding> , <binding> CREATE ( <var> ) - [ <rv>? : <TYPE>
    /// {props}? ] -> ( <var> )`
    fn edge_create(&mut self) -> ParseResult<EdgeCreate> {
        self.expect_keyword("MATCH")?;
        let first = self.match_binding()?;
        self.expect(&Token::Comma, "','")?;
        let second = self.match_binding()?;

        self.expect_keyword("CREATE")?;
        self.expect(&Token::LParen, "'('")?;
        let from_var = self.ident("variable")?;
        self.expect(&Token::RParen, "')'")?;
        self.expect(&Token::Dash, "'-'")?;
        self.expect(&Token::LBracket, "'['")?;
        let rel_variable = match self.peek() {
            Some(Token::Ident(_)) => Some(self.ident("relationship variable")?),
            _ => None,
        };
        self.expect(&Token::Colon, "':'")?;
        let rel_type = self.ident("relationship type")?;
        let properties = self.optional_property_block()?;
        self.expect(&Token::RBracket, "']'")?;
        self.expect(&Token::Arrow, "'->'")?;
        self.expect(&Token::LParen, "'('")?;
        let to_var = self.ident("variable")?;
        self.expect(&Token::RParen, "')'")?;

        Ok(EdgeCreate {
            bindings: vec![first, second],
            from_var,
            rel_variable,
            rel_type,
            properties,
            to_var,
        })
    }

    /// `( <var> { __id : <int> } )`
    fn match_binding(&mut self) -> ParseResult<MatchBinding> {
        self.expect(&Token::LParen, "'('")?;
        let variable = self.ident("variable")?;
        self.expect(&Token::LBrace, "'{'")?;
        let key = self.ident("__id")?;
        if key != "__id" {
            return Err(ParseError::UnexpectedToken {
                expected: "__id".to_string(),
                found: format!("identifier '{}'", key),
            });
        }
        self.expect(&Token::Colon, "':'")?;
        let original_id = match self.bump() {
            Some(Token::Int(id)) if id >= 0 => id as u64,
            Some(token) => {
                return Err(ParseError::UnexpectedToken {
                    expected: "node id".to_string(),
                    found: token.to_string(),
                })
            }
            None => return Err(ParseError::UnexpectedEnd("node id".to_string())),
        };
        self.expect(&Token::RBrace, "'}'")?;
        self.expect(&Token::RParen, "')'")?;
        Ok(MatchBinding { variable, original_id })
    }

    fn optional_property_block(&mut self) -> ParseResult<PropertyMap> {
        match self.peek() {
            Some(Token::LBrace) => self.property_block(),
            _ => Ok(PropertyMap::new()),
        }
    }

    /// `{ <key> : <value> , ... }`; keys are plain or backtick-quoted
    /// identifiers; nesting and quoting were resolved by the lexer, so a
    /// comma here is always a separator.
    fn property_block(&mut self) -> ParseResult<PropertyMap> {
        self.expect(&Token::LBrace, "'{'")?;
        let mut map = PropertyMap::new();
        if let Some(Token::RBrace) = self.peek() {
            self.bump();
            return Ok(map);
        }
        loop {
            let key = self.ident("property key")?;
            self.expect(&Token::Colon, "':'")?;
            let value = self.value()?;
            map.insert(key, value);
            match self.bump() {
                Some(Token::Comma) => continue,
                Some(Token::RBrace) => break,
                Some(token) => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "',' or '}'".to_string(),
                        found: token.to_string(),
                    })
                }
                None => return Err(ParseError::UnexpectedEnd("'}'".to_string())),
            }
        }
        Ok(map)
    }

    /// `null | true | false | <number> | <string> | [ <value> , ... ]`
    ///
    /// A bare word that is none of the keywords decodes as a string, which
    /// is what the original regex-based reader did.
    fn value(&mut self) -> ParseResult<PropertyValue> {
        match self.bump() {
            Some(Token::Str(s)) => Ok(PropertyValue::String(s)),
            Some(Token::Int(i)) => Ok(PropertyValue::Int(i)),
            Some(Token::Float(f)) => Ok(PropertyValue::Float(f)),
            Some(Token::Ident(word)) => Ok(match word.as_str() {
                "null" => PropertyValue::Null,
                "true" => PropertyValue::Bool(true),
                "false" => PropertyValue::Bool(false),
                _ => PropertyValue::String(word),
            }),
            Some(Token::LBracket) => {
                let mut items = Vec::new();
                if let Some(Token::RBracket) = self.peek() {
                    self.bump();
                    return Ok(PropertyValue::List(items));
                }
                loop {
                    items.push(self.value()?);
                    match self.bump() {
                        Some(Token::Comma) => continue,
                        Some(Token::RBracket) => break,
                        Some(token) => {
                            return Err(ParseError::UnexpectedToken {
                                expected: "',' or ']'".to_string(),
                                found: token.to_string(),
                            })
                        }
                        None => return Err(ParseError::UnexpectedEnd("']'".to_string())),
                    }
                }
                Ok(PropertyValue::List(items))
            }
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: "value".to_string(),
                found: token.to_string(),
            }),
            None => Err(ParseError::UnexpectedEnd("value".to_string())),
        }
    }
}
