//! Tokenizer for the interchange subset.
//!
//! Escaped quotes, backtick-quoted identifiers and negative number literals
//! are resolved here, so the parser above only ever sees structure.

use super::parser::{ParseError, ParseResult};
use std::fmt;

/// One lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Plain or backtick-quoted identifier, quoting already resolved
    Ident(String),
    /// String literal, escapes already resolved
    Str(String),
    Int(i64),
    Float(f64),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Dash,
    Arrow,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::Str(s) => write!(f, "string \"{}\"", s),
            Token::Int(i) => write!(f, "integer {}", i),
            Token::Float(fl) => write!(f, "float {}", fl),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::Colon => f.write_str("':'"),
            Token::Comma => f.write_str("','"),
            Token::Dash => f.write_str("'-'"),
            Token::Arrow => f.write_str("'->'"),
        }
    }
}

/// Tokenize one statement. Whitespace, newlines included, only separates
/// tokens, which is what rejoins a MATCH clause with a CREATE clause on the
/// next line into one logical statement.
pub fn tokenize(input: &str) -> ParseResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            c if c.is_whitespace() => pos += 1,
            '(' => {
                tokens.push(Token::LParen);
                pos += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                pos += 1;
            }
            '{' => {
                tokens.push(Token::LBrace);
                pos += 1;
            }
            '}' => {
                tokens.push(Token::RBrace);
                pos += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                pos += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                pos += 1;
            }
            ':' => {
                tokens.push(Token::Colon);
                pos += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                pos += 1;
            }
            '-' => {
                if chars.get(pos + 1) == Some(&'>') {
                    tokens.push(Token::Arrow);
                    pos += 2;
                } else if chars.get(pos + 1).is_some_and(|d| d.is_ascii_digit()) {
                    let (token, next) = lex_number(&chars, pos)?;
                    tokens.push(token);
                    pos = next;
                } else {
                    tokens.push(Token::Dash);
                    pos += 1;
                }
            }
            '"' => {
                let (text, next) = lex_string(&chars, pos)?;
                tokens.push(Token::Str(text));
                pos = next;
            }
            '`' => {
                let (name, next) = lex_backtick(&chars, pos)?;
                tokens.push(Token::Ident(name));
                pos = next;
            }
            c if c.is_ascii_digit() => {
                let (token, next) = lex_number(&chars, pos)?;
                tokens.push(token);
                pos = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                tokens.push(Token::Ident(chars[start..pos].iter().collect()));
            }
            other => return Err(ParseError::UnexpectedChar(other)),
        }
    }
    Ok(tokens)
}

/// Number literal: optional leading `-`, digits, optional `.` and fraction
/// digits. Float iff a decimal point is present; an integer too large for
/// i64 falls back to float.
fn lex_number(chars: &[char], start: usize) -> ParseResult<(Token, usize)> {
    let mut pos = start;
    if chars[pos] == '-' {
        pos += 1;
    }
    let mut has_dot = false;
    while pos < chars.len() {
        let c = chars[pos];
        if c.is_ascii_digit() {
            pos += 1;
        } else if c == '.' && !has_dot {
            has_dot = true;
            pos += 1;
        } else {
            break;
        }
    }
    let text: String = chars[start..pos].iter().collect();
    let token = if has_dot {
        Token::Float(text.parse::<f64>().map_err(|_| ParseError::InvalidNumber(text.clone()))?)
    } else {
        match text.parse::<i64>() {
            Ok(i) => Token::Int(i),
            Err(_) => Token::Float(
                text.parse::<f64>().map_err(|_| ParseError::InvalidNumber(text.clone()))?,
            ),
        }
    };
    Ok((token, pos))
}

/// Quoted string. Recognized escapes: `\\`, `\"`, `\n`, `\r`, `\t`; an
/// unknown escape keeps the backslash verbatim.
fn lex_string(chars: &[char], start: usize) -> ParseResult<(String, usize)> {
    let mut pos = start + 1;
    let mut out = String::new();
    while pos < chars.len() {
        match chars[pos] {
            '"' => return Ok((out, pos + 1)),
            '\\' => {
                match chars.get(pos + 1) {
                    Some('\\') => out.push('\\'),
                    Some('"') => out.push('"'),
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some(other) => {
                        out.push('\\');
                        out.push(*other);
                    }
                    None => return Err(ParseError::UnterminatedString),
                }
                pos += 2;
            }
            c => {
                out.push(c);
                pos += 1;
            }
        }
    }
    Err(ParseError::UnterminatedString)
}

/// Backtick-quoted identifier; a doubled backtick is a literal backtick.
fn lex_backtick(chars: &[char], start: usize) -> ParseResult<(String, usize)> {
    let mut pos = start + 1;
    let mut out = String::new();
    while pos < chars.len() {
        if chars[pos] == '`' {
            if chars.get(pos + 1) == Some(&'`') {
                out.push('`');
                pos += 2;
            } else {
                return Ok((out, pos + 1));
            }
        } else {
            out.push(chars[pos]);
            pos += 1;
        }
    }
    Err(ParseError::UnterminatedIdentifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_node_statement() {
        let tokens = tokenize(r#"CREATE (n1:Person {name: "Alice", age: 30})"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("CREATE".to_string()),
                Token::LParen,
                Token::Ident("n1".to_string()),
                Token::Colon,
                Token::Ident("Person".to_string()),
                Token::LBrace,
                Token::Ident("name".to_string()),
                Token::Colon,
                Token::Str("Alice".to_string()),
                Token::Comma,
                Token::Ident("age".to_string()),
                Token::Colon,
                Token::Int(30),
                Token::RBrace,
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_arrow_and_dash() {
        let tokens = tokenize("(a)-[r:KNOWS]->(b)").unwrap();
        assert!(tokens.contains(&Token::Dash));
        assert!(tokens.contains(&Token::Arrow));
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(tokenize("42").unwrap(), vec![Token::Int(42)]);
        assert_eq!(tokenize("-7").unwrap(), vec![Token::Int(-7)]);
        assert_eq!(tokenize("2.5").unwrap(), vec![Token::Float(2.5)]);
        assert_eq!(tokenize("-0.5").unwrap(), vec![Token::Float(-0.5)]);
    }

    #[test]
    fn test_tokenize_string_escapes() {
        let tokens = tokenize(r#""line\nquote\"back\\slash\ttab""#).unwrap();
        assert_eq!(tokens, vec![Token::Str("line\nquote\"back\\slash\ttab".to_string())]);
    }

    #[test]
    fn test_tokenize_string_keeps_unknown_escape() {
        assert_eq!(tokenize(r#""a\qb""#).unwrap(), vec![Token::Str("a\\qb".to_string())]);
    }

    #[test]
    fn test_tokenize_backtick_identifier() {
        let tokens = tokenize("`weird key!`: 1").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Ident("weird key!".to_string()), Token::Colon, Token::Int(1)]
        );
        assert_eq!(tokenize("`tick``tock`").unwrap(), vec![Token::Ident("tick`tock".to_string())]);
    }

    #[test]
    fn test_tokenize_errors() {
        assert_eq!(tokenize(r#""open"#), Err(ParseError::UnterminatedString));
        assert_eq!(tokenize("`open"), Err(ParseError::UnterminatedIdentifier));
        assert_eq!(tokenize("@"), Err(ParseError::UnexpectedChar('@')));
    }
}
