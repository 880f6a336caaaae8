//! Lexer
//!
//! Converts statement text into a sequence of positioned tokens.
//!
//! ## Lexical Rules
//! - Keywords are case-insensitive; identifiers keep their case
//! - Strings are single-quoted, `''` is an embedded quote
//! - Numbers without a decimal point are integers, with one they are floats;
//!   `1.` and `.5` are accepted as `1.0` and `0.5`
//! - Type names (`INT`, `TEXT`, ...) and keywords (`KEY`, `INDEX`, `ORDER`,
//!   ...) are reserved and cannot name a table or column
//! - `NULL` (unquoted) is the Null literal

use crate::error::{Result, TabulaError};
use crate::schema::DataType;

/// The smallest meaningful units of the statement language
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- Keywords ---
    Create,
    Table,
    Index,
    Drop,
    Insert,
    Into,
    Values,
    Select,
    From,
    Inner,
    Join,
    On,
    Where,
    And,
    Or,
    Update,
    Set,
    Delete,
    Primary,
    Key,
    Unique,
    Order,
    By,
    Asc,
    Desc,
    Limit,

    // --- Column Types ---
    Type(DataType),

    // --- Identifiers & Literals ---
    Ident(String),
    Integer(i64),
    Float(f64),
    String(String),
    Null,

    // --- Symbols ---
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Star,
    Dot,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    // --- Special ---
    Eof,
}

impl Token {
    fn keyword(word: &str) -> Option<Token> {
        let token = match word.to_ascii_uppercase().as_str() {
            "CREATE" => Token::Create,
            "TABLE" => Token::Table,
            "INDEX" => Token::Index,
            "DROP" => Token::Drop,
            "INSERT" => Token::Insert,
            "INTO" => Token::Into,
            "VALUES" => Token::Values,
            "SELECT" => Token::Select,
            "FROM" => Token::From,
            "INNER" => Token::Inner,
            "JOIN" => Token::Join,
            "ON" => Token::On,
            "WHERE" => Token::Where,
            "AND" => Token::And,
            "OR" => Token::Or,
            "UPDATE" => Token::Update,
            "SET" => Token::Set,
            "DELETE" => Token::Delete,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "UNIQUE" => Token::Unique,
            "ORDER" => Token::Order,
            "BY" => Token::By,
            "ASC" => Token::Asc,
            "DESC" => Token::Desc,
            "LIMIT" => Token::Limit,
            "NULL" => Token::Null,
            "INT" | "INTEGER" => Token::Type(DataType::Integer),
            "FLOAT" | "REAL" => Token::Type(DataType::Float),
            "TEXT" | "VARCHAR" => Token::Type(DataType::Text),
            _ => return None,
        };
        Some(token)
    }
}

/// A token together with the character offset where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// Scanner over the characters of one statement
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Scan the whole input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let start = self.position;
            if self.is_at_end() {
                tokens.push(Spanned {
                    token: Token::Eof,
                    position: start,
                });
                return Ok(tokens);
            }
            let token = self.next_token()?;
            tokens.push(Spanned {
                token,
                position: start,
            });
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        let start = self.position;
        let ch = self.current();

        let single = match ch {
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semicolon),
            '*' => Some(Token::Star),
            '.' if !self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => Some(Token::Dot),
            '=' => Some(Token::Equal),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        match ch {
            '<' => {
                self.advance();
                Ok(match self.peek_char() {
                    Some('=') => {
                        self.advance();
                        Token::LessEqual
                    }
                    Some('>') => {
                        self.advance();
                        Token::NotEqual
                    }
                    _ => Token::Less,
                })
            }
            '>' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    Ok(Token::GreaterEqual)
                } else {
                    Ok(Token::Greater)
                }
            }
            '!' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    Ok(Token::NotEqual)
                } else {
                    Err(TabulaError::syntax(start, "expected '=' after '!'"))
                }
            }
            '\'' => self.read_string(),
            '-' if self.starts_number(1) => self.read_number(),
            c if c.is_ascii_digit() || c == '.' => self.read_number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_word()),
            c => Err(TabulaError::syntax(start, format!("unexpected character '{}'", c))),
        }
    }

    fn read_string(&mut self) -> Result<Token> {
        let start = self.position;
        self.advance(); // opening quote
        let mut text = String::new();

        loop {
            match self.peek_char() {
                None => return Err(TabulaError::syntax(start, "unterminated string literal")),
                Some('\'') => {
                    self.advance();
                    if self.peek_char() == Some('\'') {
                        text.push('\'');
                        self.advance();
                    } else {
                        return Ok(Token::String(text));
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
    }

    fn read_number(&mut self) -> Result<Token> {
        let start = self.position;
        let mut literal = String::new();

        if self.current() == '-' {
            literal.push('-');
            self.advance();
        }
        self.read_digits(&mut literal);

        if self.peek_char() != Some('.') {
            return literal
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| TabulaError::syntax(start, format!("integer literal {} is out of range", literal)));
        }

        // `1.` and `.5` are floats too
        if literal.is_empty() || literal == "-" {
            literal.push('0');
        }
        literal.push('.');
        self.advance();
        self.read_digits(&mut literal);
        if literal.ends_with('.') {
            literal.push('0');
        }

        match literal.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Token::Float(value)),
            _ => Err(TabulaError::syntax(start, format!("float literal {} is out of range", literal))),
        }
    }

    /// Whether a number starts `offset` chars ahead: a digit, or a point
    /// followed by a digit
    fn starts_number(&self, offset: usize) -> bool {
        match self.peek_at(offset) {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => self.peek_at(offset + 1).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn read_digits(&mut self, into: &mut String) {
        while let Some(c) = self.peek_char().filter(|c| c.is_ascii_digit()) {
            into.push(c);
            self.advance();
        }
    }

    fn read_word(&mut self) -> Token {
        let mut word = String::new();
        while let Some(c) = self.peek_char().filter(|c| c.is_alphanumeric() || *c == '_') {
            word.push(c);
            self.advance();
        }
        Token::keyword(&word).unwrap_or(Token::Ident(word))
    }

    // =========================================================================
    // Cursor Helpers
    // =========================================================================

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn current(&self) -> char {
        self.input[self.position]
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}
