//! Grammar
//!
//! Recursive-descent parser from tokens to a [`Statement`].

use crate::error::{Result, TabulaError};
use crate::schema::{Column, Constraint, DataType, Value};

use super::lexer::{Lexer, Spanned, Token};
use super::statement::*;

/// Parse one statement. A trailing `;` is optional.
pub fn parse(text: &str) -> Result<Statement> {
    let tokens = Lexer::new(text).tokenize()?;
    Parser::new(tokens).parse()
}

/// Token-stream parser for a single statement
pub struct Parser {
    tokens: Vec<Spanned>,
    position: usize,
}

impl Parser {
    /// Takes tokens as produced by [`Lexer::tokenize`]. A missing trailing
    /// `Token::Eof` is added.
    pub fn new(mut tokens: Vec<Spanned>) -> Self {
        if tokens.last().map(|t| &t.token) != Some(&Token::Eof) {
            let position = tokens.last().map_or(0, |t| t.position + 1);
            tokens.push(Spanned {
                token: Token::Eof,
                position,
            });
        }
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Statement> {
        let statement = match self.current() {
            Token::Create => self.parse_create(),
            Token::Drop => self.parse_drop_table(),
            Token::Insert => self.parse_insert(),
            Token::Select => self.parse_select(),
            Token::Update => self.parse_update(),
            Token::Delete => self.parse_delete(),
            Token::Eof => Err(self.error("empty statement")),
            other => Err(self.error(format!("unexpected {:?} at start of statement", other))),
        }?;

        if self.check(&Token::Semicolon) {
            self.advance();
        }

        if !self.check(&Token::Eof) {
            return Err(self.error(format!(
                "unexpected {:?} after end of statement",
                self.current()
            )));
        }

        Ok(statement)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_create(&mut self) -> Result<Statement> {
        self.expect(Token::Create)?;
        match self.current() {
            Token::Table => self.parse_create_table(),
            Token::Index => self.parse_create_index(),
            _ => Err(self.error("expected TABLE or INDEX after CREATE")),
        }
    }

    fn parse_create_table(&mut self) -> Result<Statement> {
        self.expect(Token::Table)?;
        let name = self.expect_ident()?;
        self.expect(Token::LeftParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            match self.current() {
                Token::Comma => self.advance(),
                Token::RightParen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error("expected ',' or ')' in column list")),
            }
        }

        Ok(Statement::CreateTable(CreateTable { name, columns }))
    }

    fn parse_column_def(&mut self) -> Result<Column> {
        let name = self.expect_ident()?;
        let data_type = self.expect_type()?;

        let constraint = match self.current() {
            Token::Primary => {
                self.advance();
                self.expect(Token::Key)?;
                Constraint::PrimaryKey
            }
            Token::Unique => {
                self.advance();
                Constraint::Unique
            }
            _ => Constraint::None,
        };

        if constraint != Constraint::None && matches!(self.current(), Token::Primary | Token::Unique) {
            return Err(self.error(format!("column '{}' has more than one constraint", name)));
        }

        Ok(Column::new(name, data_type).with_constraint(constraint))
    }

    fn parse_create_index(&mut self) -> Result<Statement> {
        self.expect(Token::Index)?;
        self.expect(Token::On)?;
        let table = self.expect_ident()?;
        self.expect(Token::LeftParen)?;
        let column = self.expect_ident()?;
        self.expect(Token::RightParen)?;
        Ok(Statement::CreateIndex(CreateIndex { table, column }))
    }

    fn parse_drop_table(&mut self) -> Result<Statement> {
        self.expect(Token::Drop)?;
        self.expect(Token::Table)?;
        let name = self.expect_ident()?;
        Ok(Statement::DropTable(DropTable { name }))
    }

    fn parse_insert(&mut self) -> Result<Statement> {
        self.expect(Token::Insert)?;
        self.expect(Token::Into)?;
        let table = self.expect_ident()?;

        let columns = if self.check(&Token::LeftParen) {
            self.advance();
            let names = self.parse_list(Self::expect_ident)?;
            self.expect(Token::RightParen)?;
            Some(names)
        } else {
            None
        };

        self.expect(Token::Values)?;
        self.expect(Token::LeftParen)?;
        let values = self.parse_list(Self::expect_literal)?;
        self.expect(Token::RightParen)?;

        Ok(Statement::Insert(Insert {
            table,
            columns,
            values,
        }))
    }

    fn parse_select(&mut self) -> Result<Statement> {
        self.expect(Token::Select)?;

        let projection = if self.check(&Token::Star) {
            self.advance();
            Projection::All
        } else {
            Projection::Columns(self.parse_list(Self::parse_column_ref)?)
        };

        self.expect(Token::From)?;
        let table = self.expect_ident()?;

        let join = if matches!(self.current(), Token::Inner | Token::Join) {
            Some(self.parse_join(&table)?)
        } else {
            None
        };

        let predicate = self.parse_where()?;

        let mut order_by = Vec::new();
        if self.check(&Token::Order) {
            self.advance();
            self.expect(Token::By)?;
            order_by = self.parse_list(Self::parse_order_term)?;
        }

        let limit = if self.check(&Token::Limit) {
            self.advance();
            Some(self.expect_limit()?)
        } else {
            None
        };

        Ok(Statement::Select(Select {
            table,
            projection,
            join,
            predicate,
            order_by,
            limit,
        }))
    }

    fn parse_join(&mut self, from_table: &str) -> Result<Join> {
        if self.check(&Token::Inner) {
            self.advance();
        }
        self.expect(Token::Join)?;

        let start = self.current_position();
        let table = self.expect_ident()?;
        if table == from_table {
            return Err(TabulaError::syntax(
                start,
                format!("cannot join '{}' with itself: table aliases are not supported", table),
            ));
        }

        self.expect(Token::On)?;
        let on_start = self.current_position();
        let first = self.parse_column_ref()?;
        self.expect(Token::Equal)?;
        let second = self.parse_column_ref()?;

        let owner = |r: &ColumnRef| r.table.as_deref().map(str::to_string);
        let (left_column, right_column) = match (owner(&first), owner(&second)) {
            (Some(a), Some(b)) if a == from_table && b == table => (first.column, second.column),
            (Some(a), Some(b)) if a == table && b == from_table => (second.column, first.column),
            _ => {
                return Err(TabulaError::syntax(
                    on_start,
                    format!(
                        "ON must compare {}.<column> with {}.<column>",
                        from_table, table
                    ),
                ))
            }
        };

        Ok(Join {
            table,
            left_column,
            right_column,
        })
    }

    fn parse_update(&mut self) -> Result<Statement> {
        self.expect(Token::Update)?;
        let table = self.expect_ident()?;
        self.expect(Token::Set)?;
        let assignments = self.parse_list(Self::parse_assignment)?;
        let predicate = self.parse_where()?;
        Ok(Statement::Update(Update {
            table,
            assignments,
            predicate,
        }))
    }

    fn parse_delete(&mut self) -> Result<Statement> {
        self.expect(Token::Delete)?;
        self.expect(Token::From)?;
        let table = self.expect_ident()?;
        let predicate = self.parse_where()?;
        Ok(Statement::Delete(Delete { table, predicate }))
    }

    // =========================================================================
    // Clauses
    // =========================================================================

    fn parse_where(&mut self) -> Result<Option<Predicate>> {
        if !self.check(&Token::Where) {
            return Ok(None);
        }
        self.advance();

        let mut terms = vec![self.parse_comparison()?];
        loop {
            match self.current() {
                Token::And => {
                    self.advance();
                    terms.push(self.parse_comparison()?);
                }
                Token::Or => {
                    return Err(self.error("OR is not supported; conditions can only be combined with AND"))
                }
                _ => break,
            }
        }

        Ok(Some(Predicate { terms }))
    }

    fn parse_comparison(&mut self) -> Result<Comparison> {
        if self.check(&Token::LeftParen) {
            return Err(self.error("parentheses are not supported in WHERE"));
        }

        let column = self.parse_column_ref()?;
        let op = match self.current() {
            Token::Equal => CompareOp::Eq,
            Token::NotEqual => CompareOp::NotEq,
            Token::Less => CompareOp::Lt,
            Token::Greater => CompareOp::Gt,
            Token::LessEqual => CompareOp::LtEq,
            Token::GreaterEqual => CompareOp::GtEq,
            _ => return Err(self.error("expected comparison operator")),
        };
        self.advance();
        let value = self.expect_literal()?;

        Ok(Comparison { column, op, value })
    }

    fn parse_column_ref(&mut self) -> Result<ColumnRef> {
        let first = self.expect_ident()?;
        if self.check(&Token::Dot) {
            self.advance();
            let column = self.expect_ident()?;
            Ok(ColumnRef::qualified(first, column))
        } else {
            Ok(ColumnRef::bare(first))
        }
    }

    fn parse_order_term(&mut self) -> Result<OrderBy> {
        let column = self.parse_column_ref()?;
        let descending = match self.current() {
            Token::Asc => {
                self.advance();
                false
            }
            Token::Desc => {
                self.advance();
                true
            }
            _ => false,
        };
        Ok(OrderBy { column, descending })
    }

    fn parse_assignment(&mut self) -> Result<Assignment> {
        let column = self.expect_ident()?;
        self.expect(Token::Equal)?;
        let value = self.expect_literal()?;
        Ok(Assignment { column, value })
    }

    /// `item {, item}`
    fn parse_list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let mut items = vec![item(self)?];
        while self.check(&Token::Comma) {
            self.advance();
            items.push(item(self)?);
        }
        Ok(items)
    }

    // =========================================================================
    // Token Helpers
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.position].token
    }

    fn current_position(&self) -> usize {
        self.tokens[self.position].position
    }

    fn check(&self, expected: &Token) -> bool {
        self.current() == expected
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> TabulaError {
        TabulaError::syntax(self.current_position(), message)
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}, found {:?}", expected, self.current())))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.current() {
            Token::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.error(format!("expected identifier, found {:?}", other))),
        }
    }

    fn expect_type(&mut self) -> Result<DataType> {
        match self.current() {
            Token::Type(data_type) => {
                let data_type = *data_type;
                self.advance();
                Ok(data_type)
            }
            other => Err(self.error(format!("expected column type, found {:?}", other))),
        }
    }

    fn expect_literal(&mut self) -> Result<Value> {
        let value = match self.current() {
            Token::Integer(i) => Value::Integer(*i),
            Token::Float(f) => Value::Float(*f),
            Token::String(s) => Value::Text(s.clone()),
            Token::Null => Value::Null,
            other => return Err(self.error(format!("expected literal value, found {:?}", other))),
        };
        self.advance();
        Ok(value)
    }

    fn expect_limit(&mut self) -> Result<usize> {
        match self.current() {
            Token::Integer(n) if *n >= 0 => {
                let n = *n as usize;
                self.advance();
                Ok(n)
            }
            other => Err(self.error(format!("expected non-negative integer after LIMIT, found {:?}", other))),
        }
    }
}
