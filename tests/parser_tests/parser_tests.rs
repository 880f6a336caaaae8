//! Tests for the Parser
//!
//! These tests verify:
//! - Every statement kind parses into the right structure
//! - Lexical rules (case-insensitive keywords, quoting, numeric literals)
//! - JOIN, WHERE, ORDER BY and LIMIT clauses
//! - Documented limitations fail loudly (OR, parentheses, reserved words)
//! - Syntax errors carry the offending position

use tabula::parser::{
    parse, ColumnRef, CompareOp, Lexer, Projection, Statement, Token,
};
use tabula::schema::{Constraint, DataType, Value};
use tabula::TabulaError;

// =============================================================================
// Helper Functions
// =============================================================================

fn syntax_position(sql: &str) -> usize {
    match parse(sql) {
        Err(TabulaError::Syntax { position, .. }) => position,
        other => panic!("expected syntax error for {:?}, got {:?}", sql, other),
    }
}

fn syntax_message(sql: &str) -> String {
    match parse(sql) {
        Err(TabulaError::Syntax { message, .. }) => message,
        other => panic!("expected syntax error for {:?}, got {:?}", sql, other),
    }
}

// =============================================================================
// Lexer Tests
// =============================================================================

#[test]
fn test_lexer_keywords_case_insensitive() {
    let tokens = Lexer::new("select FROM wHeRe").tokenize().unwrap();
    let kinds: Vec<Token> = tokens.into_iter().map(|t| t.token).collect();

    assert_eq!(kinds, vec![Token::Select, Token::From, Token::Where, Token::Eof]);
}

#[test]
fn test_lexer_numeric_literals() {
    let tokens = Lexer::new("42 -7 3.5 -0.25").tokenize().unwrap();
    let kinds: Vec<Token> = tokens.into_iter().map(|t| t.token).collect();

    assert_eq!(
        kinds,
        vec![
            Token::Integer(42),
            Token::Integer(-7),
            Token::Float(3.5),
            Token::Float(-0.25),
            Token::Eof
        ]
    );
}

#[test]
fn test_lexer_point_float_forms() {
    let tokens = Lexer::new("1. .5 -.5 -2. t.id").tokenize().unwrap();
    let kinds: Vec<Token> = tokens.into_iter().map(|t| t.token).collect();

    assert_eq!(
        kinds,
        vec![
            Token::Float(1.0),
            Token::Float(0.5),
            Token::Float(-0.5),
            Token::Float(-2.0),
            Token::Ident("t".to_string()),
            Token::Dot,
            Token::Ident("id".to_string()),
            Token::Eof
        ]
    );
}

#[test]
fn test_parse_insert_point_floats() {
    let Statement::Insert(insert) = parse("INSERT INTO f VALUES (1., .5)").unwrap() else {
        panic!("expected Insert");
    };

    assert_eq!(insert.values, vec![Value::Float(1.0), Value::Float(0.5)]);
}

#[test]
fn test_lexer_string_with_escaped_quote() {
    let tokens = Lexer::new("'it''s'").tokenize().unwrap();

    assert_eq!(tokens[0].token, Token::String("it's".to_string()));
}

#[test]
fn test_lexer_not_equal_spellings() {
    let tokens = Lexer::new("!= <>").tokenize().unwrap();

    assert_eq!(tokens[0].token, Token::NotEqual);
    assert_eq!(tokens[1].token, Token::NotEqual);
}

#[test]
fn test_lexer_positions() {
    let tokens = Lexer::new("SELECT  name").tokenize().unwrap();

    assert_eq!(tokens[0].position, 0);
    assert_eq!(tokens[1].position, 8);
    assert_eq!(tokens[2].position, 12);
}

#[test]
fn test_lexer_unterminated_string() {
    let err = Lexer::new("SELECT 'abc").tokenize().unwrap_err();

    assert!(matches!(err, TabulaError::Syntax { position: 7, .. }));
}

#[test]
fn test_lexer_integer_overflow() {
    let err = Lexer::new("99999999999999999999").tokenize().unwrap_err();

    assert!(matches!(err, TabulaError::Syntax { position: 0, .. }));
}

// =============================================================================
// CREATE / DROP Tests
// =============================================================================

#[test]
fn test_parse_create_table() {
    let stmt = parse("CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT UNIQUE, score FLOAT)")
        .unwrap();

    let Statement::CreateTable(create) = stmt else {
        panic!("expected CreateTable");
    };
    assert_eq!(create.name, "users");
    assert_eq!(create.columns.len(), 3);

    assert_eq!(create.columns[0].name, "id");
    assert_eq!(create.columns[0].data_type, DataType::Integer);
    assert_eq!(create.columns[0].constraint, Constraint::PrimaryKey);

    assert_eq!(create.columns[1].data_type, DataType::Text);
    assert_eq!(create.columns[1].constraint, Constraint::Unique);

    assert_eq!(create.columns[2].data_type, DataType::Float);
    assert_eq!(create.columns[2].constraint, Constraint::None);
}

#[test]
fn test_parse_type_aliases() {
    let Statement::CreateTable(create) = parse("create table t (a int, b real, c varchar)").unwrap() else {
        panic!("expected CreateTable");
    };

    let types: Vec<DataType> = create.columns.iter().map(|c| c.data_type).collect();
    assert_eq!(types, vec![DataType::Integer, DataType::Float, DataType::Text]);
}

#[test]
fn test_parse_two_constraints_rejected() {
    let message = syntax_message("CREATE TABLE t (id INTEGER PRIMARY KEY UNIQUE)");

    assert!(message.contains("more than one constraint"));
}

#[test]
fn test_parse_create_index() {
    let Statement::CreateIndex(index) = parse("CREATE INDEX ON users (email)").unwrap() else {
        panic!("expected CreateIndex");
    };

    assert_eq!(index.table, "users");
    assert_eq!(index.column, "email");
}

#[test]
fn test_parse_drop_table() {
    let Statement::DropTable(drop) = parse("DROP TABLE users;").unwrap() else {
        panic!("expected DropTable");
    };

    assert_eq!(drop.name, "users");
}

// =============================================================================
// INSERT Tests
// =============================================================================

#[test]
fn test_parse_insert_positional() {
    let Statement::Insert(insert) = parse("INSERT INTO users VALUES (1, 'Ann', 2.5, NULL)").unwrap() else {
        panic!("expected Insert");
    };

    assert_eq!(insert.table, "users");
    assert_eq!(insert.columns, None);
    assert_eq!(
        insert.values,
        vec![
            Value::Integer(1),
            Value::Text("Ann".to_string()),
            Value::Float(2.5),
            Value::Null
        ]
    );
}

#[test]
fn test_parse_insert_with_columns() {
    let Statement::Insert(insert) = parse("INSERT INTO users (name, id) VALUES ('Bo', 2)").unwrap() else {
        panic!("expected Insert");
    };

    assert_eq!(insert.columns, Some(vec!["name".to_string(), "id".to_string()]));
    assert_eq!(insert.values, vec![Value::Text("Bo".to_string()), Value::Integer(2)]);
}

#[test]
fn test_parse_insert_missing_values_keyword() {
    let position = syntax_position("INSERT INTO users (1, 2)");

    assert_eq!(position, 19);
}

// =============================================================================
// SELECT Tests
// =============================================================================

#[test]
fn test_parse_select_star() {
    let Statement::Select(select) = parse("SELECT * FROM users").unwrap() else {
        panic!("expected Select");
    };

    assert_eq!(select.table, "users");
    assert_eq!(select.projection, Projection::All);
    assert!(select.join.is_none());
    assert!(select.predicate.is_none());
    assert!(select.order_by.is_empty());
    assert_eq!(select.limit, None);
}

#[test]
fn test_parse_select_where_conjunction() {
    let Statement::Select(select) =
        parse("SELECT name, users.id FROM users WHERE id >= 2 AND name != 'x' AND score < 1.5").unwrap()
    else {
        panic!("expected Select");
    };

    assert_eq!(
        select.projection,
        Projection::Columns(vec![ColumnRef::bare("name"), ColumnRef::qualified("users", "id")])
    );

    let terms = select.predicate.unwrap().terms;
    assert_eq!(terms.len(), 3);
    assert_eq!(terms[0].op, CompareOp::GtEq);
    assert_eq!(terms[0].value, Value::Integer(2));
    assert_eq!(terms[1].op, CompareOp::NotEq);
    assert_eq!(terms[2].op, CompareOp::Lt);
    assert_eq!(terms[2].value, Value::Float(1.5));
}

#[test]
fn test_parse_select_join() {
    let Statement::Select(select) = parse(
        "SELECT users.name, orders.total FROM users INNER JOIN orders ON users.id = orders.user_id",
    )
    .unwrap() else {
        panic!("expected Select");
    };

    let join = select.join.unwrap();
    assert_eq!(join.table, "orders");
    assert_eq!(join.left_column, "id");
    assert_eq!(join.right_column, "user_id");
}

#[test]
fn test_parse_join_sides_swapped() {
    let Statement::Select(select) =
        parse("SELECT * FROM users JOIN orders ON orders.user_id = users.id").unwrap()
    else {
        panic!("expected Select");
    };

    let join = select.join.unwrap();
    assert_eq!(join.left_column, "id");
    assert_eq!(join.right_column, "user_id");
}

#[test]
fn test_parse_join_requires_qualified_sides() {
    let message = syntax_message("SELECT * FROM users JOIN orders ON id = user_id");

    assert!(message.contains("ON must compare"));
}

#[test]
fn test_parse_self_join_rejected() {
    let message = syntax_message("SELECT * FROM users JOIN users ON users.id = users.id");

    assert!(message.contains("itself"));
}

#[test]
fn test_parse_order_by_and_limit() {
    let Statement::Select(select) =
        parse("SELECT * FROM users ORDER BY score DESC, name ASC, id LIMIT 10").unwrap()
    else {
        panic!("expected Select");
    };

    assert_eq!(select.order_by.len(), 3);
    assert!(select.order_by[0].descending);
    assert!(!select.order_by[1].descending);
    assert!(!select.order_by[2].descending);
    assert_eq!(select.limit, Some(10));
}

#[test]
fn test_parse_negative_limit_rejected() {
    assert!(parse("SELECT * FROM users LIMIT -1").is_err());
}

#[test]
fn test_parse_or_rejected() {
    let message = syntax_message("SELECT * FROM users WHERE id = 1 OR id = 2");

    assert!(message.contains("OR is not supported"));
}

#[test]
fn test_parse_parentheses_rejected() {
    let message = syntax_message("SELECT * FROM users WHERE (id = 1)");

    assert!(message.contains("parentheses"));
}

#[test]
fn test_parse_reserved_word_as_column_rejected() {
    assert_eq!(syntax_position("CREATE TABLE t (text TEXT)"), 16);
    assert_eq!(syntax_position("SELECT key FROM t"), 7);
}

// =============================================================================
// UPDATE / DELETE Tests
// =============================================================================

#[test]
fn test_parse_update() {
    let Statement::Update(update) = parse("UPDATE users SET name = 'Z', score = 1.0 WHERE id = 3").unwrap() else {
        panic!("expected Update");
    };

    assert_eq!(update.table, "users");
    assert_eq!(update.assignments.len(), 2);
    assert_eq!(update.assignments[0].column, "name");
    assert_eq!(update.assignments[1].value, Value::Float(1.0));
    assert_eq!(update.predicate.unwrap().terms.len(), 1);
}

#[test]
fn test_parse_delete_without_where() {
    let Statement::Delete(delete) = parse("DELETE FROM users").unwrap() else {
        panic!("expected Delete");
    };

    assert_eq!(delete.table, "users");
    assert!(delete.predicate.is_none());
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_parse_empty_statement() {
    assert_eq!(syntax_position("   "), 3);
}

#[test]
fn test_parse_trailing_tokens() {
    assert_eq!(syntax_position("DELETE FROM users; DELETE"), 19);
}

#[test]
fn test_parse_unknown_statement() {
    assert_eq!(syntax_position("EXPLAIN SELECT * FROM t"), 0);
}
