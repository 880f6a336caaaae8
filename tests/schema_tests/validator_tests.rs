//! Tests for the constraint validator and Value model
//!
//! These tests verify:
//! - Schema checks (empty, duplicate names, multiple primary keys)
//! - Type checks, with Null accepted everywhere
//! - PRIMARY KEY / UNIQUE checks against live rows only
//! - The same answers with and without an index on the constrained column
//! - Value comparison rules across tags

use std::cmp::Ordering;

use tabula::schema::validator::{
    validate_for_insert, validate_for_update, validate_schema, validate_update_batch,
};
use tabula::schema::{Column, Constraint, DataType, Table, Value};
use tabula::{Config, Database, TabulaError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn users_columns() -> Vec<Column> {
    vec![
        Column::new("id", DataType::Integer).with_constraint(Constraint::PrimaryKey),
        Column::new("email", DataType::Text).with_constraint(Constraint::Unique),
        Column::new("score", DataType::Float),
    ]
}

/// A users table holding ids 1..=3 with id 2 deleted and one Null email
fn setup_users(indexed: bool) -> (TempDir, Table) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .index_constrained_columns(indexed)
        .lazy_indexing(false)
        .build();
    let mut db = Database::open(config).unwrap();

    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT UNIQUE, score FLOAT)")
        .unwrap();
    db.execute("INSERT INTO users VALUES (1, 'a@x', 1.0)").unwrap();
    db.execute("INSERT INTO users VALUES (2, 'b@x', 2.0)").unwrap();
    db.execute("INSERT INTO users VALUES (3, NULL, 3.0)").unwrap();
    db.execute("DELETE FROM users WHERE id = 2").unwrap();

    let table = db.table("users").unwrap().clone();
    assert_eq!(table.indexes().len(), if indexed { 2 } else { 0 });
    (temp_dir, table)
}

fn row(id: Value, email: Value, score: Value) -> Vec<Value> {
    vec![id, email, score]
}

// =============================================================================
// Schema Tests
// =============================================================================

#[test]
fn test_schema_valid() {
    assert!(validate_schema("users", &users_columns()).is_ok());
}

#[test]
fn test_schema_empty_rejected() {
    let err = validate_schema("t", &[]).unwrap_err();

    assert!(matches!(err, TabulaError::InvalidSchema { .. }));
}

#[test]
fn test_schema_duplicate_column_rejected() {
    let columns = vec![
        Column::new("a", DataType::Integer),
        Column::new("a", DataType::Text),
    ];

    let err = validate_schema("t", &columns).unwrap_err();

    assert!(matches!(err, TabulaError::DuplicateColumn { ref column, .. } if column == "a"));
}

#[test]
fn test_schema_two_primary_keys_rejected() {
    let columns = vec![
        Column::new("a", DataType::Integer).with_constraint(Constraint::PrimaryKey),
        Column::new("b", DataType::Integer).with_constraint(Constraint::PrimaryKey),
    ];

    let err = validate_schema("t", &columns).unwrap_err();

    assert!(matches!(err, TabulaError::InvalidSchema { .. }));
}

// =============================================================================
// Type Tests
// =============================================================================

#[test]
fn test_insert_type_mismatch() {
    let table = Table::new("users", users_columns());

    let err = validate_for_insert(&table, &row(Value::from("one"), Value::Null, Value::Null)).unwrap_err();

    match err {
        TabulaError::TypeMismatch { column, expected, found } => {
            assert_eq!(column, "id");
            assert_eq!(expected, DataType::Integer);
            assert_eq!(found, "TEXT");
        }
        other => panic!("expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_insert_null_accepted_for_any_type() {
    let table = Table::new("users", users_columns());

    assert!(validate_for_insert(&table, &row(Value::Null, Value::Null, Value::Null)).is_ok());
}

#[test]
fn test_insert_integer_not_accepted_for_float_without_coercion() {
    let table = Table::new("users", users_columns());

    let err = validate_for_insert(&table, &row(Value::from(1), Value::Null, Value::from(2))).unwrap_err();

    assert!(matches!(err, TabulaError::TypeMismatch { .. }));
}

#[test]
fn test_insert_wrong_arity() {
    let table = Table::new("users", users_columns());

    let err = validate_for_insert(&table, &[Value::from(1)]).unwrap_err();

    assert!(matches!(
        err,
        TabulaError::ColumnCountMismatch { expected: 3, found: 1, .. }
    ));
}

// =============================================================================
// Uniqueness Tests (indexed and scanned)
// =============================================================================

fn check_uniqueness(indexed: bool) {
    let (_temp, table) = setup_users(indexed);

    // Live primary key
    let err = validate_for_insert(&table, &row(Value::from(1), Value::Null, Value::Null)).unwrap_err();
    assert!(matches!(err, TabulaError::ConstraintViolation { ref column, .. } if column == "id"));

    // Deleted row's key is free again
    assert!(validate_for_insert(&table, &row(Value::from(2), Value::from("b@x"), Value::Null)).is_ok());

    // Live unique value
    let err = validate_for_insert(&table, &row(Value::from(9), Value::from("a@x"), Value::Null)).unwrap_err();
    assert!(matches!(err, TabulaError::ConstraintViolation { ref column, .. } if column == "email"));

    // Unique ignores Null
    assert!(validate_for_insert(&table, &row(Value::from(9), Value::Null, Value::Null)).is_ok());

    // Primary key Null is an ordinary value
    assert!(validate_for_insert(&table, &row(Value::Null, Value::Null, Value::Null)).is_ok());
}

#[test]
fn test_uniqueness_with_index() {
    check_uniqueness(true);
}

#[test]
fn test_uniqueness_by_scan() {
    check_uniqueness(false);
}

#[test]
fn test_update_excludes_own_row() {
    let (_temp, table) = setup_users(true);

    // Row at position 0 keeps its own id
    assert!(validate_for_update(&table, 0, &[(0, Value::from(1))]).is_ok());

    // Row at position 2 cannot take row 0's id
    let err = validate_for_update(&table, 2, &[(0, Value::from(1))]).unwrap_err();
    assert!(matches!(err, TabulaError::ConstraintViolation { .. }));
}

#[test]
fn test_update_checks_changed_columns_only() {
    let (_temp, table) = setup_users(false);

    // score is unconstrained, so duplicates are fine
    assert!(validate_for_update(&table, 2, &[(2, Value::from(1.0))]).is_ok());
}

#[test]
fn test_update_batch_constrained_value_rejected() {
    let (_temp, table) = setup_users(true);

    let err = validate_update_batch(&table, &[0, 2], &[(0, Value::from(50))]).unwrap_err();
    assert!(matches!(err, TabulaError::ConstraintViolation { .. }));

    // Null on a UNIQUE column is exempt
    assert!(validate_update_batch(&table, &[0, 2], &[(1, Value::Null)]).is_ok());

    // A single row may take a fresh key
    assert!(validate_update_batch(&table, &[2], &[(0, Value::from(50))]).is_ok());
}

// =============================================================================
// Value Tests
// =============================================================================

#[test]
fn test_value_compare_within_tag() {
    assert_eq!(Value::from(1).compare(&Value::from(2)), Some(Ordering::Less));
    assert_eq!(Value::from("b").compare(&Value::from("a")), Some(Ordering::Greater));
    assert_eq!(Value::Null.compare(&Value::Null), Some(Ordering::Equal));
    assert_eq!(Value::from(0.0).compare(&Value::from(-0.0)), Some(Ordering::Equal));
}

#[test]
fn test_value_compare_across_tags() {
    assert_eq!(Value::from(1).compare(&Value::from(1.0)), None);
    assert_eq!(Value::from(1).compare(&Value::from("1")), None);
    assert_eq!(Value::Null.compare(&Value::from(0)), None);
    assert_ne!(Value::from(1), Value::from("1"));
}

#[test]
fn test_value_sort_order() {
    let mut values = vec![
        Value::from("a"),
        Value::from(2.5),
        Value::from(3),
        Value::Null,
        Value::from(1),
    ];
    values.sort_by(|a, b| a.sort_cmp(b));

    assert_eq!(
        values,
        vec![
            Value::Null,
            Value::from(1),
            Value::from(3),
            Value::from(2.5),
            Value::from("a")
        ]
    );
}

#[test]
fn test_value_coerce_integer_to_float() {
    assert_eq!(Value::from(2).coerce_to(DataType::Float), Value::from(2.0));
    assert_eq!(Value::from(2).coerce_to(DataType::Text), Value::from(2));
    assert_eq!(Value::Null.coerce_to(DataType::Float), Value::Null);
}
