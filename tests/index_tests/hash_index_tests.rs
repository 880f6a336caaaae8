//! Tests for HashIndex and IndexManager
//!
//! These tests verify:
//! - Building from a scan skips tombstoned rows
//! - Insert/update/delete keep forward and reverse maps in step
//! - IndexManager only touches columns whose value changed
//! - Indexes stay consistent with the table through SQL mutations

use std::collections::HashSet;

use tabula::index::{HashIndex, IndexManager};
use tabula::schema::{Row, Table, Value};
use tabula::{Config, Database};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn rows(values: &[&str]) -> Vec<Row> {
    values
        .iter()
        .map(|v| Row::new(vec![Value::from(*v)]))
        .collect()
}

fn positions(index: &HashIndex, value: &str) -> Vec<usize> {
    index.lookup_sorted(&Value::from(value))
}

/// Every live row is indexed under its current value and nothing else is
fn assert_index_matches_table(table: &Table, column: usize) {
    let index = table.indexes().get(column).expect("index exists");

    let live: HashSet<usize> = table.live_rows().map(|(p, _)| p).collect();
    assert_eq!(index.len(), live.len());

    for (position, row) in table.live_rows() {
        let value = row.value(column).unwrap();
        assert_eq!(index.value_at(position), Some(value));
        assert!(index.lookup(value).unwrap().contains(&position));
    }
}

// =============================================================================
// HashIndex Tests
// =============================================================================

#[test]
fn test_build_and_lookup() {
    let rows = rows(&["a", "b", "a"]);

    let index = HashIndex::build(0, "tag", rows.iter().enumerate());

    assert_eq!(index.column(), 0);
    assert_eq!(index.column_name(), "tag");
    assert_eq!(index.len(), 3);
    assert_eq!(index.distinct_values(), 2);
    assert_eq!(positions(&index, "a"), vec![0, 2]);
    assert_eq!(positions(&index, "b"), vec![1]);
    assert!(index.lookup(&Value::from("zzz")).is_none());
}

#[test]
fn test_empty_index() {
    let index = HashIndex::new(1, "email");

    assert!(index.is_empty());
    assert!(positions(&index, "x").is_empty());
}

#[test]
fn test_insert() {
    let mut index = HashIndex::new(0, "tag");

    index.on_insert(0, Value::from("a"));
    index.on_insert(1, Value::from("a"));

    assert_eq!(positions(&index, "a"), vec![0, 1]);
    assert_eq!(index.value_at(1), Some(&Value::from("a")));
}

#[test]
fn test_update_moves_entry() {
    let rows = rows(&["a", "b"]);
    let mut index = HashIndex::build(0, "tag", rows.iter().enumerate());

    index.on_update(0, &Value::from("a"), Value::from("b"));

    assert!(index.lookup(&Value::from("a")).is_none());
    assert_eq!(positions(&index, "b"), vec![0, 1]);
    assert_eq!(index.value_at(0), Some(&Value::from("b")));
    assert_eq!(index.distinct_values(), 1);
}

#[test]
fn test_update_trusts_reverse_map() {
    let rows = rows(&["a"]);
    let mut index = HashIndex::build(0, "tag", rows.iter().enumerate());

    // Caller passes the wrong old value; the indexed one is still removed
    index.on_update(0, &Value::from("stale"), Value::from("c"));

    assert!(index.lookup(&Value::from("a")).is_none());
    assert_eq!(positions(&index, "c"), vec![0]);
}

#[test]
fn test_delete() {
    let rows = rows(&["a", "a"]);
    let mut index = HashIndex::build(0, "tag", rows.iter().enumerate());

    assert_eq!(index.on_delete(0), Some(Value::from("a")));
    assert_eq!(index.on_delete(0), None);

    assert_eq!(positions(&index, "a"), vec![1]);
    assert_eq!(index.value_at(0), None);
    assert_eq!(index.len(), 1);
}

#[test]
fn test_null_and_float_keys() {
    let mut index = HashIndex::new(0, "v");

    index.on_insert(0, Value::Null);
    index.on_insert(1, Value::from(0.0));
    index.on_insert(2, Value::from(-0.0));
    index.on_insert(3, Value::from(1));

    assert_eq!(index.lookup_sorted(&Value::Null), vec![0]);
    assert_eq!(index.lookup_sorted(&Value::from(0.0)), vec![1, 2]);
    // Integer 1 and Float 1.0 are different keys
    assert!(index.lookup(&Value::from(1.0)).is_none());
}

// =============================================================================
// IndexManager Tests
// =============================================================================

#[test]
fn test_manager_routes_row_events() {
    let mut manager = IndexManager::new();
    manager.insert(HashIndex::new(0, "id"));
    manager.insert(HashIndex::new(2, "tag"));

    assert_eq!(manager.columns(), vec![0, 2]);
    assert!(manager.contains(2));
    assert!(!manager.contains(1));

    let old = vec![Value::from(1), Value::from("x"), Value::from("red")];
    manager.on_insert(0, &old);

    let new = vec![Value::from(1), Value::from("y"), Value::from("blue")];
    manager.on_update(0, &old, &new);

    let id = manager.get(0).unwrap();
    assert_eq!(id.lookup_sorted(&Value::from(1)), vec![0]);

    let tag = manager.get(2).unwrap();
    assert!(tag.lookup(&Value::from("red")).is_none());
    assert_eq!(tag.lookup_sorted(&Value::from("blue")), vec![0]);

    manager.on_delete(0);
    assert!(manager.get(0).unwrap().is_empty());
    assert!(manager.get(2).unwrap().is_empty());
}

// =============================================================================
// Table Consistency Tests
// =============================================================================

#[test]
fn test_indexes_follow_sql_mutations() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .index_column("tag")
        .build();
    let mut db = Database::open(config).unwrap();

    db.execute("CREATE TABLE items (id INTEGER PRIMARY KEY, tag TEXT)").unwrap();
    for i in 0..10 {
        let tag = if i % 2 == 0 { "even" } else { "odd" };
        db.execute(&format!("INSERT INTO items VALUES ({}, '{}')", i, tag)).unwrap();
    }
    db.execute("UPDATE items SET tag = 'three' WHERE id = 3").unwrap();
    db.execute("DELETE FROM items WHERE tag = 'even'").unwrap();
    db.execute("UPDATE items SET id = 100 WHERE id = 9").unwrap();

    let table = db.table("items").unwrap();
    assert!(table.has_index("id"));
    assert!(table.has_index("tag"));
    assert_index_matches_table(table, 0);
    assert_index_matches_table(table, 1);

    let tag = table.indexes().get(1).unwrap();
    assert!(tag.lookup(&Value::from("even")).is_none());
    assert_eq!(tag.lookup_sorted(&Value::from("odd")), vec![1, 5, 7, 9]);
    assert_eq!(tag.lookup_sorted(&Value::from("three")), vec![3]);
}

#[test]
fn test_indexes_rebuilt_on_load() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut db = Database::open_path(temp_dir.path()).unwrap();
        db.execute("CREATE TABLE items (id INTEGER PRIMARY KEY, tag TEXT)").unwrap();
        db.execute("INSERT INTO items VALUES (1, 'a')").unwrap();
        db.execute("INSERT INTO items VALUES (2, 'b')").unwrap();
        db.execute("DELETE FROM items WHERE id = 1").unwrap();
    }

    let mut db = Database::open_path(temp_dir.path()).unwrap();
    let table = db.table("items").unwrap();

    assert!(table.has_index("id"));
    assert!(!table.has_index("tag"));
    assert_index_matches_table(table, 0);
    assert_eq!(table.indexes().get(0).unwrap().len(), 1);
}
