//! Equality Join
//!
//! `left.col = right.col` over live rows of two tables, never as a nested
//! O(n·m) scan.
//!
//! ## Strategies
//! - **IndexProbe**: one side has a hash index on its join column; every live
//!   row of the other side looks its key up in it. O(n + m).
//! - **HashBuild**: neither side is indexed; a temporary key → positions map is
//!   built over the smaller table and the larger one probes it. O(n + m) average.
//!
//! Both produce the same pairs. Output is sorted by (left position, right
//! position) so results do not depend on the strategy or on hash order.

use std::collections::HashMap;

use crate::index::HashIndex;
use crate::schema::{Table, Value};

/// How to execute a join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinStrategy {
    /// IndexProbe if either join column is indexed, HashBuild otherwise
    #[default]
    Auto,

    /// Probe an existing index; builds a transient one on the right side if
    /// neither column is indexed
    IndexProbe,

    /// Build a temporary hash map over the smaller side
    HashBuild,
}

/// Positions `(left, right)` of every live row pair with equal join keys
pub fn join_positions(
    left: &Table,
    left_column: usize,
    right: &Table,
    right_column: usize,
    strategy: JoinStrategy,
) -> Vec<(usize, usize)> {
    let indexed = left.indexes().contains(left_column) || right.indexes().contains(right_column);

    let strategy = match strategy {
        JoinStrategy::Auto if indexed => JoinStrategy::IndexProbe,
        JoinStrategy::Auto => JoinStrategy::HashBuild,
        forced => forced,
    };

    tracing::debug!(
        left = left.name(),
        right = right.name(),
        ?strategy,
        "Executing join"
    );

    let mut pairs = match strategy {
        JoinStrategy::HashBuild => hash_build(left, left_column, right, right_column),
        _ => index_probe(left, left_column, right, right_column),
    };

    pairs.sort_unstable();
    pairs
}

// =============================================================================
// Strategies
// =============================================================================

fn index_probe(left: &Table, left_column: usize, right: &Table, right_column: usize) -> Vec<(usize, usize)> {
    if let Some(index) = right.indexes().get(right_column) {
        return probe(left, left_column, index, |probe, hit| (probe, hit));
    }

    if let Some(index) = left.indexes().get(left_column) {
        return probe(right, right_column, index, |probe, hit| (hit, probe));
    }

    let transient = HashIndex::build(
        right_column,
        &right.column(right_column).name,
        right.live_rows(),
    );
    probe(left, left_column, &transient, |probe, hit| (probe, hit))
}

/// Look up every live row of `table` in `index`; `pair` orders (probe, hit)
fn probe<F>(table: &Table, column: usize, index: &HashIndex, pair: F) -> Vec<(usize, usize)>
where
    F: Fn(usize, usize) -> (usize, usize),
{
    let mut pairs = Vec::new();
    for (position, row) in table.live_rows() {
        let Some(key) = row.value(column) else { continue };
        if let Some(hits) = index.lookup(key) {
            pairs.extend(hits.iter().map(|&hit| pair(position, hit)));
        }
    }
    pairs
}

fn hash_build(left: &Table, left_column: usize, right: &Table, right_column: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();

    if left.live_count() <= right.live_count() {
        let built = key_map(left, left_column);
        for (position, row) in right.live_rows() {
            if let Some(hits) = row.value(right_column).and_then(|key| built.get(key)) {
                pairs.extend(hits.iter().map(|&hit| (hit, position)));
            }
        }
    } else {
        let built = key_map(right, right_column);
        for (position, row) in left.live_rows() {
            if let Some(hits) = row.value(left_column).and_then(|key| built.get(key)) {
                pairs.extend(hits.iter().map(|&hit| (position, hit)));
            }
        }
    }

    pairs
}

/// Temporary join-key → positions map over the live rows of `table`
fn key_map(table: &Table, column: usize) -> HashMap<&Value, Vec<usize>> {
    let mut map: HashMap<&Value, Vec<usize>> = HashMap::new();
    for (position, row) in table.live_rows() {
        if let Some(key) = row.value(column) {
            map.entry(key).or_default().push(position);
        }
    }
    map
}
