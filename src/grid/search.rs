//! Pure row predicates and ordering used to derive the grid view.
//!
//! Every function here is a single pass over an in-memory slice; the grid
//! composes them as search -> column filters -> sort.

use std::collections::BTreeSet;

use crate::data::record::Record;
use crate::data::value_compare::compare_values;
use crate::grid::column::ColumnSpec;
use crate::grid::view_state::{SortDirection, SortKey, ViewState};

/// True iff some column's stringified value contains the term, ignoring case.
/// An empty term matches every row.
pub fn row_matches_search(row: &Record, columns: &[ColumnSpec], term_lower: &str) -> bool {
    if term_lower.is_empty() {
        return true;
    }
    columns
        .iter()
        .any(|column| row.value(&column.key).contains_lowercase(term_lower))
}

/// True iff the row's column value contains any accepted value, ignoring case.
/// No accepted values means no constraint.
pub fn row_matches_filter(row: &Record, column: &str, accepted: &BTreeSet<String>) -> bool {
    if accepted.is_empty() {
        return true;
    }
    let value = row.value(column);
    if value.is_null() {
        return false;
    }
    let text = value.to_string().to_lowercase();
    accepted
        .iter()
        .any(|wanted| text.contains(&wanted.to_lowercase()))
}

/// Column filters combine with AND
pub fn row_matches_filters(row: &Record, state: &ViewState) -> bool {
    state
        .filters
        .iter()
        .all(|(column, accepted)| row_matches_filter(row, column, accepted))
}

/// Rows where at least one column contains `term`
pub fn search<'a>(rows: &'a [Record], columns: &[ColumnSpec], term: &str) -> Vec<&'a Record> {
    let term_lower = term.to_lowercase();
    rows.iter()
        .filter(|row| row_matches_search(row, columns, &term_lower))
        .collect()
}

/// Rows whose `column` value contains one of `accepted`
pub fn filter<'a>(rows: &'a [Record], column: &str, accepted: &BTreeSet<String>) -> Vec<&'a Record> {
    rows.iter()
        .filter(|row| row_matches_filter(row, column, accepted))
        .collect()
}

/// Stable sort of row positions by one column. Ties keep their incoming
/// order in both directions.
pub fn sort_positions(rows: &[Record], positions: &mut [usize], key: &SortKey) {
    positions.sort_by(|&a, &b| {
        let cmp = compare_values(rows[a].value(&key.column), rows[b].value(&key.column));
        match key.direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        }
    });
}

/// Full derivation: search, then filters, then sort. Returns positions into `rows`.
pub fn derive_view(rows: &[Record], columns: &[ColumnSpec], state: &ViewState) -> Vec<usize> {
    let term_lower = state.search.to_lowercase();

    let mut positions: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row_matches_search(row, columns, &term_lower))
        .filter(|(_, row)| row_matches_filters(row, state))
        .map(|(idx, _)| idx)
        .collect();

    if let Some(key) = state.sort.active() {
        sort_positions(rows, &mut positions, key);
    }

    positions
}
