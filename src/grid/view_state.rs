use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::data::record::RowKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

/// The single active sort, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

/// Tri-state sort: at most one column is ever active
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<SortKey>,
}

impl SortState {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            active: Some(SortKey {
                column: column.into(),
                direction,
            }),
        }
    }

    pub fn active(&self) -> Option<&SortKey> {
        self.active.as_ref()
    }

    pub fn direction_for(&self, column: &str) -> Option<SortDirection> {
        self.active
            .as_ref()
            .filter(|k| k.column == column)
            .map(|k| k.direction)
    }

    /// Advance the cycle for a header click: none -> asc -> desc -> none.
    /// A different column always starts at ascending.
    pub fn cycle(&mut self, column: &str) {
        self.active = match self.active.take() {
            Some(SortKey {
                column: current,
                direction: SortDirection::Ascending,
            }) if current == column => Some(SortKey {
                column: current,
                direction: SortDirection::Descending,
            }),
            Some(SortKey {
                column: current,
                direction: SortDirection::Descending,
            }) if current == column => None,
            _ => Some(SortKey {
                column: column.to_string(),
                direction: SortDirection::Ascending,
            }),
        };
    }
}

/// Cell currently open in an editor, addressed by stable row key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: RowKey,
    pub column: String,
}

impl CellRef {
    pub fn new(row: impl Into<RowKey>, column: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            column: column.into(),
        }
    }
}

/// Transient view state of one grid instance. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub search: String,

    /// column key -> accepted values (OR within a column, AND across columns)
    pub filters: BTreeMap<String, BTreeSet<String>>,

    pub sort: SortState,

    pub hidden_columns: HashSet<String>,

    pub selected: HashSet<RowKey>,
}

impl ViewState {
    pub fn has_active_filters(&self) -> bool {
        self.filters.values().any(|values| !values.is_empty())
    }

    pub fn filter_values(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.filters.get(column).filter(|values| !values.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_cycle_returns_to_none() {
        let mut sort = SortState::default();
        sort.cycle("age");
        assert_eq!(sort.direction_for("age"), Some(SortDirection::Ascending));
        sort.cycle("age");
        assert_eq!(sort.direction_for("age"), Some(SortDirection::Descending));
        sort.cycle("age");
        assert_eq!(sort.active(), None);
        sort.cycle("age");
        assert_eq!(sort.direction_for("age"), Some(SortDirection::Ascending));
    }

    #[test]
    fn test_new_column_resets_previous() {
        let mut sort = SortState::new("age", SortDirection::Descending);
        sort.cycle("name");
        assert_eq!(sort.direction_for("age"), None);
        assert_eq!(sort.direction_for("name"), Some(SortDirection::Ascending));
    }

    #[test]
    fn test_empty_filter_sets_are_inactive() {
        let mut state = ViewState::default();
        state.filters.insert("status".to_string(), BTreeSet::new());
        assert!(!state.has_active_filters());
        assert!(state.filter_values("status").is_none());
    }
}
