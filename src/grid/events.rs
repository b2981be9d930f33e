//! Events the grid reports upward, and the handler trait that receives them

use anyhow::Result;

use crate::data::record::Record;
use crate::data::value::CellValue;
use crate::grid::view_state::SortKey;

/// Identifies one committed edit until it is confirmed or rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditId(pub u64);

/// A committed inline edit
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    pub id: EditId,
    /// The row as it was before the edit
    pub row: Record,
    pub column: String,
    pub new_value: CellValue,
}

/// Everything the grid reports to its owner
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    CellEdited(CellEdit),

    /// Selected rows in current view order
    SelectionChanged { rows: Vec<Record> },

    SortChanged { sort: Option<SortKey> },

    RowClicked { row: Record, position: usize },
}

/// Receiver for grid events. Every method defaults to a no-op.
pub trait GridHandler {
    /// Persist an edit. Returning an error rolls the grid's local patch back.
    fn on_cell_edit(&mut self, _edit: &CellEdit) -> Result<()> {
        Ok(())
    }

    fn on_selection_change(&mut self, _rows: &[Record]) {}

    fn on_sort_change(&mut self, _sort: Option<&SortKey>) {}

    fn on_row_click(&mut self, _row: &Record, _position: usize) {}

    /// Handler name for logging
    fn name(&self) -> &str {
        "handler"
    }
}
