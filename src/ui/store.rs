//! The data owner behind the terminal grid.
//!
//! Accepted edits land in the store's own record set; values that do not fit
//! the column type are refused, which makes the grid roll its patch back.

use anyhow::{bail, Result};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::data::loaders::save_json_records;
use crate::data::record::{Record, RecordSet};
use crate::data::value::CellValue;
use crate::grid::column::{ColumnSpec, ColumnType};
use crate::grid::events::{CellEdit, GridHandler};
use crate::grid::view_state::SortKey;

pub struct RecordStore {
    records: RecordSet,
    columns: Vec<ColumnSpec>,
    path: Option<PathBuf>,
    dirty: bool,
    selected: usize,
}

impl RecordStore {
    pub fn new(records: RecordSet, columns: Vec<ColumnSpec>, path: Option<PathBuf>) -> Self {
        Self {
            records,
            columns,
            path,
            dirty: false,
            selected: 0,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records.records
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn selected_count(&self) -> usize {
        self.selected
    }

    /// Write accepted edits back as JSON next to the source file
    pub fn save(&mut self) -> Result<PathBuf> {
        let Some(source) = &self.path else {
            bail!("Records were not loaded from a file");
        };
        let target = source.with_extension("json");
        save_json_records(&target, &self.records.records)?;
        self.dirty = false;
        info!(target: "store", "Saved {} records to {}", self.records.len(), target.display());
        Ok(target)
    }

    fn check_value(&self, column: &str, value: &CellValue) -> Result<()> {
        let Some(spec) = self.columns.iter().find(|c| c.key == column) else {
            bail!("Unknown column '{}'", column);
        };

        match (spec.column_type, value) {
            (_, CellValue::Null) => Ok(()),
            (ColumnType::Number, CellValue::Integer(_) | CellValue::Float(_)) => Ok(()),
            (ColumnType::Number, other) => bail!("{} expects a number, got '{}'", spec.title(), other),
            (ColumnType::Boolean, CellValue::Boolean(_)) => Ok(()),
            (ColumnType::Boolean, other) => bail!("{} expects true/false, got '{}'", spec.title(), other),
            (ColumnType::Date, CellValue::Date(_)) => Ok(()),
            (ColumnType::Date, other) => bail!("{} expects a date, got '{}'", spec.title(), other),
            (ColumnType::Dropdown, v) if !spec.dropdown_options.is_empty() => {
                if spec.find_option(v).is_some() {
                    Ok(())
                } else {
                    bail!("'{}' is not an option of {}", v, spec.title())
                }
            }
            (ColumnType::Multidropdown, CellValue::List(items)) => {
                match items
                    .iter()
                    .find(|item| !spec.dropdown_options.iter().any(|o| o.value.matches(item)))
                {
                    Some(bad) if !spec.dropdown_options.is_empty() => {
                        bail!("'{}' is not an option of {}", bad, spec.title())
                    }
                    _ => Ok(()),
                }
            }
            (ColumnType::Multidropdown, other) => bail!("{} expects a list, got '{}'", spec.title(), other),
            _ => Ok(()),
        }
    }
}

impl GridHandler for RecordStore {
    fn on_cell_edit(&mut self, edit: &CellEdit) -> Result<()> {
        self.check_value(&edit.column, &edit.new_value)?;

        let Some(record) = self.records.find_mut(edit.row.key()) else {
            bail!("Row '{}' no longer exists", edit.row.key());
        };
        record.set(edit.column.clone(), edit.new_value.clone());
        self.dirty = true;
        debug!(target: "store", "Stored {} = {} on row {}", edit.column, edit.new_value, edit.row.key());
        Ok(())
    }

    fn on_selection_change(&mut self, rows: &[Record]) {
        self.selected = rows.len();
    }

    fn on_sort_change(&mut self, sort: Option<&SortKey>) {
        debug!(target: "store", "Sort changed to {:?}", sort);
    }

    fn on_row_click(&mut self, row: &Record, position: usize) {
        info!(target: "store", "Opened row {} at position {}", row.key(), position);
    }

    fn name(&self) -> &str {
        "record store"
    }
}
