//! Headless data grid with search, multi-value column filters, tri-state
//! sort, inline editing, row selection and column visibility, plus the
//! page-access and project-nesting helpers that sit around it.

pub mod access;
pub mod config;
pub mod data;
pub mod grid;
pub mod logging;
pub mod projects;
pub mod table_display;
pub mod tooltip;
pub mod ui;

pub use data::{CellValue, Record, RecordSet, RowKey};
pub use grid::{ColumnSpec, ColumnType, DataGrid, GridEvent, GridHandler, GridOptions};
