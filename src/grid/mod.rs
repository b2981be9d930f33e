//! The headless grid: column definitions, view derivation, editing and
//! the events reported to the data owner.

pub mod column;
pub mod data_grid;
pub mod display;
pub mod editor;
pub mod events;
pub mod patch;
pub mod search;
pub mod view_state;

pub use column::{ColumnSpec, ColumnType, FilterOption, FooterAggregate, GridSpec, SelectOption};
pub use data_grid::{DataGrid, GridOptions};
pub use events::{CellEdit, EditId, GridEvent, GridHandler};
pub use view_state::{CellRef, SortDirection, SortKey, ViewState};
