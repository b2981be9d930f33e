//! Data layer: cell values, records and their file formats
//!
//! Records are owned by the caller; the grid only ever reads them
//! through a derived view.

pub mod exporter;
pub mod loaders;
pub mod record;
pub mod value;
pub mod value_compare;

pub use record::{Record, RecordSet, RowKey};
pub use value::{CellValue, ValueKind};
