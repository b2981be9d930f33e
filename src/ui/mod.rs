//! Terminal front end for the grid

pub mod actions;
pub mod app;
pub mod key_mapper;
pub mod panels;
pub mod store;
pub mod table_renderer;

pub use app::{run_grid_tui, GridApp};
pub use store::RecordStore;
