//! Configuration module
//!
//! User settings for display, grid behaviour and theme.

pub mod config;

pub use config::Config;
