//! Type-aware filtering, sorting, grouping and export over tabular data.
//!
//! The [`data`] module holds the engine; the `table-explorer` binary is a
//! thin egui front-end over it.

pub mod config;
pub mod data;
