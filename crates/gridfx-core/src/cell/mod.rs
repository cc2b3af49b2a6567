//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Value`] - The concrete value held by a cell or produced by evaluation
//! - [`CellAddress`] - A cell's location (e.g., "A1")

mod address;
mod value;

pub use address::{column_to_index, index_to_column, CellAddress};
pub use value::{Value, ValueKind};
