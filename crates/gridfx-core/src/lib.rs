//! # gridfx-core
//!
//! Core data structures for the gridfx formula engine.
//!
//! This crate provides the fundamental types shared by the parser, the
//! evaluator and any host that stores cells:
//! - [`Value`] - A concrete cell value (string, number, boolean, date, null)
//! - [`CellAddress`] - A cell's location (e.g., "A1") and column label conversions
//! - [`Grid`] - A rectangular, row-major grid of cells
//!
//! ## Example
//!
//! ```rust
//! use gridfx_core::{CellAddress, Grid, Value};
//!
//! let grid = Grid::from_rows(vec![
//!     vec![Value::from(1.0), Value::from("two")],
//!     vec![Value::from(true), Value::Null],
//! ])
//! .unwrap();
//!
//! let addr = CellAddress::parse("B1").unwrap();
//! assert_eq!(grid.get_address(&addr), Some(&Value::from("two")));
//! ```

pub mod cell;
pub mod error;
pub mod grid;

// Re-exports for convenience
pub use cell::{column_to_index, index_to_column, CellAddress, Value, ValueKind};
pub use error::{Error, Result};
pub use grid::Grid;
