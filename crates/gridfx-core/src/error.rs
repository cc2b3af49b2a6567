//! Error types for gridfx-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridfx-core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid column label
    #[error("Invalid column label: {0}")]
    InvalidColumn(String),

    /// Address outside of the grid
    #[error("Cell {address} is outside of the {rows}x{cols} grid")]
    OutOfBounds {
        address: String,
        rows: usize,
        cols: usize,
    },

    /// Rows of different lengths passed to a grid constructor
    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        actual: usize,
    },
}
