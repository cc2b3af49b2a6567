//! Formula error types

use crate::ast::FunctionName;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
///
/// Parse errors are returned from [`parse`](crate::parse) to the caller.
/// Evaluation faults never leave [`evaluate`](crate::evaluate): they are
/// converted to the NaN sentinel at the boundary of the node that raised them.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Malformed expression text
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// A call to a name that is not a known function
    #[error("Invalid function name: {0}")]
    InvalidFunctionName(String),

    /// Wrong number of arguments
    #[error("{function} function requires {expected} arguments, received {actual}")]
    InvalidArity {
        function: FunctionName,
        expected: usize,
        actual: usize,
    },

    /// An argument resolved to the wrong type for its position
    #[error("{function} expected a {expected} argument, got {actual}")]
    TypeMismatch {
        function: FunctionName,
        expected: &'static str,
        actual: &'static str,
    },

    /// Reference to a cell that cannot be resolved
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] gridfx_core::Error),

    /// Formula JSON error
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormulaError {
    /// Whether this error is raised while parsing (as opposed to evaluating)
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            FormulaError::InvalidExpression(_) | FormulaError::InvalidFunctionName(_)
        )
    }
}
