//! Cell content and sheet types

use crate::ast::CellFunction;
use gridfx_core::{Grid, Value};

/// What a cell holds: a concrete value or a parsed formula
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Value(Value),
    Formula(CellFunction),
}

impl Cell {
    /// Get the formula, if the cell holds one
    pub fn as_formula(&self) -> Option<&CellFunction> {
        match self {
            Cell::Formula(f) => Some(f),
            Cell::Value(_) => None,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, Cell::Formula(_))
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Value(Value::Null)
    }
}

impl From<Value> for Cell {
    fn from(v: Value) -> Self {
        Cell::Value(v)
    }
}

impl From<CellFunction> for Cell {
    fn from(f: CellFunction) -> Self {
        Cell::Formula(f)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Value(Value::Number(n))
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Value(Value::from(s))
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Value(Value::Boolean(b))
    }
}

/// A grid of cells as read by the evaluator
pub type Sheet = Grid<Cell>;
