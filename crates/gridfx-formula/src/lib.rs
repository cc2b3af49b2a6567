//! # gridfx-formula
//!
//! Formula parsing and evaluation for gridfx.
//!
//! This crate provides:
//! - A parser turning formula text (`3+4*2`, `IF(A1>0,"yes","no")`) into a
//!   [`CellFunction`] tree
//! - An evaluator that walks the tree against a [`Sheet`] and always returns a
//!   [`Value`](gridfx_core::Value), using NaN for any fault
//! - A classifier for the raw tokens left in the tree
//! - Reference translation for copying formulas between cells
//!
//! ## Example
//!
//! ```rust
//! use gridfx_core::Value;
//! use gridfx_formula::{evaluate, parse, Cell, Sheet};
//!
//! let sheet = Sheet::from_rows(vec![vec![Cell::from(2.0), Cell::from(5.0)]]).unwrap();
//!
//! let formula = parse("=SUM(A1,B1)*2", &sheet).unwrap();
//! assert_eq!(evaluate(&formula, &sheet), Value::Number(14.0));
//!
//! let broken = parse("IF(TRUE,1)", &sheet).unwrap();
//! assert!(evaluate(&broken, &sheet).is_nan());
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod literal;
pub mod parser;
pub mod reference;
pub mod sheet;

pub use ast::{CellFunction, FunctionArg, FunctionName};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_sheet, EvaluationContext, MAX_EVALUATION_DEPTH};
pub use literal::{classify, Literal};
pub use parser::{parse, parse_formula, MAX_NESTING_DEPTH};
pub use reference::{copy_formula, increment_cell_references_in_string, REF_ERROR};
pub use sheet::{Cell, Sheet};

pub use gridfx_core::{column_to_index, index_to_column};
