//! Formula evaluator
//!
//! Walks a [`CellFunction`] tree against a read-only [`Sheet`]. Evaluation
//! never fails from the caller's point of view: a fault inside a node turns
//! that node's result into the NaN sentinel and evaluation carries on.

use crate::ast::{CellFunction, FunctionArg, FunctionName};
use crate::error::{FormulaError, FormulaResult};
use crate::literal::{classify, Literal};
use crate::sheet::{Cell, Sheet};
use gridfx_core::{Grid, Value};

/// Default bound on nested evaluation (function nesting plus reference hops)
pub const MAX_EVALUATION_DEPTH: usize = 10;

/// Evaluate a formula against a sheet with the default options
///
/// # Example
/// ```rust
/// use gridfx_formula::{evaluate, parse_formula, Sheet};
/// use gridfx_core::Value;
///
/// let sheet = Sheet::new();
/// let ast = parse_formula("SUM(1,2,3)").unwrap();
/// assert_eq!(evaluate(&ast, &sheet), Value::Number(6.0));
/// ```
pub fn evaluate(function: &CellFunction, sheet: &Sheet) -> Value {
    EvaluationContext::new(sheet).evaluate(function, 0)
}

/// Evaluate every cell of a sheet with the default options
pub fn evaluate_sheet(sheet: &Sheet) -> Grid<Value> {
    EvaluationContext::new(sheet).evaluate_sheet()
}

/// Context for formula evaluation
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    sheet: &'a Sheet,
    max_depth: usize,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context
    pub fn new(sheet: &'a Sheet) -> Self {
        Self {
            sheet,
            max_depth: MAX_EVALUATION_DEPTH,
        }
    }

    /// Override the nesting bound
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Evaluate a node at the given nesting depth.
    ///
    /// Returns NaN once `depth` exceeds the bound. This is what stops
    /// circular references; it does not detect them.
    pub fn evaluate(&self, function: &CellFunction, depth: usize) -> Value {
        if depth > self.max_depth {
            log::trace!(
                "{} not evaluated: depth {} exceeds {}",
                function.name,
                depth,
                self.max_depth
            );
            return Value::nan();
        }

        match self.evaluate_function(function, depth + 1) {
            Ok(value) => value,
            Err(err) => {
                log::debug!("{} evaluated to NaN: {}", function.name, err);
                Value::nan()
            }
        }
    }

    /// Evaluate every cell: values are copied, formulas evaluated from depth 0
    pub fn evaluate_sheet(&self) -> Grid<Value> {
        self.sheet.map(|_, cell| match cell {
            Cell::Value(v) => v.clone(),
            Cell::Formula(f) => self.evaluate(f, 0),
        })
    }

    /// Resolve a raw token.
    ///
    /// A reference yields the referenced cell's value; a formula in that cell
    /// is evaluated at `depth`, so reference chains count toward the bound.
    pub fn evaluate_literal(&self, token: &str, depth: usize) -> FormulaResult<Value> {
        match classify(token)? {
            Literal::Value(value) => Ok(value),
            Literal::Reference(addr) => match self.sheet.get_address(&addr) {
                Some(Cell::Value(value)) => Ok(value.clone()),
                Some(Cell::Formula(function)) => Ok(self.evaluate(function, depth)),
                None => Err(FormulaError::InvalidReference(format!(
                    "{} is outside of the {}x{} sheet",
                    addr,
                    self.sheet.row_count(),
                    self.sheet.col_count()
                ))),
            },
        }
    }

    /// Resolve an argument to a value
    fn resolve(&self, arg: &FunctionArg, depth: usize) -> FormulaResult<Value> {
        match arg {
            FunctionArg::Function(function) => Ok(self.evaluate(function, depth)),
            FunctionArg::Value(Value::String(token)) => self.evaluate_literal(token, depth),
            FunctionArg::Value(value) => Ok(value.clone()),
        }
    }

    /// Resolve an argument to a number; `None` if it resolves to anything else
    fn resolve_number(&self, arg: &FunctionArg, depth: usize) -> FormulaResult<Option<f64>> {
        Ok(self.resolve(arg, depth)?.as_number())
    }

    /// `depth` here is already the children's depth
    fn evaluate_function(&self, function: &CellFunction, depth: usize) -> FormulaResult<Value> {
        let args = &function.args;

        match function.name {
            FunctionName::Sum => self.fold_numbers(args, depth, 0.0, |acc, n, _| acc + n),

            // The first argument is taken as-is (n - 0), later ones are subtracted
            FunctionName::Subtract => self.fold_numbers(args, depth, 0.0, |acc, n, i| {
                if i == 0 {
                    n - acc
                } else {
                    acc - n
                }
            }),

            FunctionName::Multiply => self.fold_numbers(args, depth, 1.0, |acc, n, _| acc * n),

            // The first argument seeds the quotient
            FunctionName::Divide => self.fold_numbers(args, depth, 0.0, |acc, n, i| {
                if i == 0 {
                    n
                } else {
                    acc / n
                }
            }),

            FunctionName::Avg => {
                let mut sum = 0.0;
                let mut count = 0usize;
                for arg in args {
                    if let Some(n) = self.resolve_number(arg, depth)? {
                        sum += n;
                        count += 1;
                    }
                }
                Ok(if count > 0 {
                    Value::Number(sum / count as f64)
                } else {
                    Value::nan()
                })
            }

            FunctionName::Max => self.extremum(args, depth, f64::NEG_INFINITY, f64::max),
            FunctionName::Min => self.extremum(args, depth, f64::INFINITY, f64::min),

            FunctionName::If => {
                let [condition, then_value, else_value] = args.as_slice() else {
                    return Err(FormulaError::InvalidArity {
                        function: FunctionName::If,
                        expected: 3,
                        actual: args.len(),
                    });
                };

                let condition = match condition {
                    FunctionArg::Function(f) => self.evaluate(f, depth).as_bool(),
                    FunctionArg::Value(Value::Boolean(b)) => Some(*b),
                    FunctionArg::Value(Value::String(token)) => {
                        self.evaluate_literal(token, depth)?.as_bool()
                    }
                    FunctionArg::Value(_) => None,
                };

                match condition {
                    Some(true) => self.resolve(then_value, depth),
                    Some(false) => self.resolve(else_value, depth),
                    None => Ok(Value::nan()),
                }
            }

            FunctionName::LessThan => self.compare(function, depth, |a, b| a < b),
            FunctionName::GreaterThan => self.compare(function, depth, |a, b| a > b),
            FunctionName::LessThanOrEqual => self.compare(function, depth, |a, b| a <= b),
            FunctionName::GreaterThanOrEqual => self.compare(function, depth, |a, b| a >= b),
            FunctionName::Equals => self.compare(function, depth, |a, b| a == b),
            FunctionName::NotEqual => self.compare(function, depth, |a, b| a != b),

            // Literals never unwrap a nested call
            FunctionName::Literal => match args.first() {
                None | Some(FunctionArg::Function(_)) => Ok(Value::nan()),
                Some(FunctionArg::Value(Value::String(token))) => {
                    self.evaluate_literal(token, depth)
                }
                Some(FunctionArg::Value(value)) => Ok(value.clone()),
            },
        }
    }

    /// Fold arguments in order; an argument that is not a number makes the
    /// accumulator NaN
    fn fold_numbers<F>(
        &self,
        args: &[FunctionArg],
        depth: usize,
        seed: f64,
        step: F,
    ) -> FormulaResult<Value>
    where
        F: Fn(f64, f64, usize) -> f64,
    {
        let mut acc = seed;
        for (i, arg) in args.iter().enumerate() {
            acc = match self.resolve_number(arg, depth)? {
                Some(n) => step(acc, n, i),
                None => f64::NAN,
            };
        }
        Ok(Value::Number(acc))
    }

    /// MAX/MIN: a non-numeric argument contributes NaN, which wins
    fn extremum(
        &self,
        args: &[FunctionArg],
        depth: usize,
        seed: f64,
        pick: fn(f64, f64) -> f64,
    ) -> FormulaResult<Value> {
        let mut result = seed;
        for arg in args {
            let n = self.resolve_number(arg, depth)?.unwrap_or(f64::NAN);
            // f64::max/min skip NaN, so it has to be propagated by hand
            if n.is_nan() {
                return Ok(Value::nan());
            }
            result = pick(result, n);
        }
        Ok(Value::Number(result))
    }

    fn compare<F>(&self, function: &CellFunction, depth: usize, predicate: F) -> FormulaResult<Value>
    where
        F: Fn(f64, f64) -> bool,
    {
        let [left, right] = function.args.as_slice() else {
            return Err(FormulaError::InvalidArity {
                function: function.name,
                expected: 2,
                actual: function.args.len(),
            });
        };

        let left = self.resolve(left, depth)?;
        let right = self.resolve(right, depth)?;

        match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => Ok(Value::Boolean(predicate(a, b))),
            (None, _) => Err(type_mismatch(function.name, &left)),
            (_, None) => Err(type_mismatch(function.name, &right)),
        }
    }
}

fn type_mismatch(function: FunctionName, value: &Value) -> FormulaError {
    FormulaError::TypeMismatch {
        function,
        expected: "number",
        actual: value.type_name(),
    }
}
