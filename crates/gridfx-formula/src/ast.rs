//! Formula Abstract Syntax Tree types

use crate::error::{FormulaError, FormulaResult};
use crate::literal::{quote_text, reference_address, token_syntax};
use gridfx_core::{CellAddress, Value};
use std::borrow::Cow;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The fixed set of operations a [`CellFunction`] can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum FunctionName {
    Sum,
    Subtract,
    Multiply,
    Divide,
    Avg,
    Max,
    Min,
    If,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equals,
    NotEqual,
    Literal,
}

impl FunctionName {
    /// Every function name, in declaration order
    pub const ALL: [FunctionName; 15] = [
        FunctionName::Sum,
        FunctionName::Subtract,
        FunctionName::Multiply,
        FunctionName::Divide,
        FunctionName::Avg,
        FunctionName::Max,
        FunctionName::Min,
        FunctionName::If,
        FunctionName::LessThan,
        FunctionName::GreaterThan,
        FunctionName::LessThanOrEqual,
        FunctionName::GreaterThanOrEqual,
        FunctionName::Equals,
        FunctionName::NotEqual,
        FunctionName::Literal,
    ];

    /// The name as written in formula text
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionName::Sum => "SUM",
            FunctionName::Subtract => "SUBTRACT",
            FunctionName::Multiply => "MULTIPLY",
            FunctionName::Divide => "DIVIDE",
            FunctionName::Avg => "AVG",
            FunctionName::Max => "MAX",
            FunctionName::Min => "MIN",
            FunctionName::If => "IF",
            FunctionName::LessThan => "LESS_THAN",
            FunctionName::GreaterThan => "GREATER_THAN",
            FunctionName::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            FunctionName::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            FunctionName::Equals => "EQUALS",
            FunctionName::NotEqual => "NOT_EQUAL",
            FunctionName::Literal => "LITERAL",
        }
    }

    /// Look up a function by name.
    ///
    /// Matching ignores ASCII case, so `sum(1,2)` calls `SUM`; formulas typed
    /// into cells are not expected to follow the canonical spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One argument of a [`CellFunction`]
///
/// String values are raw tokens (`A1`, `"text"`, `TRUE`) resolved by the
/// literal classifier at evaluation time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum FunctionArg {
    /// Nested function call
    Function(CellFunction),
    /// Number, raw token, or other concrete value
    Value(Value),
}

impl FunctionArg {
    /// A raw token deferred to evaluation time
    pub fn token<S: Into<String>>(token: S) -> Self {
        FunctionArg::Value(Value::String(token.into()))
    }

    pub fn number(n: f64) -> Self {
        FunctionArg::Value(Value::Number(n))
    }
}

impl From<CellFunction> for FunctionArg {
    fn from(f: CellFunction) -> Self {
        FunctionArg::Function(f)
    }
}

impl From<Value> for FunctionArg {
    fn from(v: Value) -> Self {
        FunctionArg::Value(v)
    }
}

/// A parsed formula: an operation and its ordered arguments
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellFunction {
    pub name: FunctionName,
    pub args: Vec<FunctionArg>,
}

impl CellFunction {
    pub fn new(name: FunctionName, args: Vec<FunctionArg>) -> Self {
        Self { name, args }
    }

    /// A `LITERAL` node wrapping a single value
    pub fn literal(value: Value) -> Self {
        Self {
            name: FunctionName::Literal,
            args: vec![FunctionArg::Value(value)],
        }
    }

    /// Cell addresses referenced by raw tokens anywhere in this tree
    pub fn references(&self) -> Vec<CellAddress> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut Vec<CellAddress>) {
        for arg in &self.args {
            match arg {
                FunctionArg::Function(f) => f.collect_references(refs),
                FunctionArg::Value(Value::String(token)) => {
                    if let Some(addr) = reference_address(token) {
                        refs.push(addr);
                    }
                }
                FunctionArg::Value(_) => {}
            }
        }
    }

    /// Render as formula text that [`parse_formula`](crate::parse_formula)
    /// reads back into a tree that evaluates the same way.
    ///
    /// Fails for arguments with no formula syntax: null, NaN and infinite
    /// numbers, and text containing both kinds of quote.
    pub fn to_formula(&self) -> FormulaResult<String> {
        let mut out = String::new();
        self.write_formula(&mut out)?;
        Ok(out)
    }

    fn write_formula(&self, out: &mut String) -> FormulaResult<()> {
        out.push_str(self.name.as_str());
        out.push('(');
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            match arg {
                FunctionArg::Function(f) => f.write_formula(out)?,
                // `NAME()` would read back with no arguments at all
                FunctionArg::Value(Value::String(token))
                    if token.is_empty() && self.args.len() == 1 =>
                {
                    out.push_str("\"\"")
                }
                FunctionArg::Value(value) => {
                    let text = value_syntax(value).ok_or_else(|| {
                        FormulaError::InvalidExpression(format!(
                            "{} argument '{}' ({}) has no formula syntax",
                            self.name,
                            value,
                            value.type_name()
                        ))
                    })?;
                    out.push_str(&text);
                }
            }
        }
        out.push(')');
        Ok(())
    }

    /// Serialize to JSON (`{"name":"SUM","args":[1,"A1"]}`)
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> FormulaResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON produced by [`CellFunction::to_json`]
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> FormulaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Renders call syntax, e.g. `SUM(1,MULTIPLY(A1,2))`. Arguments with no
/// formula syntax fall back to their display text; use
/// [`CellFunction::to_formula`] when the text has to parse back.
impl fmt::Display for CellFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for FunctionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionArg::Function(func) => write!(f, "{}", func),
            FunctionArg::Value(v) => match value_syntax(v) {
                Some(text) => f.write_str(&text),
                None => write!(f, "{}", v),
            },
        }
    }
}

/// Formula syntax for an argument value, if it has one
fn value_syntax(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::Boolean(true) => Some(Cow::Borrowed("TRUE")),
        Value::Boolean(false) => Some(Cow::Borrowed("FALSE")),
        Value::Number(n) if n.is_finite() => Some(Cow::Owned(n.to_string())),
        Value::Number(_) => None,
        Value::String(token) => token_syntax(token),
        // Dates have no literal syntax; they round-trip as quoted text
        Value::Date(_) => quote_text(&value.to_string()).map(Cow::Owned),
    }
}
