//! Cell value types

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents a concrete value held by a cell or produced by evaluation
///
/// Evaluation faults are reported as `Number(NaN)`; see [`Value::nan`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum Value {
    /// Empty cell (no value)
    #[default]
    Null,

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Numeric value
    Number(f64),

    /// String value
    String(String),

    /// Date/time value
    Date(NaiveDateTime),
}

/// The kinds of value a piece of text can be read as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Date,
}

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

impl Value {
    /// The NaN sentinel that stands in for any evaluation fault
    pub fn nan() -> Self {
        Value::Number(f64::NAN)
    }

    /// Check if this is the NaN sentinel
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_nan())
    }

    /// Get the value as a number, without coercion
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a boolean, without coercion
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Name of the value's type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
        }
    }

    /// Read text as a value of the given kind.
    ///
    /// Empty text and text that cannot be read as `kind` produce
    /// [`Value::Null`]; this never fails.
    ///
    /// # Example
    /// ```rust
    /// use gridfx_core::{Value, ValueKind};
    ///
    /// assert_eq!(Value::parse_as("42", ValueKind::Number), Value::Number(42.0));
    /// assert_eq!(Value::parse_as("yes", ValueKind::Boolean), Value::Boolean(true));
    /// assert_eq!(Value::parse_as("maybe", ValueKind::Boolean), Value::Null);
    /// ```
    pub fn parse_as(text: &str, kind: ValueKind) -> Self {
        if text.is_empty() {
            return Value::Null;
        }

        match kind {
            ValueKind::String => Value::String(text.to_string()),
            ValueKind::Number => text
                .trim()
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ValueKind::Boolean => match text.to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Value::Boolean(true),
                "false" | "no" | "0" => Value::Boolean(false),
                _ => Value::Null,
            },
            ValueKind::Date => parse_date(text.trim()).map(Value::Date).unwrap_or(Value::Null),
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        // f64's Display already prints the shortest round-tripping form
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(true) => f.write_str("true"),
            Value::Boolean(false) => f.write_str("false"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => {
                if d.num_seconds_from_midnight() == 0 && d.nanosecond() == 0 {
                    write!(f, "{}", d.format(DATE_FORMAT))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S"))
                }
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}
