//! Literal classification
//!
//! Raw tokens left in the tree by the parser (`A1`, `42`, `TRUE`, `"text"`)
//! are classified here. Resolving a reference against a sheet is the
//! evaluator's job; see [`EvaluationContext::evaluate_literal`](crate::EvaluationContext::evaluate_literal).

use crate::error::{FormulaError, FormulaResult};
use gridfx_core::{CellAddress, Value};
use lazy_regex::regex_is_match;
use std::borrow::Cow;

/// What a raw token stands for
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A cell reference, to be resolved against the sheet
    Reference(CellAddress),
    /// A concrete value
    Value(Value),
}

/// Check if a token has the shape of a cell reference (`[A-Z]+[0-9]+`)
pub fn is_cell_reference(token: &str) -> bool {
    regex_is_match!(r"^[A-Z]+[0-9]+$", token)
}

/// The address a reference token points at, if it is a valid reference
pub fn reference_address(token: &str) -> Option<CellAddress> {
    if is_cell_reference(token) {
        CellAddress::parse(token).ok()
    } else {
        None
    }
}

/// Strip matching single or double quotes
pub(crate) fn unquote(token: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|q| {
        token
            .strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
    })
}

/// Characters the tokenizer reads as part of a word or number
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// How a raw token is written in formula text so that it reads back as a
/// token that classifies the same way.
///
/// Words, references and quoted text that the tokenizer reads as a single
/// token are written as they are; other numbers in number syntax; anything
/// else as quoted text. `None` if the text needs both kinds of quote, since
/// there is no escape syntax.
pub(crate) fn token_syntax(token: &str) -> Option<Cow<'_, str>> {
    if token.chars().all(is_word_char) || is_single_text(token) {
        return Some(Cow::Borrowed(token));
    }
    if let Some(n) = token.parse::<f64>().ok().filter(|n| n.is_finite()) {
        return Some(Cow::Owned(n.to_string()));
    }
    quote_text(unquote(token).unwrap_or(token)).map(Cow::Owned)
}

/// Wrap text in whichever quote it does not contain
pub(crate) fn quote_text(text: &str) -> Option<String> {
    ['"', '\'']
        .into_iter()
        .find(|q| !text.contains(*q))
        .map(|q| format!("{}{}{}", q, text, q))
}

/// Quoted text with no inner occurrence of its quote character
fn is_single_text(token: &str) -> bool {
    ['"', '\''].into_iter().any(|q| {
        token
            .strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
            .map_or(false, |inner| !inner.contains(q))
    })
}

/// Classify a raw token.
///
/// Anything that is not a reference, number, boolean keyword or quoted
/// string is passed through as an opaque string. The only failure is a token
/// shaped like a reference that does not name a valid cell (e.g. `A0`).
pub fn classify(token: &str) -> FormulaResult<Literal> {
    if is_cell_reference(token) {
        return CellAddress::parse(token)
            .map(Literal::Reference)
            .map_err(|e| FormulaError::InvalidReference(format!("{}: {}", token, e)));
    }

    if let Some(n) = token.parse::<f64>().ok().filter(|n| n.is_finite()) {
        return Ok(Literal::Value(Value::Number(n)));
    }

    let value = match token {
        "TRUE" => Value::Boolean(true),
        "FALSE" => Value::Boolean(false),
        _ => match unquote(token) {
            Some(inner) => Value::String(inner.to_string()),
            None => Value::String(token.to_string()),
        },
    };
    Ok(Literal::Value(value))
}
