//! Reference translation for copy and fill
//!
//! When a formula moves by `(rows, cols)`, every A1 reference in its text
//! moves with it. The result is new formula text, which callers re-parse.

use crate::ast::CellFunction;
use crate::error::{FormulaError, FormulaResult};
use crate::parser::parse_formula;
use ahash::AHashMap;
use gridfx_core::CellAddress;
use lazy_regex::regex;
use regex::Captures;

/// Text substituted for a reference shifted off the grid
pub const REF_ERROR: &str = "#REF!";

/// Shift every `[A-Z]+[0-9]+` reference in `text` by the given deltas.
///
/// Only whole words are references: the `E5` in `1E5` and the `A1` in `XA1B`
/// are left alone. Each distinct reference is translated once and reused for
/// its repeats. Matches are replaced in a single pass, so a translated
/// reference is never translated again. A reference pushed above row 1 or
/// left of column A becomes `#REF!`; a match that does not name a valid cell
/// is left as is.
///
/// ```rust
/// use gridfx_formula::increment_cell_references_in_string;
///
/// assert_eq!(increment_cell_references_in_string("A1+B2", 1, 1), "B2+C3");
/// assert_eq!(increment_cell_references_in_string("Z9", 0, 1), "AA9");
/// ```
pub fn increment_cell_references_in_string(text: &str, row_delta: i64, col_delta: i64) -> String {
    let mut translated: AHashMap<String, String> = AHashMap::new();

    // The regex crate has no lookaround, so the characters on either side are
    // captured: (lead)(reference)(trail)
    regex!(r"(^|[^A-Za-z0-9_.])([A-Z]+[0-9]+)([A-Za-z0-9_.]?)")
        .replace_all(text, |caps: &Captures| {
            if !caps[3].is_empty() {
                return caps[0].to_string();
            }
            let reference = &caps[2];
            let shifted = translated
                .entry(reference.to_string())
                .or_insert_with(|| shift_reference(reference, row_delta, col_delta));
            format!("{}{}", &caps[1], shifted)
        })
        .into_owned()
}

fn shift_reference(reference: &str, row_delta: i64, col_delta: i64) -> String {
    let Ok(addr) = CellAddress::parse(reference) else {
        return reference.to_string();
    };
    match addr.offset(row_delta, col_delta) {
        Some(moved) => moved.to_a1_string(),
        None => {
            log::debug!(
                "{} shifted by ({}, {}) leaves the grid",
                reference,
                row_delta,
                col_delta
            );
            REF_ERROR.to_string()
        }
    }
}

/// Copy a formula to a cell `row_delta` rows and `col_delta` columns away.
///
/// The tree is rendered with [`CellFunction::to_formula`], its references are
/// shifted, and the text is parsed again. Fails with
/// [`FormulaError::InvalidReference`] if a reference would leave the grid, and
/// with [`FormulaError::InvalidExpression`] if an argument has no formula
/// syntax.
pub fn copy_formula(
    function: &CellFunction,
    row_delta: i64,
    col_delta: i64,
) -> FormulaResult<CellFunction> {
    let text = function.to_formula()?;
    let shifted = increment_cell_references_in_string(&text, row_delta, col_delta);

    if shifted.contains(REF_ERROR) && !text.contains(REF_ERROR) {
        return Err(FormulaError::InvalidReference(format!(
            "{} shifted by ({}, {}) references a cell outside the grid",
            text, row_delta, col_delta
        )));
    }

    parse_formula(&shifted)
}
