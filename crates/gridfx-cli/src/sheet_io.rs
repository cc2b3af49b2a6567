//! CSV input and output for sheets

use anyhow::{Context, Result};
use gridfx_core::{CellAddress, Grid, Value, ValueKind};
use gridfx_formula::{parse, Cell, Sheet};
use std::io::{Read, Write};

/// Options for reading a sheet from CSV
#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub delimiter: u8,
    /// Skip the first record
    pub has_header: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: false,
        }
    }
}

/// Read a sheet from CSV.
///
/// Fields starting with `=` are formulas; everything else is typed by
/// [`detect_value`]. Short rows are padded with empty cells.
pub fn read_sheet<R: Read>(reader: R, options: &ReadOptions) -> Result<Sheet> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_header)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut formulas = Vec::new();

    for (row, result) in csv_reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV record {}", row + 1))?;

        let mut cells = Vec::with_capacity(record.len());
        for (col, field) in record.iter().enumerate() {
            let field = field.trim();
            if field.starts_with('=') {
                // Parsed once the sheet's bounds are known
                formulas.push((CellAddress::new(row as u32, col as u32), field.to_string()));
                cells.push(Cell::default());
            } else {
                cells.push(Cell::Value(detect_value(field)));
            }
        }
        rows.push(cells);
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for cells in &mut rows {
        cells.resize_with(width, Cell::default);
    }

    let mut sheet = Sheet::from_rows(rows)?;
    for (addr, text) in formulas {
        let function =
            parse(&text, &sheet).with_context(|| format!("Invalid formula in {}: {}", addr, text))?;
        sheet.set(&addr, function.into())?;
    }

    log::debug!("read {}x{} sheet", sheet.row_count(), sheet.col_count());
    Ok(sheet)
}

/// Detect the type of a plain field: boolean, number, ISO date, then text.
///
/// Only `true`/`false` are booleans here; `yes` or `1` in a data column are
/// text and numbers.
pub fn detect_value(field: &str) -> Value {
    if field.eq_ignore_ascii_case("true") || field.eq_ignore_ascii_case("false") {
        return Value::parse_as(field, ValueKind::Boolean);
    }

    if let Value::Number(n) = Value::parse_as(field, ValueKind::Number) {
        if n.is_finite() {
            return Value::Number(n);
        }
    }

    match Value::parse_as(field, ValueKind::Date) {
        date @ Value::Date(_) => date,
        _ => Value::parse_as(field, ValueKind::String),
    }
}

/// Write evaluated values as CSV
pub fn write_values<W: Write>(writer: W, values: &Grid<Value>, delimiter: u8) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    for row in values.rows() {
        csv_writer.write_record(row.iter().map(Value::to_string))?;
    }
    csv_writer.flush()?;
    Ok(())
}
