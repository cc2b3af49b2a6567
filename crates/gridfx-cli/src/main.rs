//! gridfx CLI - evaluate, inspect and move spreadsheet formulas

mod sheet_io;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gridfx_core::CellAddress;
use gridfx_formula::{
    increment_cell_references_in_string, parse_formula, Cell, EvaluationContext,
    MAX_EVALUATION_DEPTH, REF_ERROR,
};
use sheet_io::ReadOptions;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gridfx")]
#[command(author, version, about = "Spreadsheet formula engine")]
struct Cli {
    /// Log parse and evaluation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a CSV grid whose `=` fields are formulas
    Eval {
        /// Input CSV file
        input: PathBuf,

        /// Print only this cell (e.g. B2)
        #[arg(short, long)]
        cell: Option<String>,

        /// Bound on nested evaluation
        #[arg(long, default_value_t = MAX_EVALUATION_DEPTH)]
        max_depth: usize,

        /// Field delimiter (default: comma)
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Skip the first line of the input
        #[arg(long)]
        header: bool,
    },

    /// Print the parsed form of a formula as JSON
    Parse {
        formula: String,
    },

    /// Shift the cell references in a formula
    Shift {
        formula: String,

        /// Rows to move by (negative moves up)
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        rows: i64,

        /// Columns to move by (negative moves left)
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        cols: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Eval {
            input,
            cell,
            max_depth,
            delimiter,
            header,
        } => eval(&input, cell.as_deref(), max_depth, delimiter, header),
        Commands::Parse { formula } => show_parse(&formula),
        Commands::Shift {
            formula,
            rows,
            cols,
        } => shift(&formula, rows, cols),
    }
}

fn eval(
    input: &Path,
    cell: Option<&str>,
    max_depth: usize,
    delimiter: char,
    header: bool,
) -> Result<()> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }
    let delimiter = delimiter as u8;

    let file = File::open(input).with_context(|| format!("Failed to open '{}'", input.display()))?;
    let options = ReadOptions {
        delimiter,
        has_header: header,
    };
    let sheet = sheet_io::read_sheet(file, &options)
        .with_context(|| format!("Failed to load '{}'", input.display()))?;

    let ctx = EvaluationContext::new(&sheet).with_max_depth(max_depth);

    match cell {
        Some(cell) => {
            let addr = CellAddress::parse(cell)
                .with_context(|| format!("Invalid cell address '{}'", cell))?;
            let value = match sheet.get_address(&addr) {
                Some(Cell::Value(v)) => v.clone(),
                Some(Cell::Formula(f)) => ctx.evaluate(f, 0),
                None => bail!(
                    "{} is outside of the {}x{} grid",
                    addr,
                    sheet.row_count(),
                    sheet.col_count()
                ),
            };
            println!("{}", value);
        }
        None => {
            let values = ctx.evaluate_sheet();
            sheet_io::write_values(io::stdout().lock(), &values, delimiter)
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

fn show_parse(formula: &str) -> Result<()> {
    let function =
        parse_formula(formula).with_context(|| format!("Failed to parse '{}'", formula))?;
    println!("{}", function.to_json()?);
    Ok(())
}

fn shift(formula: &str, rows: i64, cols: i64) -> Result<()> {
    let shifted = increment_cell_references_in_string(formula, rows, cols);
    if shifted.contains(REF_ERROR) && !formula.contains(REF_ERROR) {
        log::warn!("'{}' moved by ({}, {}) leaves the grid", formula, rows, cols);
    }
    println!("{}", shifted);
    Ok(())
}
