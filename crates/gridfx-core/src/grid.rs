//! Rectangular cell grid

use crate::cell::CellAddress;
use crate::error::{Error, Result};

/// A rectangular, row-major grid of cells.
///
/// Every row has the same number of columns. Cells are addressed with
/// 0-based row/column indices or a [`CellAddress`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    rows: Vec<Vec<T>>,
    cols: usize,
}

impl<T> Default for Grid<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            cols: 0,
        }
    }
}

impl<T> Grid<T> {
    /// Create an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from rows, rejecting rows of differing lengths
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((row, actual)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != cols)
        {
            return Err(Error::RaggedGrid {
                row,
                expected: cols,
                actual,
            });
        }
        Ok(Self { rows, cols })
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// (rows, columns)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols == 0
    }

    /// Check whether an address falls inside the grid
    pub fn contains(&self, addr: &CellAddress) -> bool {
        (addr.row as usize) < self.rows.len() && (addr.col as usize) < self.cols
    }

    /// Get a cell by 0-based indices
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Get a cell by address
    pub fn get_address(&self, addr: &CellAddress) -> Option<&T> {
        self.get(addr.row as usize, addr.col as usize)
    }

    /// Replace a cell's content
    pub fn set(&mut self, addr: &CellAddress, value: T) -> Result<()> {
        let (rows, cols) = self.dimensions();
        let cell = self
            .rows
            .get_mut(addr.row as usize)
            .and_then(|r| r.get_mut(addr.col as usize))
            .ok_or_else(|| Error::OutOfBounds {
                address: addr.to_string(),
                rows,
                cols,
            })?;
        *cell = value;
        Ok(())
    }

    /// Iterate over the rows
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Iterate over every cell with its address, row by row
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &T)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, cell)| (CellAddress::new(r as u32, c as u32), cell))
        })
    }

    /// Build a grid of the same shape by mapping every cell
    pub fn map<U, F>(&self, mut f: F) -> Grid<U>
    where
        F: FnMut(CellAddress, &T) -> U,
    {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, cell)| f(CellAddress::new(r as u32, c as u32), cell))
                    .collect()
            })
            .collect();
        Grid {
            rows,
            cols: self.cols,
        }
    }
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows: vec![vec![value; cols]; rows],
            cols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use pretty_assertions::assert_eq;

    fn sample() -> Grid<Value> {
        Grid::from_rows(vec![
            vec![Value::from(1.0), Value::from(2.0)],
            vec![Value::from("a"), Value::Null],
            vec![Value::from(true), Value::from(3.0)],
        ])
        .unwrap()
    }

    #[test]
    fn test_from_rows() {
        let grid = sample();
        assert_eq!(grid.dimensions(), (3, 2));
        assert!(!grid.is_empty());

        let err = Grid::from_rows(vec![vec![1, 2], vec![3]]).unwrap_err();
        assert_eq!(
            err,
            Error::RaggedGrid {
                row: 1,
                expected: 2,
                actual: 1
            }
        );

        let empty: Grid<i32> = Grid::from_rows(vec![]).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_get() {
        let grid = sample();
        assert_eq!(grid.get(1, 0), Some(&Value::from("a")));
        assert_eq!(
            grid.get_address(&CellAddress::parse("B3").unwrap()),
            Some(&Value::from(3.0))
        );
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_set() {
        let mut grid = sample();
        let addr = CellAddress::parse("B2").unwrap();
        grid.set(&addr, Value::from(9.0)).unwrap();
        assert_eq!(grid.get_address(&addr), Some(&Value::from(9.0)));

        let outside = CellAddress::parse("C1").unwrap();
        assert!(matches!(
            grid.set(&outside, Value::Null),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_cells_and_map() {
        let grid = Grid::filled(2, 2, 0);
        let addresses: Vec<String> = grid.cells().map(|(a, _)| a.to_string()).collect();
        assert_eq!(addresses, vec!["A1", "B1", "A2", "B2"]);

        let labels = grid.map(|addr, _| addr.to_string());
        assert_eq!(labels.get(1, 1), Some(&"B2".to_string()));
        assert_eq!(labels.dimensions(), (2, 2));
    }
}
