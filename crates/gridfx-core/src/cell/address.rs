//! Cell address type and column label conversions

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "AB12")
///
/// Textual references use column letters followed by a 1-based row number.
/// Internally both components are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address from 0-based indices
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use gridfx_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr.row, 0);
    /// assert_eq!(addr.col, 0);
    ///
    /// let addr = CellAddress::parse("AA10").unwrap();
    /// assert_eq!(addr.row, 9);
    /// assert_eq!(addr.col, 26);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());
        if split == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = column_to_index(&s[..split])?;

        let row_str = &s[split..];
        if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!("invalid row number in '{}'", s)));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("row number too large in '{}'", s)))?;

        // Rows are 1-based in text, 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self { row: row - 1, col })
    }

    /// Move this address by the given row/column deltas.
    ///
    /// Returns `None` when the result would fall before row 1 or column A.
    pub fn offset(&self, row_delta: i64, col_delta: i64) -> Option<Self> {
        let row = i64::from(self.row).checked_add(row_delta)?;
        let col = i64::from(self.col).checked_add(col_delta)?;
        Some(Self {
            row: u32::try_from(row).ok()?,
            col: u32::try_from(col).ok()?,
        })
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        let mut result = index_to_column(self.col);
        result.push_str(&(u64::from(self.row) + 1).to_string());
        result
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Convert a column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub fn index_to_column(index: u32) -> String {
    let mut result = String::new();
    let mut n = u64::from(index) + 1; // 1-based for calculation

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert column letters to an index (A = 0, Z = 25, AA = 26, etc.)
///
/// Every letter of the label contributes, so this is the exact inverse of
/// [`index_to_column`]. Lowercase letters are accepted.
pub fn column_to_index(label: &str) -> Result<u32> {
    if label.is_empty() {
        return Err(Error::InvalidColumn("empty column label".into()));
    }

    let mut col: u32 = 0;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidColumn(format!(
                "invalid column letter '{}' in '{}'",
                c, label
            )));
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| Error::InvalidColumn(format!("column too large: {}", label)))?;
    }

    Ok(col - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_index_to_column() {
        assert_eq!(index_to_column(0), "A");
        assert_eq!(index_to_column(1), "B");
        assert_eq!(index_to_column(25), "Z");
        assert_eq!(index_to_column(26), "AA");
        assert_eq!(index_to_column(27), "AB");
        assert_eq!(index_to_column(701), "ZZ");
        assert_eq!(index_to_column(702), "AAA");
        assert_eq!(index_to_column(16383), "XFD");
    }

    #[test]
    fn test_column_to_index() {
        assert_eq!(column_to_index("A").unwrap(), 0);
        assert_eq!(column_to_index("Z").unwrap(), 25);
        assert_eq!(column_to_index("AA").unwrap(), 26);
        assert_eq!(column_to_index("ZZ").unwrap(), 701);
        assert_eq!(column_to_index("XFD").unwrap(), 16383);

        // Case insensitive
        assert_eq!(column_to_index("b").unwrap(), 1);

        assert!(column_to_index("").is_err());
        assert!(column_to_index("A1").is_err());
        assert!(column_to_index("ZZZZZZZZZZ").is_err());
    }

    #[test]
    fn test_single_letter_round_trip() {
        for c in b'A'..=b'Z' {
            let label = (c as char).to_string();
            assert_eq!(index_to_column(column_to_index(&label).unwrap()), label);
        }
    }

    #[test]
    fn test_cell_address_parse() {
        let addr = CellAddress::parse("A1").unwrap();
        assert_eq!(addr, CellAddress::new(0, 0));

        let addr = CellAddress::parse("C10").unwrap();
        assert_eq!(addr, CellAddress::new(9, 2));

        let addr = CellAddress::parse("ab3").unwrap();
        assert_eq!(addr, CellAddress::new(2, 27));
    }

    #[test]
    fn test_cell_address_parse_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("1").is_err());
        assert!(CellAddress::parse("A0").is_err()); // Row 0 is invalid
        assert!(CellAddress::parse("A1B").is_err());
        assert!(CellAddress::parse("A99999999999").is_err());
    }

    #[test]
    fn test_cell_address_offset() {
        let addr = CellAddress::new(1, 1);
        assert_eq!(addr.offset(1, 2), Some(CellAddress::new(2, 3)));
        assert_eq!(addr.offset(-1, -1), Some(CellAddress::new(0, 0)));
        assert_eq!(addr.offset(-2, 0), None);
        assert_eq!(addr.offset(0, -2), None);
    }

    #[test]
    fn test_cell_address_display() {
        assert_eq!(CellAddress::new(0, 0).to_string(), "A1");
        assert_eq!(CellAddress::new(99, 2).to_string(), "C100");
        assert_eq!(CellAddress::new(0, 26).to_string(), "AA1");
    }

    proptest! {
        #[test]
        fn column_labels_round_trip(index in 0u32..1_000_000) {
            let label = index_to_column(index);
            prop_assert_eq!(column_to_index(&label).unwrap(), index);
        }

        #[test]
        fn addresses_round_trip(row in 0u32..1_000_000, col in 0u32..20_000) {
            let addr = CellAddress::new(row, col);
            prop_assert_eq!(CellAddress::parse(&addr.to_a1_string()).unwrap(), addr);
        }
    }
}
