//! Spreadsheet cell and sheet structures.

use chrono::NaiveDateTime;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// The typed value of one worksheet cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// No value (missing cell or empty cached value)
    #[default]
    Empty,
    /// Shared, inline or formula string
    Text(String),
    /// Plain number
    Number(f64),
    /// Boolean cell
    Bool(bool),
    /// Number carrying a date or time number format, or an ISO date cell
    DateTime(NaiveDateTime),
    /// Error value such as `#N/A`
    Error(String),
}

impl CellValue {
    /// Create a text value.
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Whether the cell holds no value at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The date/time value, if the cell is a date.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

/// A worksheet row, with cells placed at their column index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    /// 1-based row number as written in the sheet
    pub number: u32,
    /// Cells by 0-based column index; gaps are `Empty`
    pub cells: Vec<CellValue>,
}

impl SheetRow {
    /// Create a row from its cells.
    pub fn new(number: u32, cells: Vec<CellValue>) -> Self {
        Self { number, cells }
    }

    /// Get the cell at a 0-based column, `Empty` past the end of the row.
    pub fn cell(&self, column: usize) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    /// Place a value at a 0-based column, growing the row as needed.
    pub fn set(&mut self, column: usize, value: CellValue) {
        if self.cells.len() <= column {
            self.cells.resize(column + 1, CellValue::Empty);
        }
        self.cells[column] = value;
    }

    /// Whether every cell in the row is empty.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_empty)
    }
}

/// A worksheet read from the workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// Sheet name as shown on its tab
    pub name: String,
    /// Non-blank rows in sheet order
    pub rows: Vec<SheetRow>,
}

impl Sheet {
    /// Create an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Rows after the header row (row 1).
    pub fn data_rows(&self) -> impl Iterator<Item = &SheetRow> {
        self.rows.iter().filter(|row| row.number > 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_row_access() {
        let mut row = SheetRow::new(2, Vec::new());
        row.set(3, CellValue::text("x"));

        assert_eq!(row.cells.len(), 4);
        assert!(row.cell(0).is_empty());
        assert_eq!(row.cell(3), &CellValue::text("x"));
        assert!(row.cell(25).is_empty());
        assert!(!row.is_blank());
    }

    #[test]
    fn test_data_rows_skip_header() {
        let mut sheet = Sheet::new("Etalons");
        sheet.rows.push(SheetRow::new(1, vec!["ID".into()]));
        sheet.rows.push(SheetRow::new(2, vec!["E-001".into()]));
        sheet.rows.push(SheetRow::new(5, vec!["E-002".into()]));

        let ids: Vec<_> = sheet.data_rows().map(|r| r.cell(0).clone()).collect();
        assert_eq!(ids, vec![CellValue::text("E-001"), CellValue::text("E-002")]);
    }
}
