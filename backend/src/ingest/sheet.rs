//! Workbook decoding.
//!
//! Only the first sheet of a workbook is read. Every cell becomes optional
//! text so downstream stages never deal with spreadsheet cell types.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

/// The first sheet of a workbook: ordered rows of optional text cells.
/// Row 0 is the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    rows: Vec<Vec<Option<String>>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Build a sheet from string literals; empty strings become empty cells.
    pub fn from_text_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| {
                            let cell = cell.as_ref();
                            (!cell.is_empty()).then(|| cell.to_string())
                        })
                        .collect()
                })
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Rows after the header, paired with their sheet index.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[Option<String>])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, row)| (index, row.as_slice()))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("unrecognized or corrupt workbook: {0}")]
    Open(String),
    #[error("failed to read first sheet: {0}")]
    Read(String),
}

/// Turns stored workbook bytes into the first sheet.
pub trait WorkbookDecoder: Send + Sync {
    /// # Returns
    /// * `Ok(None)` - The workbook has no sheets
    fn first_sheet(&self, bytes: &[u8]) -> Result<Option<RawSheet>, SheetError>;
}

/// Decodes xlsx, xlsm, xls and ods workbooks with calamine.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineDecoder;

impl WorkbookDecoder for CalamineDecoder {
    fn first_sheet(&self, bytes: &[u8]) -> Result<Option<RawSheet>, SheetError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| SheetError::Open(e.to_string()))?;

        let range = match workbook.worksheet_range_at(0) {
            None => return Ok(None),
            Some(range) => range.map_err(|e| SheetError::Read(e.to_string()))?,
        };

        // Ranges start at the first used cell; pad back to A1 so column
        // indexes in the mapping line up with the sheet.
        let (row_offset, col_offset) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<Option<String>>> = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells: Vec<Option<String>> = vec![None; col_offset];
            cells.extend(row.iter().map(cell_text));
            rows.push(cells);
        }

        Ok(Some(RawSheet::new(rows)))
    }
}

fn render_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(text) => Some(text.clone()),
        Data::Float(value) => Some(render_number(*value)),
        Data::Int(value) => Some(value.to_string()),
        Data::DateTime(value) => Some(render_number(value.as_f64())),
        other => Some(other.to_string()),
    }
}
