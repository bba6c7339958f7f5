use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::errors::ParserError;
use crate::model::ParsedSheet;
use crate::registry::SheetParser;

use super::{build_sheet, RawCell, SheetGrid};

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Reads the first worksheet of an Office Open XML workbook.
pub struct XlsxParser;

impl Default for XlsxParser {
    fn default() -> Self {
        Self
    }
}

impl XlsxParser {
    const NAME: &'static str = "XLSX";

    fn header_text(cell: &Data) -> String {
        match cell {
            Data::String(text) => text.clone(),
            Data::Empty => String::new(),
            other => other.to_string(),
        }
    }

    fn raw_cell(cell: &Data) -> RawCell {
        match cell {
            Data::Int(value) => RawCell::Number(*value as f64),
            Data::Float(value) => RawCell::Number(*value),
            Data::String(text) => RawCell::from_text(text),
            Data::Empty => RawCell::Empty,
            other => RawCell::Text(other.to_string()),
        }
    }
}

impl SheetParser for XlsxParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, file_name: &str, content: &[u8]) -> Result<ParsedSheet, ParserError> {
        if !content.starts_with(ZIP_SIGNATURE) {
            return Err(ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: "content does not start with a zip signature".to_string(),
            });
        }

        let mut workbook =
            Xlsx::new(Cursor::new(content)).map_err(|err| ParserError::Workbook {
                parser: Self::NAME,
                message: err.to_string(),
            })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ParserError::EmptyData { parser: Self::NAME })?
            .map_err(|err| ParserError::Workbook {
                parser: Self::NAME,
                message: err.to_string(),
            })?;

        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or(ParserError::EmptyData { parser: Self::NAME })?
            .iter()
            .map(Self::header_text)
            .collect();
        let body = rows
            .map(|row| row.iter().map(Self::raw_cell).collect())
            .collect();

        build_sheet(Self::NAME, file_name, SheetGrid { header, rows: body })
    }
}
