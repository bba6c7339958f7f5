use csv::ReaderBuilder;

use crate::errors::ParserError;
use crate::model::ParsedSheet;
use crate::registry::SheetParser;

use super::{build_sheet, RawCell, SheetGrid};

/// Comma separated export of the same sheet layout.
pub struct CsvParser;

impl Default for CsvParser {
    fn default() -> Self {
        Self
    }
}

impl CsvParser {
    const NAME: &'static str = "CSV";

    fn csv_error(source: csv::Error) -> ParserError {
        ParserError::Csv {
            parser: Self::NAME,
            source,
        }
    }
}

impl SheetParser for CsvParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, file_name: &str, content: &[u8]) -> Result<ParsedSheet, ParserError> {
        let text = std::str::from_utf8(content).map_err(|err| ParserError::FormatMismatch {
            parser: Self::NAME,
            reason: format!("content is not UTF-8 text: {err}"),
        })?;
        let text = text.trim_start_matches('\u{feff}');

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut records = reader.records();

        let header = records
            .next()
            .ok_or(ParserError::EmptyData { parser: Self::NAME })?
            .map_err(Self::csv_error)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in records {
            let record = record.map_err(Self::csv_error)?;
            rows.push(record.iter().map(RawCell::from_text).collect());
        }

        build_sheet(Self::NAME, file_name, SheetGrid { header, rows })
    }
}
