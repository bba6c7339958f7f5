use tracing::debug;

use crate::errors::{ParserAttempt, ParserError};
use crate::formats::{CsvParser, XlsxParser};
use crate::model::ParsedSheet;

pub trait SheetParser {
    fn name(&self) -> &'static str;
    fn parse(&self, file_name: &str, content: &[u8]) -> Result<ParsedSheet, ParserError>;
}

pub fn parse_sheet_file(file_name: &str, content: &[u8]) -> Result<ParsedSheet, ParserError> {
    let xlsx = XlsxParser;
    let csv = CsvParser;
    let parsers: [&dyn SheetParser; 2] = [&xlsx, &csv];
    parse_with_parsers(file_name, content, &parsers)
}

pub fn parse_with_parsers(
    file_name: &str,
    content: &[u8],
    parsers: &[&dyn SheetParser],
) -> Result<ParsedSheet, ParserError> {
    let mut attempts = Vec::new();

    for parser in parsers {
        match parser.parse(file_name, content) {
            Ok(mut parsed) => {
                parsed.file_hash = blake3::hash(content).to_hex().to_string();
                return Ok(parsed);
            }
            Err(ParserError::FormatMismatch { reason, .. }) => {
                debug!(parser = parser.name(), file_name, %reason, "parser declined file");
                attempts.push(ParserAttempt::new(parser.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingParser { attempts })
}
