pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ParserAttempt, ParserError};
pub use model::{split_event_column, EventColumns, EventMeasure, ParsedSheet};
pub use registry::{parse_sheet_file, parse_with_parsers, SheetParser};
