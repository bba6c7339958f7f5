mod common;
mod delimited;
mod xlsx;

pub use delimited::CsvParser;
pub use xlsx::XlsxParser;

pub use common::{
    build_sheet, discover_events, normalize_column_name, normalize_header, RawCell, SheetGrid,
};
