// crates/flowforce-core/src/error.rs

use flowforce_parser::ParserError;
use thiserror::Error;

/// Rejected inputs. Any of these blocks the calculation before results exist.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{name} must be greater than zero (received {value})")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must not be negative (received {value})")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be a finite number")]
    NotFinite { name: &'static str },

    #[error("minimum debris depth {min} m exceeds maximum debris depth {max} m")]
    DebrisRange { min: f64, max: f64 },

    #[error("lattice leg footings require a face area")]
    MissingFaceArea,

    #[error("lattice leg footings require a pile diameter greater than zero")]
    MissingPileDiameter,

    #[error(
        "event '{event}' series are misaligned: depth has {depth} rows, velocity {velocity}, scour {scour}"
    )]
    MisalignedSeries {
        event: String,
        depth: usize,
        velocity: usize,
        scour: usize,
    },

    #[error("event '{event}' is missing columns: {}", .missing.join(", "))]
    MissingColumns { event: String, missing: Vec<String> },

    #[error("event '{event}' row {row}: {name} must not be negative (received {value})")]
    NegativeReading {
        event: String,
        row: usize,
        name: &'static str,
        value: f64,
    },
}

#[derive(Error, Debug)]
pub enum CalculationError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, CalculationError>;

/// Failure to turn one uploaded file into a report.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to read spreadsheet: {0}")]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        SessionError::Calculation(CalculationError::Validation(err))
    }
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
