use std::collections::{HashMap, HashSet};

use polars::prelude::*;
use tracing::debug;

use crate::errors::ParserError;
use crate::model::{split_event_column, EventColumns, ParsedSheet};

/// Cell value as read from a workbook or CSV before column typing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Empty,
}

impl RawCell {
    pub fn from_text(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return RawCell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(number) => RawCell::Number(number),
            Err(_) => RawCell::Text(trimmed.to_string()),
        }
    }

    /// Numeric view used for event columns. Anything that is not a finite
    /// number becomes a missing reading.
    pub fn as_reading(&self) -> Option<f64> {
        let value = match self {
            RawCell::Number(number) => *number,
            RawCell::Text(text) => text.trim().parse::<f64>().ok()?,
            RawCell::Empty => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            RawCell::Number(number) => Some(format_number(*number)),
            RawCell::Text(text) => Some(text.clone()),
            RawCell::Empty => None,
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, RawCell::Empty)
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Header plus body rows, shared by every format parser.
#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    pub header: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

pub fn normalize_column_name(raw: &str) -> String {
    raw.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// Normalise header names, name blank headers by position and suffix
/// duplicates so every column name is unique. A suffix never reuses a name
/// that appears elsewhere in the header.
pub fn normalize_header(raw: &[String]) -> Vec<String> {
    let normalized: Vec<String> = raw
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = normalize_column_name(name);
            if name.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            }
        })
        .collect();
    let reserved: HashSet<&str> = normalized.iter().map(String::as_str).collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    normalized
        .iter()
        .map(|name| {
            if taken.insert(name.clone()) {
                return name.clone();
            }
            let suffix = next_suffix.entry(name.clone()).or_insert(1);
            loop {
                let candidate = format!("{name}.{suffix}");
                *suffix += 1;
                if !reserved.contains(candidate.as_str()) && taken.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

pub fn discover_events(columns: &[String]) -> Vec<EventColumns> {
    let mut order: Vec<&str> = Vec::new();
    for column in columns {
        if let Some((event, _)) = split_event_column(column) {
            if !order.contains(&event) {
                order.push(event);
            }
        }
    }
    order
        .into_iter()
        .map(|event| EventColumns::for_event(event, columns))
        .collect()
}

pub fn build_sheet(
    parser: &'static str,
    file_name: &str,
    grid: SheetGrid,
) -> Result<ParsedSheet, ParserError> {
    if grid.header.iter().all(|name| name.trim().is_empty()) {
        return Err(ParserError::EmptyData { parser });
    }

    let header = normalize_header(&grid.header);
    let rows: Vec<Vec<RawCell>> = grid
        .rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    let empty = RawCell::Empty;
    let mut columns: Vec<Column> = Vec::with_capacity(header.len());
    for (idx, name) in header.iter().enumerate() {
        let cells = rows.iter().map(|row| row.get(idx).unwrap_or(&empty));
        let series = if split_event_column(name).is_some() {
            let values: Vec<Option<f64>> = cells.map(RawCell::as_reading).collect();
            Series::new(name.as_str().into(), values)
        } else {
            let values: Vec<Option<String>> = cells.map(RawCell::as_text).collect();
            Series::new(name.as_str().into(), values)
        };
        columns.push(series.into());
    }

    let df = DataFrame::new(columns).map_err(|source| ParserError::Polars { parser, source })?;
    let events = discover_events(&header);

    debug!(
        parser,
        file_name,
        rows = df.height(),
        events = events.len(),
        "built sheet table"
    );

    Ok(ParsedSheet {
        file_name: file_name.to_string(),
        file_hash: String::new(),
        file_format: parser,
        df,
        events,
    })
}
