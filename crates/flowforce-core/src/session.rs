use std::fmt;

use flowforce_parser::{parse_sheet_file, EventColumns, ParsedSheet};
use serde::Serialize;
use tracing::{info, warn};

use crate::calculator::{compute_event_forces, EventForces};
use crate::error::{Result, SessionError, ValidationError};
use crate::event::FloodEvent;
use crate::forces::{calculate_forces, ForceValues, Observation};
use crate::parameters::StructureParameters;
use crate::summary::{summarize, EventSummary};

/// Which events of a sheet to calculate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSelection {
    /// Every complete event found in the header.
    #[default]
    All,
    Named(Vec<String>),
}

impl EventSelection {
    /// Parse a comma separated list. Blank or `all` selects every event.
    pub fn parse(list: &str) -> Self {
        let names: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        if names.iter().any(|name| name.eq_ignore_ascii_case("all")) {
            EventSelection::All
        } else {
            Self::from_names(names)
        }
    }

    /// Named events in first-mention order; repeats are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into().trim().to_string();
            if !name.is_empty() && !unique.contains(&name) {
                unique.push(name);
            }
        }

        if unique.is_empty() {
            EventSelection::All
        } else {
            EventSelection::Named(unique)
        }
    }
}

impl fmt::Display for EventSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSelection::All => f.write_str("all"),
            EventSelection::Named(names) => f.write_str(&names.join(", ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionWarning {
    /// The event was skipped because some of its columns are absent.
    MissingColumns { event: String, missing: Vec<String> },
    /// Nothing in the sheet could be calculated.
    NoEvents,
}

impl fmt::Display for SessionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionWarning::MissingColumns { event, missing } => write!(
                f,
                "Skipped event '{event}': missing columns {}",
                missing.join(", ")
            ),
            SessionWarning::NoEvents => f.write_str("No flood events could be calculated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReport {
    pub forces: EventForces,
    pub summary: EventSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetReport {
    pub file_name: String,
    pub file_hash: String,
    pub file_format: &'static str,
    pub row_count: usize,
    pub events: Vec<EventReport>,
    pub warnings: Vec<SessionWarning>,
}

/// An upload that produced no report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub file_name: String,
    pub error: String,
}

/// A parsed upload together with its report, kept for export.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub sheet: ParsedSheet,
    pub report: SheetReport,
}

pub fn process_sheet(
    sheet: &ParsedSheet,
    selection: &EventSelection,
    params: &StructureParameters,
) -> Result<SheetReport> {
    params.validate()?;

    let candidates: Vec<EventColumns> = match selection {
        EventSelection::All => sheet.events.clone(),
        EventSelection::Named(names) => {
            let columns = sheet.column_names();
            names
                .iter()
                .map(|name| {
                    sheet
                        .event(name)
                        .cloned()
                        .unwrap_or_else(|| EventColumns::for_event(name.trim(), &columns))
                })
                .collect()
        }
    };

    let mut events = Vec::new();
    let mut warnings = Vec::new();
    for columns in &candidates {
        if !columns.is_complete() {
            let missing = columns.missing();
            warn!(
                file_name = %sheet.file_name,
                event = %columns.event,
                missing = %missing.join(", "),
                "Skipping event with missing columns"
            );
            warnings.push(SessionWarning::MissingColumns {
                event: columns.event.clone(),
                missing,
            });
            continue;
        }

        let event = FloodEvent::from_sheet(sheet, columns)?;
        let forces = compute_event_forces(&event, params)?;
        let summary = summarize(&forces);
        events.push(EventReport { forces, summary });
    }

    if events.is_empty() && warnings.is_empty() {
        warn!(file_name = %sheet.file_name, "No flood events found in sheet");
        warnings.push(SessionWarning::NoEvents);
    }

    info!(
        file_name = %sheet.file_name,
        rows = sheet.height(),
        events = events.len(),
        warnings = warnings.len(),
        "Processed sheet"
    );

    Ok(SheetReport {
        file_name: sheet.file_name.clone(),
        file_hash: sheet.file_hash.clone(),
        file_format: sheet.file_format,
        row_count: sheet.height(),
        events,
        warnings,
    })
}

/// Parse one upload and calculate the selected events.
pub fn process_file(
    file_name: &str,
    content: &[u8],
    selection: &EventSelection,
    params: &StructureParameters,
) -> std::result::Result<ProcessedFile, SessionError> {
    let sheet = parse_sheet_file(file_name, content)?;
    let report = process_sheet(&sheet, selection, params)?;
    Ok(ProcessedFile { sheet, report })
}

/// Single point calculation from form inputs.
pub fn preview(
    observation: &Observation,
    params: &StructureParameters,
) -> std::result::Result<ForceValues, ValidationError> {
    calculate_forces(observation, params)
}
