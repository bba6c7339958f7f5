use std::fmt;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// One of the three per-event readings an uploaded sheet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMeasure {
    Depth,
    Velocity,
    Scour,
}

impl EventMeasure {
    pub const ALL: [EventMeasure; 3] = [
        EventMeasure::Depth,
        EventMeasure::Velocity,
        EventMeasure::Scour,
    ];

    /// Header suffix that follows the event name, including the leading space.
    pub fn suffix(&self) -> &'static str {
        match self {
            EventMeasure::Depth => " Event Peak Flood Depth",
            EventMeasure::Velocity => " Event Peak Velocity",
            EventMeasure::Scour => " Event Scour",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventMeasure::Depth => "depth",
            EventMeasure::Velocity => "velocity",
            EventMeasure::Scour => "scour",
        }
    }

    pub fn column_name(&self, event: &str) -> String {
        format!("{event}{}", self.suffix())
    }
}

impl fmt::Display for EventMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a normalised header such as `"1% AEP Event Scour"` into its event
/// name and measure.
pub fn split_event_column(column: &str) -> Option<(&str, EventMeasure)> {
    EventMeasure::ALL.iter().find_map(|measure| {
        column
            .strip_suffix(measure.suffix())
            .map(str::trim)
            .filter(|event| !event.is_empty())
            .map(|event| (event, *measure))
    })
}

/// Columns found in a sheet for one event. Any of the three may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventColumns {
    pub event: String,
    pub depth: Option<String>,
    pub velocity: Option<String>,
    pub scour: Option<String>,
}

impl EventColumns {
    pub fn for_event<S: AsRef<str>>(event: &str, columns: &[S]) -> Self {
        let find = |measure: EventMeasure| {
            let wanted = measure.column_name(event);
            columns
                .iter()
                .map(AsRef::as_ref)
                .find(|column| *column == wanted)
                .map(str::to_string)
        };

        Self {
            event: event.to_string(),
            depth: find(EventMeasure::Depth),
            velocity: find(EventMeasure::Velocity),
            scour: find(EventMeasure::Scour),
        }
    }

    pub fn column(&self, measure: EventMeasure) -> Option<&str> {
        match measure {
            EventMeasure::Depth => self.depth.as_deref(),
            EventMeasure::Velocity => self.velocity.as_deref(),
            EventMeasure::Scour => self.scour.as_deref(),
        }
    }

    /// Expected header names that are absent from the sheet.
    pub fn missing(&self) -> Vec<String> {
        EventMeasure::ALL
            .iter()
            .filter(|measure| self.column(**measure).is_none())
            .map(|measure| measure.column_name(&self.event))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        EventMeasure::ALL
            .iter()
            .all(|measure| self.column(*measure).is_some())
    }
}

#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub file_name: String,
    pub file_hash: String,
    pub file_format: &'static str,
    /// Source columns with normalised names. Event columns are `Float64`,
    /// everything else is carried as text.
    pub df: DataFrame,
    /// Events discovered in the header, in first-appearance order.
    pub events: Vec<EventColumns>,
}

impl ParsedSheet {
    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn event(&self, name: &str) -> Option<&EventColumns> {
        let wanted = name.trim();
        self.events.iter().find(|columns| columns.event == wanted)
    }

    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(|columns| columns.event.as_str()).collect()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }
}
