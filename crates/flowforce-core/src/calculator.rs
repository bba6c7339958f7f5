use flowforce_parser::EventMeasure;
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::event::FloodEvent;
use crate::forces::{compute_forces, ForceValues, Observation};
use crate::parameters::StructureParameters;

/// Result columns appended per event, as `"<event> <label>"`.
const RESULT_COLUMNS: [(&str, fn(&ForceValues) -> f64); 13] = [
    ("F1", |f| f.water_flow.force_kn),
    ("L1", |f| f.water_flow.height_m),
    ("F2", |f| f.debris.force_kn),
    ("L2", |f| f.debris.height_m),
    ("F3", |f| f.log_impact.force_kn),
    ("L3", |f| f.log_impact.height_m),
    ("Fd2", |f| f.pile.force_kn),
    ("Ld2", |f| f.pile.height_m),
    ("Overturning Moment", |f| f.overturning_moment_knm),
    ("Flow+Debris Force", |f| f.flow_plus_debris.force_kn),
    ("Flow+Debris Moment", |f| f.flow_plus_debris.moment_knm),
    ("Flow+Log Force", |f| f.flow_plus_log.force_kn),
    ("Flow+Log Moment", |f| f.flow_plus_log.moment_knm),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Valid {
        observation: Observation,
        forces: ForceValues,
    },
    /// At least one reading was blank or non-numeric.
    Invalid { missing: Vec<EventMeasure> },
}

/// Forces for one row of one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForceResult {
    pub event: String,
    pub row: usize,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

impl ForceResult {
    pub fn forces(&self) -> Option<&ForceValues> {
        match &self.outcome {
            RowOutcome::Valid { forces, .. } => Some(forces),
            RowOutcome::Invalid { .. } => None,
        }
    }

    pub fn observation(&self) -> Option<&Observation> {
        match &self.outcome {
            RowOutcome::Valid { observation, .. } => Some(observation),
            RowOutcome::Invalid { .. } => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, RowOutcome::Valid { .. })
    }
}

/// One result per input row, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventForces {
    pub event: String,
    pub results: Vec<ForceResult>,
}

impl EventForces {
    pub fn valid_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_valid()).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.results.len() - self.valid_count()
    }

    /// Result columns for export. Invalid rows are null in every column.
    pub fn to_columns(&self) -> Vec<Column> {
        RESULT_COLUMNS
            .iter()
            .map(|(label, value)| {
                let values: Vec<Option<f64>> = self
                    .results
                    .iter()
                    .map(|result| result.forces().map(value))
                    .collect();
                Series::new(format!("{} {label}", self.event).into(), values).into()
            })
            .collect()
    }

    /// Append this event's result columns to `df`. Source columns that
    /// already carry a result name (a re-uploaded results sheet) are
    /// replaced.
    pub fn append_to(&self, df: &mut DataFrame) -> PolarsResult<()> {
        let columns = self.to_columns();
        for column in &columns {
            let name = column.name().as_str();
            if df.get_column_index(name).is_some() {
                debug!(event = %self.event, column = name, "Replacing existing result column");
                df.drop_in_place(name)?;
            }
        }
        df.hstack_mut(&columns)?;
        Ok(())
    }
}

/// Compute forces for every row of an event.
///
/// Parameters are checked once up front. Rows with a missing reading are
/// kept as invalid; a negative reading fails the whole event.
pub fn compute_event_forces(
    event: &FloodEvent,
    params: &StructureParameters,
) -> Result<EventForces> {
    params.validate()?;

    let mut results = Vec::with_capacity(event.len());
    for row in 0..event.len() {
        let (depth, velocity, scour) = event.row(row).unwrap_or((None, None, None));

        let outcome = match (depth, velocity, scour) {
            (Some(depth), Some(velocity), Some(scour)) => {
                let observation = Observation::new(depth, velocity, scour);
                check_reading(event.name(), row, "depth", depth)?;
                check_reading(event.name(), row, "velocity", velocity)?;
                check_reading(event.name(), row, "scour", scour)?;
                RowOutcome::Valid {
                    forces: compute_forces(&observation, params),
                    observation,
                }
            }
            _ => RowOutcome::Invalid {
                missing: EventMeasure::ALL
                    .into_iter()
                    .zip([depth, velocity, scour])
                    .filter(|(_, value)| value.is_none())
                    .map(|(measure, _)| measure)
                    .collect(),
            },
        };

        results.push(ForceResult {
            event: event.name().to_string(),
            row,
            outcome,
        });
    }

    let forces = EventForces {
        event: event.name().to_string(),
        results,
    };
    debug!(
        event = %forces.event,
        valid = forces.valid_count(),
        invalid = forces.invalid_count(),
        "Computed event forces"
    );
    Ok(forces)
}

fn check_reading(
    event: &str,
    row: usize,
    name: &'static str,
    value: f64,
) -> std::result::Result<(), ValidationError> {
    if value < 0.0 {
        return Err(ValidationError::NegativeReading {
            event: event.to_string(),
            row,
            name,
            value,
        });
    }
    Ok(())
}
