use flowforce_parser::{EventColumns, EventMeasure, ParsedSheet};
use polars::prelude::*;

use crate::error::{CalculationError, ValidationError};

/// A named flood event with row-aligned depth, velocity and scour readings.
///
/// `None` marks a cell that was blank or not a finite number.
#[derive(Debug, Clone, PartialEq)]
pub struct FloodEvent {
    name: String,
    depth: Vec<Option<f64>>,
    velocity: Vec<Option<f64>>,
    scour: Vec<Option<f64>>,
}

impl FloodEvent {
    pub fn new(
        name: impl Into<String>,
        depth: Vec<Option<f64>>,
        velocity: Vec<Option<f64>>,
        scour: Vec<Option<f64>>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if depth.len() != velocity.len() || depth.len() != scour.len() {
            return Err(ValidationError::MisalignedSeries {
                event: name,
                depth: depth.len(),
                velocity: velocity.len(),
                scour: scour.len(),
            });
        }

        Ok(Self {
            name,
            depth,
            velocity,
            scour,
        })
    }

    /// Read the event's three columns out of a parsed sheet.
    pub fn from_sheet(
        sheet: &ParsedSheet,
        columns: &EventColumns,
    ) -> Result<Self, CalculationError> {
        if !columns.is_complete() {
            return Err(ValidationError::MissingColumns {
                event: columns.event.clone(),
                missing: columns.missing(),
            }
            .into());
        }

        let read = |measure: EventMeasure| -> Result<Vec<Option<f64>>, CalculationError> {
            // is_complete() guarantees the column is named
            let name = columns.column(measure).unwrap_or_default();
            let values = sheet.df.column(name)?.cast(&DataType::Float64)?;
            Ok(values
                .f64()?
                .into_iter()
                .map(|value| value.filter(|v| v.is_finite()))
                .collect())
        };

        let event = FloodEvent::new(
            columns.event.clone(),
            read(EventMeasure::Depth)?,
            read(EventMeasure::Velocity)?,
            read(EventMeasure::Scour)?,
        )?;
        Ok(event)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth.is_empty()
    }

    /// Readings for one row; absent measures are `None`.
    pub fn row(&self, idx: usize) -> Option<(Option<f64>, Option<f64>, Option<f64>)> {
        if idx >= self.len() {
            return None;
        }
        Some((self.depth[idx], self.velocity[idx], self.scour[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unequal_series_are_rejected() {
        let err = FloodEvent::new(
            "PMF",
            vec![Some(1.0), Some(2.0)],
            vec![Some(1.0)],
            vec![Some(0.0), Some(0.0)],
        )
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::MisalignedSeries {
                event: "PMF".to_string(),
                depth: 2,
                velocity: 1,
                scour: 2,
            }
        );
    }

    #[test]
    fn rows_are_addressed_by_index() {
        let event = FloodEvent::new("1% AEP", vec![Some(2.0), None], vec![Some(3.0), Some(1.0)], vec![
            Some(0.0),
            Some(0.5),
        ])
        .unwrap();

        assert_eq!(event.len(), 2);
        assert_eq!(event.row(1), Some((None, Some(1.0), Some(0.5))));
        assert_eq!(event.row(2), None);
    }
}
