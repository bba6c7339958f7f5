//! Terminal tables for the CLI.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use flowforce_core::calculator::RowOutcome;
use flowforce_core::forces::ForceValues;
use flowforce_core::parameters::StructureParameters;
use flowforce_core::session::{EventReport, SheetReport};
use flowforce_core::summary::Combination;

const NOT_AVAILABLE: &str = "N/A";

fn new_table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn num(value: f64) -> String {
    format!("{value:.3}")
}

pub fn parameters_table(params: &StructureParameters) -> Table {
    let mut table = new_table(["Parameter", "Value"]);
    for (label, value) in params.describe() {
        table.add_row(vec![label.to_string(), value]);
    }
    table
}

/// Single point result, one row per force.
pub fn forces_table(forces: &ForceValues) -> Table {
    let mut table = new_table(["Force", "kN", "Acts at (m)", "Moment (kN·m)"]);
    for (label, force) in [
        ("F1 water flow", forces.water_flow),
        ("F2 debris", forces.debris),
        ("F3 log impact", forces.log_impact),
        ("Fd2 scoured pile", forces.pile),
    ] {
        table.add_row(vec![
            label.to_string(),
            num(force.force_kn),
            num(force.height_m),
            num(force.moment_knm()),
        ]);
    }
    table.add_row(vec![
        "F1 + F2".to_string(),
        num(forces.flow_plus_debris.force_kn),
        String::new(),
        num(forces.flow_plus_debris.moment_knm),
    ]);
    table.add_row(vec![
        "F1 + F3".to_string(),
        num(forces.flow_plus_log.force_kn),
        String::new(),
        num(forces.flow_plus_log.moment_knm),
    ]);
    table
}

/// Every row of an event. Invalid rows show `N/A`.
pub fn event_table(report: &EventReport) -> Table {
    let mut table = new_table([
        "Row", "Depth", "Velocity", "Scour", "F1", "L1", "F2", "L2", "F3", "L3", "Fd2", "Ld2",
        "M1",
    ]);

    for result in &report.forces.results {
        let mut row = vec![result.row.to_string()];
        match &result.outcome {
            RowOutcome::Valid {
                observation,
                forces,
            } => {
                row.extend(
                    [
                        observation.depth,
                        observation.velocity,
                        observation.scour,
                        forces.water_flow.force_kn,
                        forces.water_flow.height_m,
                        forces.debris.force_kn,
                        forces.debris.height_m,
                        forces.log_impact.force_kn,
                        forces.log_impact.height_m,
                        forces.pile.force_kn,
                        forces.pile.height_m,
                        forces.overturning_moment_knm,
                    ]
                    .into_iter()
                    .map(num),
                );
            }
            RowOutcome::Invalid { .. } => {
                row.extend(std::iter::repeat(NOT_AVAILABLE.to_string()).take(12));
            }
        }
        table.add_row(row);
    }
    table
}

/// One line per event: row counts, peak forces and the governing combination.
pub fn summary_table(report: &SheetReport) -> Table {
    let mut table = new_table([
        "Event",
        "Valid",
        "Invalid",
        "Max F1",
        "Max F2",
        "Max F3",
        "Max Fd2",
        "Max M1",
        "Governs",
    ]);

    for event in &report.events {
        let summary = &event.summary;
        let mut row = vec![
            summary.event.clone(),
            summary.valid_rows.to_string(),
            summary.invalid_rows.to_string(),
        ];
        match &summary.maxima {
            Some(maxima) => row.extend(
                [
                    maxima.water_flow_kn,
                    maxima.debris_kn,
                    maxima.log_impact_kn,
                    maxima.pile_kn,
                    maxima.overturning_moment_knm,
                ]
                .into_iter()
                .map(num),
            ),
            None => row.extend(std::iter::repeat(NOT_AVAILABLE.to_string()).take(5)),
        }
        row.push(
            match summary.governing {
                Some(Combination::FlowPlusDebris) => "F1 + F2",
                Some(Combination::FlowPlusLog) => "F1 + F3",
                None => NOT_AVAILABLE,
            }
            .to_string(),
        );
        table.add_row(row);
    }
    table
}
