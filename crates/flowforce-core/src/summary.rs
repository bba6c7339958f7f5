use serde::Serialize;

use crate::calculator::EventForces;
use crate::forces::ForceValues;

/// Depth against force, for the water flow and debris charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub depth_m: f64,
    pub water_flow_kn: f64,
    pub debris_kn: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Combination {
    FlowPlusDebris,
    FlowPlusLog,
}

/// Largest value of each quantity over the valid rows of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ForceMaxima {
    pub water_flow_kn: f64,
    pub debris_kn: f64,
    pub log_impact_kn: f64,
    pub pile_kn: f64,
    pub overturning_moment_knm: f64,
    pub flow_plus_debris_kn: f64,
    pub flow_plus_debris_knm: f64,
    pub flow_plus_log_kn: f64,
    pub flow_plus_log_knm: f64,
}

impl ForceMaxima {
    fn include(&mut self, forces: &ForceValues) {
        self.water_flow_kn = self.water_flow_kn.max(forces.water_flow.force_kn);
        self.debris_kn = self.debris_kn.max(forces.debris.force_kn);
        self.log_impact_kn = self.log_impact_kn.max(forces.log_impact.force_kn);
        self.pile_kn = self.pile_kn.max(forces.pile.force_kn);
        self.overturning_moment_knm = self.overturning_moment_knm.max(forces.overturning_moment_knm);
        self.flow_plus_debris_kn = self.flow_plus_debris_kn.max(forces.flow_plus_debris.force_kn);
        self.flow_plus_debris_knm = self.flow_plus_debris_knm.max(forces.flow_plus_debris.moment_knm);
        self.flow_plus_log_kn = self.flow_plus_log_kn.max(forces.flow_plus_log.force_kn);
        self.flow_plus_log_knm = self.flow_plus_log_knm.max(forces.flow_plus_log.moment_knm);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub event: String,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    /// `None` when the event has no valid rows.
    pub maxima: Option<ForceMaxima>,
    /// Combination with the larger peak force.
    pub governing: Option<Combination>,
    /// Valid rows only, sorted by depth.
    pub chart: Vec<ChartPoint>,
}

pub fn summarize(forces: &EventForces) -> EventSummary {
    let mut maxima: Option<ForceMaxima> = None;
    let mut chart = Vec::new();

    for result in &forces.results {
        let (Some(observation), Some(values)) = (result.observation(), result.forces()) else {
            continue;
        };
        maxima.get_or_insert_with(ForceMaxima::default).include(values);
        chart.push(ChartPoint {
            depth_m: observation.depth,
            water_flow_kn: values.water_flow.force_kn,
            debris_kn: values.debris.force_kn,
        });
    }
    chart.sort_by(|a, b| a.depth_m.total_cmp(&b.depth_m));

    let governing = maxima.map(|m| {
        if m.flow_plus_log_kn > m.flow_plus_debris_kn {
            Combination::FlowPlusLog
        } else {
            Combination::FlowPlusDebris
        }
    });

    let valid_rows = forces.valid_count();
    EventSummary {
        event: forces.event.clone(),
        total_rows: forces.results.len(),
        valid_rows,
        invalid_rows: forces.results.len() - valid_rows,
        maxima,
        governing,
        chart,
    }
}
