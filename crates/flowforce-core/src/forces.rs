//! Closed-form water flow forces on a footing, per AS 5100.2 Section 16.
//!
//! Every function here is pure: identical inputs always give bit-identical
//! outputs. Forces are kN, heights m (negative below ground), moments kN·m.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::parameters::{FootingShape, StructureParameters, SubmergedHeightMode};

const N_TO_KN: f64 = 1.0e-3;

/// One row of flood readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Peak flood depth, m.
    pub depth: f64,
    /// Peak velocity, m/s.
    pub velocity: f64,
    /// Scour depth below ground, m.
    pub scour: f64,
}

impl Observation {
    pub fn new(depth: f64, velocity: f64, scour: f64) -> Self {
        Self {
            depth,
            velocity,
            scour,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("depth", self.depth),
            ("velocity", self.velocity),
            ("scour", self.scour),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { name });
            }
            if value < 0.0 {
                return Err(ValidationError::Negative { name, value });
            }
        }
        Ok(())
    }
}

/// A force and the height it acts at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliedForce {
    pub force_kn: f64,
    pub height_m: f64,
}

impl AppliedForce {
    pub fn moment_knm(&self) -> f64 {
        self.force_kn * self.height_m
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadCombination {
    pub force_kn: f64,
    pub moment_knm: f64,
}

impl LoadCombination {
    fn of(forces: &[AppliedForce]) -> Self {
        Self {
            force_kn: forces.iter().map(|f| f.force_kn).sum(),
            moment_knm: forces.iter().map(AppliedForce::moment_knm).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForceValues {
    pub effective_height_m: f64,
    pub debris_depth_m: f64,
    pub debris_drag_coefficient: f64,
    /// F1 / L1: water flow on the pier or leg.
    pub water_flow: AppliedForce,
    /// F2 / L2: debris mat.
    pub debris: AppliedForce,
    /// F3 / L3: log impact at the water surface.
    pub log_impact: AppliedForce,
    /// Fd2 / Ld2: water flow on the scoured pile.
    pub pile: AppliedForce,
    /// F1 × L1 about the footing.
    pub overturning_moment_knm: f64,
    pub flow_plus_debris: LoadCombination,
    pub flow_plus_log: LoadCombination,
}

/// Debris drag coefficient against V²y, AS 5100.2 Figure 16.6.4(A).
pub fn debris_drag_coefficient(velocity: f64, depth: f64) -> f64 {
    let v2y = velocity.powi(2) * depth;

    if v2y <= 40.0 {
        3.4
    } else if v2y <= 60.0 {
        3.4 - 0.03 * (v2y - 40.0)
    } else if v2y <= 85.0 {
        2.8 - 0.018 * (v2y - 60.0)
    } else if v2y <= 100.0 {
        2.35 - 0.01 * (v2y - 85.0)
    } else if v2y <= 130.0 {
        2.2 - 0.00833 * (v2y - 100.0)
    } else if v2y <= 260.0 {
        1.95 - 0.00423 * (v2y - 130.0)
    } else {
        1.4
    }
}

/// Flood depth held within the debris mat bounds.
pub fn debris_mat_depth(depth: f64, min_depth: f64, max_depth: f64) -> f64 {
    max_depth.min(min_depth.max(depth))
}

pub fn effective_submerged_height(observation: &Observation, params: &StructureParameters) -> f64 {
    let wetted = match params.exposed_height {
        Some(limit) => observation.depth.min(limit),
        None => observation.depth,
    };

    match params.submerged_height_mode {
        SubmergedHeightMode::ScourReduced => (wetted - observation.scour).max(0.0),
        SubmergedHeightMode::FullDepth => wetted.max(0.0),
    }
}

/// ½·ρ·Cd·A·v² in kN.
pub fn drag_force_kn(water_density: f64, drag_coefficient: f64, area: f64, velocity: f64) -> f64 {
    0.5 * water_density * drag_coefficient * area * velocity.powi(2) * N_TO_KN
}

/// Validate both inputs, then compute every force for one observation.
pub fn calculate_forces(
    observation: &Observation,
    params: &StructureParameters,
) -> Result<ForceValues, ValidationError> {
    params.validate()?;
    observation.validate()?;
    Ok(compute_forces(observation, params))
}

/// Force computation without input checks. Callers validate once per batch.
pub(crate) fn compute_forces(observation: &Observation, params: &StructureParameters) -> ForceValues {
    let Observation {
        depth,
        velocity,
        scour,
    } = *observation;
    let factor = params.load_factor;

    let effective_height = effective_submerged_height(observation, params);
    let wetted_area = match params.shape {
        FootingShape::Circular | FootingShape::Rectangular => params.width * effective_height,
        FootingShape::LatticeLeg if effective_height > 0.0 => {
            params.face_area.unwrap_or(0.0) * std::f64::consts::SQRT_2
        }
        FootingShape::LatticeLeg => 0.0,
    };
    let water_flow = AppliedForce {
        force_kn: drag_force_kn(params.water_density, params.drag_coefficient, wetted_area, velocity)
            * factor,
        height_m: effective_height * params.shape.lever_fraction(),
    };

    let debris_depth = debris_mat_depth(depth, params.min_debris_depth, params.max_debris_depth);
    let debris_cd = debris_drag_coefficient(velocity, depth);
    let debris = AppliedForce {
        force_kn: drag_force_kn(
            params.water_density,
            debris_cd,
            debris_depth * params.debris_span,
            velocity,
        ) * factor,
        height_m: (depth - debris_depth / 2.0).max(debris_depth / 2.0),
    };

    // F = m·a with a = v²/2s
    let deceleration = velocity.powi(2) / (2.0 * params.stopping_distance);
    let log_impact = AppliedForce {
        force_kn: params.log_mass * deceleration * factor * N_TO_KN,
        height_m: depth,
    };

    let pile = AppliedForce {
        force_kn: drag_force_kn(
            params.water_density,
            params.pile_drag_coefficient,
            scour * params.effective_pile_diameter(),
            velocity,
        ) * factor,
        height_m: -scour / 2.0,
    };

    ForceValues {
        effective_height_m: effective_height,
        debris_depth_m: debris_depth,
        debris_drag_coefficient: debris_cd,
        water_flow,
        debris,
        log_impact,
        pile,
        overturning_moment_knm: water_flow.moment_knm(),
        flow_plus_debris: LoadCombination::of(&[water_flow, debris]),
        flow_plus_log: LoadCombination::of(&[water_flow, log_impact]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debris_coefficient_follows_curve_breakpoints() {
        // V = 1 m/s so V²y equals depth
        assert_eq!(debris_drag_coefficient(1.0, 10.0), 3.4);
        assert!((debris_drag_coefficient(1.0, 60.0) - 2.8).abs() < 1e-12);
        assert!((debris_drag_coefficient(1.0, 85.0) - 2.35).abs() < 1e-12);
        assert!((debris_drag_coefficient(1.0, 100.0) - 2.2).abs() < 1e-12);
        assert!((debris_drag_coefficient(1.0, 130.0) - 1.9501).abs() < 1e-3);
        assert_eq!(debris_drag_coefficient(1.0, 500.0), 1.4);
    }

    #[test]
    fn debris_depth_is_clamped() {
        assert_eq!(debris_mat_depth(0.5, 1.2, 3.0), 1.2);
        assert_eq!(debris_mat_depth(2.0, 1.2, 3.0), 2.0);
        assert_eq!(debris_mat_depth(8.0, 1.2, 3.0), 3.0);
    }

    #[test]
    fn exposed_height_caps_wetted_height() {
        let params = StructureParameters {
            exposed_height: Some(1.5),
            ..StructureParameters::default()
        };
        let observation = Observation::new(4.0, 2.0, 0.5);
        assert_eq!(effective_submerged_height(&observation, &params), 1.0);

        let full = StructureParameters {
            submerged_height_mode: SubmergedHeightMode::FullDepth,
            ..params
        };
        assert_eq!(effective_submerged_height(&observation, &full), 1.5);
    }

    #[test]
    fn negative_readings_are_rejected() {
        let err = calculate_forces(&Observation::new(1.0, -0.1, 0.0), &StructureParameters::default())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Negative {
                name: "velocity",
                value: -0.1
            }
        );
    }

    #[test]
    fn lattice_leg_acts_at_two_thirds_height() {
        let params = StructureParameters {
            submerged_height_mode: SubmergedHeightMode::FullDepth,
            ..StructureParameters::for_shape(FootingShape::LatticeLeg)
        };
        let forces = calculate_forces(&Observation::new(3.0, 2.0, 0.0), &params).unwrap();
        assert!((forces.water_flow.height_m - 2.0).abs() < 1e-12);
    }

    #[test]
    fn combinations_sum_forces_and_moments() {
        let forces =
            calculate_forces(&Observation::new(4.0, 2.5, 0.5), &StructureParameters::default()).unwrap();
        let expected_force = forces.water_flow.force_kn + forces.debris.force_kn;
        let expected_moment = forces.water_flow.moment_knm() + forces.debris.moment_knm();
        assert!((forces.flow_plus_debris.force_kn - expected_force).abs() < 1e-9);
        assert!((forces.flow_plus_debris.moment_knm - expected_moment).abs() < 1e-9);
        assert!((forces.overturning_moment_knm - forces.water_flow.moment_knm()).abs() < 1e-12);
    }
}
