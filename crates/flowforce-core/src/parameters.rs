use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ValidationError;

/// Footing member shape. Selects the default pier drag coefficient and how
/// the wetted area is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FootingShape {
    /// Round or semi-circular nosed pier.
    #[default]
    Circular,
    /// Square ended pier.
    Rectangular,
    /// Triangular lattice leg on a bored pile.
    LatticeLeg,
}

impl FootingShape {
    pub const ALL: [FootingShape; 3] = [
        FootingShape::Circular,
        FootingShape::Rectangular,
        FootingShape::LatticeLeg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FootingShape::Circular => "circular",
            FootingShape::Rectangular => "rectangular",
            FootingShape::LatticeLeg => "lattice_leg",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FootingShape::Circular => "Pier (circular)",
            FootingShape::Rectangular => "Pier (rectangular)",
            FootingShape::LatticeLeg => "Lattice leg on bored pile",
        }
    }

    /// Pier drag coefficient from AS 5100.2 Table 16.6.2(A).
    pub fn default_drag_coefficient(&self) -> f64 {
        match self {
            FootingShape::Circular => 0.7,
            FootingShape::Rectangular => 1.4,
            FootingShape::LatticeLeg => 0.8,
        }
    }

    /// Fraction of the effective submerged height at which the water flow
    /// force acts.
    pub fn lever_fraction(&self) -> f64 {
        match self {
            FootingShape::Circular | FootingShape::Rectangular => 0.5,
            FootingShape::LatticeLeg => 2.0 / 3.0,
        }
    }
}

impl fmt::Display for FootingShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FootingShape {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "circular" | "round" | "pier" => Ok(FootingShape::Circular),
            "rectangular" | "flat" | "square" => Ok(FootingShape::Rectangular),
            "lattice_leg" | "lattice" | "bored_pile" => Ok(FootingShape::LatticeLeg),
            other => Err(format!("unknown footing shape '{other}'")),
        }
    }
}

/// How scour enters the water flow drag term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmergedHeightMode {
    /// Scour is subtracted from the wetted height, clipped at zero.
    #[default]
    ScourReduced,
    /// The full flood depth is wetted; scour only loads the pile below ground.
    FullDepth,
}

impl SubmergedHeightMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmergedHeightMode::ScourReduced => "scour_reduced",
            SubmergedHeightMode::FullDepth => "full_depth",
        }
    }
}

impl fmt::Display for SubmergedHeightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmergedHeightMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "scour_reduced" | "scour" => Ok(SubmergedHeightMode::ScourReduced),
            "full_depth" | "full" => Ok(SubmergedHeightMode::FullDepth),
            other => Err(format!("unknown submerged height mode '{other}'")),
        }
    }
}

/// Footing geometry and calculation settings.
///
/// Lengths are metres, mass kilograms, density kg/m³.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureParameters {
    pub shape: FootingShape,
    pub drag_coefficient: f64,
    /// Column width or diameter normal to the flow.
    pub width: f64,
    /// Single face area of a lattice leg.
    pub face_area: Option<f64>,
    /// Zero means the column width is used.
    pub pile_diameter: f64,
    pub pile_drag_coefficient: f64,
    pub water_density: f64,
    pub submerged_height_mode: SubmergedHeightMode,
    /// Upper bound on the wetted height, if the member stops below the flood level.
    pub exposed_height: Option<f64>,
    pub min_debris_depth: f64,
    pub max_debris_depth: f64,
    pub debris_span: f64,
    pub log_mass: f64,
    pub stopping_distance: f64,
    pub load_factor: f64,
}

impl Default for StructureParameters {
    fn default() -> Self {
        Self::for_shape(FootingShape::default())
    }
}

impl StructureParameters {
    pub fn for_shape(shape: FootingShape) -> Self {
        let (pile_diameter, face_area) = match shape {
            FootingShape::LatticeLeg => (DEFAULT_PILE_DIAMETER_M, Some(DEFAULT_LATTICE_FACE_AREA_M2)),
            FootingShape::Circular | FootingShape::Rectangular => (0.0, None),
        };

        Self {
            shape,
            drag_coefficient: shape.default_drag_coefficient(),
            width: DEFAULT_COLUMN_DIAMETER_M,
            face_area,
            pile_diameter,
            pile_drag_coefficient: DEFAULT_PILE_DRAG_COEFFICIENT,
            water_density: DEFAULT_WATER_DENSITY_KG_M3,
            submerged_height_mode: SubmergedHeightMode::default(),
            exposed_height: None,
            min_debris_depth: DEFAULT_MIN_DEBRIS_DEPTH_M,
            max_debris_depth: DEFAULT_MAX_DEBRIS_DEPTH_M,
            debris_span: DEFAULT_DEBRIS_SPAN_M,
            log_mass: DEFAULT_LOG_MASS_KG,
            stopping_distance: DEFAULT_STOPPING_DISTANCE_M,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_positive("drag coefficient", self.drag_coefficient)?;
        require_positive("width", self.width)?;
        require_positive("water density", self.water_density)?;
        require_positive("debris span", self.debris_span)?;
        require_positive("stopping distance", self.stopping_distance)?;
        require_positive("load factor", self.load_factor)?;
        require_non_negative("pile diameter", self.pile_diameter)?;
        require_non_negative("pile drag coefficient", self.pile_drag_coefficient)?;
        require_non_negative("minimum debris depth", self.min_debris_depth)?;
        require_non_negative("maximum debris depth", self.max_debris_depth)?;
        require_non_negative("log mass", self.log_mass)?;

        if let Some(height) = self.exposed_height {
            require_positive("exposed height", height)?;
        }
        if let Some(area) = self.face_area {
            require_positive("face area", area)?;
        }
        if self.min_debris_depth > self.max_debris_depth {
            return Err(ValidationError::DebrisRange {
                min: self.min_debris_depth,
                max: self.max_debris_depth,
            });
        }
        if self.shape == FootingShape::LatticeLeg {
            if self.face_area.is_none() {
                return Err(ValidationError::MissingFaceArea);
            }
            if self.pile_diameter == 0.0 {
                return Err(ValidationError::MissingPileDiameter);
            }
        }

        Ok(())
    }

    /// Pile diameter used below ground.
    pub fn effective_pile_diameter(&self) -> f64 {
        if self.pile_diameter > 0.0 {
            self.pile_diameter
        } else {
            self.width
        }
    }

    /// Label/value rows for reports and the exported parameter sheet.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let optional = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
        vec![
            ("Footing Shape", self.shape.label().to_string()),
            ("Water Drag Coefficient on Pier (Cd)", self.drag_coefficient.to_string()),
            ("Column Width / Diameter (m)", self.width.to_string()),
            ("Lattice Face Area (m2)", optional(self.face_area)),
            ("Pile Diameter (m)", self.effective_pile_diameter().to_string()),
            ("Pile Drag Coefficient (Cd)", self.pile_drag_coefficient.to_string()),
            ("Water Density (kg/m3)", self.water_density.to_string()),
            ("Submerged Height Mode", self.submerged_height_mode.to_string()),
            ("Exposed Height (m)", optional(self.exposed_height)),
            ("Min Debris Mat Depth (m)", self.min_debris_depth.to_string()),
            ("Max Debris Mat Depth (m)", self.max_debris_depth.to_string()),
            ("Debris Span (m)", self.debris_span.to_string()),
            ("Log Mass (kg)", self.log_mass.to_string()),
            ("Stopping Distance (m)", self.stopping_distance.to_string()),
            ("Load Factor", self.load_factor.to_string()),
        ]
    }
}

fn require_finite(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { name })
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ValidationError> {
    require_finite(name, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NonPositive { name, value });
    }
    Ok(())
}

fn require_non_negative(name: &'static str, value: f64) -> Result<(), ValidationError> {
    require_finite(name, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative { name, value });
    }
    Ok(())
}

/// Partial parameters from a config file, CLI flags or a request body.
/// Unset fields fall back to the defaults of the selected shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterOverrides {
    pub shape: Option<FootingShape>,
    pub drag_coefficient: Option<f64>,
    pub width: Option<f64>,
    pub face_area: Option<f64>,
    pub pile_diameter: Option<f64>,
    pub pile_drag_coefficient: Option<f64>,
    pub water_density: Option<f64>,
    pub submerged_height_mode: Option<SubmergedHeightMode>,
    pub exposed_height: Option<f64>,
    pub min_debris_depth: Option<f64>,
    pub max_debris_depth: Option<f64>,
    pub debris_span: Option<f64>,
    pub log_mass: Option<f64>,
    pub stopping_distance: Option<f64>,
    pub load_factor: Option<f64>,
}

impl ParameterOverrides {
    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: ParameterOverrides) -> ParameterOverrides {
        ParameterOverrides {
            shape: other.shape.or(self.shape),
            drag_coefficient: other.drag_coefficient.or(self.drag_coefficient),
            width: other.width.or(self.width),
            face_area: other.face_area.or(self.face_area),
            pile_diameter: other.pile_diameter.or(self.pile_diameter),
            pile_drag_coefficient: other.pile_drag_coefficient.or(self.pile_drag_coefficient),
            water_density: other.water_density.or(self.water_density),
            submerged_height_mode: other.submerged_height_mode.or(self.submerged_height_mode),
            exposed_height: other.exposed_height.or(self.exposed_height),
            min_debris_depth: other.min_debris_depth.or(self.min_debris_depth),
            max_debris_depth: other.max_debris_depth.or(self.max_debris_depth),
            debris_span: other.debris_span.or(self.debris_span),
            log_mass: other.log_mass.or(self.log_mass),
            stopping_distance: other.stopping_distance.or(self.stopping_distance),
            load_factor: other.load_factor.or(self.load_factor),
        }
    }

    pub fn resolve(&self) -> StructureParameters {
        let mut params = StructureParameters::for_shape(self.shape.unwrap_or_default());

        if let Some(value) = self.drag_coefficient {
            params.drag_coefficient = value;
        }
        if let Some(value) = self.width {
            params.width = value;
        }
        if let Some(value) = self.face_area {
            params.face_area = Some(value);
        }
        if let Some(value) = self.pile_diameter {
            params.pile_diameter = value;
        }
        if let Some(value) = self.pile_drag_coefficient {
            params.pile_drag_coefficient = value;
        }
        if let Some(value) = self.water_density {
            params.water_density = value;
        }
        if let Some(value) = self.submerged_height_mode {
            params.submerged_height_mode = value;
        }
        if let Some(value) = self.exposed_height {
            params.exposed_height = Some(value);
        }
        if let Some(value) = self.min_debris_depth {
            params.min_debris_depth = value;
        }
        if let Some(value) = self.max_debris_depth {
            params.max_debris_depth = value;
        }
        if let Some(value) = self.debris_span {
            params.debris_span = value;
        }
        if let Some(value) = self.log_mass {
            params.log_mass = value;
        }
        if let Some(value) = self.stopping_distance {
            params.stopping_distance = value;
        }
        if let Some(value) = self.load_factor {
            params.load_factor = value;
        }

        params
    }
}
