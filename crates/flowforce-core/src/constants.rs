//! Code defaults from AS 5100.2 Section 16 and the text shipped with every
//! results bundle.

/// Flood events offered for selection, rarest last.
pub const STANDARD_EVENTS: [&str; 6] = ["10% AEP", "1% AEP", "0.5% AEP", "0.2% AEP", "0.05% AEP", "PMF"];

pub const DEFAULT_EVENT: &str = "1% AEP";

pub const DEFAULT_COLUMN_DIAMETER_M: f64 = 2.5;
pub const DEFAULT_PILE_DIAMETER_M: f64 = 2.5;
pub const DEFAULT_PILE_DRAG_COEFFICIENT: f64 = 0.7;
pub const DEFAULT_LATTICE_FACE_AREA_M2: f64 = 20.0;
pub const DEFAULT_WATER_DENSITY_KG_M3: f64 = 1000.0;
pub const DEFAULT_MIN_DEBRIS_DEPTH_M: f64 = 1.2;
pub const DEFAULT_MAX_DEBRIS_DEPTH_M: f64 = 3.0;
pub const DEFAULT_DEBRIS_SPAN_M: f64 = 20.0;
pub const DEFAULT_LOG_MASS_KG: f64 = 2000.0;
pub const DEFAULT_STOPPING_DISTANCE_M: f64 = 0.075;
pub const DEFAULT_LOAD_FACTOR: f64 = 1.3;

pub const CALCULATOR_DESCRIPTION: &str = "Estimates design forces on transmission tower footings \
in accordance with AS 5100.2 Section 16, Forces Resulting from Water Flow.";

pub const ENGINEERING_ASSUMPTIONS: &str = "A default load factor of 1.3 is applied to every force \
for the PMF peak flood, covering climate change allowance, limited redundancy and \
inspection constraints.";

pub const USAGE_TERMS: &str = "Outputs must be reviewed by an appropriately qualified engineer \
before use in design.";

pub const TECHNICAL_ASSUMPTIONS: [&str; 6] = [
    "For circular and rectangular piers the wetted area is the effective submerged height times the column width.",
    "For lattice legs the wetted area is the area of a single face times sqrt(2), the critical 45 degree attack on two faces.",
    "The debris mat spans 20 m unless overridden.",
    "Water depths below the minimum debris depth adopt the minimum debris depth, per AS 5100.2.",
    "Scoured pile drag acts over the scour depth, centred half the scour depth below ground.",
    "The load factor is a parameter; the default of 1.3 applies to every force.",
];

pub fn assumptions_text() -> String {
    let mut text = String::new();
    for paragraph in [CALCULATOR_DESCRIPTION, ENGINEERING_ASSUMPTIONS, USAGE_TERMS] {
        text.push_str(paragraph);
        text.push_str("\n\n");
    }
    text.push_str("Technical assumptions:\n");
    for assumption in TECHNICAL_ASSUMPTIONS {
        text.push_str("- ");
        text.push_str(assumption);
        text.push('\n');
    }
    text
}
