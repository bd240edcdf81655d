//! Soil Parameter Table
//!
//! The twelve chemical parameters accepted by the prediction endpoint, with
//! their inclusive validation ranges. Ranges come from the training dataset
//! plus a buffer for edge cases; `typical_range` is the span actually observed
//! in that dataset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the twelve soil parameters, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SoilParameter {
    N,
    P,
    K,
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "EC")]
    Ec,
    #[serde(rename = "OC")]
    Oc,
    S,
    Zn,
    Fe,
    Cu,
    Mn,
    B,
}

impl SoilParameter {
    /// All parameters in declaration order (N, P, K, pH, EC, OC, S, Zn, Fe, Cu, Mn, B).
    /// Validation scans in this order, so it decides which error surfaces first.
    pub const ALL: [SoilParameter; 12] = [
        SoilParameter::N,
        SoilParameter::P,
        SoilParameter::K,
        SoilParameter::Ph,
        SoilParameter::Ec,
        SoilParameter::Oc,
        SoilParameter::S,
        SoilParameter::Zn,
        SoilParameter::Fe,
        SoilParameter::Cu,
        SoilParameter::Mn,
        SoilParameter::B,
    ];

    /// Wire key used in the JSON payload (e.g. "pH")
    pub fn key(self) -> &'static str {
        self.spec().key
    }

    /// Position in declaration order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Static range/label entry for this parameter
    pub fn spec(self) -> &'static ParameterSpec {
        &PARAMETER_SPECS[self.index()]
    }
}

impl fmt::Display for SoilParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SoilParameter {
    type Err = String;

    /// Parse a wire key. Exact match first, then case-insensitive
    /// ("ph" and "PH" both map to pH since no two keys collide ignoring case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SoilParameter::ALL
            .iter()
            .copied()
            .find(|p| p.key() == s)
            .or_else(|| {
                SoilParameter::ALL
                    .iter()
                    .copied()
                    .find(|p| p.key().eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| format!("Unknown soil parameter: {}", s))
    }
}

/// Nutrient grouping used to lay out the entry form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterGroup {
    /// N, P, K, S
    Macronutrient,
    /// Zn, Fe, Cu, Mn, B
    Micronutrient,
    /// pH, EC, OC
    Physical,
}

impl ParameterGroup {
    pub const ALL: [ParameterGroup; 3] = [
        ParameterGroup::Macronutrient,
        ParameterGroup::Micronutrient,
        ParameterGroup::Physical,
    ];

    /// Section heading text
    pub fn display_text(&self) -> &'static str {
        match self {
            ParameterGroup::Macronutrient => "Macronutrients",
            ParameterGroup::Micronutrient => "Micronutrients",
            ParameterGroup::Physical => "Physical Properties",
        }
    }
}

/// Static description of a single soil parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub parameter: SoilParameter,
    /// Wire key (unique)
    pub key: &'static str,
    /// Human-readable name used in messages
    pub label: &'static str,
    /// Inclusive lower bound
    pub min: f64,
    /// Inclusive upper bound
    pub max: f64,
    /// Display unit; empty for dimensionless pH
    pub unit: &'static str,
    /// Range observed in the training dataset
    pub typical_range: &'static str,
    pub group: ParameterGroup,
    /// Example value shown in an empty form field
    pub placeholder: &'static str,
}

impl ParameterSpec {
    /// Inclusive on both ends
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Label with key suffix, e.g. "Nitrogen (N)"
    pub fn full_label(&self) -> String {
        format!("{} ({})", self.label, self.key)
    }

    /// Position of `value` within [min, max], clamped to [0, 1]
    pub fn fraction_of_range(&self, value: f64) -> f64 {
        let width = (self.max - self.min).max(f64::EPSILON);
        ((value - self.min) / width).clamp(0.0, 1.0)
    }

    /// Hint text under a form field, e.g. "Range: 1 - 500"
    pub fn range_hint(&self) -> String {
        format!("Range: {} - {}", self.min, self.max)
    }
}

macro_rules! spec {
    ($param:ident, $key:literal, $label:literal, $min:literal, $max:literal, $unit:literal, $typical:literal, $group:ident, $placeholder:literal) => {
        ParameterSpec {
            parameter: SoilParameter::$param,
            key: $key,
            label: $label,
            min: $min,
            max: $max,
            unit: $unit,
            typical_range: $typical,
            group: ParameterGroup::$group,
            placeholder: $placeholder,
        }
    };
}

/// The fixed parameter table, indexed by `SoilParameter::index()`
pub static PARAMETER_SPECS: [ParameterSpec; 12] = [
    spec!(N, "N", "Nitrogen", 1.0, 500.0, "mg/kg", "6-383", Macronutrient, "150"),
    spec!(P, "P", "Phosphorus", 0.1, 150.0, "mg/kg", "3-125", Macronutrient, "45"),
    spec!(K, "K", "Potassium", 5.0, 1000.0, "mg/kg", "11-887", Macronutrient, "210"),
    spec!(Ph, "pH", "Soil pH", 0.5, 14.0, "", "0.9-11.2", Physical, "6.5"),
    spec!(Ec, "EC", "EC", 0.05, 3.0, "dS/m", "0.1-0.95", Physical, "0.45"),
    spec!(Oc, "OC", "Organic Carbon", 0.05, 30.0, "%", "0.1-24", Physical, "0.85"),
    spec!(S, "S", "Sulfur", 0.5, 50.0, "mg/kg", "0.6-31", Macronutrient, "12"),
    spec!(Zn, "Zn", "Zinc", 0.05, 50.0, "mg/kg", "0.07-42", Micronutrient, "1.2"),
    spec!(Fe, "Fe", "Iron", 0.1, 50.0, "mg/kg", "0.21-44", Micronutrient, "4.5"),
    spec!(Cu, "Cu", "Copper", 0.05, 5.0, "mg/kg", "0.09-3", Micronutrient, "0.8"),
    spec!(Mn, "Mn", "Manganese", 0.1, 40.0, "mg/kg", "0.11-31", Micronutrient, "2.5"),
    spec!(B, "B", "Boron", 0.05, 5.0, "mg/kg", "0.06-2.8", Micronutrient, "0.5"),
];

/// Parameters belonging to one form section, in declaration order
pub fn parameters_in_group(group: ParameterGroup) -> impl Iterator<Item = &'static ParameterSpec> {
    PARAMETER_SPECS.iter().filter(move |s| s.group == group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_matches_declaration_order() {
        for (i, p) in SoilParameter::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
            assert_eq!(PARAMETER_SPECS[i].parameter, *p);
        }
    }

    #[test]
    fn test_keys_unique_and_ranges_sane() {
        let keys: HashSet<&str> = PARAMETER_SPECS.iter().map(|s| s.key).collect();
        assert_eq!(keys.len(), 12);
        for s in PARAMETER_SPECS.iter() {
            assert!(s.min < s.max, "{} has empty range", s.key);
            assert!(s.contains(s.min) && s.contains(s.max));
        }
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("pH".parse::<SoilParameter>().unwrap(), SoilParameter::Ph);
        assert_eq!("ph".parse::<SoilParameter>().unwrap(), SoilParameter::Ph);
        assert_eq!(" Zn ".parse::<SoilParameter>().unwrap(), SoilParameter::Zn);
        assert!("Ca".parse::<SoilParameter>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_keys() {
        let json = serde_json::to_string(&SoilParameter::Oc).unwrap();
        assert_eq!(json, "\"OC\"");
        let back: SoilParameter = serde_json::from_str("\"pH\"").unwrap();
        assert_eq!(back, SoilParameter::Ph);
    }

    #[test]
    fn test_groups_partition_table() {
        let macro_count = parameters_in_group(ParameterGroup::Macronutrient).count();
        let micro_count = parameters_in_group(ParameterGroup::Micronutrient).count();
        let phys_count = parameters_in_group(ParameterGroup::Physical).count();
        assert_eq!((macro_count, micro_count, phys_count), (4, 5, 3));

        let headings: Vec<&str> = ParameterGroup::ALL.iter().map(|g| g.display_text()).collect();
        assert_eq!(headings, ["Macronutrients", "Micronutrients", "Physical Properties"]);
    }

    #[test]
    fn test_fraction_of_range() {
        let ph = SoilParameter::Ph.spec();
        assert_eq!(ph.fraction_of_range(0.5), 0.0);
        assert_eq!(ph.fraction_of_range(14.0), 1.0);
        assert_eq!(ph.fraction_of_range(100.0), 1.0);
        assert_eq!(ph.range_hint(), "Range: 0.5 - 14");
        assert_eq!(SoilParameter::N.spec().full_label(), "Nitrogen (N)");
    }
}
