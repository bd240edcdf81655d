//! Reading Validation
//!
//! Scans the twelve parameters in declaration order and stops at the first
//! failure: an empty field, a value that is not a finite number, or a value
//! outside the parameter's inclusive range.

use crate::parameters::{ParameterSpec, SoilParameter};
use crate::reading::{RawReading, ValidatedReading};
use thiserror::Error;

/// Why a reading was rejected before submission.
///
/// `Display` gives the alert body; `title()` the alert heading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please enter a value for {}", .key.spec().label)]
    Missing { key: SoilParameter },

    #[error("{} must be a number, got '{raw}'", .key.spec().label)]
    Parse { key: SoilParameter, raw: String },

    #[error("{} must be between {min} and {max}.", .key.spec().label)]
    OutOfRange {
        key: SoilParameter,
        min: f64,
        max: f64,
        actual: f64,
    },
}

impl ValidationError {
    /// Parameter that failed
    pub fn key(&self) -> SoilParameter {
        match self {
            ValidationError::Missing { key }
            | ValidationError::Parse { key, .. }
            | ValidationError::OutOfRange { key, .. } => *key,
        }
    }

    /// Alert heading
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::Missing { .. } => "Missing Info",
            ValidationError::Parse { .. } | ValidationError::OutOfRange { .. } => "Invalid Value",
        }
    }

    /// Longer explanation including unit and dataset range,
    /// e.g. "Nitrogen value 600 mg/kg is unrealistic. ..."
    pub fn detail(&self) -> String {
        match self {
            ValidationError::OutOfRange { key, min, max, actual } => {
                let spec = key.spec();
                let unit = unit_suffix(spec);
                format!(
                    "{} value {}{} is unrealistic. Please enter a value between {} and {}{}. \
                     Typical range in dataset: {}{}.",
                    spec.label, actual, unit, min, max, unit, spec.typical_range, unit
                )
            }
            other => other.to_string(),
        }
    }
}

fn unit_suffix(spec: &ParameterSpec) -> String {
    if spec.unit.is_empty() {
        String::new()
    } else {
        format!(" {}", spec.unit)
    }
}

/// Validate a raw reading. Pure: no I/O, no hidden state.
pub fn validate(raw: &RawReading) -> Result<ValidatedReading, ValidationError> {
    let mut values = [0.0_f64; 12];

    for param in SoilParameter::ALL {
        let spec = param.spec();
        let text = raw.get(param).map(str::trim).unwrap_or("");

        if text.is_empty() {
            return Err(ValidationError::Missing { key: param });
        }

        let value = parse_number(text).ok_or_else(|| ValidationError::Parse {
            key: param,
            raw: text.to_string(),
        })?;

        if !spec.contains(value) {
            return Err(ValidationError::OutOfRange {
                key: param,
                min: spec.min,
                max: spec.max,
                actual: value,
            });
        }

        values[param.index()] = value;
    }

    Ok(ValidatedReading::from_checked(values))
}

/// Finite f64 or nothing ("NaN", "inf" are rejected)
fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Live status of a single form field, independent of the other fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldStatus {
    /// Nothing entered yet
    Empty,
    /// Parsed and within range
    Valid(f64),
    /// Not a finite number
    Unparseable,
    /// Parsed but outside [min, max]
    OutOfRange(f64),
}

impl FieldStatus {
    /// Whether the form should highlight this field as an error
    pub fn is_error(&self) -> bool {
        matches!(self, FieldStatus::Unparseable | FieldStatus::OutOfRange(_))
    }
}

/// Per-field check used to highlight inputs while the user types
pub fn field_status(raw: &RawReading, param: SoilParameter) -> FieldStatus {
    let text = raw.get(param).map(str::trim).unwrap_or("");
    if text.is_empty() {
        return FieldStatus::Empty;
    }
    match parse_number(text) {
        None => FieldStatus::Unparseable,
        Some(v) if param.spec().contains(v) => FieldStatus::Valid(v),
        Some(v) => FieldStatus::OutOfRange(v),
    }
}
