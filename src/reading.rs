//! Soil Readings
//!
//! `RawReading` holds what the user typed, one string per parameter.
//! `ValidatedReading` holds checked numeric values and is only produced by
//! `validation::validate`.

use crate::parameters::{parameters_in_group, ParameterGroup, SoilParameter};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// Form input for one reading. Fields may be empty or absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReading {
    fields: BTreeMap<SoilParameter, String>,
}

/// Errors building a `RawReading` from `KEY=VALUE` text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadingError {
    #[error("Expected KEY=VALUE, got '{0}'")]
    MalformedPair(String),

    #[error("Unknown soil parameter: {0}")]
    UnknownParameter(String),
}

impl RawReading {
    /// Fresh form with every field present and empty
    pub fn new() -> Self {
        let fields = SoilParameter::ALL
            .iter()
            .map(|p| (*p, String::new()))
            .collect();
        Self { fields }
    }

    /// Sample values offered by the form's "Sample Data" button
    pub fn sample() -> Self {
        let mut reading = Self::new();
        for param in SoilParameter::ALL {
            reading.set(param, param.spec().placeholder);
        }
        reading
    }

    /// Build from `KEY=VALUE` pairs (e.g. CLI arguments).
    /// Keys not mentioned stay empty; a repeated key keeps the last value.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ReadingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut reading = Self::new();
        reading.apply_pairs(pairs)?;
        Ok(reading)
    }

    /// Overwrite fields from `KEY=VALUE` pairs. `KEY=` clears that field.
    /// If any pair is rejected the reading is left untouched.
    pub fn apply_pairs<I, S>(&mut self, pairs: I) -> Result<(), ReadingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut updates = Vec::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| ReadingError::MalformedPair(pair.to_string()))?;
            let param: SoilParameter = key
                .parse()
                .map_err(|_| ReadingError::UnknownParameter(key.trim().to_string()))?;
            updates.push((param, value.to_string()));
        }
        for (param, value) in updates {
            self.set(param, value);
        }
        Ok(())
    }

    /// Update one field as the user types
    pub fn set(&mut self, param: SoilParameter, value: impl Into<String>) {
        self.fields.insert(param, value.into());
    }

    /// Drop a field entirely (absent is treated like empty by validation)
    pub fn remove(&mut self, param: SoilParameter) -> Option<String> {
        self.fields.remove(&param)
    }

    pub fn get(&self, param: SoilParameter) -> Option<&str> {
        self.fields.get(&param).map(|s| s.as_str())
    }

    /// Reset every field to empty
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Twelve finite values, each within its parameter's inclusive range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedReading {
    values: [f64; 12],
}

impl ValidatedReading {
    /// Only `validate` calls this, after range-checking every value
    pub(crate) fn from_checked(values: [f64; 12]) -> Self {
        Self { values }
    }

    pub fn get(&self, param: SoilParameter) -> f64 {
        self.values[param.index()]
    }

    /// (parameter, value) pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (SoilParameter, f64)> + '_ {
        SoilParameter::ALL.iter().map(move |p| (*p, self.values[p.index()]))
    }

    /// JSON body for the prediction endpoint: exactly the twelve numeric keys
    pub fn to_payload(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(p, v)| (p.key().to_string(), serde_json::json!(v)))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Plain-text listing under the entry form's section headings
    pub fn grouped_text(&self) -> String {
        let mut sections = Vec::with_capacity(ParameterGroup::ALL.len());
        for group in ParameterGroup::ALL {
            let mut section = group.display_text().to_string();
            for spec in parameters_in_group(group) {
                let line = format!("  {}: {} {}", spec.full_label(), self.get(spec.parameter), spec.unit);
                section.push('\n');
                section.push_str(line.trim_end());
            }
            sections.push(section);
        }
        sections.join("\n\n")
    }
}

impl Serialize for ValidatedReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (param, value) in self.iter() {
            map.serialize_entry(param.key(), &value)?;
        }
        map.end()
    }
}
