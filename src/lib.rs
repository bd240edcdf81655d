//! Soil Fertility Client
//!
//! Validates twelve-parameter soil chemistry readings and submits them to a
//! remote fertility prediction endpoint.
//!
//! Pipeline: collect → validate → serialize → transmit → classify outcome.
//! - `parameters`: Immutable parameter table (keys, labels, inclusive ranges)
//! - `reading`: Raw form strings and validated numeric readings
//! - `validation`: Range validation with first-failure-wins semantics
//! - `outcome`: Three-way prediction outcome and response classification
//! - `client`: HTTP submission with a bounded deadline (feature `client`)
//! - `config`: Endpoint/timeout configuration from the environment
//! - `report`: Table and chart data for rendering a successful result

pub mod parameters;
pub mod reading;
pub mod validation;
pub mod outcome;
pub mod config;
pub mod report;

#[cfg(feature = "client")]
pub mod client;

// Re-export commonly used types
pub use parameters::{ParameterGroup, ParameterSpec, SoilParameter, PARAMETER_SPECS};
pub use reading::{RawReading, ReadingError, ValidatedReading};
pub use validation::{field_status, validate, FieldStatus, ValidationError};
pub use outcome::{
    classify_response, PredictionOutcome, PredictionResult, Recommendation, TransportFailureKind,
};
pub use config::ClientConfig;
pub use report::{ChartPoint, FertilityLevel, NutrientRow, ResultReport};

#[cfg(feature = "client")]
pub use client::{submit, ClientError, HealthStatus, SoilClient};
