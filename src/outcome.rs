//! Prediction Outcomes
//!
//! Every submission attempt ends in exactly one `PredictionOutcome`:
//! a classification, a refusal from the service, or no usable response.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Reason used when the service declines without saying why
pub const FALLBACK_FAILURE_REASON: &str = "Unknown error occurred during analysis.";

/// Timestamp layout emitted by the prediction service
const SERVICE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of one submission attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PredictionOutcome {
    /// The service classified the reading
    Success(PredictionResult),

    /// The service responded but declined to classify
    DomainFailure { reason: String },

    /// No usable response was obtained
    TransportFailure {
        kind: TransportFailureKind,
        message: String,
    },
}

impl PredictionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PredictionOutcome::Success(_))
    }

    /// Alert heading for the non-success cases
    pub fn title(&self) -> &'static str {
        match self {
            PredictionOutcome::Success(_) => "Analysis Complete",
            PredictionOutcome::DomainFailure { .. } => "Analysis Failed",
            PredictionOutcome::TransportFailure { .. } => "Connection Error",
        }
    }

    /// Text to show the user. Domain failures are surfaced verbatim,
    /// transport failures get a generic connectivity message.
    pub fn user_message(&self) -> String {
        match self {
            PredictionOutcome::Success(result) => format!(
                "{} (confidence {})",
                result.fertility_class, result.confidence_score
            ),
            PredictionOutcome::DomainFailure { reason } => reason.clone(),
            PredictionOutcome::TransportFailure { kind, .. } => match kind {
                TransportFailureKind::Timeout => {
                    "Request timed out. Server is taking too long.".to_string()
                }
                TransportFailureKind::ConnectionError | TransportFailureKind::Other => {
                    "Could not connect to server. Ensure the prediction service is running."
                        .to_string()
                }
            },
        }
    }
}

/// Why no usable response arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportFailureKind {
    /// The deadline expired before a full response arrived
    Timeout,
    /// Connection refused, DNS failure, unreachable network
    ConnectionError,
    /// Anything else (non-2xx status, broken body stream)
    Other,
}

impl fmt::Display for TransportFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TransportFailureKind::Timeout => "timeout",
            TransportFailureKind::ConnectionError => "connection error",
            TransportFailureKind::Other => "transport error",
        };
        f.write_str(text)
    }
}

/// A successful classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// e.g. "Highly Fertile", "High Fertility"
    pub fertility_class: String,
    /// Model certainty; the service may send a 0-1 fraction or a 0-100 percentage
    pub confidence_score: f64,
    /// Opaque service timestamp
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendation: Recommendation,
    /// Numeric class index, when the service includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<i64>,
}

impl PredictionResult {
    /// Parse the timestamp as RFC 3339 or the service's "YYYY-MM-DD HH:MM:SS"
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        let ts = self.timestamp.trim();
        DateTime::parse_from_rfc3339(ts)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(ts, SERVICE_TIMESTAMP_FORMAT))
            .ok()
    }
}

/// Agronomic advice attached to a classification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered actions, possibly empty
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<String>,
}

/// Explicit `null` reads the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Classify a 2xx response body.
///
/// Truthy `success` → parse the result fields; otherwise (or when the body
/// is not JSON) → `DomainFailure` with the service's `error` text.
pub fn classify_response(body: &[u8]) -> PredictionOutcome {
    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => {
            return PredictionOutcome::DomainFailure {
                reason: FALLBACK_FAILURE_REASON.to_string(),
            }
        }
    };

    if value.get("success").map(is_truthy).unwrap_or(false) {
        match serde_json::from_value::<PredictionResult>(value) {
            Ok(result) => PredictionOutcome::Success(result),
            Err(e) => PredictionOutcome::DomainFailure {
                reason: format!("Malformed prediction response: {}", e),
            },
        }
    } else {
        let reason = value
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(FALLBACK_FAILURE_REASON);
        PredictionOutcome::DomainFailure {
            reason: reason.to_string(),
        }
    }
}

/// JavaScript-style truthiness for the `success` flag
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(value: Value) -> PredictionOutcome {
        classify_response(value.to_string().as_bytes())
    }

    #[test]
    fn test_success_response() {
        let outcome = classify(json!({
            "success": true,
            "fertility_class": "High Fertility",
            "confidence_score": 95,
            "timestamp": "2024-01-01T00:00:00Z",
            "recommendation": { "actions": ["Apply balanced NPK"] }
        }));

        let expected = PredictionResult {
            fertility_class: "High Fertility".to_string(),
            confidence_score: 95.0,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            recommendation: Recommendation {
                title: None,
                description: None,
                actions: vec!["Apply balanced NPK".to_string()],
            },
            prediction: None,
        };
        assert_eq!(outcome, PredictionOutcome::Success(expected));
    }

    #[test]
    fn test_success_with_full_service_payload() {
        let outcome = classify(json!({
            "success": true,
            "prediction": 2,
            "fertility_class": "Highly Fertile",
            "confidence_score": 0.85,
            "timestamp": "2024-05-01 10:30:00",
            "input_data": { "N": 150.0 },
            "recommendation": {
                "title": "Soil Preservation Plan",
                "description": "Your soil is highly fertile.",
                "actions": ["Practice precision nutrient management", "Use nutrient budgeting"]
            }
        }));

        let PredictionOutcome::Success(result) = outcome else {
            panic!("expected success");
        };
        assert_eq!(result.prediction, Some(2));
        assert_eq!(result.recommendation.actions.len(), 2);
        assert_eq!(result.recommendation.title.as_deref(), Some("Soil Preservation Plan"));
        assert!(result.parsed_timestamp().is_some());
    }

    #[test]
    fn test_missing_actions_default_to_empty() {
        let outcome = classify(json!({
            "success": true,
            "fertility_class": "Fertile",
            "confidence_score": 70,
            "timestamp": "2024-01-01T00:00:00Z"
        }));
        let PredictionOutcome::Success(result) = outcome else {
            panic!("expected success");
        };
        assert!(result.recommendation.actions.is_empty());
    }

    #[test]
    fn test_null_recommendation_reads_as_empty() {
        let outcome = classify(json!({
            "success": true,
            "fertility_class": "Fertile",
            "confidence_score": 0.7,
            "timestamp": "2024-01-01 09:00:00",
            "recommendation": null
        }));
        let PredictionOutcome::Success(result) = outcome else {
            panic!("expected success");
        };
        assert_eq!(result.recommendation, Recommendation::default());
    }

    #[test]
    fn test_null_actions_read_as_empty() {
        let outcome = classify(json!({
            "success": true,
            "fertility_class": "Less Fertile",
            "confidence_score": 0.7,
            "timestamp": "2024-01-01 09:00:00",
            "recommendation": { "title": "Soil Improvement Plan", "actions": null }
        }));
        let PredictionOutcome::Success(result) = outcome else {
            panic!("expected success");
        };
        assert!(result.recommendation.actions.is_empty());
        assert_eq!(result.recommendation.title.as_deref(), Some("Soil Improvement Plan"));
    }

    #[test]
    fn test_domain_failure_uses_error_field() {
        let outcome = classify(json!({ "success": false, "error": "model unavailable" }));
        assert_eq!(
            outcome,
            PredictionOutcome::DomainFailure { reason: "model unavailable".to_string() }
        );
        assert_eq!(outcome.title(), "Analysis Failed");
        assert_eq!(outcome.user_message(), "model unavailable");
    }

    #[test]
    fn test_domain_failure_fallback() {
        for body in [json!({ "success": false }), json!({}), json!({ "success": 0, "error": 5 })] {
            assert_eq!(
                classify(body),
                PredictionOutcome::DomainFailure { reason: FALLBACK_FAILURE_REASON.to_string() }
            );
        }
        assert_eq!(
            classify_response(b"<html>502</html>"),
            PredictionOutcome::DomainFailure { reason: FALLBACK_FAILURE_REASON.to_string() }
        );
    }

    #[test]
    fn test_success_missing_fields_is_domain_failure() {
        let outcome = classify(json!({ "success": true, "fertility_class": "Fertile" }));
        match outcome {
            PredictionOutcome::DomainFailure { reason } => {
                assert!(reason.starts_with("Malformed prediction response"), "{}", reason)
            }
            other => panic!("expected domain failure, got {:?}", other),
        }
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn test_transport_messages() {
        let timeout = PredictionOutcome::TransportFailure {
            kind: TransportFailureKind::Timeout,
            message: "deadline elapsed".to_string(),
        };
        assert_eq!(timeout.title(), "Connection Error");
        assert!(timeout.user_message().contains("timed out"));

        let refused = PredictionOutcome::TransportFailure {
            kind: TransportFailureKind::ConnectionError,
            message: "connection refused".to_string(),
        };
        assert!(refused.user_message().starts_with("Could not connect"));
    }

    #[test]
    fn test_parsed_timestamp_formats() {
        let mut result = PredictionResult {
            fertility_class: "Fertile".to_string(),
            confidence_score: 0.7,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            recommendation: Recommendation::default(),
            prediction: Some(1),
        };
        let rfc = result.parsed_timestamp().unwrap();
        assert_eq!(rfc.to_string(), "2024-01-01 00:00:00");

        result.timestamp = "2024-03-15 08:45:10".to_string();
        assert_eq!(result.parsed_timestamp().unwrap().to_string(), "2024-03-15 08:45:10");

        result.timestamp = "yesterday".to_string();
        assert!(result.parsed_timestamp().is_none());
    }
}
