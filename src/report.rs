//! Result Report
//!
//! Data a renderer needs after a successful prediction: status level,
//! nutrient table, bar/radar chart series and a plain-text share summary.
//! Drawing is left to the caller.

use crate::outcome::PredictionResult;
use crate::parameters::SoilParameter;
use crate::reading::ValidatedReading;
use serde::Serialize;

/// Parameters plotted on the result bar chart
pub const BAR_CHART_PARAMETERS: [SoilParameter; 6] = [
    SoilParameter::N,
    SoilParameter::P,
    SoilParameter::K,
    SoilParameter::Ph,
    SoilParameter::Oc,
    SoilParameter::S,
];

/// Coarse fertility level derived from the class label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FertilityLevel {
    High,
    Moderate,
    Low,
}

impl FertilityLevel {
    /// Map a class label to a level.
    ///
    /// Handles both label sets in use: "High/Moderate/Low Fertility" and
    /// "Highly Fertile/Fertile/Less Fertile". Unknown labels count as Low.
    pub fn from_class(class: &str) -> Self {
        let class = class.trim().to_ascii_lowercase();
        if class.starts_with("high") {
            FertilityLevel::High
        } else if class.starts_with("moderate") || class == "fertile" {
            FertilityLevel::Moderate
        } else {
            FertilityLevel::Low
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            FertilityLevel::High => "High",
            FertilityLevel::Moderate => "Moderate",
            FertilityLevel::Low => "Low",
        }
    }
}

/// One row of the nutrient table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientRow {
    pub parameter: SoilParameter,
    pub label: String,
    pub value: f64,
    pub unit: &'static str,
}

/// One point in a chart series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: &'static str,
    pub value: f64,
}

/// View over a successful result and the reading that produced it
#[derive(Debug, Clone)]
pub struct ResultReport<'a> {
    result: &'a PredictionResult,
    reading: &'a ValidatedReading,
}

impl<'a> ResultReport<'a> {
    pub fn new(result: &'a PredictionResult, reading: &'a ValidatedReading) -> Self {
        Self { result, reading }
    }

    pub fn fertility_level(&self) -> FertilityLevel {
        FertilityLevel::from_class(&self.result.fertility_class)
    }

    /// Confidence on a 0-100 scale.
    ///
    /// Scores up to and including 1.0 are read as fractions, anything above
    /// as a percentage already, so 1.0 means 100% and a literal 1% score is
    /// not representable. Results are clamped to [0, 100].
    pub fn confidence_percent(&self) -> f64 {
        let score = self.result.confidence_score;
        let percent = if score <= 1.0 { score * 100.0 } else { score };
        percent.clamp(0.0, 100.0)
    }

    /// All twelve parameters with labels and units, in declaration order
    pub fn nutrient_table(&self) -> Vec<NutrientRow> {
        self.reading
            .iter()
            .map(|(param, value)| {
                let spec = param.spec();
                NutrientRow {
                    parameter: param,
                    label: spec.full_label(),
                    value,
                    unit: spec.unit,
                }
            })
            .collect()
    }

    /// Raw values of the six bar-chart parameters
    pub fn bar_series(&self) -> Vec<ChartPoint> {
        BAR_CHART_PARAMETERS
            .iter()
            .map(|p| ChartPoint {
                label: p.key(),
                value: self.reading.get(*p),
            })
            .collect()
    }

    /// All twelve parameters scaled into [0, 1] over their ranges,
    /// so nutrients with very different magnitudes share one radar axis
    pub fn radar_series(&self) -> Vec<ChartPoint> {
        self.reading
            .iter()
            .map(|(p, v)| ChartPoint {
                label: p.key(),
                value: p.spec().fraction_of_range(v),
            })
            .collect()
    }

    /// Multi-line summary for sharing
    pub fn share_text(&self) -> String {
        let mut text = format!(
            "Soil Fertility Analysis Result: {}\nConfidence: {}%\nDate: {}\n\nRecommendations:\n",
            self.result.fertility_class,
            format_percent(self.confidence_percent()),
            self.result.timestamp
        );
        text.push_str(&self.result.recommendation.actions.join("\n"));
        text
    }
}

fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Recommendation;
    use crate::reading::RawReading;
    use crate::validation::validate;
    use approx::assert_relative_eq;

    fn result(class: &str, confidence: f64) -> PredictionResult {
        PredictionResult {
            fertility_class: class.to_string(),
            confidence_score: confidence,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            recommendation: Recommendation {
                title: None,
                description: None,
                actions: vec!["Apply balanced NPK".to_string(), "Add compost".to_string()],
            },
            prediction: None,
        }
    }

    #[test]
    fn test_fertility_levels() {
        assert_eq!(FertilityLevel::from_class("High Fertility"), FertilityLevel::High);
        assert_eq!(FertilityLevel::from_class("Highly Fertile"), FertilityLevel::High);
        assert_eq!(FertilityLevel::from_class("Moderate Fertility"), FertilityLevel::Moderate);
        assert_eq!(FertilityLevel::from_class("Fertile"), FertilityLevel::Moderate);
        assert_eq!(FertilityLevel::from_class("Less Fertile"), FertilityLevel::Low);
        assert_eq!(FertilityLevel::from_class("???"), FertilityLevel::Low);

        let r = result("Highly Fertile", 0.85);
        let reading = validate(&RawReading::sample()).unwrap();
        assert_eq!(ResultReport::new(&r, &reading).fertility_level().display_text(), "High");
        assert_eq!(FertilityLevel::Moderate.display_text(), "Moderate");
    }

    #[test]
    fn test_confidence_percent() {
        let reading = validate(&RawReading::sample()).unwrap();
        let fraction = result("Fertile", 0.85);
        let percent = result("Fertile", 95.0);
        assert_relative_eq!(ResultReport::new(&fraction, &reading).confidence_percent(), 85.0);
        assert_relative_eq!(ResultReport::new(&percent, &reading).confidence_percent(), 95.0);
    }

    #[test]
    fn test_confidence_percent_cutoff() {
        let reading = validate(&RawReading::sample()).unwrap();
        let percent = |score: f64| ResultReport::new(&result("Fertile", score), &reading).confidence_percent();
        assert_relative_eq!(percent(1.0), 100.0);
        assert_relative_eq!(percent(1.5), 1.5);
        assert_relative_eq!(percent(0.0), 0.0);
        assert_relative_eq!(percent(250.0), 100.0);
        assert_relative_eq!(percent(-0.2), 0.0);
    }

    #[test]
    fn test_table_and_series() {
        let reading = validate(&RawReading::sample()).unwrap();
        let r = result("High Fertility", 95.0);
        let report = ResultReport::new(&r, &reading);

        let table = report.nutrient_table();
        assert_eq!(table.len(), 12);
        assert_eq!(table[0].label, "Nitrogen (N)");
        assert_eq!(table[0].unit, "mg/kg");
        assert_eq!(table[3].unit, "");

        let bars = report.bar_series();
        let labels: Vec<&str> = bars.iter().map(|p| p.label).collect();
        assert_eq!(labels, ["N", "P", "K", "pH", "OC", "S"]);
        assert_eq!(bars[2].value, 210.0);

        let radar = report.radar_series();
        assert_eq!(radar.len(), 12);
        assert!(radar.iter().all(|p| (0.0..=1.0).contains(&p.value)));
        // pH 6.5 over [0.5, 14]
        assert_relative_eq!(radar[3].value, 6.0 / 13.5, epsilon = 1e-12);
    }

    #[test]
    fn test_share_text() {
        let reading = validate(&RawReading::sample()).unwrap();
        let r = result("High Fertility", 95.0);
        let text = ResultReport::new(&r, &reading).share_text();
        assert_eq!(
            text,
            "Soil Fertility Analysis Result: High Fertility\nConfidence: 95%\n\
             Date: 2024-01-01T00:00:00Z\n\nRecommendations:\nApply balanced NPK\nAdd compost"
        );
    }
}
