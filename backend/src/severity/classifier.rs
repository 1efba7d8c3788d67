//! Severity classification from recent case counts.

use serde::{Deserialize, Serialize};

use crate::error::{CrewError, CrewResult, ErrorContext};

/// Inputs of a severity classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityFeatures {
    pub lag_1: f64,
    pub lag_2: f64,
    pub lag_3: f64,
    pub roll_mean_3: f64,
    pub roll_std_3: f64,
    /// Calendar month of the forecast period, 1-12.
    pub month_num: u32,
}

impl SeverityFeatures {
    /// Features for a single known month: every lag and the rolling mean
    /// are `last`, the rolling spread is zero.
    pub fn from_last_value(last: f64, month_num: u32) -> Self {
        Self {
            lag_1: last,
            lag_2: last,
            lag_3: last,
            roll_mean_3: last,
            roll_std_3: 0.0,
            month_num,
        }
    }
}

/// A severity label with the classifier's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Severity {
    pub label: String,
    pub confidence: f64,
}

impl Severity {
    /// Label used when classification fails.
    pub fn unknown() -> Self {
        Self {
            label: "Unknown".to_string(),
            confidence: 0.0,
        }
    }
}

/// Maps features to a severity label.
pub trait SeverityClassifier: Send + Sync {
    fn classify(&self, features: &SeverityFeatures) -> CrewResult<Severity>;
}

/// Lower edge of a severity band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityBand {
    pub label: String,
    pub min_cases: f64,
}

impl SeverityBand {
    pub fn new(label: impl Into<String>, min_cases: f64) -> Self {
        Self {
            label: label.into(),
            min_cases,
        }
    }
}

/// Low < 100 <= Moderate < 500 <= High < 1000 <= Severe.
pub fn default_bands() -> Vec<SeverityBand> {
    vec![
        SeverityBand::new("Low", 0.0),
        SeverityBand::new("Moderate", 100.0),
        SeverityBand::new("High", 500.0),
        SeverityBand::new("Severe", 1000.0),
    ]
}

/// Check that `bands` is non-empty, labelled, finite and strictly ascending.
pub fn validate_bands(bands: &[SeverityBand]) -> CrewResult<()> {
    let fail = |message: String| {
        Err(CrewError::configuration(message).with_context(ErrorContext::new("validate_bands")))
    };
    if bands.is_empty() {
        return fail("at least one severity band is required".to_string());
    }
    for band in bands {
        if band.label.trim().is_empty() {
            return fail("severity band labels must not be empty".to_string());
        }
        if !band.min_cases.is_finite() {
            return fail(format!("band '{}' has a non-finite lower edge", band.label));
        }
    }
    if let Some(pair) = bands.windows(2).find(|w| w[1].min_cases <= w[0].min_cases) {
        return fail(format!(
            "band '{}' must start above band '{}'",
            pair[1].label, pair[0].label
        ));
    }
    Ok(())
}

/// Classifies the rolling mean into ascending case-count bands.
///
/// Confidence is 0.5 on a band edge and grows to 1.0 towards the middle of
/// the band. The lowest band is open below and the highest open above; for
/// those, distance is measured from their single edge, scaled by the width
/// of the neighbouring band.
#[derive(Debug, Clone)]
pub struct BandClassifier {
    bands: Vec<SeverityBand>,
}

impl BandClassifier {
    pub fn new(bands: Vec<SeverityBand>) -> CrewResult<Self> {
        validate_bands(&bands)?;
        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[SeverityBand] {
        &self.bands
    }
}

impl Default for BandClassifier {
    fn default() -> Self {
        Self {
            bands: default_bands(),
        }
    }
}

impl SeverityClassifier for BandClassifier {
    fn classify(&self, features: &SeverityFeatures) -> CrewResult<Severity> {
        let value = features.roll_mean_3;
        if !value.is_finite() {
            return Err(CrewError::model("non-finite case count")
                .with_context(ErrorContext::new("classify").with_entity("severity")));
        }

        let index = self
            .bands
            .iter()
            .rposition(|band| value >= band.min_cases)
            .unwrap_or(0);
        let band = &self.bands[index];
        let lower = (index > 0).then(|| band.min_cases);
        let upper = self.bands.get(index + 1).map(|next| next.min_cases);

        let confidence = match (lower, upper) {
            (Some(lo), Some(hi)) => {
                let half = (hi - lo) / 2.0;
                let distance = (value - lo).min(hi - value);
                0.5 + 0.5 * (distance / half)
            }
            (None, Some(hi)) => {
                let scale = self
                    .bands
                    .get(index + 2)
                    .map(|b| b.min_cases - hi)
                    .unwrap_or(hi - band.min_cases)
                    .max(f64::EPSILON);
                0.5 + 0.5 * ((hi - value) / scale)
            }
            (Some(lo), None) => {
                let scale = (lo - self.bands[index - 1].min_cases).max(f64::EPSILON);
                0.5 + 0.5 * ((value - lo) / scale)
            }
            (None, None) => 1.0,
        };

        Ok(Severity {
            label: band.label.clone(),
            confidence: confidence.clamp(0.5, 1.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(value: f64) -> Severity {
        BandClassifier::default()
            .classify(&SeverityFeatures::from_last_value(value, 6))
            .unwrap()
    }

    #[test]
    fn test_default_band_edges() {
        assert_eq!(classify(0.0).label, "Low");
        assert_eq!(classify(99.9).label, "Low");
        assert_eq!(classify(100.0).label, "Moderate");
        assert_eq!(classify(499.0).label, "Moderate");
        assert_eq!(classify(500.0).label, "High");
        assert_eq!(classify(1000.0).label, "Severe");
        assert_eq!(classify(-5.0).label, "Low");
    }

    #[test]
    fn test_confidence_range() {
        assert_eq!(classify(100.0).confidence, 0.5);
        assert_eq!(classify(300.0).confidence, 1.0);
        assert_eq!(classify(1000.0).confidence, 0.5);
        assert_eq!(classify(5000.0).confidence, 1.0);
        for v in [0.0, 42.0, 150.0, 750.0, 1200.0] {
            let c = classify(v).confidence;
            assert!((0.5..=1.0).contains(&c), "confidence {} for {}", c, v);
        }
    }

    #[test]
    fn test_non_finite_is_model_error() {
        let err = BandClassifier::default()
            .classify(&SeverityFeatures::from_last_value(f64::NAN, 1))
            .unwrap_err();
        assert!(matches!(err, CrewError::Model { .. }));
    }

    #[test]
    fn test_validate_bands() {
        assert!(validate_bands(&default_bands()).is_ok());
        assert!(validate_bands(&[]).is_err());
        assert!(validate_bands(&[SeverityBand::new("A", 10.0), SeverityBand::new("B", 10.0)]).is_err());
        assert!(validate_bands(&[SeverityBand::new(" ", 0.0)]).is_err());
        assert!(BandClassifier::new(vec![SeverityBand::new("Only", 0.0)]).is_ok());
    }
}
