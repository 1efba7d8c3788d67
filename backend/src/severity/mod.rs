//! Disease severity scan.
//!
//! Turns a raw disease case table into one prediction-with-confidence record
//! per disease: a one-month-ahead case forecast from the disease's model and
//! a severity label from the classifier.
//!
//! - `table`: CSV loading and monthly aggregation
//! - `registry`: disease-name keyed model lookup with fuzzy matching
//! - `classifier`: severity labels and confidence
//! - `scan`: per-disease analysis and the periodic scanner
//! - `sink`: where records are stored

pub mod classifier;
pub mod registry;
pub mod scan;
pub mod sink;
pub mod table;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use classifier::{
    BandClassifier, Severity, SeverityBand, SeverityClassifier, SeverityFeatures,
};
pub use registry::{normalize_key, ModelRegistry};
pub use scan::{analyze_disease, DiseaseOutcome, ScanReport, SeverityScanner, SkippedDisease};
pub use sink::{JsonLinesSink, LocalSink, RecordSink};
pub use table::DiseaseTable;

/// Forecast and severity for one disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityRecord {
    pub disease: String,
    #[serde(with = "crate::dates::ymd")]
    pub predicted_date: NaiveDate,
    pub predicted_cases: i64,
    pub severity: String,
    pub confidence: f64,
    pub ai_analysis: String,
    /// Set by the sink when the record is stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
