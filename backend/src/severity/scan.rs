//! Per-disease analysis and the periodic severity scanner.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use serde::Serialize;
use tracing::{error, info, warn};

use super::{DiseaseTable, RecordSink, Severity, SeverityFeatures, SeverityRecord};
use crate::context::ModelContext;
use crate::error::{CrewError, CrewResult};
use crate::forecast::{is_valid_forecast, Cadence};

/// Result of analysing one disease.
#[derive(Debug, Clone, PartialEq)]
pub enum DiseaseOutcome {
    Record(SeverityRecord),
    /// The disease was found but could not be analysed; carries the reason.
    Skipped(String),
}

/// Forecast next month's cases for `disease` and classify their severity.
///
/// Returns `None` when the table has no usable rows for the disease.
pub fn analyze_disease(
    disease: &str,
    table: &DiseaseTable,
    context: &ModelContext,
) -> Option<DiseaseOutcome> {
    let series = table.monthly_series(disease)?;

    let Some((key, model)) = context.registry().lookup(disease) else {
        return Some(DiseaseOutcome::Skipped(format!("No AI model for {}", disease)));
    };

    let next = match model.forecast(&series, 1, Cadence::MonthStart) {
        Ok(points) if is_valid_forecast(&points, 1) => points[0].clone(),
        Ok(_) => return Some(DiseaseOutcome::Skipped("Forecast math failed".to_string())),
        Err(e) => {
            warn!(disease, model_key = key, error = %e, "Disease forecast failed");
            return Some(DiseaseOutcome::Skipped("Forecast math failed".to_string()));
        }
    };
    let predicted_cases = next.yhat.trunc() as i64;
    let predicted_date = next.ds;

    let features = SeverityFeatures::from_last_value(series.last().y, predicted_date.month());
    let severity = context.classifier().classify(&features).unwrap_or_else(|e| {
        warn!(disease, error = %e, "Severity classification failed");
        Severity::unknown()
    });
    let confidence = (severity.confidence * 1000.0).round() / 1000.0;

    Some(DiseaseOutcome::Record(SeverityRecord {
        disease: disease.to_string(),
        predicted_date,
        predicted_cases,
        ai_analysis: format!(
            "Forecast: {} cases expected by {}. Risk: {}.",
            predicted_cases,
            predicted_date.format("%Y-%m-%d"),
            severity.label
        ),
        severity: severity.label,
        confidence,
        created_at: None,
    }))
}

/// Summary of one scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Records that were stored.
    pub saved: Vec<SeverityRecord>,
    /// Diseases that could not be analysed, with the reason.
    pub skipped: Vec<SkippedDisease>,
    /// Records analysed but not stored because the sink failed.
    pub failed_saves: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDisease {
    pub disease: String,
    pub reason: String,
}

/// Load the table at `path` and analyse each of its diseases.
fn analyze_table(
    path: &Path,
    context: &ModelContext,
) -> CrewResult<Vec<(String, DiseaseOutcome)>> {
    let table = DiseaseTable::from_path(path)?;
    let diseases = table.diseases();
    info!(
        path = %path.display(),
        diseases = diseases.len(),
        "Starting severity scan"
    );
    Ok(diseases
        .into_iter()
        .filter_map(|disease| {
            analyze_disease(&disease, &table, context).map(|outcome| (disease, outcome))
        })
        .collect())
}

/// Runs the severity analysis over every disease of a case table.
#[derive(Clone)]
pub struct SeverityScanner {
    csv_path: PathBuf,
    context: Arc<ModelContext>,
    sink: Arc<dyn RecordSink>,
}

impl SeverityScanner {
    pub fn new(
        csv_path: impl Into<PathBuf>,
        context: Arc<ModelContext>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            csv_path: csv_path.into(),
            context,
            sink,
        }
    }

    pub fn sink(&self) -> &Arc<dyn RecordSink> {
        &self.sink
    }

    /// Analyse every distinct disease of the table and store the records.
    ///
    /// # Errors
    /// `Input` when the table cannot be read. Per-disease failures and sink
    /// failures are logged and reported in the [`ScanReport`].
    pub async fn run_scan(&self) -> CrewResult<ScanReport> {
        // Table parsing and model fitting stay off the runtime workers; only
        // the sink writes run here.
        let outcomes = tokio::task::spawn_blocking({
            let csv_path = self.csv_path.clone();
            let context = Arc::clone(&self.context);
            move || analyze_table(&csv_path, &context)
        })
        .await
        .map_err(|e| {
            CrewError::model(format!("severity scan task failed: {}", e))
                .with_operation("run_scan")
        })??;

        let mut report = ScanReport::default();
        for (disease, outcome) in outcomes {
            match outcome {
                DiseaseOutcome::Record(record) => {
                    info!(
                        disease = %record.disease,
                        predicted_cases = record.predicted_cases,
                        severity = %record.severity,
                        "Disease analysed"
                    );
                    match self.sink.save(record).await {
                        Ok(saved) => report.saved.push(saved),
                        Err(e) => {
                            error!(disease = %disease, error = %e, "Failed to store severity record");
                            report.failed_saves += 1;
                        }
                    }
                }
                DiseaseOutcome::Skipped(reason) => {
                    warn!(disease = %disease, reason = %reason, "Disease skipped");
                    report.skipped.push(SkippedDisease { disease, reason });
                }
            }
        }

        info!(
            saved = report.saved.len(),
            skipped = report.skipped.len(),
            "Severity scan complete"
        );
        Ok(report)
    }

    /// Run a scan now and then every `interval`, forever.
    ///
    /// A failed scan is logged and the schedule continues.
    pub async fn run_every(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.run_scan().await {
                error!(path = %self.csv_path.display(), error = %e, "Severity scan failed");
            }
        }
    }
}
