//! Disease case table loading and monthly aggregation.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;

use super::registry::normalize_key;
use crate::dates::parse_date;
use crate::error::{CrewError, CrewResult, ErrorContext};
use crate::forecast::cadence::month_start;
use crate::forecast::{Cadence, Observation, Series};

/// Candidate case-count columns, in order of preference.
const TARGET_COLUMNS: [&str; 4] = ["reported_cases", "cases", "count", "y"];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// One raw table row. Date and value are `None` when absent or unparsable.
#[derive(Debug, Clone, PartialEq)]
struct Row {
    disease: String,
    key: String,
    ds: Option<NaiveDate>,
    value: Option<f64>,
}

/// How the table encodes dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateColumns {
    YearMonth { year: usize, month: usize },
    Date(usize),
    Missing,
}

/// A disease case table.
///
/// Headers are trimmed and lower-cased. A `disease` column is required;
/// dates come from `year` + `month` or from `date`; the case count is the
/// first of `reported_cases`, `cases`, `count` or `y` that exists.
#[derive(Debug, Clone)]
pub struct DiseaseTable {
    rows: Vec<Row>,
    has_dates: bool,
    target: Option<String>,
}

impl DiseaseTable {
    /// Read a table from a CSV file.
    ///
    /// # Errors
    /// `Input` when the file cannot be read or has no `disease` column.
    pub fn from_path<P: AsRef<Path>>(path: P) -> CrewResult<Self> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| {
                CrewError::input(e.to_string()).with_context(
                    ErrorContext::new("read_disease_table").with_entity_id(path.display()),
                )
            })?;
        Self::from_csv_reader(reader).map_err(|e| e.with_entity_id(path.display()))
    }

    /// Read a table from CSV text.
    pub fn from_csv_str(content: &str) -> CrewResult<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> CrewResult<Self> {
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| CrewError::input(e.to_string()).with_operation("read_disease_table"))?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let disease_idx = column("disease").ok_or_else(|| {
            CrewError::input("missing 'disease' column").with_operation("read_disease_table")
        })?;
        let dates = match (column("year"), column("month"), column("date")) {
            (Some(year), Some(month), _) => DateColumns::YearMonth { year, month },
            (_, _, Some(date)) => DateColumns::Date(date),
            _ => DateColumns::Missing,
        };
        let target_idx = TARGET_COLUMNS.iter().find_map(|name| column(name));

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let disease = record.get(disease_idx).unwrap_or_default().to_string();
            let ds = match dates {
                DateColumns::YearMonth { year, month } => parse_year_month(
                    record.get(year).unwrap_or_default(),
                    record.get(month).unwrap_or_default(),
                ),
                DateColumns::Date(idx) => record.get(idx).and_then(parse_date),
                DateColumns::Missing => None,
            };
            let value = target_idx
                .and_then(|idx| record.get(idx))
                .and_then(|raw| raw.parse::<f64>().ok());
            rows.push(Row {
                key: normalize_key(&disease),
                disease,
                ds,
                value,
            });
        }

        Ok(Self {
            rows,
            has_dates: dates != DateColumns::Missing,
            target: target_idx.map(|idx| headers[idx].clone()),
        })
    }

    /// One name per distinct normalised disease, in order of first
    /// appearance. Each is spelled as in its first row.
    pub fn diseases(&self) -> Vec<String> {
        let mut keys = Vec::<&str>::new();
        let mut names = Vec::new();
        for row in &self.rows {
            if row.key.is_empty() || keys.contains(&row.key.as_str()) {
                continue;
            }
            keys.push(&row.key);
            names.push(row.disease.clone());
        }
        names
    }

    /// Name of the case-count column, if any.
    pub fn target_column(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Monthly case totals for `disease`, dated on month starts, with empty
    /// months between the first and last observation counted as zero.
    ///
    /// Returns `None` when no row matches the normalised name, the table has
    /// no date or case-count column, or a matching row has an unparsable
    /// date or count.
    pub fn monthly_series(&self, disease: &str) -> Option<Series> {
        if !self.has_dates || self.target.is_none() {
            return None;
        }
        let key = normalize_key(disease);
        let mut totals = BTreeMap::<NaiveDate, f64>::new();
        for row in self.rows.iter().filter(|r| r.key == key) {
            let month = month_start(row.ds?);
            *totals.entry(month).or_insert(0.0) += row.value?;
        }
        let (&first, _) = totals.first_key_value()?;
        let (&last, _) = totals.last_key_value()?;

        let mut observations = Vec::with_capacity(totals.len());
        let mut month = first;
        while month <= last {
            observations.push(Observation::new(
                month,
                totals.get(&month).copied().unwrap_or(0.0),
            ));
            month = Cadence::MonthStart.step(month, 1)?;
        }
        Series::new(observations).ok()
    }
}

/// Parse `year` + `month`, where month is an abbreviated or full English
/// name or a number.
fn parse_year_month(year: &str, month: &str) -> Option<NaiveDate> {
    let year: i32 = year.trim().parse().ok()?;
    let month = month.trim().to_lowercase();
    let number = match month.parse::<u32>() {
        Ok(n) => n,
        Err(_) => {
            let position = if month.len() == 3 {
                MONTHS.iter().position(|name| name.starts_with(&month))
            } else {
                MONTHS.iter().position(|name| *name == month)
            };
            position? as u32 + 1
        }
    };
    NaiveDate::from_ymd_opt(year, number, 1)
}
