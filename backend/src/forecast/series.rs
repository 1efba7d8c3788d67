//! Historical series loading.

use std::path::Path;

use chrono::NaiveDate;

use crate::dates::parse_date;
use crate::error::{CrewError, CrewResult, ErrorContext};

/// One observed period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub ds: NaiveDate,
    pub y: f64,
}

impl Observation {
    pub fn new(ds: NaiveDate, y: f64) -> Self {
        Self { ds, y }
    }
}

/// A non-empty series of observations sorted ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    /// Sort `observations` by date and wrap them.
    ///
    /// # Errors
    /// `Input` when `observations` is empty.
    pub fn new(mut observations: Vec<Observation>) -> CrewResult<Self> {
        if observations.is_empty() {
            return Err(CrewError::input("series has no observations"));
        }
        observations.sort_by_key(|o| o.ds);
        Ok(Self { observations })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.y).collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn last(&self) -> Observation {
        self.observations[self.observations.len() - 1]
    }

    /// The last `n` values (all of them when the series is shorter).
    pub fn tail(&self, n: usize) -> &[Observation] {
        let start = self.observations.len().saturating_sub(n);
        &self.observations[start..]
    }
}

/// Load a `ds`/`y` series from a CSV file.
///
/// Column names are matched case-insensitively; other columns are ignored.
///
/// # Errors
/// `Input` when the file cannot be read, a required column is missing, a
/// row has an unparsable date or value, or there are no rows.
pub fn load_series<P: AsRef<Path>>(path: P) -> CrewResult<Series> {
    let path = path.as_ref();
    let context = || {
        ErrorContext::new("read_series")
            .with_entity("series")
            .with_entity_id(path.display())
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| CrewError::input(e.to_string()).with_context(context()))?;

    let headers = reader
        .headers()
        .map_err(|e| CrewError::input(e.to_string()).with_context(context()))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                CrewError::input(format!("missing '{}' column", name)).with_context(context())
            })
    };
    let ds_idx = column("ds")?;
    let y_idx = column("y")?;

    let mut observations = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| CrewError::input(e.to_string()).with_context(context()))?;
        let line = row + 2;
        let raw_ds = record.get(ds_idx).unwrap_or_default();
        let ds = parse_date(raw_ds).ok_or_else(|| {
            CrewError::input(format!("line {}: invalid date '{}'", line, raw_ds))
                .with_context(context())
        })?;
        let raw_y = record.get(y_idx).unwrap_or_default();
        let y = raw_y
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                CrewError::input(format!("line {}: invalid value '{}'", line, raw_y))
                    .with_context(context())
            })?;
        observations.push(Observation::new(ds, y));
    }

    Series::new(observations).map_err(|e| e.with_context(context()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_sorts_and_ignores_extra_columns() {
        let file = write_csv("ds,y,ward\n2024-01-03,30,A\n2024-01-01,10,A\n2024-01-02 00:00:00,20.5,B\n");
        let series = load_series(file.path()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.values(), vec![10.0, 20.5, 30.0]);
        assert_eq!(series.last().ds, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn test_missing_column_is_input_error() {
        let file = write_csv("date,value\n2024-01-01,1\n");
        let err = load_series(file.path()).unwrap_err();
        assert!(err.is_input());
        assert!(err.to_string().contains("missing 'ds' column"));
    }

    #[test]
    fn test_bad_value_reports_line() {
        let file = write_csv("ds,y\n2024-01-01,1\n2024-01-02,lots\n");
        let err = load_series(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_empty_and_missing_files() {
        let file = write_csv("ds,y\n");
        assert!(load_series(file.path()).unwrap_err().is_input());
        assert!(load_series("/nonexistent/series.csv").unwrap_err().is_input());
    }

    #[test]
    fn test_tail_shorter_than_window() {
        let obs = (1..=3)
            .map(|d| Observation::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap(), d as f64))
            .collect();
        let series = Series::new(obs).unwrap();
        assert_eq!(series.tail(7).len(), 3);
        assert_eq!(series.tail(2)[0].y, 2.0);
    }
}
