//! Date stepping for forecast periods.

use chrono::{Datelike, Days, Months, NaiveDate};

/// Spacing between consecutive periods of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// One observation per day.
    Daily,
    /// One observation per month, dated on the first of the month.
    MonthStart,
}

impl Cadence {
    /// Number of periods in one seasonal cycle.
    pub fn season_length(&self) -> usize {
        match self {
            Cadence::Daily => 7,
            Cadence::MonthStart => 12,
        }
    }

    /// Position of `date` within the seasonal cycle: weekday for daily
    /// series (Monday = 0), month for monthly ones (January = 0).
    pub fn slot(&self, date: NaiveDate) -> usize {
        match self {
            Cadence::Daily => date.weekday().num_days_from_monday() as usize,
            Cadence::MonthStart => date.month0() as usize,
        }
    }

    /// The date `steps` periods after `date`.
    pub fn step(&self, date: NaiveDate, steps: u32) -> Option<NaiveDate> {
        match self {
            Cadence::Daily => date.checked_add_days(Days::new(u64::from(steps))),
            Cadence::MonthStart => date
                .with_day(1)
                .and_then(|first| first.checked_add_months(Months::new(steps))),
        }
    }

    /// The `horizon` dates immediately following `last`.
    pub fn future_dates(&self, last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
        (1..=horizon as u32)
            .map_while(|step| self.step(last, step))
            .collect()
    }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_future_dates_cross_month_end() {
        let dates = Cadence::Daily.future_dates(ymd(2024, 2, 27), 5);
        assert_eq!(
            dates,
            vec![
                ymd(2024, 2, 28),
                ymd(2024, 2, 29),
                ymd(2024, 3, 1),
                ymd(2024, 3, 2),
                ymd(2024, 3, 3)
            ]
        );
    }

    #[test]
    fn test_month_start_steps_from_mid_month() {
        assert_eq!(
            Cadence::MonthStart.step(ymd(2023, 12, 15), 1),
            Some(ymd(2024, 1, 1))
        );
        assert_eq!(
            Cadence::MonthStart.future_dates(ymd(2024, 11, 1), 2),
            vec![ymd(2024, 12, 1), ymd(2025, 1, 1)]
        );
    }

    #[test]
    fn test_slots() {
        // 2024-01-01 is a Monday.
        assert_eq!(Cadence::Daily.slot(ymd(2024, 1, 1)), 0);
        assert_eq!(Cadence::Daily.slot(ymd(2024, 1, 7)), 6);
        assert_eq!(Cadence::MonthStart.slot(ymd(2024, 12, 1)), 11);
    }
}
