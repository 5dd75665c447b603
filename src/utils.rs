use crate::error::{PortfolioAnalyticsError, Result};
use chrono::{Days, NaiveDate};

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Last day (inclusive) of a reminder window opening on `start`.
pub fn window_end(start: NaiveDate, days: u32) -> Result<NaiveDate> {
    start
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| {
            PortfolioAnalyticsError::DateError(format!(
                "Window of {} days starting {} overflows the calendar",
                days, start
            ))
        })
}

pub fn percent_of(part: f64, whole: f64) -> f64 {
    part / whole * 100.0
}

/// Percentage text used in human-readable summaries: two decimals, no sign padding.
pub fn format_percent(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    // -0.00 reads badly in a month summary
    if rounded == "-0.00" {
        "0.00".to_string()
    } else {
        rounded
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
