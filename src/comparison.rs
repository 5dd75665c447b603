//! Month-over-month view restricted to installments flagged Vencida.
//!
//! Unlike the delinquency report this ignores payment dates entirely: only the stored
//! state decides, and changes are measured on counts rather than percentages.

use crate::bucketing::MonthlyBuckets;
use crate::months::Month;
use crate::schema::InstallmentRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverdueMonth {
    pub month: Month,
    pub overdue_value: f64,
    pub overdue_count: usize,
    /// Whole-number percent change in count against the previous month. 0 for Enero
    /// and whenever the previous month had no overdue installments.
    pub change_percent: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increased,
    Decreased,
    Unchanged,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthComparison {
    pub reference_month: Month,
    pub compare_month: Month,
    pub reference_count: usize,
    pub compare_count: usize,
    pub delta_abs: usize,
    pub direction: Direction,
    /// `None` when the reference month has no overdue installments to compare against.
    pub delta_percent: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverdueComparisonReport {
    pub months: Vec<OverdueMonth>,
    pub comparison: MonthComparison,
}

impl OverdueComparisonReport {
    pub fn month(&self, month: Month) -> &OverdueMonth {
        &self.months[month.index()]
    }
}

pub fn compare_overdue(
    records: &[InstallmentRecord],
    reference: Month,
    compare: Month,
) -> OverdueComparisonReport {
    let overdue = MonthlyBuckets::from_filtered(records, InstallmentRecord::is_flagged_overdue);
    let values = overdue.sum_by(|r| r.value);

    let months: Vec<OverdueMonth> = Month::ALL
        .iter()
        .map(|&month| {
            let count = overdue.len(month);
            let change_percent = match month.previous().map(|prev| overdue.len(prev)) {
                Some(prev) if prev > 0 => rounded_change(prev, count),
                _ => 0,
            };
            OverdueMonth {
                month,
                overdue_value: values[month.index()],
                overdue_count: count,
                change_percent,
            }
        })
        .collect();

    let reference_count = overdue.len(reference);
    let compare_count = overdue.len(compare);
    let direction = match compare_count.cmp(&reference_count) {
        std::cmp::Ordering::Greater => Direction::Increased,
        std::cmp::Ordering::Less => Direction::Decreased,
        std::cmp::Ordering::Equal => Direction::Unchanged,
    };
    let delta_percent = if reference_count == 0 {
        None
    } else {
        Some(rounded_change(reference_count, compare_count))
    };

    OverdueComparisonReport {
        months,
        comparison: MonthComparison {
            reference_month: reference,
            compare_month: compare,
            reference_count,
            compare_count,
            delta_abs: reference_count.abs_diff(compare_count),
            direction,
            delta_percent,
        },
    }
}

/// Percent change from `from` to `to`, rounded half to even. `from` must be non-zero.
fn rounded_change(from: usize, to: usize) -> i64 {
    let change = (to as f64 - from as f64) / from as f64 * 100.0;
    change.round_ties_even() as i64
}
