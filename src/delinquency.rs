use crate::bucketing::MonthlyBuckets;
use crate::config::AccountingMode;
use crate::months::Month;
use crate::schema::{InstallmentRecord, InstallmentState};
use crate::utils::{format_percent, percent_of};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthDelinquency {
    pub month: Month,
    pub total_count: usize,
    /// Installments paid late or flagged Vencida, each counted once.
    pub overdue_count: usize,
    pub delinquency_percent: f64,
    /// Difference in percentage points against the previous month; 0 for Enero.
    pub month_over_month_delta: f64,
    pub debt_total: f64,
    pub amount_collected: f64,
    pub balance: f64,
}

impl MonthDelinquency {
    pub fn summary(&self) -> String {
        format!(
            "Total de cuotas en {}: {}, Numero de cuotas Vencidas: {}, Porcentaje Morosidad: {}%, comparacion con el mes anterior: {}",
            self.month,
            self.total_count,
            self.overdue_count,
            format_percent(self.delinquency_percent),
            format_percent(self.month_over_month_delta),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyDelinquencyReport {
    pub accounting: AccountingMode,
    pub months: Vec<MonthDelinquency>,
    /// One human-readable line per month, Enero first.
    pub summaries: Vec<String>,
    pub debt_total: [f64; 12],
    pub amount_collected: [f64; 12],
    pub balance: [f64; 12],
    /// Every bucketed installment grouped by month, Enero first.
    pub installments: Vec<(Month, Vec<InstallmentRecord>)>,
}

impl MonthlyDelinquencyReport {
    pub fn month(&self, month: Month) -> &MonthDelinquency {
        &self.months[month.index()]
    }
}

pub struct DelinquencyCalculator {
    accounting: AccountingMode,
}

impl DelinquencyCalculator {
    pub fn new(accounting: AccountingMode) -> Self {
        Self { accounting }
    }

    pub fn calculate(&self, records: &[InstallmentRecord]) -> MonthlyDelinquencyReport {
        let all = MonthlyBuckets::from_records(records);
        let delinquent = MonthlyBuckets::from_filtered(records, InstallmentRecord::is_delinquent);
        self.calculate_from_buckets(&all, &delinquent)
    }

    pub fn calculate_from_buckets(
        &self,
        all: &MonthlyBuckets<'_>,
        delinquent: &MonthlyBuckets<'_>,
    ) -> MonthlyDelinquencyReport {
        let percents: Vec<f64> = Month::ALL
            .iter()
            .map(|&month| delinquency_percent(all.len(month), delinquent.len(month)))
            .collect();

        let accounting = self.accounting;
        let debt_total = all.sum_by(|r| {
            accounting.debt_contribution(r.is_paid_late(), r.is_flagged_overdue(), r.value)
        });
        let amount_collected = all.sum_by(|r| {
            if r.state == InstallmentState::Paid {
                r.value
            } else {
                0.0
            }
        });

        let mut balance = [0.0; 12];
        let mut months = Vec::with_capacity(12);
        for month in Month::ALL {
            let i = month.index();
            balance[i] = amount_collected[i] - debt_total[i];

            let month_over_month_delta = match month.previous() {
                Some(prev) => percents[i] - percents[prev.index()],
                None => 0.0,
            };

            months.push(MonthDelinquency {
                month,
                total_count: all.len(month),
                overdue_count: delinquent.len(month),
                delinquency_percent: percents[i],
                month_over_month_delta,
                debt_total: debt_total[i],
                amount_collected: amount_collected[i],
                balance: balance[i],
            });
        }

        let summaries = months.iter().map(MonthDelinquency::summary).collect();

        MonthlyDelinquencyReport {
            accounting,
            months,
            summaries,
            debt_total,
            amount_collected,
            balance,
            installments: all.to_named_lists(),
        }
    }
}

pub fn delinquency_percent(total_count: usize, overdue_count: usize) -> f64 {
    if total_count == 0 || overdue_count == 0 {
        0.0
    } else {
        percent_of(overdue_count as f64, total_count as f64)
    }
}

pub fn calculate_delinquency(
    records: &[InstallmentRecord],
    accounting: AccountingMode,
) -> MonthlyDelinquencyReport {
    DelinquencyCalculator::new(accounting).calculate(records)
}
