use crate::bucketing::MonthlyBuckets;
use crate::config::AccountingMode;
use crate::error::{PortfolioAnalyticsError, Result};
use crate::months::Month;
use crate::schema::InstallmentRecord;
use crate::utils::{mean, percent_of};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const NOTHING_SELECTED_MESSAGE: &str = "No has seleccionado ningún mes";

/// Share of a month's outstanding debt that was recovered through late payments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RecoveryPercent {
    Value(f64),
    /// Something was recovered but the month has no outstanding debt to measure it
    /// against. Serialized as `null`.
    Indeterminate,
}

impl RecoveryPercent {
    pub fn compute(recovered: f64, outstanding: f64) -> Self {
        if recovered == 0.0 {
            RecoveryPercent::Value(0.0)
        } else if outstanding == 0.0 {
            RecoveryPercent::Indeterminate
        } else {
            RecoveryPercent::Value(percent_of(recovered, outstanding))
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, RecoveryPercent::Indeterminate)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RecoveryPercent::Value(v) => Some(*v),
            RecoveryPercent::Indeterminate => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyRecoveryReport {
    pub accounting: AccountingMode,
    pub recovered_amount: [f64; 12],
    pub outstanding_debt: [f64; 12],
    pub recovery_percent: [RecoveryPercent; 12],
}

impl MonthlyRecoveryReport {
    pub fn recovered(&self, month: Month) -> f64 {
        self.recovered_amount[month.index()]
    }

    pub fn outstanding(&self, month: Month) -> f64 {
        self.outstanding_debt[month.index()]
    }

    /// The month's recovery percentage, or `IndeterminatePercentage` when it cannot be
    /// computed.
    pub fn percent(&self, month: Month) -> Result<f64> {
        self.recovery_percent[month.index()]
            .as_f64()
            .ok_or_else(|| PortfolioAnalyticsError::IndeterminatePercentage {
                month: month.to_string(),
                recovered: self.recovered(month),
            })
    }

    pub fn indeterminate_months(&self) -> Vec<Month> {
        Month::ALL
            .iter()
            .copied()
            .filter(|m| self.recovery_percent[m.index()].is_indeterminate())
            .collect()
    }
}

/// Month checkboxes of the average-recovery request. Every flag defaults to false and
/// keys outside the twelve month names are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MonthSelection {
    #[serde(default, rename = "Enero")]
    pub enero: bool,
    #[serde(default, rename = "Febrero")]
    pub febrero: bool,
    #[serde(default, rename = "Marzo")]
    pub marzo: bool,
    #[serde(default, rename = "Abril")]
    pub abril: bool,
    #[serde(default, rename = "Mayo")]
    pub mayo: bool,
    #[serde(default, rename = "Junio")]
    pub junio: bool,
    #[serde(default, rename = "Julio")]
    pub julio: bool,
    #[serde(default, rename = "Agosto")]
    pub agosto: bool,
    #[serde(default, rename = "Septiembre")]
    pub septiembre: bool,
    #[serde(default, rename = "Octubre")]
    pub octubre: bool,
    #[serde(default, rename = "Noviembre")]
    pub noviembre: bool,
    #[serde(default, rename = "Diciembre")]
    pub diciembre: bool,
}

impl MonthSelection {
    fn flags(&self) -> [bool; 12] {
        [
            self.enero,
            self.febrero,
            self.marzo,
            self.abril,
            self.mayo,
            self.junio,
            self.julio,
            self.agosto,
            self.septiembre,
            self.octubre,
            self.noviembre,
            self.diciembre,
        ]
    }

    pub fn from_months(months: &[Month]) -> Self {
        let mut selection = Self::default();
        for month in months {
            let flag = match month {
                Month::Enero => &mut selection.enero,
                Month::Febrero => &mut selection.febrero,
                Month::Marzo => &mut selection.marzo,
                Month::Abril => &mut selection.abril,
                Month::Mayo => &mut selection.mayo,
                Month::Junio => &mut selection.junio,
                Month::Julio => &mut selection.julio,
                Month::Agosto => &mut selection.agosto,
                Month::Septiembre => &mut selection.septiembre,
                Month::Octubre => &mut selection.octubre,
                Month::Noviembre => &mut selection.noviembre,
                Month::Diciembre => &mut selection.diciembre,
            };
            *flag = true;
        }
        selection
    }

    /// Checked months in reporting order.
    pub fn selected(&self) -> Vec<Month> {
        Month::ALL
            .iter()
            .zip(self.flags())
            .filter(|(_, checked)| *checked)
            .map(|(month, _)| *month)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        !self.flags().iter().any(|checked| *checked)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AverageRecoveryReport {
    NothingSelected {
        message: String,
    },
    Average {
        selection: Vec<Month>,
        values: Vec<f64>,
        average_recovery: f64,
    },
}

impl AverageRecoveryReport {
    pub fn nothing_selected() -> Self {
        AverageRecoveryReport::NothingSelected {
            message: NOTHING_SELECTED_MESSAGE.to_string(),
        }
    }

    pub fn average(&self) -> Option<f64> {
        match self {
            AverageRecoveryReport::Average {
                average_recovery, ..
            } => Some(*average_recovery),
            AverageRecoveryReport::NothingSelected { .. } => None,
        }
    }
}

pub struct RecoveryCalculator {
    accounting: AccountingMode,
}

impl RecoveryCalculator {
    pub fn new(accounting: AccountingMode) -> Self {
        Self { accounting }
    }

    pub fn calculate(&self, records: &[InstallmentRecord]) -> MonthlyRecoveryReport {
        self.calculate_from_buckets(&MonthlyBuckets::from_records(records))
    }

    pub fn calculate_from_buckets(&self, buckets: &MonthlyBuckets<'_>) -> MonthlyRecoveryReport {
        let accounting = self.accounting;
        let recovered_amount =
            buckets.sum_by(|r| if r.is_paid_late() { r.value } else { 0.0 });
        let outstanding_debt = buckets.sum_by(|r| {
            accounting.debt_contribution(r.is_paid_late(), r.is_flagged_overdue(), r.value)
        });

        let mut recovery_percent = [RecoveryPercent::Value(0.0); 12];
        for month in Month::ALL {
            let i = month.index();
            recovery_percent[i] = RecoveryPercent::compute(recovered_amount[i], outstanding_debt[i]);
            if recovery_percent[i].is_indeterminate() {
                warn!(
                    "{}: recovered {} with zero outstanding debt, recovery percent is indeterminate",
                    month, recovered_amount[i]
                );
            }
        }

        MonthlyRecoveryReport {
            accounting,
            recovered_amount,
            outstanding_debt,
            recovery_percent,
        }
    }
}

/// Mean recovered amount over `months`, treated as a set: duplicates collapse and the
/// echoed selection follows reporting order.
pub fn average_recovery(report: &MonthlyRecoveryReport, months: &[Month]) -> AverageRecoveryReport {
    let mut selection = months.to_vec();
    selection.sort();
    selection.dedup();

    if selection.is_empty() {
        return AverageRecoveryReport::nothing_selected();
    }

    let values: Vec<f64> = selection.iter().map(|m| report.recovered(*m)).collect();
    let average_recovery = mean(&values);

    AverageRecoveryReport::Average {
        selection,
        values,
        average_recovery,
    }
}

/// Same as [`average_recovery`] for month names. One unknown name rejects the whole
/// request.
pub fn average_recovery_for_names<S: AsRef<str>>(
    report: &MonthlyRecoveryReport,
    names: &[S],
) -> Result<AverageRecoveryReport> {
    Ok(average_recovery(report, &parse_month_names(names)?))
}

/// Parses every name or fails on the first unknown one.
pub fn parse_month_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<Month>> {
    names.iter().map(|name| name.as_ref().parse::<Month>()).collect()
}

pub fn calculate_recovery(
    records: &[InstallmentRecord],
    accounting: AccountingMode,
) -> MonthlyRecoveryReport {
    RecoveryCalculator::new(accounting).calculate(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::InstallmentState;
    use chrono::NaiveDate;

    fn installment(
        id: i64,
        due: (i32, u32, u32),
        value: f64,
        state: InstallmentState,
        paid: Option<(i32, u32, u32)>,
    ) -> InstallmentRecord {
        let date = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        InstallmentRecord {
            id,
            credit_id: 1,
            sequence_number: 1,
            due_date: Some(date(due)),
            value,
            state,
            payment_date: paid.map(date),
        }
    }

    fn report_with_recovered(pairs: &[(Month, f64)]) -> MonthlyRecoveryReport {
        let mut recovered_amount = [0.0; 12];
        for (month, value) in pairs {
            recovered_amount[month.index()] = *value;
        }
        MonthlyRecoveryReport {
            accounting: AccountingMode::default(),
            recovered_amount,
            outstanding_debt: recovered_amount,
            recovery_percent: [RecoveryPercent::Value(0.0); 12],
        }
    }

    #[test]
    fn test_march_late_payment_fully_recovered() {
        let records = vec![installment(
            1,
            (2024, 3, 1),
            300.0,
            InstallmentState::Paid,
            Some((2024, 3, 15)),
        )];
        let report = calculate_recovery(&records, AccountingMode::default());

        assert_eq!(report.recovered(Month::Marzo), 300.0);
        assert_eq!(report.outstanding(Month::Marzo), 300.0);
        assert_eq!(report.percent(Month::Marzo).unwrap(), 100.0);
        assert_eq!(report.percent(Month::Abril).unwrap(), 0.0);
    }

    #[test]
    fn test_partial_recovery_with_overdue_flag() {
        let records = vec![
            installment(1, (2024, 5, 1), 100.0, InstallmentState::Paid, Some((2024, 5, 20))),
            installment(2, (2024, 5, 3), 300.0, InstallmentState::Overdue, None),
            installment(3, (2024, 5, 4), 500.0, InstallmentState::Paid, Some((2024, 5, 4))),
        ];
        let report = calculate_recovery(&records, AccountingMode::default());
        assert_eq!(report.recovered(Month::Mayo), 100.0);
        assert_eq!(report.outstanding(Month::Mayo), 400.0);
        assert_eq!(report.percent(Month::Mayo).unwrap(), 25.0);
    }

    #[test]
    fn test_accounting_modes_differ_on_double_signal() {
        let records = vec![installment(
            1,
            (2024, 7, 1),
            200.0,
            InstallmentState::Overdue,
            Some((2024, 7, 30)),
        )];

        let legacy = calculate_recovery(&records, AccountingMode::LegacyDoubleCountingAccounting);
        assert_eq!(legacy.outstanding(Month::Julio), 400.0);
        assert_eq!(legacy.percent(Month::Julio).unwrap(), 50.0);

        let strict = calculate_recovery(&records, AccountingMode::StrictDelinquencyAccounting);
        assert_eq!(strict.outstanding(Month::Julio), 200.0);
        assert_eq!(strict.percent(Month::Julio).unwrap(), 100.0);
    }

    #[test]
    fn test_indeterminate_percent() {
        assert_eq!(RecoveryPercent::compute(0.0, 0.0), RecoveryPercent::Value(0.0));
        assert_eq!(RecoveryPercent::compute(0.0, 50.0), RecoveryPercent::Value(0.0));
        assert!(RecoveryPercent::compute(10.0, 0.0).is_indeterminate());

        // Unreachable from well-formed rows, so build the month state directly.
        let mut report = report_with_recovered(&[(Month::Agosto, 75.0)]);
        report.outstanding_debt[Month::Agosto.index()] = 0.0;
        report.recovery_percent[Month::Agosto.index()] = RecoveryPercent::compute(75.0, 0.0);

        assert_eq!(report.indeterminate_months(), vec![Month::Agosto]);
        let err = report.percent(Month::Agosto).unwrap_err();
        assert!(matches!(
            err,
            PortfolioAnalyticsError::IndeterminatePercentage { ref month, recovered } if month == "Agosto" && recovered == 75.0
        ));

        let json = serde_json::to_value(report.recovery_percent).unwrap();
        assert!(json[Month::Agosto.index()].is_null());
        assert_eq!(json[0], serde_json::json!(0.0));

        let text = serde_json::to_string(&report).unwrap();
        let restored: MonthlyRecoveryReport = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, report);
        assert!(restored.recovery_percent[Month::Agosto.index()].is_indeterminate());
    }

    #[test]
    fn test_average_of_selected_months() {
        let report = report_with_recovered(&[(Month::Enero, 100.0), (Month::Marzo, 300.0)]);

        let result = average_recovery_for_names(&report, &["Enero", "Marzo"]).unwrap();
        assert_eq!(
            result,
            AverageRecoveryReport::Average {
                selection: vec![Month::Enero, Month::Marzo],
                values: vec![100.0, 300.0],
                average_recovery: 200.0,
            }
        );

        let single = average_recovery(&report, &[Month::Marzo]);
        assert_eq!(single.average(), Some(300.0));

        // Order and duplicates in the request do not change the set.
        let shuffled = average_recovery(&report, &[Month::Marzo, Month::Enero, Month::Marzo]);
        assert_eq!(shuffled, result);
    }

    #[test]
    fn test_empty_selection_is_not_zero_average() {
        let report = report_with_recovered(&[]);

        let empty = average_recovery(&report, &[]);
        assert!(matches!(empty, AverageRecoveryReport::NothingSelected { .. }));
        assert_eq!(empty.average(), None);

        let zero = average_recovery(&report, &[Month::Junio]);
        assert_eq!(zero.average(), Some(0.0));
    }

    #[test]
    fn test_unknown_month_rejects_request() {
        let report = report_with_recovered(&[(Month::Enero, 100.0)]);
        let err = average_recovery_for_names(&report, &["Enero", "Smarch"]).unwrap_err();
        assert!(matches!(err, PortfolioAnalyticsError::InvalidMonth(ref name) if name == "Smarch"));

        assert_eq!(
            parse_month_names(&["Diciembre", "Enero"]).unwrap(),
            vec![Month::Diciembre, Month::Enero]
        );
        assert_eq!(
            average_recovery(&report, &[]),
            AverageRecoveryReport::nothing_selected()
        );
    }

    #[test]
    fn test_month_selection_payload() {
        let selection: MonthSelection =
            serde_json::from_str(r#"{"Marzo": true, "Enero": true, "Mayo": false}"#).unwrap();
        assert_eq!(selection.selected(), vec![Month::Enero, Month::Marzo]);
        assert_eq!(MonthSelection::from_months(&[Month::Marzo, Month::Enero]), selection);

        let none: MonthSelection = serde_json::from_str("{}").unwrap();
        assert!(none.is_empty());

        assert!(serde_json::from_str::<MonthSelection>(r#"{"January": true}"#).is_err());
    }

    #[test]
    fn test_report_serialization_shape() {
        let report = report_with_recovered(&[(Month::Enero, 100.0)]);
        let average = average_recovery(&report, &[Month::Enero]);
        let json = serde_json::to_value(&average).unwrap();
        assert_eq!(json["outcome"], "average");
        assert_eq!(json["selection"], serde_json::json!(["Enero"]));

        let nothing = serde_json::to_value(average_recovery(&report, &[])).unwrap();
        assert_eq!(nothing["outcome"], "nothing_selected");
        assert_eq!(nothing["message"], NOTHING_SELECTED_MESSAGE);
    }
}
