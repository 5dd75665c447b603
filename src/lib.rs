//! # Portfolio Analytics
//!
//! Monthly delinquency, recovery and collection-activity analytics over a loan
//! portfolio: installments, the credits and clients that own them, and the contact
//! attempts managers log while collecting.
//!
//! ## Core Concepts
//!
//! - **Monthly buckets**: installments grouped by the month-of-year of their due date,
//!   always twelve buckets from Enero to Diciembre, years merged
//! - **Delinquency**: an installment paid after its due date or flagged `Vencida`
//! - **Recovery**: value of installments paid late but eventually collected
//! - **Accounting mode**: whether an installment that is both paid late and flagged
//!   `Vencida` adds its value to debt once or twice (see [`AccountingMode`])
//!
//! Every report is recomputed from the store on each call; nothing is cached.
//!
//! ## Example
//!
//! ```rust,ignore
//! use portfolio_analytics::*;
//!
//! let store = SnapshotStore::from_path("portfolio.json")?;
//! let analytics = PortfolioAnalytics::new(store, AnalyticsConfig::default());
//!
//! let delinquency = analytics.installments_by_month()?;
//! for line in &delinquency.summaries {
//!     println!("{}", line);
//! }
//!
//! let selection = MonthSelection::from_months(&[Month::Enero, Month::Marzo]);
//! let average = analytics.average_recovery_for_months(&selection)?;
//! ```

pub mod bucketing;
pub mod comparison;
pub mod config;
pub mod contacts;
pub mod delinquency;
pub mod error;
pub mod months;
pub mod recovery;
pub mod reminders;
pub mod schema;
pub mod store;
pub mod utils;

pub use bucketing::MonthlyBuckets;
pub use comparison::{
    compare_overdue, Direction, MonthComparison, OverdueComparisonReport, OverdueMonth,
};
pub use config::{AccountingMode, AnalyticsConfig};
pub use contacts::{aggregate_contacts, ContactedClient, ManagerContactReport, ManagerContactSummary};
pub use delinquency::{
    calculate_delinquency, DelinquencyCalculator, MonthDelinquency, MonthlyDelinquencyReport,
};
pub use error::{PortfolioAnalyticsError, Result};
pub use months::Month;
pub use recovery::{
    average_recovery, average_recovery_for_names, calculate_recovery, parse_month_names,
    AverageRecoveryReport, MonthSelection, MonthlyRecoveryReport, RecoveryCalculator,
    RecoveryPercent,
};
pub use reminders::{ReminderBatch, ReminderBuilder, ReminderRecipient};
pub use schema::*;
pub use store::{PortfolioStore, SnapshotStore};

use chrono::NaiveDate;
use log::{debug, info};

/// Entry point for every report. Holds a store and the configuration; no other state.
pub struct PortfolioAnalytics<S> {
    store: S,
    config: AnalyticsConfig,
}

impl<S: PortfolioStore> PortfolioAnalytics<S> {
    pub fn new(store: S, config: AnalyticsConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Twelve-month delinquency report: counts, percentages, deltas and the
    /// debt/collected/balance arrays.
    pub fn installments_by_month(&self) -> Result<MonthlyDelinquencyReport> {
        let records = self.store.installments()?;
        info!(
            "Computing monthly delinquency over {} installments ({:?})",
            records.len(),
            self.config.accounting
        );

        let report = DelinquencyCalculator::new(self.config.accounting).calculate(&records);
        debug!("Debt per month: {:?}", report.debt_total);
        debug!("Collected per month: {:?}", report.amount_collected);
        debug!("Balance per month: {:?}", report.balance);
        Ok(report)
    }

    pub fn money_recovery_by_month(&self) -> Result<MonthlyRecoveryReport> {
        let records = self.store.installments()?;
        info!(
            "Computing monthly recovery over {} installments ({:?})",
            records.len(),
            self.config.accounting
        );
        Ok(RecoveryCalculator::new(self.config.accounting).calculate(&records))
    }

    /// Average recovered amount over the checked months. An empty selection returns
    /// [`AverageRecoveryReport::NothingSelected`] without touching the store.
    pub fn average_recovery_for_months(
        &self,
        selection: &MonthSelection,
    ) -> Result<AverageRecoveryReport> {
        let months = selection.selected();
        if months.is_empty() {
            debug!("Average recovery requested with no months selected");
            return Ok(AverageRecoveryReport::nothing_selected());
        }

        let report = self.money_recovery_by_month()?;
        Ok(average_recovery(&report, &months))
    }

    /// Same as [`Self::average_recovery_for_months`] with month names. Names are
    /// validated before the store is read.
    pub fn average_recovery_for_month_names<N: AsRef<str>>(
        &self,
        names: &[N],
    ) -> Result<AverageRecoveryReport> {
        let months = parse_month_names(names)?;
        self.average_recovery_for_months(&MonthSelection::from_months(&months))
    }

    pub fn manager_contact_summary(&self) -> Result<ManagerContactReport> {
        let events = self.store.contact_events()?;
        info!("Aggregating {} contact events by manager", events.len());
        Ok(aggregate_contacts(&events))
    }

    /// Reminder batch for installments due within the configured window from `today`.
    pub fn upcoming_reminders(&self, today: NaiveDate) -> Result<ReminderBatch> {
        self.config.validate()?;
        let due = self.store.due_installments()?;
        let batch = ReminderBuilder::new(&self.config).build(today, &due)?;
        info!(
            "{} reminder(s) for installments due {} + {} days",
            batch.recipients.len(),
            today,
            self.config.reminder_window_days
        );
        Ok(batch)
    }

    pub fn overdue_comparison(
        &self,
        reference: Month,
        compare: Month,
    ) -> Result<OverdueComparisonReport> {
        let records = self.store.installments()?;
        info!(
            "Comparing Vencida installments: {} against {}",
            compare, reference
        );
        Ok(compare_overdue(&records, reference, compare))
    }
}
