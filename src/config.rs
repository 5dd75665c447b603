use crate::error::{PortfolioAnalyticsError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_REMINDER_WINDOW_DAYS: u32 = 10;
pub const MAX_REMINDER_WINDOW_DAYS: u32 = 366;

/// How a delinquent installment's value feeds the monthly debt totals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
pub enum AccountingMode {
    #[schemars(
        description = "Each delinquency signal adds the value on its own: an installment that was paid late AND is flagged Vencida counts twice toward debt_total and outstanding_debt. Matches the figures the credit services have always reported."
    )]
    #[default]
    LegacyDoubleCountingAccounting,

    #[schemars(
        description = "A delinquent installment adds its value once, whichever signal (late payment, Vencida flag, or both) marks it."
    )]
    StrictDelinquencyAccounting,
}

impl AccountingMode {
    /// Amount an installment contributes to a month's debt total.
    pub fn debt_contribution(self, paid_late: bool, flagged_overdue: bool, value: f64) -> f64 {
        match self {
            AccountingMode::LegacyDoubleCountingAccounting => {
                let mut total = 0.0;
                if paid_late {
                    total += value;
                }
                if flagged_overdue {
                    total += value;
                }
                total
            }
            AccountingMode::StrictDelinquencyAccounting => {
                if paid_late || flagged_overdue {
                    value
                } else {
                    0.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsConfig {
    #[serde(default)]
    #[schemars(description = "Debt accounting rule for delinquency and recovery reports.")]
    pub accounting: AccountingMode,

    #[serde(default = "default_reminder_window_days")]
    #[schemars(
        description = "Installments due between today and today + this many days (inclusive) receive a reminder. Range 0..=366."
    )]
    pub reminder_window_days: u32,

    #[serde(default = "default_reminder_sender")]
    #[schemars(description = "Sender phone label attached to every reminder batch.")]
    pub reminder_sender: String,

    #[serde(default = "default_reminder_language")]
    #[schemars(description = "Language the messaging provider renders reminders in.")]
    pub reminder_language: String,
}

fn default_reminder_window_days() -> u32 {
    DEFAULT_REMINDER_WINDOW_DAYS
}

fn default_reminder_sender() -> String {
    "default".to_string()
}

fn default_reminder_language() -> String {
    "Spanish (MEX)".to_string()
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            accounting: AccountingMode::default(),
            reminder_window_days: default_reminder_window_days(),
            reminder_sender: default_reminder_sender(),
            reminder_language: default_reminder_language(),
        }
    }
}

impl AnalyticsConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AnalyticsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn with_accounting(mut self, accounting: AccountingMode) -> Self {
        self.accounting = accounting;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.reminder_window_days > MAX_REMINDER_WINDOW_DAYS {
            return Err(PortfolioAnalyticsError::InvalidConfig(format!(
                "reminder_window_days {} exceeds {}",
                self.reminder_window_days, MAX_REMINDER_WINDOW_DAYS
            )));
        }
        if self.reminder_sender.trim().is_empty() {
            return Err(PortfolioAnalyticsError::InvalidConfig(
                "reminder_sender must not be empty".to_string(),
            ));
        }
        if self.reminder_language.trim().is_empty() {
            return Err(PortfolioAnalyticsError::InvalidConfig(
                "reminder_language must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn schema_as_json() -> Result<String> {
        let schema = schemars::schema_for!(AnalyticsConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}
