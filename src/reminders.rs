use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::schema::DueInstallment;
use crate::utils::{format_date, window_end};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderRecipient {
    /// Client phone in international form, `+` prefixed.
    pub to: String,
    pub name: String,
    pub amount: f64,
    pub date: String,
}

/// Payload handed to the messaging provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderBatch {
    pub phone_number: String,
    pub language: String,
    pub recipients: Vec<ReminderRecipient>,
}

pub struct ReminderBuilder<'a> {
    config: &'a AnalyticsConfig,
}

impl<'a> ReminderBuilder<'a> {
    pub fn new(config: &'a AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Recipients for every installment due between `today` and
    /// `today + reminder_window_days`, both ends included, in store order.
    pub fn build(&self, today: NaiveDate, due: &[DueInstallment]) -> Result<ReminderBatch> {
        let last_day = window_end(today, self.config.reminder_window_days)?;

        let recipients = due
            .iter()
            .filter_map(|row| {
                let due_date = row.due_date?;
                if due_date < today || due_date > last_day {
                    return None;
                }
                Some(ReminderRecipient {
                    to: international_phone(&row.client_phone),
                    name: row.client_name.clone(),
                    amount: row.value,
                    date: format_date(due_date),
                })
            })
            .collect();

        Ok(ReminderBatch {
            phone_number: self.config.reminder_sender.clone(),
            language: self.config.reminder_language.clone(),
            recipients,
        })
    }
}

fn international_phone(phone: &str) -> String {
    format!("+{}", phone.trim().trim_start_matches('+'))
}
