use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
pub enum InstallmentState {
    #[serde(rename = "Pagada", alias = "Paid")]
    #[schemars(description = "The installment has been settled.")]
    Paid,

    #[serde(rename = "Pendiente", alias = "Pending")]
    #[schemars(description = "Not yet due or awaiting payment.")]
    Pending,

    #[serde(rename = "Promesa de pago", alias = "PromiseToPay")]
    #[schemars(description = "The client committed to a payment date during a collection contact.")]
    PromiseToPay,

    #[serde(rename = "Vencida", alias = "Overdue")]
    #[schemars(
        description = "Flagged overdue by the credit services. Stored independently of the payment date, so it may disagree with a date comparison."
    )]
    Overdue,
}

/// One scheduled payment obligation within a credit, as read from the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct InstallmentRecord {
    pub id: i64,
    pub credit_id: i64,

    #[schemars(description = "Position of the installment within its credit, starting at 1.")]
    pub sequence_number: u32,

    #[serde(default)]
    #[schemars(description = "Due date in YYYY-MM-DD format. Records without one are left out of every monthly bucket.")]
    pub due_date: Option<NaiveDate>,

    #[schemars(description = "Monetary value of the installment.")]
    pub value: f64,

    pub state: InstallmentState,

    #[serde(default)]
    #[schemars(description = "Settlement date in YYYY-MM-DD format, present only once paid.")]
    pub payment_date: Option<NaiveDate>,
}

impl InstallmentRecord {
    /// Settled strictly after the due date.
    pub fn is_paid_late(&self) -> bool {
        match (self.payment_date, self.due_date) {
            (Some(paid), Some(due)) => paid > due,
            _ => false,
        }
    }

    pub fn is_flagged_overdue(&self) -> bool {
        self.state == InstallmentState::Overdue
    }

    /// Either delinquency signal holds. A record satisfying both is still one event.
    pub fn is_delinquent(&self) -> bool {
        self.is_paid_late() || self.is_flagged_overdue()
    }
}

/// One collection attempt, already joined to its manager and to the client that owns
/// the contacted installment's credit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ContactEvent {
    pub id: i64,
    pub installment_id: i64,
    pub manager_id: i64,
    pub manager_name: String,
    pub client_id: i64,
    pub client_name: String,
}

/// An installment joined to the client who owes it, used for payment reminders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct DueInstallment {
    pub installment_id: i64,
    pub client_name: String,
    pub client_phone: String,
    pub value: f64,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Client {
    pub id: i64,
    pub name: String,
    #[schemars(description = "Phone number without the leading '+'; reminders prepend it.")]
    pub phone: String,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Credit {
    pub id: i64,
    pub client_id: i64,
    pub disbursement_amount: f64,
    pub disbursement_date: NaiveDate,
    #[schemars(description = "Reference quoted by the client when paying; unique per credit.")]
    pub payment_reference: i64,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct Manager {
    pub id: i64,
    pub name: String,
}

/// A collection ("portfolio management") activity row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct PortfolioActivity {
    pub id: i64,
    pub installment_id: i64,
    pub manager_id: i64,
    #[schemars(description = "How the client was reached, e.g. 'Llamada' or 'WhatsApp'.")]
    pub contact_method: String,
    #[schemars(description = "Outcome of the contact, e.g. 'Contactado' or 'Promesa de pago'.")]
    pub contact_result: String,
    pub management_date: NaiveDate,
    #[serde(default)]
    pub observation: Option<String>,
    #[serde(default)]
    pub payment_promise_date: Option<NaiveDate>,
}

/// Point-in-time copy of the relational tables the analytics read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PortfolioSnapshot {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub credits: Vec<Credit>,
    #[serde(default)]
    pub installments: Vec<InstallmentRecord>,
    #[serde(default)]
    pub managers: Vec<Manager>,
    #[serde(default)]
    pub activities: Vec<PortfolioActivity>,
}

impl PortfolioSnapshot {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(PortfolioSnapshot)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(due: Option<(i32, u32, u32)>, state: InstallmentState, paid: Option<(i32, u32, u32)>) -> InstallmentRecord {
        let date = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        InstallmentRecord {
            id: 1,
            credit_id: 1,
            sequence_number: 1,
            due_date: due.map(date),
            value: 100.0,
            state,
            payment_date: paid.map(date),
        }
    }

    #[test]
    fn test_delinquency_signals() {
        let on_time = record(Some((2024, 1, 10)), InstallmentState::Paid, Some((2024, 1, 10)));
        assert!(!on_time.is_paid_late());
        assert!(!on_time.is_delinquent());

        let late = record(Some((2024, 1, 10)), InstallmentState::Paid, Some((2024, 1, 11)));
        assert!(late.is_paid_late());
        assert!(late.is_delinquent());

        let flagged = record(Some((2024, 1, 10)), InstallmentState::Overdue, None);
        assert!(!flagged.is_paid_late());
        assert!(flagged.is_flagged_overdue());
        assert!(flagged.is_delinquent());

        let no_due = record(None, InstallmentState::Paid, Some((2024, 1, 11)));
        assert!(!no_due.is_paid_late());
    }

    #[test]
    fn test_state_wire_names() {
        let json = r#"{"id":7,"credit_id":2,"sequence_number":3,"due_date":"2024-05-01","value":250.0,"state":"Promesa de pago"}"#;
        let parsed: InstallmentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.state, InstallmentState::PromiseToPay);
        assert_eq!(parsed.payment_date, None);

        let aliased: InstallmentState = serde_json::from_str(r#""Overdue""#).unwrap();
        assert_eq!(aliased, InstallmentState::Overdue);
        assert_eq!(serde_json::to_string(&aliased).unwrap(), r#""Vencida""#);
    }

    #[test]
    fn test_snapshot_schema_generation() {
        let schema_json = PortfolioSnapshot::schema_as_json().unwrap();
        assert!(schema_json.contains("installments"));
        assert!(schema_json.contains("activities"));
        assert!(schema_json.contains("Promesa de pago"));
    }
}
