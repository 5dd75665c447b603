use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioAnalyticsError {
    #[error("Data access failure: {0}")]
    DataAccess(String),

    #[error("Invalid month name '{0}': expected one of Enero..Diciembre")]
    InvalidMonth(String),

    #[error("Recovery percentage for {month} is indeterminate: recovered {recovered} against zero outstanding debt")]
    IndeterminatePercentage { month: String, recovered: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PortfolioAnalyticsError>;
