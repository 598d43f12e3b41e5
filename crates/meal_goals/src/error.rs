//! Error types for the comparison pipeline.

use meal_history_client::MealHistoryError;
use thiserror::Error;

/// Fatal conditions of a report run. Malformed meal data is never an error;
/// it degrades to defaults during normalization.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("document store error: {0}")]
    Client(#[from] MealHistoryError),

    #[error("no meal-history collection found (probed: {0}); set MEAL_COLLECTION to the correct collection name")]
    NoMealCollection(String),

    #[error("no timestamps found in meals and no explicit start/end provided")]
    NoReportableRange,

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("no goals found for user_id={user_id:?} in {collection}")]
    GoalsNotFound { user_id: String, collection: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReportError {
    /// Process exit code the CLI reports for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReportError::Client(MealHistoryError::Config(_)) => 5,
            ReportError::Client(_) | ReportError::Serialization(_) => 1,
            ReportError::NoMealCollection(_) => 2,
            ReportError::NoReportableRange => 3,
            ReportError::GoalsNotFound { .. } => 4,
            ReportError::InvalidRange { .. } => 5,
        }
    }
}

/// Result type alias for report operations.
pub type ReportResult<T> = Result<T, ReportError>;
