//! `MealHistoryClient` trait and a reqwest-based client for a MongoDB Data API endpoint.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use thiserror::Error;

pub mod collections;
pub mod config;
pub mod http_client;
pub mod query;
pub mod retry;

#[derive(Debug, Error)]
pub enum MealHistoryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl MealHistoryError {
    pub fn from_status(status: u16, body: String) -> Self {
        Self::Status { status, body }
    }

    /// Connection failures, timeouts, throttling and server-side errors.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Parameters for one meal-history lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct MealQuery {
    pub collection: String,
    pub user_id: Option<String>,
    pub user_field: String,
    pub created_field: String,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub limit: u32,
}

impl MealQuery {
    pub const DEFAULT_LIMIT: u32 = 1000;

    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            user_id: None,
            user_field: "userId".into(),
            created_field: "createdAt".into(),
            start: None,
            end: None,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    /// The store-side filter document for this query.
    pub fn filter(&self) -> Value {
        query::build_filter(self)
    }
}

#[async_trait]
pub trait MealHistoryClient: Send + Sync + 'static {
    /// Fetch meal documents matching the query, most recent first.
    async fn find_meals(&self, query: &MealQuery) -> Result<Vec<Value>, MealHistoryError>;

    /// Look up the goals document stored for `user_id`.
    async fn find_goals(
        &self,
        collection: &str,
        user_id: &str,
    ) -> Result<Option<Value>, MealHistoryError>;

    /// Whether the collection holds at least one document.
    async fn collection_has_documents(&self, collection: &str) -> Result<bool, MealHistoryError>;

    /// Whether any document in the collection carries `field`.
    async fn has_field(&self, collection: &str, field: &str) -> Result<bool, MealHistoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_cover_throttling_and_server_faults() {
        assert!(MealHistoryError::from_status(503, "down".into()).is_transient());
        assert!(MealHistoryError::from_status(429, "slow down".into()).is_transient());
        assert!(!MealHistoryError::from_status(418, "teapot".into()).is_transient());
        assert!(!MealHistoryError::NotFound("x".into()).is_transient());
    }

    #[test]
    fn meal_query_defaults_match_fetcher_conventions() {
        let q = MealQuery::new("mealhistories");
        assert_eq!(q.user_field, "userId");
        assert_eq!(q.created_field, "createdAt");
        assert_eq!(q.limit, 1000);
        assert_eq!(q.filter(), serde_json::json!({}));
    }
}
