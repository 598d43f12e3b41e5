//! HTTP client for a MongoDB Data API–compatible endpoint.
//!
//! This module provides a reqwest-based implementation of the
//! [`MealHistoryClient`](crate::MealHistoryClient) trait. Every operation is a
//! `POST {base}/action/<name>` carrying the data source, database and
//! collection in the JSON body.

use crate::config::Config;
use crate::retry::RetryPolicy;
use crate::{MealHistoryClient, MealHistoryError, MealQuery};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct FindResponse {
    documents: Vec<Value>,
}

#[derive(Deserialize)]
struct FindOneResponse {
    document: Option<Value>,
}

/// Client for the meal store using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestMealHistoryClient {
    base_url: String,
    data_source: String,
    database: String,
    api_key: SecretString,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl ReqwestMealHistoryClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - Data API base URL, up to and excluding `/action`
    /// * `data_source` - Cluster name the Data API exposes
    /// * `database` - Database holding the meal and goals collections
    /// * `api_key` - Data API key sent in the `api-key` header
    pub fn new(
        base_url: &str,
        data_source: impl Into<String>,
        database: impl Into<String>,
        api_key: SecretString,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            data_source: data_source.into(),
            database: database.into(),
            api_key,
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.api_url,
            config.data_source.clone(),
            config.database.clone(),
            config.api_key.clone(),
        )
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn action_body(&self, collection: &str) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("dataSource".into(), json!(self.data_source));
        body.insert("database".into(), json!(self.database));
        body.insert("collection".into(), json!(collection));
        body
    }

    /// Build an authenticated action request.
    fn action_request(&self, action: &str, body: &Map<String, Value>) -> reqwest::RequestBuilder {
        let url = format!("{}/action/{}", self.base_url, action);
        self.client
            .post(url)
            .header("api-key", self.api_key.expose_secret())
            .header(ACCEPT, "application/json")
            .json(body)
    }

    /// Execute an action, retrying transient failures.
    async fn execute_action<T: DeserializeOwned>(
        &self,
        action: &str,
        body: Map<String, Value>,
    ) -> Result<T, MealHistoryError> {
        let body = &body;
        self.retry
            .retry_async(
                move || async move {
                    metrics::counter!("meal_history_client_requests_total", "action" => action.to_string())
                        .increment(1);
                    let resp = self.action_request(action, body).send().await?;
                    self.handle_response(resp).await
                },
                MealHistoryError::is_transient,
            )
            .await
    }

    /// Handle a response, converting status codes to appropriate errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, MealHistoryError> {
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| MealHistoryError::Decode(e.to_string()))
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> MealHistoryError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            404 => MealHistoryError::NotFound(body_snippet),
            401 | 403 => MealHistoryError::Auth(body_snippet),
            400 | 422 => MealHistoryError::InvalidInput(body_snippet),
            _ => MealHistoryError::from_status(status, body_snippet),
        }
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Value,
    ) -> Result<Option<Value>, MealHistoryError> {
        let mut body = self.action_body(collection);
        body.insert("filter".into(), filter);
        let resp: FindOneResponse = self.execute_action("findOne", body).await?;
        Ok(resp.document)
    }
}

#[async_trait]
impl MealHistoryClient for ReqwestMealHistoryClient {
    async fn find_meals(&self, query: &MealQuery) -> Result<Vec<Value>, MealHistoryError> {
        if query.collection.trim().is_empty() {
            return Err(MealHistoryError::InvalidInput(
                "collection must not be empty".into(),
            ));
        }
        let sort_field = if self.has_field(&query.collection, &query.created_field).await? {
            query.created_field.as_str()
        } else {
            "_id"
        };
        let mut sort = Map::new();
        sort.insert(sort_field.to_string(), json!(-1));

        let mut body = self.action_body(&query.collection);
        body.insert("filter".into(), query.filter());
        body.insert("sort".into(), Value::Object(sort));
        body.insert("limit".into(), json!(query.limit));

        let resp: FindResponse = self.execute_action("find", body).await?;
        tracing::debug!(
            collection = %query.collection,
            sort_field,
            count = resp.documents.len(),
            "fetched meal documents"
        );
        Ok(resp.documents)
    }

    async fn find_goals(
        &self,
        collection: &str,
        user_id: &str,
    ) -> Result<Option<Value>, MealHistoryError> {
        self.find_one(collection, json!({ "user_id": user_id })).await
    }

    async fn collection_has_documents(&self, collection: &str) -> Result<bool, MealHistoryError> {
        Ok(self.find_one(collection, json!({})).await?.is_some())
    }

    async fn has_field(&self, collection: &str, field: &str) -> Result<bool, MealHistoryError> {
        let filter = json!({ field: { "$exists": true } });
        Ok(self.find_one(collection, filter).await?.is_some())
    }
}
