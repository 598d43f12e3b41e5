//! Runs the meal-vs-goals pipeline against a [`MealHistoryClient`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use meal_history_client::collections::{candidate_collections, pick_meal_collection};
use meal_history_client::{MealHistoryClient, MealQuery};
use serde_json::Value;

use crate::aggregate::aggregate_by_day;
use crate::compare::{DailyGoals, compare_day};
use crate::error::{ReportError, ReportResult};
use crate::normalize::{NormalizedMeal, normalize};
use crate::report::{DayReport, Report, tally};

/// Which meals to fetch and how to read them.
#[derive(Clone, Debug)]
pub struct MealSelection {
    /// Explicitly requested meal collection, probed first.
    pub collection: Option<String>,
    /// Configured meal collection, probed after the explicit one.
    pub fallback_collection: Option<String>,
    pub user_id: Option<String>,
    pub user_field: String,
    pub created_field: String,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub limit: u32,
}

impl Default for MealSelection {
    fn default() -> Self {
        Self {
            collection: None,
            fallback_collection: None,
            user_id: None,
            user_field: "userId".into(),
            created_field: "createdAt".into(),
            start: None,
            end: None,
            limit: MealQuery::DEFAULT_LIMIT,
        }
    }
}

#[derive(Clone)]
pub struct ComparisonService {
    client: Arc<dyn MealHistoryClient>,
    goals_collection: String,
}

impl ComparisonService {
    pub fn new(client: Arc<dyn MealHistoryClient>, goals_collection: impl Into<String>) -> Self {
        Self {
            client,
            goals_collection: goals_collection.into(),
        }
    }

    async fn resolve_collection(&self, selection: &MealSelection) -> ReportResult<String> {
        let preferred: Vec<&str> = [&selection.collection, &selection.fallback_collection]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        pick_meal_collection(self.client.as_ref(), &preferred)
            .await?
            .ok_or_else(|| ReportError::NoMealCollection(candidate_collections(&preferred).join(", ")))
    }

    /// Raw meal documents, most recent first.
    pub async fn fetch_meals(&self, selection: &MealSelection) -> ReportResult<(String, Vec<Value>)> {
        let collection = self.resolve_collection(selection).await?;
        let query = MealQuery {
            collection: collection.clone(),
            user_id: selection.user_id.clone(),
            user_field: selection.user_field.clone(),
            created_field: selection.created_field.clone(),
            start: selection.start,
            end: selection.end,
            limit: selection.limit,
        };
        let docs = self.client.find_meals(&query).await?;
        tracing::info!(collection = %collection, count = docs.len(), "fetched meal history");
        Ok((collection, docs))
    }

    pub async fn load_goals(&self, user_id: &str) -> ReportResult<DailyGoals> {
        let doc = self
            .client
            .find_goals(&self.goals_collection, user_id)
            .await?
            .ok_or_else(|| ReportError::GoalsNotFound {
                user_id: user_id.to_string(),
                collection: self.goals_collection.clone(),
            })?;
        Ok(DailyGoals::from_document(&doc))
    }

    /// Fetch, normalize, bucket and compare one user's meals.
    pub async fn compare(&self, user_id: &str, selection: &MealSelection) -> ReportResult<Report> {
        let mut selection = selection.clone();
        selection.user_id = Some(user_id.to_string());

        let (collection, docs) = self.fetch_meals(&selection).await?;
        let meals: Vec<NormalizedMeal> = docs
            .into_iter()
            .map(|doc| normalize(doc, &selection.created_field))
            .collect();
        let undated = meals.iter().filter(|m| m.timestamp.is_none()).count();
        if undated > 0 {
            tracing::debug!(undated, "meals without a usable timestamp are excluded");
        }

        let by_day = aggregate_by_day(
            &meals,
            selection.start.map(|s| s.date_naive()),
            selection.end.map(|e| e.date_naive()),
        )?;
        let goals = self.load_goals(user_id).await?;

        let comparisons: BTreeMap<_, _> = by_day
            .iter()
            .map(|(date, totals)| (*date, compare_day(totals, &goals)))
            .collect();
        let summary = tally(&comparisons);

        let (start, end) = match (by_day.keys().next(), by_day.keys().next_back()) {
            (Some(s), Some(e)) => (*s, *e),
            _ => return Err(ReportError::NoReportableRange),
        };
        let days = by_day
            .into_iter()
            .zip(comparisons)
            .map(|((date, totals), (_, comparison))| DayReport {
                date,
                totals,
                comparison,
            })
            .collect();

        Ok(Report {
            user_id: user_id.to_string(),
            collection,
            start,
            end,
            goals,
            days,
            summary,
        })
    }
}
