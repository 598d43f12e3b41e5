use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use meal_goals::{
    ComparisonService, MealSelection, Metric, ReportError, Status, parse_iso_datetime,
};
use meal_history_client::{MealHistoryClient, MealHistoryError, MealQuery};
use serde_json::{Value, json};

#[derive(Default)]
struct InMemoryStore {
    collections: HashMap<String, Vec<Value>>,
    goals: HashMap<String, Value>,
}

impl InMemoryStore {
    fn with_meals(mut self, collection: &str, docs: Value) -> Self {
        let docs = docs.as_array().cloned().unwrap_or_default();
        self.collections.insert(collection.to_string(), docs);
        self
    }

    fn with_goals(mut self, user_id: &str, daily_goals: Value) -> Self {
        self.goals.insert(
            user_id.to_string(),
            json!({"user_id": user_id, "daily_goals": daily_goals}),
        );
        self
    }
}

#[async_trait]
impl MealHistoryClient for InMemoryStore {
    async fn find_meals(&self, query: &MealQuery) -> Result<Vec<Value>, MealHistoryError> {
        let docs = self
            .collections
            .get(&query.collection)
            .cloned()
            .unwrap_or_default();
        Ok(docs
            .into_iter()
            .filter(|d| match &query.user_id {
                Some(id) => d.get(&query.user_field).and_then(Value::as_str) == Some(id),
                None => true,
            })
            .take(query.limit as usize)
            .collect())
    }

    async fn find_goals(
        &self,
        _collection: &str,
        user_id: &str,
    ) -> Result<Option<Value>, MealHistoryError> {
        Ok(self.goals.get(user_id).cloned())
    }

    async fn collection_has_documents(&self, collection: &str) -> Result<bool, MealHistoryError> {
        Ok(self
            .collections
            .get(collection)
            .is_some_and(|docs| !docs.is_empty()))
    }

    async fn has_field(&self, collection: &str, field: &str) -> Result<bool, MealHistoryError> {
        Ok(self
            .collections
            .get(collection)
            .is_some_and(|docs| docs.iter().any(|d| d.get(field).is_some())))
    }
}

fn service(store: InMemoryStore) -> ComparisonService {
    ComparisonService::new(Arc::new(store), "goals")
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
}

#[tokio::test]
async fn compare_buckets_meals_and_judges_each_metric() {
    let store = InMemoryStore::default()
        .with_meals(
            "mealhistories",
            json!([
                {"userId": "alice", "name": "Dinner", "calories": "700", "protein_g": 20, "createdAt": "2025-10-01T19:00:00Z"},
                {"userId": "alice", "name": "Lunch", "calories": 500, "protein": 30, "sugar": 40, "createdAt": "2025-10-01T12:00:00Z"},
                {"userId": "bob", "name": "Snack", "calories": 9000, "createdAt": "2025-10-01T15:00:00Z"}
            ]),
        )
        .with_goals(
            "alice",
            json!({"calories": 1000, "protein_g": 50, "sugar_g_max": 30}),
        );

    let report = service(store)
        .compare("alice", &MealSelection::default())
        .await
        .unwrap();

    assert_eq!(report.collection, "mealhistories");
    assert_eq!((report.start, report.end), (day(1), day(1)));
    assert_eq!(report.days.len(), 1);

    let cmp = &report.days[0].comparison;
    assert_eq!(cmp[&Metric::Calories].actual, Some(1200.0));
    assert_eq!(cmp[&Metric::Calories].status, Status::Over);
    assert_eq!(cmp[&Metric::ProteinG].status, Status::Within);
    assert_eq!(cmp[&Metric::SugarG].delta, Some(10.0));
    assert_eq!(cmp[&Metric::SugarG].status, Status::Over);
    assert_eq!(cmp[&Metric::CarbsG].status, Status::NotApplicable);

    assert_eq!(report.summary[&Metric::Calories].over, 1);
    assert_eq!(report.summary[&Metric::FatG].not_applicable, 1);

    let text = report.render_text();
    assert!(text.starts_with("# 2025-10-01\n- calories    | actual: 1200  goal: 1000"));
    assert!(text.contains("\n\n== Summary across period ==\n"));
}

#[tokio::test]
async fn explicit_range_includes_empty_days() {
    let store = InMemoryStore::default()
        .with_meals(
            "meals",
            json!([
                {"userId": "alice", "calories": 400, "createdAt": "2025-10-02T08:00:00Z"},
                {"userId": "alice", "calories": 300, "createdAt": "2025-09-20T08:00:00Z"}
            ]),
        )
        .with_goals("alice", json!({"calories": 2000}));

    let selection = MealSelection {
        start: parse_iso_datetime("2025-10-01"),
        end: parse_iso_datetime("2025-10-04"),
        ..Default::default()
    };
    let report = service(store).compare("alice", &selection).await.unwrap();

    assert_eq!(report.collection, "meals");
    let dates: Vec<NaiveDate> = report.days.iter().map(|d| d.date).collect();
    assert_eq!(dates, vec![day(1), day(2), day(3), day(4)]);
    assert_eq!(report.days[0].totals.calories, 0.0);
    assert_eq!(report.days[1].totals.calories, 400.0);
    assert_eq!(report.summary[&Metric::Calories].under, 4);
}

#[tokio::test]
async fn no_dated_meals_and_no_bounds_is_not_reportable() {
    let store = InMemoryStore::default()
        .with_meals("meals", json!([{"userId": "alice", "calories": 100}]))
        .with_goals("alice", json!({"calories": 2000}));

    let err = service(store)
        .compare("alice", &MealSelection::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::NoReportableRange));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn missing_goals_document_is_reported() {
    let store = InMemoryStore::default().with_meals(
        "meals",
        json!([{"userId": "carol", "calories": 100, "createdAt": "2025-10-01T08:00:00Z"}]),
    );

    let err = service(store)
        .compare("carol", &MealSelection::default())
        .await
        .unwrap_err();
    match &err {
        ReportError::GoalsNotFound {
            user_id,
            collection,
        } => {
            assert_eq!(user_id, "carol");
            assert_eq!(collection, "goals");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn no_meal_collection_lists_candidates() {
    let err = service(InMemoryStore::default())
        .fetch_meals(&MealSelection {
            collection: Some("diary".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    match &err {
        ReportError::NoMealCollection(tried) => {
            assert!(tried.starts_with("diary, mealhistories"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn fetch_without_user_returns_every_document() {
    let store = InMemoryStore::default().with_meals(
        "meal",
        json!([
            {"userId": "a", "calories": 1},
            {"userId": "b", "calories": 2},
            {"userId": "c", "calories": 3}
        ]),
    );
    let (collection, docs) = service(store)
        .fetch_meals(&MealSelection {
            limit: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(collection, "meal");
    assert_eq!(docs.len(), 2);
}

#[tokio::test]
async fn compact_offset_timestamps_count_toward_the_day() {
    let store = InMemoryStore::default()
        .with_meals(
            "mealhistories",
            json!([
                {"userId": "alice", "calories": 500, "createdAt": "2025-10-01T12:30:00+0530"},
                {"userId": "alice", "calories": 700, "createdAt": "2025-10-01T18:00:00Z"}
            ]),
        )
        .with_goals("alice", json!({"calories": 1200}));

    let report = service(store)
        .compare("alice", &MealSelection::default())
        .await
        .unwrap();

    assert_eq!(report.days.len(), 1);
    let calories = report.days[0].comparison[&Metric::Calories];
    assert_eq!(calories.actual, Some(1200.0));
    assert_eq!(calories.status, Status::Within);
}

#[tokio::test]
async fn empty_explicit_collection_falls_back_to_configured_one() {
    let store = InMemoryStore::default()
        .with_meals("diary", json!([]))
        .with_meals("food_log", json!([{"userId": "a", "calories": 1}]))
        .with_meals("meals", json!([{"userId": "a", "calories": 2}]));

    let (collection, docs) = service(store)
        .fetch_meals(&MealSelection {
            collection: Some("diary".into()),
            fallback_collection: Some("food_log".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(collection, "food_log");
    assert_eq!(docs[0]["calories"], 1);
}
