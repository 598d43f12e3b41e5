//! Meal history vs. dietary goals.
//!
//! Meal documents of any shape are normalized into [`NormalizedMeal`]s,
//! bucketed per calendar day into [`DailyTotals`] and compared against the
//! user's [`DailyGoals`]. The [`service`] module wires the pipeline to a
//! [`meal_history_client::MealHistoryClient`].

pub mod aggregate;
pub mod cli;
pub mod compare;
pub mod error;
pub mod metric;
pub mod normalize;
pub mod report;
pub mod resolve;
pub mod service;

pub use aggregate::{DailyTotals, aggregate_by_day, report_range};
pub use compare::{ComparisonResult, DailyGoals, MetricComparison, Status, compare_day};
pub use error::{ReportError, ReportResult};
pub use metric::{Metric, MetricKind};
pub use normalize::{NormalizedMeal, normalize, parse_iso_datetime, parse_timestamp};
pub use report::{Report, StatusCounts, render_day, summarize, tally};
pub use resolve::{Accessor, parse_numeric_or_default, resolve_first};
pub use service::{ComparisonService, MealSelection};
