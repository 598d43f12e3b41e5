//! Day totals judged against a user's dietary goals.
//!
//! Target metrics (calories, protein, carbs, fat) are `within` when the
//! actual value lies inside a ±5% band around the goal. Limit metrics
//! (sugar, sodium) are `within` at or below their ceiling and never `under`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregate::DailyTotals;
use crate::metric::{Metric, MetricKind};
use crate::resolve::{Accessor, parse_numeric};

/// Relative half-width of the `within` band for target metrics.
pub const TARGET_TOLERANCE: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "within")]
    Within,
    #[serde(rename = "over")]
    Over,
    #[serde(rename = "under")]
    Under,
    #[serde(rename = "n/a")]
    NotApplicable,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Within,
        Status::Over,
        Status::Under,
        Status::NotApplicable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Within => "within",
            Status::Over => "over",
            Status::Under => "under",
            Status::NotApplicable => "n/a",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-user daily targets and ceilings. Unset fields disable the comparison
/// for that metric.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DailyGoals {
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub sugar_g_max: Option<f64>,
    pub sodium_mg_max: Option<f64>,
}

impl DailyGoals {
    /// Read the `daily_goals` mapping of a stored goals document. A missing
    /// or non-mapping `daily_goals` leaves every goal unset; non-numeric
    /// values are treated as unset.
    pub fn from_document(doc: &Value) -> Self {
        let goals = Accessor::Key("daily_goals")
            .lookup(doc)
            .filter(|v| v.is_object());
        let field = |m: Metric| {
            goals
                .and_then(|g| Accessor::Key(m.goal_key()).lookup(g))
                .and_then(parse_numeric)
        };
        Self {
            calories: field(Metric::Calories),
            protein_g: field(Metric::ProteinG),
            carbs_g: field(Metric::CarbsG),
            fat_g: field(Metric::FatG),
            sugar_g_max: field(Metric::SugarG),
            sodium_mg_max: field(Metric::SodiumMg),
        }
    }

    /// The target or ceiling for `metric`.
    pub fn goal_for(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Calories => self.calories,
            Metric::ProteinG => self.protein_g,
            Metric::CarbsG => self.carbs_g,
            Metric::FatG => self.fat_g,
            Metric::SugarG => self.sugar_g_max,
            Metric::SodiumMg => self.sodium_mg_max,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MetricComparison {
    pub actual: Option<f64>,
    pub goal: Option<f64>,
    pub delta: Option<f64>,
    pub status: Status,
}

impl MetricComparison {
    fn not_applicable(actual: Option<f64>, goal: Option<f64>) -> Self {
        Self {
            actual,
            goal,
            delta: None,
            status: Status::NotApplicable,
        }
    }
}

/// One day's comparison, keyed in report order.
pub type ComparisonResult = BTreeMap<Metric, MetricComparison>;

/// Judge a target metric. The band is `TARGET_TOLERANCE * goal`, which
/// collapses to zero for a zero goal.
pub fn assess_target(actual: Option<f64>, goal: Option<f64>) -> MetricComparison {
    let (Some(a), Some(g)) = (actual, goal) else {
        return MetricComparison::not_applicable(actual, goal);
    };
    let delta = a - g;
    let tolerance = if g != 0.0 { TARGET_TOLERANCE * g } else { 0.0 };
    let status = if delta.abs() <= tolerance {
        Status::Within
    } else if a > g {
        Status::Over
    } else {
        Status::Under
    };
    MetricComparison {
        actual,
        goal,
        delta: Some(delta),
        status,
    }
}

/// Judge a limit metric against its ceiling.
pub fn assess_limit(actual: Option<f64>, limit: Option<f64>) -> MetricComparison {
    let (Some(a), Some(l)) = (actual, limit) else {
        return MetricComparison::not_applicable(actual, limit);
    };
    MetricComparison {
        actual,
        goal: limit,
        delta: Some(a - l),
        status: if a <= l { Status::Within } else { Status::Over },
    }
}

pub fn compare_day(totals: &DailyTotals, goals: &DailyGoals) -> ComparisonResult {
    Metric::ALL
        .into_iter()
        .map(|m| {
            let actual = Some(totals.get(m));
            let goal = goals.goal_for(m);
            let cmp = match m.kind() {
                MetricKind::Target => assess_target(actual, goal),
                MetricKind::Limit => assess_limit(actual, goal),
            };
            (m, cmp)
        })
        .collect()
}
