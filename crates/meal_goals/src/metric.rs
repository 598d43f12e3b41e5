use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolve::Accessor;

/// The six tracked nutrition metrics, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "calories")]
    Calories,
    #[serde(rename = "protein_g")]
    ProteinG,
    #[serde(rename = "carbs_g")]
    CarbsG,
    #[serde(rename = "fat_g")]
    FatG,
    #[serde(rename = "sugar_g")]
    SugarG,
    #[serde(rename = "sodium_mg")]
    SodiumMg,
}

/// How a metric is judged against its goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    /// A target with a tolerance band on both sides.
    Target,
    /// A ceiling; only exceeding it counts.
    Limit,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Calories,
        Metric::ProteinG,
        Metric::CarbsG,
        Metric::FatG,
        Metric::SugarG,
        Metric::SodiumMg,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Calories => "calories",
            Metric::ProteinG => "protein_g",
            Metric::CarbsG => "carbs_g",
            Metric::FatG => "fat_g",
            Metric::SugarG => "sugar_g",
            Metric::SodiumMg => "sodium_mg",
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            Metric::SugarG | Metric::SodiumMg => MetricKind::Limit,
            _ => MetricKind::Target,
        }
    }

    /// Key of this metric's goal inside a `daily_goals` document.
    pub fn goal_key(self) -> &'static str {
        match self {
            Metric::SugarG => "sugar_g_max",
            Metric::SodiumMg => "sodium_mg_max",
            other => other.name(),
        }
    }

    /// Where a meal document may store this metric, most specific first.
    pub fn aliases(self) -> &'static [Accessor<'static>] {
        match self {
            Metric::Calories => &[
                Accessor::Key("calories"),
                Accessor::Path(&["nutrition", "calories"]),
            ],
            Metric::ProteinG => &[
                Accessor::Key("protein_g"),
                Accessor::Key("protein"),
                Accessor::Path(&["nutrition", "protein_g"]),
            ],
            Metric::CarbsG => &[
                Accessor::Key("carbs_g"),
                Accessor::Key("carbs"),
                Accessor::Key("carbohydrates_g"),
                Accessor::Path(&["nutrition", "carbs_g"]),
            ],
            Metric::FatG => &[
                Accessor::Key("fat_g"),
                Accessor::Key("fat"),
                Accessor::Path(&["nutrition", "fat_g"]),
            ],
            Metric::SugarG => &[
                Accessor::Key("sugar_g"),
                Accessor::Key("sugar"),
                Accessor::Path(&["nutrition", "sugar_g"]),
            ],
            Metric::SodiumMg => &[
                Accessor::Key("sodium_mg"),
                Accessor::Key("sodium"),
                Accessor::Path(&["nutrition", "sodium_mg"]),
            ],
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
