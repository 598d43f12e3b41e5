//! Text and JSON rendering of per-day comparisons.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::DailyTotals;
use crate::compare::{ComparisonResult, DailyGoals, Status};
use crate::metric::Metric;

/// How many days ended in each status for one metric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub within: usize,
    pub over: usize,
    pub under: usize,
    #[serde(rename = "n/a")]
    pub not_applicable: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Within => self.within += 1,
            Status::Over => self.over += 1,
            Status::Under => self.under += 1,
            Status::NotApplicable => self.not_applicable += 1,
        }
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Within => self.within,
            Status::Over => self.over,
            Status::Under => self.under,
            Status::NotApplicable => self.not_applicable,
        }
    }
}

pub type Summary = BTreeMap<Metric, StatusCounts>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub totals: DailyTotals,
    pub comparison: ComparisonResult,
}

/// A full comparison run for one user.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub user_id: String,
    pub collection: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub goals: DailyGoals,
    pub days: Vec<DayReport>,
    pub summary: Summary,
}

impl Report {
    /// Day blocks followed by the period summary.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for day in &self.days {
            out.push_str(&render_day(day.date, &day.comparison));
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&render_summary(&self.summary));
        out
    }
}

fn whole(v: Option<f64>) -> String {
    match v {
        None => "-".to_string(),
        Some(v) => format!("{v:.0}"),
    }
}

/// Header line with the date, then one line per metric.
pub fn render_day(date: NaiveDate, comparison: &ComparisonResult) -> String {
    let mut out = format!("# {}", date.format("%Y-%m-%d"));
    for metric in Metric::ALL {
        let (actual, goal, delta, status) = match comparison.get(&metric) {
            Some(row) => (row.actual, row.goal, row.delta, row.status),
            None => (None, None, None, Status::NotApplicable),
        };
        let _ = write!(
            out,
            "\n- {metric:11} | actual: {}  goal: {}  delta: {}  status: {status}",
            whole(actual),
            whole(goal),
            whole(delta),
        );
    }
    out
}

/// Count statuses per metric across every day, `n/a` included.
pub fn tally(all: &BTreeMap<NaiveDate, ComparisonResult>) -> Summary {
    let mut summary: Summary = Metric::ALL
        .into_iter()
        .map(|m| (m, StatusCounts::default()))
        .collect();
    for comparison in all.values() {
        for metric in Metric::ALL {
            let status = comparison
                .get(&metric)
                .map_or(Status::NotApplicable, |row| row.status);
            if let Some(counts) = summary.get_mut(&metric) {
                counts.record(status);
            }
        }
    }
    summary
}

pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::from("== Summary across period ==");
    for metric in Metric::ALL {
        let t = summary.get(&metric).copied().unwrap_or_default();
        let _ = write!(
            out,
            "\n{metric:11} | within: {:>2}  over: {:>2}  under: {:>2}  n/a: {:>2}",
            t.within, t.over, t.under, t.not_applicable
        );
    }
    out
}

/// Status tally across the whole period, rendered as text.
pub fn summarize(all: &BTreeMap<NaiveDate, ComparisonResult>) -> String {
    render_summary(&tally(all))
}
