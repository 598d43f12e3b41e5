//! Per-day nutrition totals over a dense date range.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{ReportError, ReportResult};
use crate::metric::Metric;
use crate::normalize::NormalizedMeal;

/// Running nutrition totals for one calendar day.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
}

impl DailyTotals {
    pub fn add_meal(&mut self, meal: &NormalizedMeal) {
        self.calories += meal.calories;
        self.protein_g += meal.protein_g;
        self.carbs_g += meal.carbs_g;
        self.fat_g += meal.fat_g;
        self.sugar_g += meal.sugar_g;
        self.sodium_mg += meal.sodium_mg;
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Calories => self.calories,
            Metric::ProteinG => self.protein_g,
            Metric::CarbsG => self.carbs_g,
            Metric::FatG => self.fat_g,
            Metric::SugarG => self.sugar_g,
            Metric::SodiumMg => self.sodium_mg,
        }
    }
}

/// Resolve the inclusive reporting range. Missing bounds come from the
/// earliest/latest meal date.
pub fn report_range(
    meals: &[NormalizedMeal],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ReportResult<(NaiveDate, NaiveDate)> {
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        _ => {
            let dates = meals.iter().filter_map(NormalizedMeal::date);
            let (min, max) = dates
                .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
                    None => Some((d, d)),
                    Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
                })
                .ok_or(ReportError::NoReportableRange)?;
            (start.unwrap_or(min), end.unwrap_or(max))
        }
    };
    if start > end {
        return Err(ReportError::InvalidRange { start, end });
    }
    Ok((start, end))
}

/// Sum meals into one [`DailyTotals`] per date of the range.
///
/// Every date in the range is present, zero-valued when no meal falls on
/// it. Meals without a timestamp or outside the range are skipped.
pub fn aggregate_by_day(
    meals: &[NormalizedMeal],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ReportResult<BTreeMap<NaiveDate, DailyTotals>> {
    let (start, end) = report_range(meals, start, end)?;

    let mut by_day: BTreeMap<NaiveDate, DailyTotals> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| (d, DailyTotals::default()))
        .collect();

    let mut skipped = 0usize;
    for meal in meals {
        match meal.date().and_then(|d| by_day.get_mut(&d)) {
            Some(totals) => totals.add_meal(meal),
            None => skipped += 1,
        }
    }
    tracing::debug!(
        %start,
        %end,
        days = by_day.len(),
        skipped,
        "aggregated meals by day"
    );
    Ok(by_day)
}
