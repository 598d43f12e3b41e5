//! Canonical meal records built from heterogeneous meal documents.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::metric::Metric;
use crate::resolve::{Accessor, parse_numeric_or_default, resolve_first};

const NAME_FIELDS: &[Accessor<'static>] = &[
    Accessor::Key("name"),
    Accessor::Key("title"),
    Accessor::Key("meal"),
    Accessor::Key("item"),
];

// `%#z` takes `+05:30`, `+0530` and `+05`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y%m%dT%H%M%S%.f%#z",
    "%Y%m%dT%H%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// One meal in canonical shape. The six nutrition fields are always finite.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedMeal {
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub name: Option<String>,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
    /// The document this meal was built from.
    pub raw: Value,
}

impl NormalizedMeal {
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

    /// Calendar date of the meal in its own UTC offset.
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date_naive())
    }
}

/// Parse an ISO-8601 date or date-time. A trailing `Z` means `+00:00`;
/// values without an offset are taken as UTC and a bare date as midnight.
pub fn parse_iso_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    let s = match s.strip_suffix(['Z', 'z']) {
        Some(head) => format!("{head}+00:00"),
        None => s.to_string(),
    };
    parse_iso_shape(&s).or_else(|| with_minutes(&s).and_then(|s| parse_iso_shape(&s)))
}

fn parse_iso_shape(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc().fixed_offset());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc().fixed_offset())
}

/// `2025-10-01T12` or `2025-10-01T12+05:30` with `:00` minutes inserted.
fn with_minutes(s: &str) -> Option<String> {
    let (date, rest) = s.split_at_checked(10)?;
    let time = rest.strip_prefix(['T', ' '])?;
    let sep = &rest[..1];
    let hour_len = time
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(time.len());
    if hour_len != 2 || time[2..].starts_with(':') {
        return None;
    }
    Some(format!("{date}{sep}{}:00{}", &time[..2], &time[2..]))
}

fn parse_epoch_millis(ms: i64) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.fixed_offset())
}

/// Interpret a stored timestamp: an ISO string or an extended-JSON date
/// (`{"$date": ...}`). Anything else is treated as missing.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::String(s) => parse_iso_datetime(s),
        Value::Object(map) => match map.get("$date")? {
            Value::String(s) => parse_iso_datetime(s),
            Value::Number(n) => parse_epoch_millis(n.as_i64()?),
            Value::Object(inner) => {
                let ms = inner.get("$numberLong")?.as_str()?.parse::<i64>().ok()?;
                parse_epoch_millis(ms)
            }
            _ => None,
        },
        _ => None,
    }
}

fn display_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Build a [`NormalizedMeal`] from one meal document.
///
/// The timestamp is looked up under `timestamp_field`, then `timestamp`,
/// then `date`. Missing or malformed values never fail: the timestamp
/// becomes `None` and numeric fields become `0.0`.
pub fn normalize(record: Value, timestamp_field: &str) -> NormalizedMeal {
    let timestamp_fields = [
        Accessor::Key(timestamp_field),
        Accessor::Key("timestamp"),
        Accessor::Key("date"),
    ];
    let timestamp = resolve_first(&record, &timestamp_fields).and_then(parse_timestamp);
    let name = resolve_first(&record, NAME_FIELDS).and_then(display_name);
    let field = |m: Metric| parse_numeric_or_default(resolve_first(&record, m.aliases()), 0.0);

    NormalizedMeal {
        timestamp,
        name,
        calories: field(Metric::Calories),
        protein_g: field(Metric::ProteinG),
        carbs_g: field(Metric::CarbsG),
        fat_g: field(Metric::FatG),
        sugar_g: field(Metric::SugarG),
        sodium_mg: field(Metric::SodiumMg),
        raw: record,
    }
}
