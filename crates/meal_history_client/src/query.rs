//! Filter documents for meal-history lookups, in MongoDB extended JSON.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use crate::MealQuery;

/// A 24-character hexadecimal string, the textual form of a BSON ObjectId.
pub fn is_object_id(s: &str) -> bool {
    s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Match the user id stored either as a plain string or as an ObjectId.
pub fn user_filter(user_field: &str, user_id: &str) -> Value {
    let mut ors = vec![json!({ user_field: user_id })];
    if is_object_id(user_id) {
        ors.push(json!({ user_field: { "$oid": user_id } }));
    }
    json!({ "$or": ors })
}

fn extended_date(dt: &DateTime<FixedOffset>) -> Value {
    let utc = dt.with_timezone(&Utc);
    json!({ "$date": utc.to_rfc3339_opts(SecondsFormat::Millis, true) })
}

/// Range condition on `created_field`, or `None` when neither bound is set.
pub fn time_filter(
    created_field: &str,
    start: Option<&DateTime<FixedOffset>>,
    end: Option<&DateTime<FixedOffset>>,
) -> Option<(String, Value)> {
    if start.is_none() && end.is_none() {
        return None;
    }
    let mut range = Map::new();
    if let Some(s) = start {
        range.insert("$gte".into(), extended_date(s));
    }
    if let Some(e) = end {
        range.insert("$lte".into(), extended_date(e));
    }
    Some((created_field.to_string(), Value::Object(range)))
}

pub fn build_filter(query: &MealQuery) -> Value {
    let mut filter = Map::new();
    if let Some(user_id) = &query.user_id
        && let Value::Object(user) = user_filter(&query.user_field, user_id)
    {
        filter.extend(user);
    }
    if let Some((field, range)) =
        time_filter(&query.created_field, query.start.as_ref(), query.end.as_ref())
    {
        filter.insert(field, range);
    }
    Value::Object(filter)
}
