//! First-present field lookup over loosely structured documents.
//!
//! Meal and goal documents come from a schemaless store, so a logical field
//! may live under several keys or nested paths. Callers describe the
//! candidates as an ordered [`Accessor`] list and take the first one that
//! yields a non-null value.

use serde_json::Value;

/// One candidate location of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accessor<'a> {
    /// A top-level key.
    Key(&'a str),
    /// A nested path; every segment before the last must be a mapping.
    Path(&'a [&'a str]),
}

impl<'a> Accessor<'a> {
    /// The value at this location, or `None` when absent or null.
    pub fn lookup<'v>(&self, record: &'v Value) -> Option<&'v Value> {
        let found = match self {
            Accessor::Key(key) => record.as_object()?.get(*key)?,
            Accessor::Path(segments) => {
                let mut cur = record;
                for seg in segments.iter() {
                    cur = cur.as_object()?.get(*seg)?;
                }
                cur
            }
        };
        (!found.is_null()).then_some(found)
    }
}

/// The value of the first accessor that resolves to a present, non-null value.
pub fn resolve_first<'v>(record: &'v Value, accessors: &[Accessor<'_>]) -> Option<&'v Value> {
    accessors.iter().find_map(|a| a.lookup(record))
}

/// Coerce a stored value to a finite float.
///
/// Accepts JSON numbers, numeric strings (surrounding whitespace ignored),
/// booleans as 1/0 and the extended-JSON number wrappers
/// (`$numberInt`, `$numberLong`, `$numberDouble`, `$numberDecimal`).
pub fn parse_numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Object(map) if map.len() == 1 => {
            let (key, inner) = map.iter().next()?;
            match key.as_str() {
                "$numberInt" | "$numberLong" | "$numberDouble" | "$numberDecimal" => {
                    inner.as_str()?.trim().parse::<f64>().ok()?
                }
                _ => return None,
            }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// [`parse_numeric`] that never fails: absence or any coercion failure
/// yields `default`.
pub fn parse_numeric_or_default(value: Option<&Value>, default: f64) -> f64 {
    value.and_then(parse_numeric).unwrap_or(default)
}
