//! Meal collection auto-detection.

use crate::{MealHistoryClient, MealHistoryError};

/// Collection names probed, in order, when none is configured.
pub const MEAL_COLLECTION_CANDIDATES: &[&str] = &[
    "mealhistories",
    "meal_history",
    "mealHistory",
    "mealHistories",
    "meals",
    "meal",
];

/// Preferred names first, in the order given, then the well-known
/// candidates; blanks and duplicates dropped.
pub fn candidate_collections(preferred: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let names = preferred
        .iter()
        .copied()
        .chain(MEAL_COLLECTION_CANDIDATES.iter().copied());
    for name in names {
        let name = name.trim();
        if name.is_empty() || out.iter().any(|n| n == name) {
            continue;
        }
        out.push(name.to_string());
    }
    out
}

/// Return the first candidate collection holding documents, if any.
///
/// Falling past the first preferred name is logged at `warn`, since the
/// caller asked for that collection explicitly.
pub async fn pick_meal_collection<C>(
    client: &C,
    preferred: &[&str],
) -> Result<Option<String>, MealHistoryError>
where
    C: MealHistoryClient + ?Sized,
{
    let requested = preferred
        .iter()
        .map(|n| n.trim())
        .find(|n| !n.is_empty());
    for name in candidate_collections(preferred) {
        if client.collection_has_documents(&name).await? {
            match requested {
                Some(requested) if requested != name => tracing::warn!(
                    requested,
                    collection = %name,
                    "requested meal collection has no documents, using fallback"
                ),
                _ => tracing::debug!(collection = %name, "meal collection detected"),
            }
            return Ok(Some(name));
        }
        tracing::trace!(collection = %name, "no documents in candidate collection");
    }
    Ok(None)
}
