//! # Fingerprint Template Scan
//!
//! Linear scan of the raw identity collection. Works on JSON values so
//! that unrelated records with odd shapes never block a match.
//!
//! O(n) per event. Fine at classroom scale; a store-side index keyed by
//! template id would remove the scan.

use serde_json::Value;

use super::errors::ResolutionError;

/// Whether a raw identity record claims `template_id` in its `fprints`.
///
/// Accepts the mapping form (`{"7": true}`) and the sparse-array form the
/// store uses for integer-keyed maps (`[null, …, true]`). Only a literal
/// `true` counts.
#[must_use]
pub fn template_claimed(record: &Value, template_id: i64) -> bool {
    let claim = match record.get("fprints") {
        Some(Value::Object(map)) => map.get(&template_id.to_string()),
        Some(Value::Array(list)) => usize::try_from(template_id)
            .ok()
            .and_then(|index| list.get(index)),
        _ => None,
    };
    matches!(claim, Some(Value::Bool(true)))
}

/// Entries of a collection in the store's iteration order.
fn entries(collection: &Value) -> Option<Vec<(String, &Value)>> {
    match collection {
        Value::Object(map) => Some(map.iter().map(|(k, v)| (k.clone(), v)).collect()),
        Value::Array(list) => Some(
            list.iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        ),
        _ => None,
    }
}

/// First record in `collection` claiming `template_id`, with its key.
pub fn find_template_owner(
    collection: &Value,
    template_id: i64,
) -> Result<Option<(String, &Value)>, ResolutionError> {
    let records = entries(collection).ok_or_else(|| ResolutionError::CorruptRecord {
        key: "identity collection".to_string(),
        reason: "not a keyed collection".to_string(),
    })?;

    Ok(records
        .into_iter()
        .find(|(_, record)| template_claimed(record, template_id)))
}
