use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::Resource;
use crate::error::ResourceError;

/// Serialize a value and require a JSON object.
pub fn to_json_object<T: Serialize + ?Sized>(
    collection: &str,
    value: &T,
) -> Result<Map<String, Value>, ResourceError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ResourceError::invalid_payload(
            collection,
            format!("expected an object, got {}", json_kind(&other)),
        )),
        Err(e) => Err(ResourceError::invalid_payload(collection, e)),
    }
}

/// Build a new record from draft fields plus a store-assigned id and timestamp.
///
/// Draft keys colliding with the id or timestamp keys are discarded.
pub(crate) fn build_record<M: Resource, D: Serialize + ?Sized>(
    id: &str,
    created_at: DateTime<Utc>,
    draft: &D,
) -> Result<M, ResourceError> {
    let mut fields = to_json_object(M::COLLECTION, draft)?;
    fields.insert(M::ID_KEY.to_string(), Value::String(id.to_string()));
    let stamp = serde_json::to_value(created_at)
        .map_err(|e| ResourceError::invalid_payload(M::COLLECTION, e))?;
    fields.insert(M::CREATED_AT_KEY.to_string(), stamp);

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| ResourceError::invalid_payload(M::COLLECTION, e))
}

/// Merge the top-level keys of `patch` over `existing`.
///
/// The id and timestamp keys are protected. Keys missing from the patch keep
/// their current value; an explicit `null` is written through.
pub(crate) fn merge_patch<M: Resource, P: Serialize + ?Sized>(
    existing: &M,
    patch: &P,
) -> Result<M, ResourceError> {
    let mut fields = to_json_object(M::COLLECTION, existing)?;
    let patch = to_json_object(M::COLLECTION, patch)?;

    for (key, value) in patch {
        if key == M::ID_KEY || key == M::CREATED_AT_KEY {
            continue;
        }
        fields.insert(key, value);
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| ResourceError::invalid_payload(M::COLLECTION, e))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
