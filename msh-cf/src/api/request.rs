//! Lenient request body parsing shared by the POST handlers
//!
//! Bodies are read as raw JSON so a missing or mistyped list can be
//! reported as a 400 with the same message the front-end already expects,
//! instead of axum's generic extractor rejection.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::ApiError;

/// Parse a request body, treating anything but a JSON object as missing
pub(crate) fn parse_object(body: &[u8], missing: &str) -> Result<Value, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => Ok(value),
        _ => Err(ApiError::bad_request(missing)),
    }
}

/// Remove `key` from `request` and decode each array element as `T`
///
/// An element that is not a JSON object is decoded as an empty record, so
/// it still gets classified and counted.
pub(crate) fn take_items<T: DeserializeOwned>(
    request: &mut Value,
    key: &str,
    item_label: &str,
    missing: &str,
) -> Result<Vec<T>, ApiError> {
    let items = match request.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => return Err(ApiError::bad_request(missing)),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let item = match item {
                object @ Value::Object(_) => object,
                _ => Value::Object(Map::new()),
            };
            serde_json::from_value(item).map_err(|e| {
                ApiError::bad_request(format!("Invalid {} at index {}: {}", item_label, index, e))
            })
        })
        .collect()
}
