//! Field mapping between canonical (snake_case) and wire (camelCase) names,
//! and decoding of API payloads into typed records.
//!
//! Records declare their wire names statically through serde attributes
//! (`rename_all = "camelCase"`). The key functions here state the same rule for
//! code that works on untyped JSON, such as query parameters.

mod canonical;
mod tuple;

use crate::common::CryptowatchError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Canonical field name -> wire key.
///
/// One trailing underscore is a keyword escape (`id_` -> `id`); the remaining
/// words are camel-cased (`volume_quote` -> `volumeQuote`).
pub fn to_wire_key(canonical: &str) -> String {
    let name = canonical.strip_suffix('_').unwrap_or(canonical);
    let mut key = String::with_capacity(name.len());
    for (i, word) in name.split('_').filter(|w| !w.is_empty()).enumerate() {
        if i == 0 {
            key.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            key.extend(first.to_uppercase());
            key.push_str(chars.as_str());
        }
    }
    key
}

/// Wire key -> canonical field name (`hasMore` -> `has_more`).
pub fn to_canonical_key(wire: &str) -> String {
    let mut name = String::with_capacity(wire.len() + 4);
    for c in wire.chars() {
        if c.is_uppercase() {
            if !name.is_empty() && !name.ends_with('_') {
                name.push('_');
            }
            name.extend(c.to_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

/// Recursively rewrite object keys from wire to canonical form.
///
/// Every key is rewritten, including keys that are data. Use
/// [`unstructure_canonical`] when the value comes from a typed record.
pub fn canonicalize_keys(value: Value) -> Value {
    map_keys(value, &to_canonical_key)
}

/// Recursively rewrite object keys from canonical to wire form.
pub fn wire_keys(value: Value) -> Value {
    map_keys(value, &to_wire_key)
}

fn map_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .map(|(key, inner)| (rename(&key), map_keys(inner, rename)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| map_keys(v, rename)).collect())
        }
        other => other,
    }
}

/// Decode a raw response body into `T`.
pub fn structure<T: DeserializeOwned>(raw: &str) -> Result<T, CryptowatchError> {
    serde_json::from_str(raw).map_err(|e| CryptowatchError::ResponseStructure {
        message: e.to_string(),
        payload: raw.to_string(),
    })
}

/// Decode an already parsed JSON value into `T`.
pub fn structure_value<T: DeserializeOwned>(value: Value) -> Result<T, CryptowatchError> {
    let payload = value.to_string();
    serde_json::from_value(value).map_err(|e| CryptowatchError::ResponseStructure {
        message: e.to_string(),
        payload,
    })
}

/// Encode `value` in its wire form.
pub fn unstructure<T: Serialize>(value: &T) -> Result<Value, CryptowatchError> {
    serde_json::to_value(value).map_err(|e| CryptowatchError::ResponseStructure {
        message: e.to_string(),
        payload: String::new(),
    })
}

/// Encode `value` in canonical form.
///
/// Struct fields take their snake_case names and tuple-encoded records
/// ([`Trade`](crate::models::Trade), [`OrderBookItem`](crate::models::OrderBookItem),
/// [`Candle`](crate::models::Candle)) become named records. Map keys are left as they are.
pub fn unstructure_canonical<T: Serialize>(value: &T) -> Result<Value, CryptowatchError> {
    canonical::Canonical(value)
        .serialize(serde_json::value::Serializer)
        .map_err(|e| CryptowatchError::ResponseStructure {
            message: e.to_string(),
            payload: String::new(),
        })
}
