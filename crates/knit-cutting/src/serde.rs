use std::collections::BTreeMap;

use knit_core::errors::{ErrorInfo, KnitError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

fn serde_error(code: &str, err: impl ToString) -> KnitError {
    KnitError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>()
                .into_iter()
                .collect::<Map<_, _>>(),
        ),
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into JSON bytes with object keys in sorted order.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, KnitError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json-serialize", err))?;
    serde_json::to_vec(&canonicalize(value)).map_err(|err| serde_error("json-write", err))
}

/// Deserializes a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, KnitError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json-deserialize", err))
}
