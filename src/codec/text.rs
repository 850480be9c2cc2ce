//! UTF-8 passthrough codec

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DbmError, Result};

pub(super) fn encode<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(value) {
        Ok(Value::String(text)) => Ok(text.into_bytes()),
        Ok(other) => Err(DbmError::Type(format!(
            "text dumper needs a string value, got {}",
            kind(&other)
        ))),
        Err(e) => Err(DbmError::Type(format!(
            "text dumper needs a string value: {}",
            e
        ))),
    }
}

pub(super) fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let text = String::from_utf8(bytes.to_vec())
        .map_err(|e| DbmError::Corruption(format!("text: {}", e)))?;
    serde_json::from_value(Value::String(text))
        .map_err(|e| DbmError::Corruption(format!("text: {}", e)))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}
