//! bincode codec
//!
//! Not self-describing and tied to the exact Rust type layout that wrote it.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DbmError, Result};

pub(super) fn encode<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    bincode::serialize(value).map_err(|e| DbmError::Encode(format!("bincode: {}", e)))
}

pub(super) fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    bincode::deserialize(bytes).map_err(|e| DbmError::Corruption(format!("bincode: {}", e)))
}
