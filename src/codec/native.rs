//! MessagePack codec

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::NativeProtocol;
use crate::error::{DbmError, Result};

pub(super) fn encode<T>(value: &T, protocol: NativeProtocol) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let encoded = match protocol {
        NativeProtocol::Compact => rmp_serde::to_vec(value),
        NativeProtocol::Named => rmp_serde::to_vec_named(value),
    };
    encoded.map_err(|e| DbmError::Encode(format!("msgpack: {}", e)))
}

pub(super) fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    rmp_serde::from_slice(bytes).map_err(|e| DbmError::Corruption(format!("msgpack: {}", e)))
}
