//! Codec Module
//!
//! Reversible value <-> bytes conversion for anything implementing serde's
//! `Serialize` / `Deserialize`.
//!
//! ## Variants
//! ```text
//! ┌──────────────┬──────────────┬──────────────────────────────────────┐
//! │ Dumper       │ Format       │ Accepts                              │
//! ├──────────────┼──────────────┼──────────────────────────────────────┤
//! │ Native       │ MessagePack  │ any serde value, non-string map keys │
//! │ Interchange  │ JSON         │ string-keyed maps, finite numbers    │
//! │ RawHost      │ bincode      │ any serde value, same build only     │
//! │ PlainText    │ UTF-8        │ strings only                         │
//! └──────────────┴──────────────┴──────────────────────────────────────┘
//! ```
//!
//! Every variant guarantees `decode(encode(v)) == v` for the values it
//! accepts. Failures on the write path are `Encode` / `Type` errors; failures
//! on the read path are `Corruption` errors.
//!
//! `RawHost` is not self-describing: it cannot decode into dynamic values such
//! as `serde_json::Value`, and bytes written by one struct layout are not
//! readable after that layout changes. [`Codec::is_self_describing`] lets
//! callers verify such writes before storing them.

mod native;
mod interchange;
mod raw;
mod text;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{Config, Dumper, NativeProtocol};
use crate::error::Result;

/// A value codec selected at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Native(NativeProtocol),
    Interchange,
    RawHost,
    PlainText,
}

impl Codec {
    /// Build the codec a config asks for
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.dumper, config.native_protocol)
    }

    pub fn new(dumper: Dumper, protocol: NativeProtocol) -> Self {
        match dumper {
            Dumper::Native => Codec::Native(protocol),
            Dumper::Interchange => Codec::Interchange,
            Dumper::RawHost => Codec::RawHost,
            Dumper::PlainText => Codec::PlainText,
        }
    }

    /// Which dumper this codec implements
    pub fn dumper(&self) -> Dumper {
        match self {
            Codec::Native(_) => Dumper::Native,
            Codec::Interchange => Dumper::Interchange,
            Codec::RawHost => Dumper::RawHost,
            Codec::PlainText => Dumper::PlainText,
        }
    }

    /// Whether decoding can be driven by the bytes alone
    ///
    /// False for `RawHost`, whose decoder follows the target type's layout.
    pub fn is_self_describing(&self) -> bool {
        !matches!(self, Codec::RawHost)
    }

    /// Encode a value to bytes
    pub fn encode<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        match self {
            Codec::Native(protocol) => native::encode(value, *protocol),
            Codec::Interchange => interchange::encode(value),
            Codec::RawHost => raw::encode(value),
            Codec::PlainText => text::encode(value),
        }
    }

    /// Decode bytes produced by `encode`
    pub fn decode<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        match self {
            Codec::Native(_) => native::decode(bytes),
            Codec::Interchange => interchange::decode(bytes),
            Codec::RawHost => raw::decode(bytes),
            Codec::PlainText => text::decode(bytes),
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        Codec::Native(NativeProtocol::default())
    }
}
