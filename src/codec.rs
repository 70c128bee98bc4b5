//! Canonical JSON text encoding for cached values

use crate::error::{CacheError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encode a value into its stored text form
pub fn encode<V: Serialize>(value: &V) -> Result<String> {
    serde_json::to_string(value).map_err(CacheError::Encode)
}

/// Decode stored text back into a value
pub fn decode<V: DeserializeOwned>(text: &str) -> Result<V> {
    serde_json::from_str(text).map_err(CacheError::Decode)
}
