//! JSON payload codec.
//!
//! Serializes a value to UTF-8 JSON bytes and back. This is plain serialization:
//! the bytes are readable by anyone holding them.

use crate::error::OrmError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialize `value` to JSON bytes
///
/// # Errors
///
/// Returns `OrmError::Payload` if `value` cannot be represented as JSON (for example a
/// map with non-string keys).
///
/// # Examples
///
/// ```
/// use mooring::{from_payload_bytes, to_payload_bytes};
/// use std::collections::BTreeMap;
///
/// let mut settings = BTreeMap::new();
/// settings.insert("theme".to_string(), "dark".to_string());
///
/// let bytes = to_payload_bytes(&settings)?;
/// let restored: BTreeMap<String, String> = from_payload_bytes(&bytes)?;
/// assert_eq!(restored, settings);
/// # Ok::<(), mooring::OrmError>(())
/// ```
pub fn to_payload_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, OrmError> {
    serde_json::to_vec(value).map_err(OrmError::Payload)
}

/// Decode JSON bytes produced by [`to_payload_bytes`]
///
/// # Errors
///
/// Returns `OrmError::Payload` if the bytes are not valid JSON for `T`.
pub fn from_payload_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, OrmError> {
    serde_json::from_slice(bytes).map_err(OrmError::Payload)
}
