//! Opaque page cursors.
//!
//! A cursor is the base64 encoding of the JSON form of a storage key
//! (`{"pk": ..., "sk": ...}`). The codec never looks inside the key strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::database::Key;
use crate::error::ApiError;

#[derive(Deserialize)]
struct RawKey {
    pk: Option<String>,
    sk: Option<String>,
}

/// Encode the continuation key of a page. `None` when there is no next page.
pub fn encode(key: Option<&Key>) -> Option<String> {
    let key = key?;
    let json = serde_json::to_vec(key).ok()?;
    Some(STANDARD.encode(json))
}

/// Decode a cursor back into the key to resume from. An absent or empty
/// cursor means "start from the beginning".
pub fn decode(cursor: Option<&str>) -> Result<Option<Key>, ApiError> {
    let cursor = match cursor {
        None | Some("") => return Ok(None),
        Some(cursor) => cursor,
    };

    let bytes = STANDARD.decode(cursor).map_err(|e| {
        tracing::debug!("cursor is not valid base64: {}", e);
        ApiError::InvalidCursor
    })?;
    let raw: RawKey = serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!("cursor key has invalid JSON: {}", e);
        ApiError::InvalidCursor
    })?;

    match (raw.pk, raw.sk) {
        (Some(pk), Some(sk)) if !pk.is_empty() && !sk.is_empty() => Ok(Some(Key { pk, sk })),
        _ => {
            tracing::debug!("cursor key has missing pk and/or sk");
            Err(ApiError::InvalidCursor)
        }
    }
}
