//! Canonical JSON and the sha256 ids derived from it.

use gap_core::{ErrorInfo, GapError};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Serializes `value` as JSON with object keys in sorted order.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, GapError> {
    let tree = serde_json::to_value(value).map_err(|err| {
        GapError::Serde(ErrorInfo::new("gap_exp.canonical_json", err.to_string()))
    })?;
    serde_json::to_vec_pretty(&tree)
        .map_err(|err| GapError::Serde(ErrorInfo::new("gap_exp.canonical_json", err.to_string())))
}

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, GapError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}
