use base64::{engine::general_purpose, Engine as _};
use json_patch::Patch;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("cannot serialize object for diffing: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("cannot encode patch: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Computes the JSON Patch that turns `original` into `modified`.
///
/// Both objects are serialized to their JSON representation first, the
/// operations are emitted in the order the structural comparison finds
/// the differences. Identical inputs produce an empty patch.
pub fn diff<T: Serialize>(original: &T, modified: &T) -> Result<Patch, PatchError> {
    let original = serde_json::to_value(original).map_err(PatchError::Serialize)?;
    let modified = serde_json::to_value(modified).map_err(PatchError::Serialize)?;

    Ok(json_patch::diff(&original, &modified))
}

/// Renders the patch in the form expected by the `patch` field of an
/// AdmissionResponse: a base64 encoded JSON document.
pub fn encode(patch: &Patch) -> Result<String, PatchError> {
    serde_json::to_string(patch)
        .map(|s| general_purpose::STANDARD.encode(s))
        .map_err(PatchError::Encode)
}
