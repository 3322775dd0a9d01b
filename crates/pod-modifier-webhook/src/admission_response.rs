use serde::{Deserialize, Serialize};

use crate::mutation::patch::{self, PatchError};

/// This models the admission/v1/AdmissionResponse object of Kubernetes
/// See https://pkg.go.dev/k8s.io/kubernetes/pkg/apis/admission#AdmissionResponse
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// UID is an identifier for the individual request/response.
    /// This must be copied over from the corresponding AdmissionRequest.
    pub uid: String,

    /// Allowed indicates whether or not the admission request was permitted.
    pub allowed: bool,

    /// The type of Patch. Currently we only allow "JSONPatch".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<PatchType>,

    /// The patch body, a base64 encoded RFC 6902 document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,

    /// Status carries the diagnostic message of a failed evaluation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionResponseStatus>,
}

/// PatchType is the type of patch being used to represent the mutated object
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub enum PatchType {
    #[serde(rename = "JSONPatch")]
    #[default]
    JSONPatch,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct AdmissionResponseStatus {
    /// A human-readable description of the status of this operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AdmissionResponse {
    /// Let the object through untouched.
    pub fn allow(uid: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: true,
            ..Default::default()
        }
    }

    /// Let the object through, rewritten by the given patch.
    pub fn allow_with_patch(
        uid: String,
        patch: &json_patch::Patch,
    ) -> Result<AdmissionResponse, PatchError> {
        Ok(AdmissionResponse {
            uid,
            allowed: true,
            patch_type: Some(PatchType::JSONPatch),
            patch: Some(patch::encode(patch)?),
            status: None,
        })
    }

    /// Let the object through untouched, reporting why it was not mutated.
    pub fn allow_with_message(uid: String, message: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: true,
            status: Some(AdmissionResponseStatus {
                message: Some(message),
            }),
            ..Default::default()
        }
    }

    /// Answer a review that could not be decoded: `allowed` is false and the
    /// message carries the decode error.
    pub fn decode_failure(uid: String, message: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: false,
            status: Some(AdmissionResponseStatus {
                message: Some(message),
            }),
            ..Default::default()
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use base64::{engine::general_purpose, Engine as _};
    use serde_json::json;

    #[test]
    fn create_allow_response() {
        let response = AdmissionResponse::allow(String::from("UID"));

        assert_eq!(response.uid, "UID");
        assert!(response.allowed);
        assert_eq!(response.patch, None);
        assert_eq!(response.patch_type, None);
        assert_eq!(response.status, None);
    }

    #[test]
    fn create_response_with_patch() {
        let original = json!({"hello": "world"});
        let mutated = json!({"hello": "world", "ciao": "mondo"});
        let expected_diff = json_patch::diff(&original, &mutated);

        let response = AdmissionResponse::allow_with_patch(String::from("UID"), &expected_diff)
            .expect("patch should be encoded");

        assert_eq!(response.uid, "UID");
        assert!(response.allowed);
        assert!(response.status.is_none());
        assert_eq!(response.patch_type, Some(PatchType::JSONPatch));

        let patch_decoded_str = general_purpose::STANDARD
            .decode(response.patch.unwrap())
            .unwrap();
        let patch: json_patch::Patch =
            serde_json::from_slice(patch_decoded_str.as_slice()).unwrap();
        assert_eq!(patch, expected_diff);
    }

    #[test]
    fn create_decode_failure_response() {
        let response =
            AdmissionResponse::decode_failure(String::from("UID"), String::from("boom"));

        assert_eq!(response.uid, "UID");
        assert!(!response.allowed);
        assert!(response.patch.is_none());
        assert_eq!(response.message(), Some("boom"));
    }

    #[test]
    fn serialize_uses_kubernetes_field_names() {
        let original = json!({"a": 1});
        let mutated = json!({"a": 2});
        let response = AdmissionResponse::allow_with_patch(
            String::from("UID"),
            &json_patch::diff(&original, &mutated),
        )
        .unwrap();

        let serialized = serde_json::to_value(&response).unwrap();

        assert_eq!(serialized["uid"], "UID");
        assert_eq!(serialized["allowed"], true);
        assert_eq!(serialized["patchType"], "JSONPatch");
        assert!(serialized["patch"].is_string());
        assert!(serialized.get("status").is_none());
    }

    #[test]
    fn allow_with_message_keeps_request_allowed() {
        let response =
            AdmissionResponse::allow_with_message(String::from("UID"), String::from("bad"));

        let serialized = serde_json::to_value(&response).unwrap();

        assert_eq!(serialized["allowed"], true);
        assert_eq!(serialized["status"]["message"], "bad");
        assert!(serialized.get("patch").is_none());
        assert!(serialized.get("patchType").is_none());
    }
}
