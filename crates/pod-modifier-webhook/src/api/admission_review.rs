use crate::admission_request::AdmissionRequest;
use crate::admission_response::AdmissionResponse;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub request: AdmissionRequest,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub response: AdmissionResponse,
}

impl AdmissionReviewResponse {
    pub fn new(response: AdmissionResponse) -> Self {
        AdmissionReviewResponse {
            api_version: Some(String::from("admission.k8s.io/v1")),
            kind: Some(String::from("AdmissionReview")),
            response,
        }
    }
}

/// Best effort extraction of `request.uid` from a review that cannot be
/// decoded, so that the answer can still be correlated with the request.
pub(crate) fn salvage_uid(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|review| {
            review
                .pointer("/request/uid")
                .and_then(|uid| uid.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_default()
}
