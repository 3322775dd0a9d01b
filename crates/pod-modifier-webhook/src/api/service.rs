use k8s_openapi::api::core::v1::Pod;
use serde::Deserialize;
use tracing::{error, info, warn, Span};

use crate::{
    admission_request::AdmissionRequest,
    admission_response::AdmissionResponse,
    api::admission_review::{salvage_uid, AdmissionReviewRequest, AdmissionReviewResponse},
    errors::{Result, ReviewError},
    mutation::{MutationError, Mutator},
};

/// Runs a raw AdmissionReview document through the mutation pipeline.
///
/// Every failure past the transport checks ends up inside of the returned
/// review, the caller only has to serialize it.
pub(crate) fn review(mutator: &Mutator, body: &[u8]) -> AdmissionReviewResponse {
    let response = match serde_json::from_slice::<AdmissionReviewRequest>(body) {
        Ok(admission_review) => {
            populate_span_with_admission_request_data(&admission_review.request);
            evaluate(mutator, &admission_review.request)
        }
        Err(e) => {
            let error = ReviewError::EnvelopeDecode(e);
            error!(error = %error, "cannot decode body");
            AdmissionResponse::decode_failure(salvage_uid(body), error.to_string())
        }
    };

    populate_span_with_mutation_results(&response);

    AdmissionReviewResponse::new(response)
}

pub(crate) fn evaluate(mutator: &Mutator, adm_req: &AdmissionRequest) -> AdmissionResponse {
    let uid = adm_req.uid.clone();

    let pod = match decode_pod(adm_req) {
        Ok(pod) => pod,
        Err(error) => {
            error!(error = %error, "could not unmarshal raw object");
            return AdmissionResponse::decode_failure(uid, error.to_string());
        }
    };

    info!(
        kind = adm_req.kind.kind.as_str(),
        namespace = adm_req.namespace.as_deref().unwrap_or_default(),
        name = adm_req.name.as_deref().unwrap_or_default(),
        pod = pod.metadata.name.as_deref().unwrap_or_default(),
        uid = uid.as_str(),
        operation = %adm_req.operation,
        user_info = ?adm_req.user_info,
        "AdmissionReview"
    );

    // Pods created by controllers often carry no namespace inside of their body
    let namespace = pod
        .metadata
        .namespace
        .as_deref()
        .or(adm_req.namespace.as_deref())
        .unwrap_or_default();

    let mutation = mutator
        .compute_mutation(&pod, namespace)
        .and_then(|patch| match patch {
            Some(patch) => AdmissionResponse::allow_with_patch(uid.clone(), &patch)
                .map_err(MutationError::DiffEncoding),
            None => Ok(AdmissionResponse::allow(uid.clone())),
        });

    match mutation {
        Ok(response) => {
            if let Some(patch) = &response.patch {
                info!(patch = patch.as_str(), "AdmissionResponse");
            }
            response
        }
        Err(e) => {
            let error = ReviewError::from(e);
            warn!(error = %error, "pod left unmodified");
            AdmissionResponse::allow_with_message(uid, error.to_string())
        }
    }
}

fn decode_pod(adm_req: &AdmissionRequest) -> Result<Pod> {
    let object = adm_req
        .object
        .as_ref()
        .ok_or_else(|| ReviewError::ObjectDecode(String::from("request has no object")))?;

    Pod::deserialize(&object.0).map_err(|e| ReviewError::ObjectDecode(e.to_string()))
}

fn populate_span_with_admission_request_data(adm_req: &AdmissionRequest) {
    Span::current().record("kind", adm_req.kind.kind.as_str());
    Span::current().record("name", adm_req.name.as_deref().unwrap_or_default());
    Span::current().record(
        "namespace",
        adm_req.namespace.as_deref().unwrap_or_default(),
    );
    Span::current().record("operation", adm_req.operation.as_str());
    Span::current().record("request_uid", adm_req.uid.as_str());
    Span::current().record("user", adm_req.username());
}

fn populate_span_with_mutation_results(response: &AdmissionResponse) {
    Span::current().record("allowed", response.allowed);
    Span::current().record("mutated", response.patch.is_some());
    if let Some(message) = response.message() {
        Span::current().record("response_message", message);
    }
}
