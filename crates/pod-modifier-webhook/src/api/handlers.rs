use std::sync::Arc;

use axum::{
    body::Bytes,
    extract,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::{debug, error};

use crate::{
    api::{api_error::ApiError, service, state::ApiServerState},
    errors::{Result, ReviewError},
};

#[tracing::instrument(
    name = "mutation",
    fields(
        request_uid=tracing::field::Empty,
        host=crate::config::HOSTNAME.as_str(),
        name=tracing::field::Empty,
        namespace=tracing::field::Empty,
        operation=tracing::field::Empty,
        kind=tracing::field::Empty,
        user=tracing::field::Empty,
        allowed=tracing::field::Empty,
        mutated=tracing::field::Empty,
        response_message=tracing::field::Empty,
    ),
    skip_all)]
/// Run an AdmissionReview through the mutation pipeline.
pub(crate) async fn mutate_handler(
    extract::State(state): extract::State<Arc<ApiServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<impl IntoResponse, ApiError> {
    validate_body(&headers, &body).map_err(handle_review_error)?;

    debug!(admission_review = %String::from_utf8_lossy(&body));

    let admission_review = service::review(&state.mutator, &body);

    let payload = serde_json::to_vec(&admission_review)
        .map_err(|e| handle_review_error(ReviewError::ResponseEncoding(e)))?;

    Ok(([(header::CONTENT_TYPE, "application/json")], payload))
}

pub(crate) async fn readiness_handler() -> StatusCode {
    StatusCode::OK
}

/// Transport level checks, done before looking at the review itself
fn validate_body(headers: &HeaderMap, body: &[u8]) -> Result<()> {
    if body.is_empty() {
        return Err(ReviewError::EmptyBody);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    match content_type.parse::<mime::Mime>() {
        Ok(media_type) if media_type.essence_str() == mime::APPLICATION_JSON.essence_str() => {
            Ok(())
        }
        _ => Err(ReviewError::UnsupportedContentType(content_type.to_owned())),
    }
}

fn handle_review_error(error: ReviewError) -> ApiError {
    error!("{}", error);
    ApiError::from(error)
}
