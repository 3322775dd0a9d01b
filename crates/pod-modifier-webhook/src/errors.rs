use thiserror::Error;

use crate::mutation::MutationError;

pub type Result<T> = std::result::Result<T, ReviewError>;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("empty body")]
    EmptyBody,

    #[error("invalid Content-Type {0:?}, expect `application/json`")]
    UnsupportedContentType(String),

    #[error("cannot decode admission review: {0}")]
    EnvelopeDecode(#[source] serde_json::Error),

    #[error("cannot decode pod: {0}")]
    ObjectDecode(String),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error("cannot encode admission review response: {0}")]
    ResponseEncoding(#[source] serde_json::Error),
}
