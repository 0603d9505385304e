use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("event api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("event api responded with status {0}")]
    Status(u16),

    #[error("event api reported: {0}")]
    Graphql(String),

    #[error("no event with id {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound(id) => {
                tracing::debug!(%id, "event not found");
                (StatusCode::NOT_FOUND, "Event not found").into_response()
            }
            err => {
                tracing::error!(error = %err, "failed to fetch from event api");
                (StatusCode::BAD_GATEWAY, "Failed to fetch events").into_response()
            }
        }
    }
}
