use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors a request handler can surface. Implements
/// [`axum::response::IntoResponse`] so handlers can return
/// `Result<T, ServerError>` and get a JSON error body with the right status.
///
/// Upstream failures are logged in full but only a generic message reaches
/// the client, so provider URLs and keys never leak into responses.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The query matched nothing in the index.
    #[error("not found: {0}")]
    NotFound(String),

    /// An external service (vector database, embedding or LLM provider)
    /// failed or was unreachable.
    #[error("upstream error: {0}")]
    Upstream(#[from] anyhow::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::Upstream(e) => {
                log::error!("upstream failure: {e:?}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "an external service is unavailable".to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
