//! Proxy error responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use market_data::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    /// The request payload was unusable; answered with 400.
    #[error("{0}")]
    BadRequest(String),

    /// The upstream call failed; answered with 500.
    #[error(transparent)]
    Upstream(#[from] FetchError),
}

impl ProxyError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ProxyError::BadRequest(message.into())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                [(header::CACHE_CONTROL, "no-store")],
                Json(serde_json::json!({ "message": message })),
            )
                .into_response(),
            ProxyError::Upstream(e) => {
                tracing::warn!(error = %e, "upstream call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
