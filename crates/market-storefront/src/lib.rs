//! Storefront API proxy.
//!
//! Thin HTTP routes in front of the commerce backend's shop API:
//! - per-seller shipping (`/api/checkout/*`)
//! - cart management (`/api/cart/*`)
//!
//! The browser's cookie header is forwarded on every call and the backend
//! session cookies are relayed back.

mod config;
mod error;
mod routes;
mod state;

pub use config::*;
pub use error::*;
pub use state::*;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use market_observability::REQUEST_ID_HEADER;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone, Copy, Default)]
struct MakeMarketRequestId;

impl MakeRequestId for MakeMarketRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = market_observability::RequestId::generate();
        HeaderValue::from_str(id.as_str()).ok().map(RequestId::new)
    }
}

/// Build the application with its middleware stack.
///
/// Request ids are assigned before tracing and echoed on every response.
pub fn build_app(state: AppState, max_concurrency: usize) -> Router {
    routes::router()
        .layer(ConcurrencyLimitLayer::new(max_concurrency))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeMarketRequestId,
        ))
        .with_state(state)
}
