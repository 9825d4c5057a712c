//! Per-seller shipping routes.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use market_data::documents::{MUTATION_SET_SHIPPING_PER_SELLER, QUERY_ELIGIBLE_METHODS_BY_SELLER};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{append_set_cookies, forwarded_cookie};
use crate::error::ProxyError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EligibleData {
    eligible_methods_by_seller: Value,
}

/// `GET /api/checkout/eligible-by-seller.json`
pub async fn eligible_by_seller(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let response = state
        .shop
        .execute::<EligibleData>(QUERY_ELIGIBLE_METHODS_BY_SELLER, json!({}), forwarded_cookie(&headers))
        .await?;

    let mut out = Json(response.data.eligible_methods_by_seller).into_response();
    append_set_cookies(&mut out, response.set_cookie);
    Ok(out)
}

/// `POST /api/checkout/set-shipping-per-seller`
pub async fn set_shipping_per_seller(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|_| ProxyError::bad_request("Invalid JSON body"))?
    };
    let selections = body.get("selections").cloned().unwrap_or_else(|| json!([]));

    let response = state
        .shop
        .execute::<Value>(
            MUTATION_SET_SHIPPING_PER_SELLER,
            json!({ "selections": selections }),
            forwarded_cookie(&headers),
        )
        .await?;

    let mut out = Json(response.data).into_response();
    append_set_cookies(&mut out, response.set_cookie);
    Ok(out)
}
