//! Cart routes.
//!
//! Session cookies the backend sets are re-issued first-party so the
//! browser sends them back to the storefront.

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use market_data::documents::{
    MUTATION_ADD_TO_ORDER, MUTATION_ADJUST_ORDER_LINE, MUTATION_CHECKOUT, MUTATION_REMOVE_ORDER_LINE,
    QUERY_ACTIVE_ORDER_LINES, QUERY_ACTIVE_ORDER_QUANTITY,
};
use market_data::SessionCookies;
use serde_json::{json, Map, Value};

use super::{append_set_cookies, forwarded_cookie, integer_field, no_store_json, Payload, PayloadKind};
use crate::error::ProxyError;
use crate::state::AppState;

const CHECKOUT_FIELDS: &[&str] = &[
    "email",
    "firstName",
    "lastName",
    "streetLine1",
    "city",
    "postalCode",
    "countryCode",
];

fn json_object(body: &Bytes) -> Map<String, Value> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn line_id(body: &Map<String, Value>) -> String {
    match body.get("lineId") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// `POST /api/cart/add`
///
/// Accepts JSON, a form post or query parameters. Form posts get a redirect
/// to `/cart` so the browser commits the session cookies first.
pub async fn add(State(state): State<AppState>, request: Request) -> Result<Response, ProxyError> {
    let cookie = forwarded_cookie(request.headers()).map(str::to_string);
    let payload = Payload::read(request).await;

    let variant_id = payload.string("variantId");
    let quantity = payload.integer("quantity", 1).filter(|q| *q > 0);
    let Some(quantity) = quantity.filter(|_| !variant_id.is_empty()) else {
        return Err(ProxyError::bad_request("Invalid payload: missing variantId"));
    };

    let raw = state
        .shop
        .execute_raw(
            MUTATION_ADD_TO_ORDER,
            json!({ "variantId": variant_id, "quantity": quantity }),
            cookie.as_deref(),
        )
        .await?;
    tracing::debug!(variant_id = %variant_id, quantity, "cart add");

    let mut response = if payload.kind == PayloadKind::Form {
        (
            StatusCode::FOUND,
            [(header::LOCATION, "/cart"), (header::CACHE_CONTROL, "no-store")],
        )
            .into_response()
    } else {
        no_store_json(raw.data_field_or_body("addItemToOrder"))
    };
    append_set_cookies(&mut response, raw.cookies.to_set_cookie_headers());
    Ok(response)
}

/// `POST /api/cart/update`
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let body = json_object(&body);
    let line_id = line_id(&body);
    let quantity = integer_field(body.get("quantity"), 0).filter(|q| *q >= 1);
    let Some(quantity) = quantity.filter(|_| !line_id.is_empty()) else {
        return Err(ProxyError::bad_request("Invalid payload"));
    };

    let raw = state
        .shop
        .execute_raw(
            MUTATION_ADJUST_ORDER_LINE,
            json!({ "orderLineId": line_id, "quantity": quantity }),
            forwarded_cookie(&headers),
        )
        .await?;

    let mut response = no_store_json(raw.data_field_or_body("adjustOrderLine"));
    append_set_cookies(&mut response, raw.cookies.to_set_cookie_headers());
    Ok(response)
}

/// `POST /api/cart/remove`
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let line_id = line_id(&json_object(&body));
    if line_id.is_empty() {
        return Err(ProxyError::bad_request("Invalid payload"));
    }

    let raw = state
        .shop
        .execute_raw(
            MUTATION_REMOVE_ORDER_LINE,
            json!({ "orderLineId": line_id }),
            forwarded_cookie(&headers),
        )
        .await?;

    let mut response = no_store_json(raw.data_field_or_body("removeOrderLine"));
    append_set_cookies(&mut response, raw.cookies.to_set_cookie_headers());
    Ok(response)
}

/// `POST /api/cart/clear`
///
/// Removes every line of the active order one at a time and stops at the
/// first error result.
pub async fn clear(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ProxyError> {
    let cookie = forwarded_cookie(&headers);
    let lines = state
        .shop
        .execute_raw(QUERY_ACTIVE_ORDER_LINES, json!({}), cookie)
        .await?;
    let mut cookies: SessionCookies = lines.cookies.clone();

    let line_ids: Vec<String> = lines
        .body
        .pointer("/data/activeOrder/lines")
        .and_then(Value::as_array)
        .map(|lines| {
            lines
                .iter()
                .filter_map(|l| l.get("id"))
                .filter_map(|id| match id {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let mut last = Value::Null;
    for id in &line_ids {
        let raw = state
            .shop
            .execute_raw(MUTATION_REMOVE_ORDER_LINE, json!({ "orderLineId": id }), cookie)
            .await?;
        cookies.merge(raw.cookies.clone());
        last = raw.body.pointer("/data/removeOrderLine").cloned().unwrap_or(Value::Null);
        if last.get("errorCode").is_some() {
            tracing::debug!(line_id = %id, "cart clear stopped on error result");
            let mut response = no_store_json(last);
            append_set_cookies(&mut response, cookies.to_set_cookie_headers());
            return Ok(response);
        }
    }

    let body = if line_ids.is_empty() {
        json!({ "ok": true, "cleared": 0 })
    } else {
        json!({ "ok": true, "cleared": line_ids.len(), "last": last })
    };
    let mut response = no_store_json(body);
    append_set_cookies(&mut response, cookies.to_set_cookie_headers());
    Ok(response)
}

/// `GET /api/cart/count`
pub async fn count(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ProxyError> {
    let raw = state
        .shop
        .execute_raw(QUERY_ACTIVE_ORDER_QUANTITY, json!({}), forwarded_cookie(&headers))
        .await?;
    let count = raw
        .body
        .pointer("/data/activeOrder/totalQuantity")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    let mut response = Json(json!({ "count": count })).into_response();
    append_set_cookies(&mut response, raw.set_cookie);
    Ok(response)
}

/// `POST /api/cart/checkout`
///
/// Answers `{code}` once the order is placed, else the backend data.
pub async fn checkout(State(state): State<AppState>, request: Request) -> Result<Response, ProxyError> {
    let cookie = forwarded_cookie(request.headers()).map(str::to_string);
    let payload = Payload::read(request).await;

    let mut variables = Map::new();
    for field in CHECKOUT_FIELDS {
        let value = payload.string(field);
        if value.is_empty() {
            return Err(ProxyError::bad_request("Missing checkout fields"));
        }
        variables.insert(field.to_string(), Value::String(value));
    }

    let raw = state
        .shop
        .execute_raw(MUTATION_CHECKOUT, Value::Object(variables), cookie.as_deref())
        .await?;
    let code = raw
        .body
        .pointer("/data/addPaymentToOrder/code")
        .or_else(|| raw.body.pointer("/data/transitionOrderToState/code"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let body = match code {
        Some(code) => {
            tracing::info!(order_code = %code, "checkout placed order");
            json!({ "code": code })
        }
        None => raw
            .body
            .get("data")
            .filter(|d| !d.is_null())
            .cloned()
            .unwrap_or_else(|| raw.body.clone()),
    };
    let mut response = Json(body).into_response();
    append_set_cookies(&mut response, raw.set_cookie);
    Ok(response)
}
