//! Route table and request helpers shared by the handlers.

mod cart;
mod checkout;

use std::collections::HashMap;

use axum::extract::{FromRequest, Query, Request};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{Map, Value};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ping", get(ping))
        .route("/api/checkout/eligible-by-seller.json", get(checkout::eligible_by_seller))
        .route("/api/checkout/set-shipping-per-seller", post(checkout::set_shipping_per_seller))
        .route("/api/cart/add", post(cart::add))
        .route("/api/cart/update", post(cart::update))
        .route("/api/cart/remove", post(cart::remove))
        .route("/api/cart/clear", post(cart::clear))
        .route("/api/cart/count", get(cart::count))
        .route("/api/cart/checkout", post(cart::checkout))
}

async fn ping() -> Json<Value> {
    Json(serde_json::json!({
        "ok": true,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// The browser's cookie header, passed through to the backend untouched.
pub(crate) fn forwarded_cookie(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::COOKIE).and_then(|v| v.to_str().ok())
}

/// Append `set-cookie` headers, skipping values that are not valid header text.
pub(crate) fn append_set_cookies(response: &mut Response, values: impl IntoIterator<Item = String>) {
    let headers = response.headers_mut();
    for value in values {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.append(header::SET_COOKIE, value);
        }
    }
}

/// A JSON response that must not be cached.
pub(crate) fn no_store_json(value: Value) -> Response {
    ([(header::CACHE_CONTROL, "no-store")], Json(value)).into_response()
}

/// How the client sent its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PayloadKind {
    Json,
    /// A browser form post, or a bare request with no content type.
    Form,
    Other,
}

/// Payload fields read from a JSON body, a form body or the query string.
#[derive(Debug, Clone)]
pub(crate) struct Payload {
    pub kind: PayloadKind,
    pub fields: Map<String, Value>,
}

impl Payload {
    /// Read the payload; unparseable input yields no fields.
    pub async fn read(request: Request) -> Self {
        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.contains("application/json") {
            let fields = match Json::<Value>::from_request(request, &()).await {
                Ok(Json(Value::Object(map))) => map,
                _ => Map::new(),
            };
            return Self {
                kind: PayloadKind::Json,
                fields,
            };
        }

        if content_type.starts_with("application/x-www-form-urlencoded")
            || content_type.starts_with("multipart/form-data")
        {
            let fields = Form::<HashMap<String, String>>::from_request(request, &())
                .await
                .map(|Form(map)| strings_to_fields(map))
                .unwrap_or_default();
            return Self {
                kind: PayloadKind::Form,
                fields,
            };
        }

        let fields = Query::<HashMap<String, String>>::try_from_uri(request.uri())
            .map(|Query(map)| strings_to_fields(map))
            .unwrap_or_default();
        let kind = if content_type.is_empty() {
            PayloadKind::Form
        } else {
            PayloadKind::Other
        };
        Self { kind, fields }
    }

    /// A field as text; numbers are rendered, anything else is empty.
    pub fn string(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// A field as an integer, `default` when absent; `None` when not integral.
    pub fn integer(&self, key: &str, default: i64) -> Option<i64> {
        integer_field(self.fields.get(key), default)
    }
}

pub(crate) fn integer_field(value: Option<&Value>, default: i64) -> Option<i64> {
    match value {
        None | Some(Value::Null) => Some(default),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) if s.trim().is_empty() => Some(default),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn strings_to_fields(map: HashMap<String, String>) -> Map<String, Value> {
    map.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
}
