use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use market_data::{GraphQlClient, TimeoutConfig};
use market_storefront::{build_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Fake shop API keyed on the operation name in the document.
async fn shop_api(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let query = body["query"].as_str().unwrap_or_default();
    let variables = &body["variables"];
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let data = if query.contains("EligibleMethodsBySeller") {
        json!({ "eligibleMethodsBySeller": [{
            "sellerChannelId": "2",
            "sellerName": cookie,
            "quotes": [{ "id": "5", "code": "seller-a-std", "name": "Seller A Standard", "price": 800, "priceWithTax": 800 }]
        }] })
    } else if query.contains("SetShippingPerSeller") {
        if variables["selections"].as_array().map_or(true, |s| s.is_empty()) {
            return Json(json!({ "errors": [{ "message": "Missing shipping selection for seller channel 2" }] }))
                .into_response();
        }
        json!({ "setShippingPerSeller": { "id": "1" } })
    } else if query.contains("AddToOrder") {
        json!({ "addItemToOrder": {
            "__typename": "Order",
            "id": "1",
            "totalQuantity": variables["quantity"],
        } })
    } else if query.contains("AdjustOrderLine") {
        json!({ "adjustOrderLine": { "__typename": "Order", "id": "1", "totalQuantity": variables["quantity"] } })
    } else if query.contains("ActiveOrderLines") {
        json!({ "activeOrder": { "id": "1", "lines": [{ "id": "10" }, { "id": "11" }] } })
    } else if query.contains("RemoveOrderLine") {
        json!({ "removeOrderLine": { "__typename": "Order", "id": "1", "totalQuantity": 0 } })
    } else if query.contains("ActiveOrderQuantity") {
        json!({ "activeOrder": { "totalQuantity": 3 } })
    } else if query.contains("Checkout") {
        json!({
            "transitionOrderToState": { "id": "1", "state": "ArrangingPayment", "code": "ORD-1" },
            "addPaymentToOrder": { "id": "1", "code": "ORD-1", "state": "PaymentAuthorized" }
        })
    } else {
        return (StatusCode::BAD_REQUEST, "unknown operation").into_response();
    };

    let mut response = Json(json!({ "data": data })).into_response();
    let headers = response.headers_mut();
    headers.append(header::SET_COOKIE, "session=abc; Path=/; Domain=backend".parse().unwrap());
    headers.append(header::SET_COOKIE, "session.sig=xyz; Path=/".parse().unwrap());
    response
}

async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/shop-api", addr)
}

async fn app() -> Router {
    let url = spawn_upstream(Router::new().route("/shop-api", post(shop_api))).await;
    let client = GraphQlClient::new(url, TimeoutConfig::from_total(Duration::from_secs(5))).unwrap();
    build_app(AppState::new(client), 16)
}

async fn app_with_dead_upstream() -> Router {
    let url = spawn_upstream(Router::new().route(
        "/shop-api",
        post(|| async { (StatusCode::BAD_GATEWAY, "down") }),
    ))
    .await;
    let client = GraphQlClient::new(url, TimeoutConfig::default()).unwrap();
    build_app(AppState::new(client), 16)
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, "session=old")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_ping() {
    let response = app()
        .await
        .oneshot(Request::get("/api/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_json(response).await["ok"], true);
}

#[tokio::test]
async fn test_eligible_by_seller_forwards_cookie() {
    let request = Request::get("/api/checkout/eligible-by-seller.json")
        .header(header::COOKIE, "session=s1")
        .body(Body::empty())
        .unwrap();
    let response = app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookies(&response).len(), 2);

    let body = body_json(response).await;
    assert_eq!(body[0]["sellerChannelId"], "2");
    assert_eq!(body[0]["sellerName"], "session=s1");
    assert_eq!(body[0]["quotes"][0]["price"], 800);
}

#[tokio::test]
async fn test_set_shipping_per_seller() {
    let app = app().await;
    let ok = app
        .clone()
        .oneshot(post_json(
            "/api/checkout/set-shipping-per-seller",
            json!({ "selections": [{ "sellerChannelId": "2", "shippingMethodId": "5" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(body_json(ok).await["setShippingPerSeller"]["id"], "1");

    let missing = app
        .oneshot(post_json("/api/checkout/set-shipping-per-seller", json!({})))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(missing).await["error"],
        "Missing shipping selection for seller channel 2"
    );
}

#[tokio::test]
async fn test_set_shipping_per_seller_rejects_malformed_json() {
    let response = app()
        .await
        .oneshot(
            Request::post("/api/checkout/set-shipping-per-seller")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"selections\": ["))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid JSON body");
}

#[tokio::test]
async fn test_upstream_http_failure_is_500() {
    let response = app_with_dead_upstream()
        .await
        .oneshot(Request::get("/api/checkout/eligible-by-seller.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("GraphQL HTTP 502"));
}

#[tokio::test]
async fn test_cart_add_json_reissues_cookies() {
    let response = app()
        .await
        .oneshot(post_json("/api/cart/add", json!({ "variantId": "7", "quantity": 2 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        set_cookies(&response),
        vec![
            "session=abc; Path=/; HttpOnly; SameSite=Lax".to_string(),
            "session.sig=xyz; Path=/; HttpOnly; SameSite=Lax".to_string(),
        ]
    );
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(body_json(response).await["totalQuantity"], 2);
}

#[tokio::test]
async fn test_cart_add_form_redirects() {
    let request = Request::post("/api/cart/add")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("variantId=7&quantity=1"))
        .unwrap();
    let response = app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/cart");
    assert_eq!(set_cookies(&response).len(), 2);
}

#[tokio::test]
async fn test_cart_add_rejects_missing_variant() {
    let response = app()
        .await
        .oneshot(post_json("/api/cart/add", json!({ "quantity": 1 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid payload: missing variantId");
}

#[tokio::test]
async fn test_cart_update_and_remove() {
    let app = app().await;
    let updated = app
        .clone()
        .oneshot(post_json("/api/cart/update", json!({ "lineId": "10", "quantity": 4 })))
        .await
        .unwrap();
    assert_eq!(body_json(updated).await["totalQuantity"], 4);

    let invalid = app
        .clone()
        .oneshot(post_json("/api/cart/update", json!({ "lineId": "10", "quantity": 0 })))
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let removed = app
        .oneshot(post_json("/api/cart/remove", json!({ "lineId": "10" })))
        .await
        .unwrap();
    assert_eq!(body_json(removed).await["__typename"], "Order");
}

#[tokio::test]
async fn test_cart_clear_removes_every_line() {
    let response = app()
        .await
        .oneshot(post_json("/api/cart/clear", json!({})))
        .await
        .unwrap();
    assert_eq!(set_cookies(&response).len(), 2);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["cleared"], 2);
}

#[tokio::test]
async fn test_cart_count() {
    let response = app()
        .await
        .oneshot(Request::get("/api/cart/count").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 3);
}

#[tokio::test]
async fn test_cart_checkout() {
    let app = app().await;
    let fields = json!({
        "email": "buyer1@example.com",
        "firstName": "Buyer",
        "lastName": "One",
        "streetLine1": "1 Main St",
        "city": "Nicosia",
        "postalCode": "1010",
        "countryCode": "CY",
    });
    let placed = app.clone().oneshot(post_json("/api/cart/checkout", fields)).await.unwrap();
    assert_eq!(body_json(placed).await, json!({ "code": "ORD-1" }));

    let missing = app
        .oneshot(post_json("/api/cart/checkout", json!({ "email": "buyer1@example.com" })))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["message"], "Missing checkout fields");
}
