//! GraphQL client for the host's shop and admin APIs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cookie::SessionCookies;
use crate::timeout::TimeoutConfig;

/// Error type for GraphQL calls.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("GraphQL HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Request error: {0}")]
    Request(String),

    /// The response carried GraphQL errors; messages joined with `; `.
    #[error("{0}")]
    GraphQl(String),

    #[error("Response has no data")]
    MissingData,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if e.is_connect() {
            FetchError::Connection(e.to_string())
        } else if e.is_decode() {
            FetchError::Deserialization(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// A GraphQL request body.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub variables: Value,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

/// The raw outcome of a call: status, body and captured session cookies.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed JSON body; `{}` when the body was not JSON.
    pub body: Value,
    /// Raw upstream `set-cookie` values.
    pub set_cookie: Vec<String>,
    pub cookies: SessionCookies,
}

impl RawResponse {
    /// The `data.<field>` node, or the whole body when absent.
    pub fn data_field_or_body(&self, field: &str) -> Value {
        self.body
            .get("data")
            .and_then(|d| d.get(field))
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| self.body.clone())
    }
}

/// A decoded GraphQL response.
#[derive(Debug, Clone)]
pub struct GraphQlResponse<T> {
    pub data: T,
    pub set_cookie: Vec<String>,
    pub cookies: SessionCookies,
}

/// GraphQL-over-HTTP client.
///
/// Forwards the caller's cookie header and captures `set-cookie` on the way
/// back. Calls are never retried.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    client: reqwest::Client,
    endpoint: String,
    bearer: Option<String>,
    channel_token: Option<String>,
}

impl GraphQlClient {
    /// Create a client for `endpoint` with the given timeouts.
    pub fn new(endpoint: impl Into<String>, timeout: TimeoutConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout.connect)
            .timeout(timeout.total)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            bearer: None,
            channel_token: None,
        })
    }

    /// Authenticate with a bearer token.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Scope calls to a channel via the `vendure-token` header.
    pub fn with_channel_token(mut self, token: impl Into<String>) -> Self {
        self.channel_token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a document and return the body without interpreting it.
    pub async fn execute_raw(
        &self,
        query: &str,
        variables: Value,
        cookie: Option<&str>,
    ) -> Result<RawResponse, FetchError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables });
        if let Some(cookie) = cookie.filter(|c| !c.is_empty()) {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }
        if let Some(token) = &self.channel_token {
            req = req.header("vendure-token", token);
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let set_cookie: Vec<String> = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let cookies = SessionCookies::from_set_cookie(set_cookie.iter().map(String::as_str));

        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::Object(Default::default()));

        tracing::debug!(endpoint = %self.endpoint, status, "graphql call");

        Ok(RawResponse {
            status,
            body,
            set_cookie,
            cookies,
        })
    }

    /// POST a document and decode its `data`.
    ///
    /// Fails on a non-2xx status or when the response carries GraphQL errors.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        cookie: Option<&str>,
    ) -> Result<GraphQlResponse<T>, FetchError> {
        let raw = self.execute_raw(query, variables, cookie).await?;
        if !(200..300).contains(&raw.status) {
            return Err(FetchError::Http {
                status: raw.status,
                url: self.endpoint.clone(),
            });
        }

        let envelope: Envelope = serde_json::from_value(raw.body)
            .map_err(|e| FetchError::Deserialization(e.to_string()))?;
        if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FetchError::GraphQl(message));
        }

        let data = envelope.data.ok_or(FetchError::MissingData)?;
        let data = serde_json::from_value(data).map_err(|e| FetchError::Deserialization(e.to_string()))?;

        Ok(GraphQlResponse {
            data,
            set_cookie: raw.set_cookie,
            cookies: raw.cookies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap};
    use axum::routing::post;
    use axum::{Json, Router};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/shop-api", addr)
    }

    fn client(url: String) -> GraphQlClient {
        GraphQlClient::new(url, TimeoutConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_execute_decodes_data_and_cookies() {
        let router = Router::new().route(
            "/shop-api",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let cookie = headers
                    .get(header::COOKIE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                let mut out = HeaderMap::new();
                out.append(header::SET_COOKIE, "session=s1; path=/".parse().unwrap());
                out.append(header::SET_COOKIE, "session.sig=g1; path=/".parse().unwrap());
                (
                    out,
                    Json(serde_json::json!({
                        "data": { "echo": { "cookie": cookie, "query": body["query"] } }
                    })),
                )
            }),
        );
        let url = serve(router).await;

        let response: GraphQlResponse<Value> = client(url)
            .execute("query { echo }", Value::Null, Some("session=abc"))
            .await
            .unwrap();

        assert_eq!(response.data["echo"]["cookie"], "session=abc");
        assert_eq!(response.data["echo"]["query"], "query { echo }");
        assert_eq!(response.cookies.session.as_deref(), Some("s1"));
        assert_eq!(response.cookies.signature.as_deref(), Some("g1"));
        assert_eq!(response.set_cookie.len(), 2);
    }

    #[tokio::test]
    async fn test_graphql_errors_joined() {
        let router = Router::new().route(
            "/shop-api",
            post(|| async {
                Json(serde_json::json!({
                    "errors": [{ "message": "No active order" }, { "message": "second" }]
                }))
            }),
        );
        let url = serve(router).await;

        let err = client(url)
            .execute::<Value>("query { x }", Value::Null, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No active order; second");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let router = Router::new().route(
            "/shop-api",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "nope") }),
        );
        let url = serve(router).await;

        let err = client(url)
            .execute::<Value>("query { x }", Value::Null, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Http { status: 502, .. }));

        let raw = client(serve(Router::new().route(
            "/shop-api",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "nope") }),
        ))
        .await)
        .execute_raw("query { x }", Value::Null, None)
        .await
        .unwrap();
        assert_eq!(raw.status, 502);
        assert_eq!(raw.body, serde_json::json!({}));
    }

    #[test]
    fn test_data_field_or_body() {
        let raw = RawResponse {
            status: 200,
            body: serde_json::json!({ "data": { "removeOrderLine": { "id": "1" } } }),
            set_cookie: Vec::new(),
            cookies: SessionCookies::default(),
        };
        assert_eq!(raw.data_field_or_body("removeOrderLine")["id"], "1");
        assert_eq!(raw.data_field_or_body("missing"), raw.body);
    }
}
