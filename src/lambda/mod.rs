//! Function-invocation adapter.
//!
//! Translates a cloud-function event into an internal HTTP request,
//! dispatches it through a real router, and translates the HTTP response
//! back into the invocation-response shape. The adapter holds no state
//! besides the router (and, through it, the shared pool), so warm
//! invocation contexts reuse connections but never observe each other.

use std::collections::HashMap;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderName, HeaderValue, Method, Request};
use axum::response::Response;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::router::{AppState, app_router, todos_router, users_router};

const X_REQUEST_ID: &str = "x-request-id";

/// Inbound invocation event. Field aliases cover the common camelCase
/// gateway encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionEvent {
    #[serde(alias = "httpMethod")]
    pub http_method: String,

    pub path: String,

    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default, alias = "queryStringParameters")]
    pub query: HashMap<String, String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default, alias = "isBase64Encoded")]
    pub is_base64_encoded: bool,

    /// Correlation id assigned by the platform, if any.
    #[serde(default, alias = "requestId")]
    pub request_id: Option<String>,
}

/// Outbound invocation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(alias = "statusCode")]
    pub status_code: u16,

    pub headers: HashMap<String, String>,

    pub body: String,

    #[serde(alias = "isBase64Encoded")]
    pub is_base64_encoded: bool,
}

/// One deployable unit: a router plus the event translation around it.
#[derive(Clone)]
pub struct Dispatcher {
    app: Router,
}

impl Dispatcher {
    pub fn new(app: Router) -> Self {
        Self { app }
    }

    /// Full API in a single unit.
    pub fn api(state: AppState) -> Self {
        Self::new(app_router(state))
    }

    /// Users-only unit.
    pub fn users(state: AppState) -> Self {
        Self::new(users_router(state))
    }

    /// Todos-only unit.
    pub fn todos(state: AppState) -> Self {
        Self::new(todos_router(state))
    }

    pub async fn dispatch(&self, event: FunctionEvent) -> Result<FunctionResponse, ApiError> {
        let request = build_request(event)?;

        let response = match self.app.clone().oneshot(request).await {
            Ok(response) => response,
            Err(infallible) => match infallible {},
        };

        into_function_response(response).await
    }
}

fn build_request(event: FunctionEvent) -> Result<Request<Body>, ApiError> {
    let method = Method::from_bytes(event.http_method.as_bytes())
        .map_err(|_| ApiError::invalid_field("http_method", "not a valid HTTP method"))?;

    let uri = if event.query.is_empty() {
        event.path.clone()
    } else {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &event.query {
            serializer.append_pair(key, value);
        }
        format!("{}?{}", event.path, serializer.finish())
    };

    let body = match event.body {
        None => Body::empty(),
        Some(raw) if event.is_base64_encoded => Body::from(
            BASE64
                .decode(raw)
                .map_err(|_| ApiError::invalid_field("body", "invalid base64 payload"))?,
        ),
        Some(raw) => Body::from(raw),
    };

    let mut builder = Request::builder().method(method).uri(uri);
    {
        // Infallible builder so far; headers() only returns None after a
        // builder error, which cannot have happened yet.
        let headers = builder
            .headers_mut()
            .ok_or_else(|| ApiError::Internal("request builder poisoned".to_string()))?;

        for (name, value) in &event.headers {
            let name = HeaderName::try_from(name.as_str()).map_err(|_| {
                ApiError::invalid_field("headers", format!("invalid header name {name:?}"))
            })?;
            let value = HeaderValue::try_from(value.as_str()).map_err(|_| {
                ApiError::invalid_field("headers", format!("invalid value for header {name}"))
            })?;
            headers.insert(name, value);
        }

        // Make sure every invocation is correlatable, preferring the id
        // the platform already assigned.
        if !headers.contains_key(X_REQUEST_ID) {
            let request_id = event
                .request_id
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            if let Ok(value) = HeaderValue::try_from(request_id) {
                headers.insert(X_REQUEST_ID, value);
            }
        }
    }

    builder
        .body(body)
        .map_err(|e| ApiError::Internal(format!("failed to build request: {e}")))
}

async fn into_function_response(response: Response) -> Result<FunctionResponse, ApiError> {
    let status_code = response.status().as_u16();

    let headers: HashMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to read response body: {e}")))?;

    match String::from_utf8(bytes.to_vec()) {
        Ok(body) => Ok(FunctionResponse {
            status_code,
            headers,
            body,
            is_base64_encoded: false,
        }),
        Err(non_utf8) => Ok(FunctionResponse {
            status_code,
            headers,
            body: BASE64.encode(non_utf8.into_bytes()),
            is_base64_encoded: true,
        }),
    }
}
