// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP Gateway for fnhost.
//!
//! Routes `/function/{name}` (and anything below it) to the registered
//! function of that name. Every other path goes to the configured target
//! function, if there is one.
//!
//! The gateway owns the wire format: it parses request bodies before handing
//! them to functions and turns invocation failures into 500 responses.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body as AxumBody, Bytes},
    extract::{Path, Request as AxumRequest, State},
    http::{Response as HttpResponse, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
    routing::any,
    Router,
};
use fnhost_core::{
    Body, CloudEvent, FunctionName, FunctionRegistry, RegisteredFunction, Request, Response,
    ResponseParts, SignatureType,
};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::metrics::{self, Outcome};

/// Header carrying the caller-supplied execution id.
pub const EXECUTION_ID_HEADER: &str = "function-execution-id";

/// Largest request body accepted.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Gateway state shared across tasks
#[derive(Clone)]
struct GatewayState {
    registry: Arc<FunctionRegistry>,
    target: Option<FunctionName>,
}

/// Build the router serving `registry`.
pub fn router(registry: Arc<FunctionRegistry>, target: Option<FunctionName>) -> Router {
    let state = GatewayState { registry, target };

    Router::new()
        .route("/function/{name}", any(invoke_named_root))
        .route("/function/{name}/{*path}", any(invoke_named))
        .fallback(invoke_target)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_gateway(
    port: u16,
    registry: Arc<FunctionRegistry>,
    target: Option<FunctionName>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(registry, target);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn invoke_named_root(
    State(state): State<GatewayState>,
    Path(name): Path<String>,
    req: AxumRequest,
) -> AxumResponse {
    dispatch(&state, &name, "/".to_string(), req).await
}

async fn invoke_named(
    State(state): State<GatewayState>,
    Path((name, path)): Path<(String, String)>,
    req: AxumRequest,
) -> AxumResponse {
    dispatch(&state, &name, format!("/{}", path), req).await
}

async fn invoke_target(State(state): State<GatewayState>, req: AxumRequest) -> AxumResponse {
    let Some(target) = state.target.clone() else {
        return (StatusCode::NOT_FOUND, "No target function configured").into_response();
    };
    let path = req.uri().path().to_string();
    dispatch(&state, target.as_str(), path, req).await
}

async fn dispatch(state: &GatewayState, name: &str, path: String, req: AxumRequest) -> AxumResponse {
    // 1. Lookup function in registry
    let Some(entry) = state.registry.get_registered_function(name) else {
        return (StatusCode::NOT_FOUND, format!("Function not found: {}", name)).into_response();
    };

    let execution_id = req
        .headers()
        .get(EXECUTION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "invocation",
        function = %name,
        signature = %entry.signature_type,
        execution_id = %execution_id,
    );

    let started = Instant::now();
    let response = async {
        // 2. Convert the wire request into a function request
        let request = match into_function_request(req, path).await {
            Ok(request) => request,
            Err(status) => return status.into_response(),
        };

        // 3. Invoke with the calling convention the function was registered with
        match entry.signature_type {
            SignatureType::Http | SignatureType::Typed => invoke_http(&entry, request).await,
            SignatureType::CloudEvent => invoke_event(&entry, request).await,
        }
    }
    .instrument(span)
    .await;

    metrics::record_invocation(
        name,
        Outcome::from_status(response.status().as_u16()),
        started.elapsed(),
    );

    response
}

async fn invoke_http(entry: &RegisteredFunction, request: Request) -> AxumResponse {
    let response = Response::new();

    if let Err(e) = entry.invoke(request, response.clone()).await {
        tracing::error!(error = %e, "Function failed");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let parts = response.snapshot().await;
    if !parts.ended {
        tracing::error!("Function returned without ending the response");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    into_http_response(parts)
}

async fn invoke_event(entry: &RegisteredFunction, request: Request) -> AxumResponse {
    let event = match CloudEvent::from_request(&request) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting malformed CloudEvent");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match entry.invoke_event(event).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Function failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn into_function_request(req: AxumRequest, path: String) -> Result<Request, StatusCode> {
    let (parts, body) = req.into_parts();

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    let mut request = Request::new(parts.method.as_str(), path);
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }

    let body = parse_body(request.content_type().as_deref(), bytes)?;
    Ok(request.with_body(body))
}

/// Parse a body according to its media type.
///
/// JSON media types are parsed into a JSON value, text into a string, and
/// anything else is passed through as bytes.
fn parse_body(content_type: Option<&str>, bytes: Bytes) -> Result<Body, StatusCode> {
    if bytes.is_empty() {
        return Ok(Body::Empty);
    }

    match content_type {
        Some(ct) if ct == "application/json" || ct.ends_with("+json") => {
            serde_json::from_slice(&bytes)
                .map(Body::Json)
                .map_err(|_| StatusCode::BAD_REQUEST)
        }
        Some(ct) if ct.starts_with("text/") => String::from_utf8(bytes.to_vec())
            .map(Body::Text)
            .map_err(|_| StatusCode::BAD_REQUEST),
        _ => Ok(Body::Bytes(bytes.to_vec())),
    }
}

fn into_http_response(parts: ResponseParts) -> AxumResponse {
    let mut builder = HttpResponse::builder().status(parts.status);
    for (name, value) in &parts.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder
        .body(AxumBody::from(parts.body))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Function produced an invalid response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;
    use fnhost_core::HandlerError;
    use tower::ServiceExt;

    fn test_registry() -> Arc<FunctionRegistry> {
        let registry = FunctionRegistry::new_shared();
        crate::functions::register_all(&registry).unwrap();
        registry
            .http("broken", |_req: Request, _res: Response| async move {
                Err::<(), HandlerError>("broken on purpose".into())
            })
            .unwrap();
        registry
            .http("silent", |_req: Request, _res: Response| async move {
                Ok::<(), HandlerError>(())
            })
            .unwrap();
        registry
    }

    async fn send(app: Router, request: HttpRequest<AxumBody>) -> (StatusCode, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn post(uri: &str, content_type: &str, body: &str) -> HttpRequest<AxumBody> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", content_type)
            .body(AxumBody::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_typed_function_over_http() {
        let app = router(test_registry(), None);
        let (status, body) = send(app, post("/function/add-one", "application/json", r#"{"x":1}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"y":2}"#);
    }

    #[tokio::test]
    async fn test_typed_function_wrong_content_type() {
        let app = router(test_registry(), None);
        let (status, body) = send(app, post("/function/add-one", "text/plain", r#"{"x":1}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "400 Bad Request");
    }

    #[tokio::test]
    async fn test_invalid_json_rejected() {
        let app = router(test_registry(), None);
        let (status, _) = send(app, post("/function/add-one", "application/json", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_function() {
        let app = router(test_registry(), None);
        let (status, _) = send(app, post("/function/nope", "application/json", "{}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handler_failure_is_500() {
        let app = router(test_registry(), None);
        let (status, _) = send(app, post("/function/broken", "text/plain", "hi")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unended_response_is_500() {
        let app = router(test_registry(), None);
        let (status, _) = send(app, post("/function/silent", "text/plain", "hi")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_target_fallback_and_subpath() {
        let target = FunctionName::new("shout").unwrap();
        let app = router(test_registry(), Some(target));

        let (status, body) = send(app.clone(), post("/any/path", "text/plain", "quiet")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "QUIET");

        let (status, body) = send(app, post("/function/hello/deep/path", "application/json", r#"{"name":"Lin"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello, Lin!");
    }

    #[tokio::test]
    async fn test_no_target_configured() {
        let app = router(test_registry(), None);
        let (status, _) = send(app, post("/", "text/plain", "x")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cloud_event_binary_mode() {
        let app = router(test_registry(), None);
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/function/log-event")
            .header("content-type", "application/json")
            .header("ce-id", "1")
            .header("ce-source", "//test")
            .header("ce-specversion", "1.0")
            .header("ce-type", "test.event")
            .body(AxumBody::from(r#"{"k":"v"}"#))
            .unwrap();

        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_cloud_event_missing_attributes() {
        let app = router(test_registry(), None);
        let (status, body) = send(app, post("/function/log-event", "application/json", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("id"));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(Some("application/json"), Bytes::new()), Ok(Body::Empty));
        assert!(parse_body(None, Bytes::new()).unwrap().is_empty());
        assert_eq!(
            parse_body(Some("text/plain"), Bytes::from_static(b"hi")),
            Ok(Body::Text("hi".to_string()))
        );
        assert_eq!(
            parse_body(Some("application/octet-stream"), Bytes::from_static(b"\x00")),
            Ok(Body::Bytes(vec![0]))
        );
        assert!(matches!(
            parse_body(Some("application/cloudevents+json"), Bytes::from_static(b"{}")),
            Ok(Body::Json(_))
        ));
    }
}
