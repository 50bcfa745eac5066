//! HTTP surface of the agent.
//!
//! Every inbound request becomes a [`RequestDescriptor`] and runs through
//! the engine; intercepted requests are answered from a strategy,
//! everything else is proxied to the upstream untouched. Browser traffic
//! carries `Sec-Fetch-Dest`; for clients that don't send it the
//! destination is inferred from the path suffix and the Accept header.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};

use holdover_client::FetchClient;
use holdover_core::{AgentResponse, BackendResponse, CacheAgent, Destination, RequestDescriptor};

use crate::control;
use crate::error::error_response;

/// Shared gateway state: the policy engine plus the raw client used for
/// pass-through traffic.
#[derive(Clone)]
pub struct GatewayState {
    pub agent: CacheAgent,
    pub client: Arc<FetchClient>,
}

/// Build the gateway router: control surface under `/_holdover`, every
/// other path intercepted.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/_holdover/status", get(control::status))
        .route("/_holdover/sync", post(control::sync))
        .route("/_holdover/push", post(control::push))
        .route("/_holdover/notification-click", post(control::notification_click))
        .route("/_holdover/purge", post(control::purge))
        .fallback(intercept)
        .with_state(state)
}

async fn intercept(State(state): State<GatewayState>, request: Request) -> Response {
    let descriptor = descriptor_from(&request);

    match state.agent.handle_fetch(&descriptor).await {
        Ok(Some(answer)) => agent_response(answer),
        Ok(None) => passthrough(&state, request).await,
        Err(err) => {
            tracing::warn!(path = %descriptor.path_and_query, error = %err, "intercepted request failed");
            error_response(&err)
        }
    }
}

fn descriptor_from(request: &Request) -> RequestDescriptor {
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    RequestDescriptor {
        method: request.method().to_string(),
        path_and_query,
        destination: destination_of(request),
    }
}

fn destination_of(request: &Request) -> Destination {
    if let Some(value) = header_str(request, "sec-fetch-dest") {
        return Destination::from_sec_fetch_dest(value);
    }
    infer_destination(request.uri().path(), header_str(request, "accept"))
}

fn header_str<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Fallback destination sniffing for clients without fetch metadata.
fn infer_destination(path: &str, accept: Option<&str>) -> Destination {
    const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp"];

    if path.ends_with(".css") {
        Destination::Style
    } else if path.ends_with(".js") {
        Destination::Script
    } else if IMAGE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix)) {
        Destination::Image
    } else if accept.is_some_and(|v| v.contains("text/html")) {
        Destination::Document
    } else {
        Destination::Other
    }
}

/// Forward a bypassed request to the upstream with method, body, and
/// relayable headers intact.
async fn passthrough(state: &GatewayState, request: Request) -> Response {
    let method = request.method().to_string();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let headers: Vec<(String, String)> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
        .collect();

    let limit = state.client.config().max_bytes;
    let body = match axum::body::to_bytes(request.into_body(), limit).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    match state.client.forward(&method, &path_and_query, &headers, body).await {
        Ok(upstream) => upstream_response(upstream),
        Err(err) => {
            tracing::warn!(path = %path_and_query, error = %err, "pass-through request failed");
            error_response(&err)
        }
    }
}

fn agent_response(answer: AgentResponse) -> Response {
    build_response(
        answer.status,
        &answer.headers,
        answer.content_type.as_deref(),
        answer.body,
        Some(answer.source.as_str()),
    )
}

fn upstream_response(upstream: BackendResponse) -> Response {
    build_response(
        upstream.status,
        &upstream.headers,
        upstream.content_type.as_deref(),
        upstream.body,
        None,
    )
}

fn build_response(
    status: u16,
    headers: &[(String, String)],
    content_type: Option<&str>,
    body: bytes::Bytes,
    source: Option<&str>,
) -> Response {
    let mut builder = Response::builder().status(status);
    let mut has_content_type = false;

    for (name, value) in headers {
        if name.eq_ignore_ascii_case("content-type") {
            has_content_type = true;
        }
        if let Ok(header_value) = HeaderValue::from_str(value) {
            builder = builder.header(name.as_str(), header_value);
        }
    }

    if !has_content_type
        && let Some(ct) = content_type
        && let Ok(header_value) = HeaderValue::from_str(ct)
    {
        builder = builder.header(header::CONTENT_TYPE, header_value);
    }

    if let Some(source) = source {
        builder = builder.header("x-holdover-source", source);
    }

    builder
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
