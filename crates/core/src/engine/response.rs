//! Responses handed back to the host, with provenance.

use bytes::Bytes;

use crate::backend::BackendResponse;
use crate::cache::StoredResponse;

/// Where a response came from. The gateway exposes this as the
/// `x-holdover-source` header; tests assert on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Live upstream answer.
    Network,
    /// Served from a cache namespace.
    Cache,
    /// Synthesized or degraded offline answer.
    Fallback,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::Fallback => "fallback",
        }
    }
}

/// A normal-shaped response: the page never sees a transport fault for an
/// intercepted request, only one of these.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub source: ResponseSource,
}

impl AgentResponse {
    pub fn from_backend(response: BackendResponse) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type,
            headers: response.headers,
            body: response.body,
            source: ResponseSource::Network,
        }
    }

    pub fn from_stored(entry: StoredResponse, source: ResponseSource) -> Self {
        let headers = entry.headers();
        Self {
            status: entry.status,
            content_type: entry.content_type,
            headers,
            body: Bytes::from(entry.body),
            source,
        }
    }
}

/// Offline marker for failed API fetches with no cached entry.
pub(crate) fn offline_api_response() -> AgentResponse {
    AgentResponse {
        status: 503,
        content_type: Some("application/json".to_string()),
        headers: Vec::new(),
        body: Bytes::from(serde_json::json!({"error": "Offline"}).to_string()),
        source: ResponseSource::Fallback,
    }
}

/// Last-resort answer for failed navigations with nothing cached.
pub(crate) fn offline_page_response() -> AgentResponse {
    AgentResponse {
        status: 503,
        content_type: Some("text/plain".to_string()),
        headers: Vec::new(),
        body: Bytes::from_static(b"You are offline"),
        source: ResponseSource::Fallback,
    }
}

/// Degraded stand-in for an unreachable stylesheet: valid, empty CSS.
pub(crate) fn empty_stylesheet_response() -> AgentResponse {
    AgentResponse {
        status: 200,
        content_type: Some("text/css".to_string()),
        headers: Vec::new(),
        body: Bytes::from_static(b"/* offline fallback */"),
        source: ResponseSource::Fallback,
    }
}
