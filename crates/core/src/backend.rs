//! Network capability injected into the engine.
//!
//! The engine never opens sockets itself; every live fetch goes through a
//! [`Backend`] passed in at construction. The client crate provides the
//! reqwest implementation; tests provide scripted mocks.

use async_trait::async_trait;
use bytes::Bytes;

use crate::Error;

/// One upstream answer. Transport-level failures are `Err` at the
/// [`Backend`] boundary; HTTP error statuses are `Ok` responses, because
/// the strategies pass them through uncached.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// Headers safe to replay to a client. The implementation strips
    /// hop-by-hop and content-encoding headers since the body is stored
    /// decoded.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl BackendResponse {
    /// Whether this response is cacheable (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to fetch an origin-relative path from the upstream.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<BackendResponse, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        let mut response = BackendResponse {
            status: 200,
            content_type: None,
            headers: Vec::new(),
            body: Bytes::new(),
        };
        assert!(response.is_success());
        response.status = 204;
        assert!(response.is_success());
        response.status = 304;
        assert!(!response.is_success());
        response.status = 500;
        assert!(!response.is_success());
    }
}
