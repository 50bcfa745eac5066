//! HTTP client for the upstream origin.
//!
//! ### Timeouts
//! Every request carries an explicit timeout; a hung upstream turns into
//! a transport failure that the engine's strategies recover from, instead
//! of a request stalled indefinitely.
//!
//! ### Body handling
//! reqwest decodes content-encoding transparently, so the encoding and
//! length headers of the upstream answer are dropped before the response
//! is snapshotted or relayed. Bodies over `max_bytes` are rejected.

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, RequestBuilder, Url, header};

use holdover_core::{Backend, BackendResponse, Error};

pub use url::{parse_upstream, resolve};

/// Headers never relayed through the gateway: hop-by-hop headers plus the
/// encoding/length pair invalidated by transparent decompression.
const STRIPPED_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-encoding",
    "content-length",
    "host",
];

fn is_stripped(name: &str) -> bool {
    STRIPPED_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Upstream origin, e.g. "http://127.0.0.1:5000".
    pub upstream: String,

    /// User agent string (default: "holdover/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            upstream: "http://127.0.0.1:5000".to_string(),
            user_agent: "holdover/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(10000),
            max_redirects: 5,
        }
    }
}

/// HTTP client bound to the configured upstream origin.
pub struct FetchClient {
    http: Client,
    upstream: Url,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let upstream = parse_upstream(&config.upstream)?;

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::FetchFailed(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, upstream, config })
    }

    /// GET an origin-relative path, returning the decoded body and
    /// relay-safe headers. HTTP error statuses are `Ok`; only transport
    /// failures are `Err`.
    pub async fn fetch_path(&self, path: &str) -> Result<BackendResponse, Error> {
        let url = resolve(&self.upstream, path)?;
        let start = Instant::now();

        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(map_transport_err)?;

        let backend_response = self.read_response(response).await?;

        tracing::debug!(
            path = %path,
            status = backend_response.status,
            bytes = backend_response.body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "upstream fetch complete"
        );

        Ok(backend_response)
    }

    /// Forward an uninterpreted request to the upstream: same method,
    /// body, and relayable headers. Used for traffic the agent bypasses.
    pub async fn forward(
        &self,
        method: &str,
        path: &str,
        headers: &[(String, String)],
        body: Bytes,
    ) -> Result<BackendResponse, Error> {
        let url = resolve(&self.upstream, path)?;
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {method}")))?;

        let mut request: RequestBuilder = self.http.request(method, url.as_str());
        for (name, value) in headers {
            if !is_stripped(name) {
                request = request.header(name, value);
            }
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await.map_err(map_transport_err)?;
        self.read_response(response).await
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn read_response(&self, response: reqwest::Response) -> Result<BackendResponse, Error> {
        let status = response.status().as_u16();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                len, self.config.max_bytes
            )));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter(|(name, _)| !is_stripped(name.as_str()))
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::FetchFailed(format!("failed to read response: {}", e)))?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                body.len(),
                self.config.max_bytes
            )));
        }

        Ok(BackendResponse { status, content_type, headers, body })
    }
}

#[async_trait]
impl Backend for FetchClient {
    async fn fetch(&self, path: &str) -> Result<BackendResponse, Error> {
        self.fetch_path(path).await
    }
}

fn map_transport_err(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(err.to_string())
    } else {
        Error::FetchFailed(err.to_string())
    }
}
