//! Upstream URL handling.
//!
//! The gateway fetches exactly one origin; every request is an
//! origin-relative path resolved against it.

use holdover_core::Error;
use url::Url;

/// Parse and validate the configured upstream origin.
pub fn parse_upstream(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw.trim()).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidUrl(format!("unsupported upstream scheme: {other}")));
        }
    }

    if url.host_str().is_none() {
        return Err(Error::InvalidUrl(format!("{raw}: missing host")));
    }

    Ok(url)
}

/// Resolve an origin-relative path (with optional query) against the
/// upstream origin.
pub fn resolve(upstream: &Url, path: &str) -> Result<Url, Error> {
    if !path.starts_with('/') {
        return Err(Error::InvalidUrl(format!("{path}: expected origin-relative path")));
    }
    upstream
        .join(path)
        .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upstream_http() {
        let url = parse_upstream("http://127.0.0.1:5000").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("127.0.0.1"));
    }

    #[test]
    fn test_parse_upstream_rejects_other_schemes() {
        assert!(parse_upstream("ftp://origin").is_err());
        assert!(parse_upstream("unix:/tmp/sock").is_err());
    }

    #[test]
    fn test_parse_upstream_rejects_garbage() {
        assert!(parse_upstream("not a url").is_err());
    }

    #[test]
    fn test_resolve_path_and_query() {
        let upstream = parse_upstream("http://127.0.0.1:5000").unwrap();
        let resolved = resolve(&upstream, "/api/skills?q=rust").unwrap();
        assert_eq!(resolved.as_str(), "http://127.0.0.1:5000/api/skills?q=rust");
    }

    #[test]
    fn test_resolve_rejects_relative_paths() {
        let upstream = parse_upstream("http://127.0.0.1:5000").unwrap();
        assert!(resolve(&upstream, "api/skills").is_err());
        assert!(resolve(&upstream, "").is_err());
    }
}
