//! Request descriptors and the strategy classifier.
//!
//! Classification is a pure function of (method, path, resource kind);
//! it never touches the cache or the network.

use crate::policy::{API_PREFIXES, PRECACHE_MANIFEST};

/// Resource kind of an intercepted request, as reported by the client
/// (`Sec-Fetch-Dest` on browser traffic).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Style,
    Script,
    Image,
    Other,
}

impl Destination {
    /// Parse a `Sec-Fetch-Dest` header value. Unknown kinds map to
    /// [`Destination::Other`] and are never intercepted on their own.
    pub fn from_sec_fetch_dest(value: &str) -> Self {
        match value {
            "document" => Destination::Document,
            "style" => Destination::Style,
            "script" => Destination::Script,
            "image" => Destination::Image,
            _ => Destination::Other,
        }
    }

    /// Subresource kinds handled by the static-asset strategy.
    pub fn is_static_asset(&self) -> bool {
        matches!(self, Destination::Style | Destination::Script | Destination::Image)
    }
}

/// Classification key for one intercepted request.
///
/// `path_and_query` is also the cache key within a namespace; two requests
/// for the same path with different query strings are distinct entries.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: String,
    pub path_and_query: String,
    pub destination: Destination,
}

impl RequestDescriptor {
    /// Descriptor for a GET request.
    pub fn get(path_and_query: impl Into<String>, destination: Destination) -> Self {
        Self {
            method: "GET".to_string(),
            path_and_query: path_and_query.into(),
            destination,
        }
    }

    /// Path component without the query string, used for prefix and
    /// manifest matching.
    pub fn path(&self) -> &str {
        match self.path_and_query.split_once('?') {
            Some((path, _)) => path,
            None => &self.path_and_query,
        }
    }

    fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

/// Strategy selected for a request. `Bypass` requests pass straight to the
/// network untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Api,
    StaticAsset,
    Page,
    Bypass,
}

/// Map a request to its handling strategy. Rules are checked in order,
/// first match wins:
///
/// 1. GET under an API prefix → [`Route::Api`]
/// 2. GET for a style/script/image, or an exact manifest path → [`Route::StaticAsset`]
/// 3. GET navigation (document) → [`Route::Page`]
/// 4. anything else → [`Route::Bypass`]
pub fn classify(request: &RequestDescriptor) -> Route {
    if !request.is_get() {
        return Route::Bypass;
    }

    let path = request.path();

    if API_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return Route::Api;
    }

    if request.destination.is_static_asset() || PRECACHE_MANIFEST.contains(&path) {
        return Route::StaticAsset;
    }

    if request.destination == Destination::Document {
        return Route::Page;
    }

    Route::Bypass
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_prefix_wins() {
        let request = RequestDescriptor::get("/api/skills", Destination::Other);
        assert_eq!(classify(&request), Route::Api);
    }

    #[test]
    fn test_api_prefix_beats_destination() {
        // Rule order: a script loaded from under /api/ is still API traffic.
        let request = RequestDescriptor::get("/api/widget.js", Destination::Script);
        assert_eq!(classify(&request), Route::Api);
    }

    #[test]
    fn test_subresource_kinds_are_static() {
        for destination in [Destination::Style, Destination::Script, Destination::Image] {
            let request = RequestDescriptor::get("/anything/at/all", destination);
            assert_eq!(classify(&request), Route::StaticAsset);
        }
    }

    #[test]
    fn test_manifest_match_is_static_even_for_documents() {
        // "/" is a navigation but also a manifest entry; manifest wins.
        let request = RequestDescriptor::get("/", Destination::Document);
        assert_eq!(classify(&request), Route::StaticAsset);
    }

    #[test]
    fn test_navigation_is_page() {
        let request = RequestDescriptor::get("/profile", Destination::Document);
        assert_eq!(classify(&request), Route::Page);
    }

    #[test]
    fn test_unmatched_get_bypasses() {
        let request = RequestDescriptor::get("/profile", Destination::Other);
        assert_eq!(classify(&request), Route::Bypass);
    }

    #[test]
    fn test_non_get_bypasses() {
        let request = RequestDescriptor {
            method: "POST".to_string(),
            path_and_query: "/api/skills".to_string(),
            destination: Destination::Other,
        };
        assert_eq!(classify(&request), Route::Bypass);
    }

    #[test]
    fn test_query_string_ignored_for_classification() {
        let request = RequestDescriptor::get("/api/skills?q=rust", Destination::Other);
        assert_eq!(classify(&request), Route::Api);
        assert_eq!(request.path(), "/api/skills");
    }

    #[test]
    fn test_sec_fetch_dest_parsing() {
        assert_eq!(Destination::from_sec_fetch_dest("document"), Destination::Document);
        assert_eq!(Destination::from_sec_fetch_dest("style"), Destination::Style);
        assert_eq!(Destination::from_sec_fetch_dest("script"), Destination::Script);
        assert_eq!(Destination::from_sec_fetch_dest("image"), Destination::Image);
        assert_eq!(Destination::from_sec_fetch_dest("empty"), Destination::Other);
        assert_eq!(Destination::from_sec_fetch_dest("worker"), Destination::Other);
    }
}
