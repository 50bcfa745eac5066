//! Compiled-in caching policy surface.
//!
//! The manifest, API prefixes, and trigger tags are part of the deployed
//! agent, not runtime configuration: changing them is a new version with a
//! new cache tag, which is what makes activation-time pruning safe.

/// Version tag baked into every namespace name. Bump on deploys that
/// change the precache manifest or the caching policy.
pub const CACHE_VERSION: &str = "v1";

/// Origin-relative assets written into the static namespace at install.
/// Install is all-or-nothing over this list.
pub const PRECACHE_MANIFEST: &[&str] = &[
    "/",
    "/static/css/style.css",
    "/static/js/main.js",
    "/static/favicon.ico",
];

/// Path prefixes routed to the API strategy.
pub const API_PREFIXES: &[&str] = &["/api/"];

/// Endpoints refreshed by the periodic background task.
pub const API_REFRESH_ENDPOINTS: &[&str] = &["/api/skills", "/api/user_skills/"];

/// Page served from the pages namespace when a navigation fails offline
/// and no exact cached copy exists.
pub const OFFLINE_PAGE: &str = "/offline.html";

/// Icon and badge path attached to push notifications.
pub const NOTIFICATION_ICON: &str = "/static/favicon.ico";

/// Tag carried by the periodic refresh trigger.
pub const REFRESH_TAG: &str = "cache-update";

/// Tag carried by the deferred-replay (background sync) trigger.
pub const SYNC_TAG: &str = "background-sync";

/// The three versioned namespace names owned by one agent version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNames {
    pub static_assets: String,
    pub api: String,
    pub pages: String,
}

impl CacheNames {
    /// Names for the compiled-in [`CACHE_VERSION`].
    pub fn current() -> Self {
        Self::for_version(CACHE_VERSION)
    }

    /// Names for an arbitrary version tag.
    pub fn for_version(tag: &str) -> Self {
        Self {
            static_assets: format!("static-{tag}"),
            api: format!("api-{tag}"),
            pages: format!("pages-{tag}"),
        }
    }

    /// Whether `name` belongs to this version's namespace set.
    /// Activation deletes every registered namespace this returns false for.
    pub fn contains(&self, name: &str) -> bool {
        name == self.static_assets || name == self.api || name == self.pages
    }

    pub fn all(&self) -> [&str; 3] {
        [&self.static_assets, &self.api, &self.pages]
    }
}

impl Default for CacheNames {
    fn default() -> Self {
        Self::current()
    }
}
