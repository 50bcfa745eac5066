//! The request-interception policy engine.
//!
//! [`CacheAgent`] owns the three versioned namespaces and answers every
//! runtime signal through a handler method: `install`/`activate`
//! (lifecycle), [`CacheAgent::handle_fetch`] (interception),
//! `handle_periodic_sync` (refresh), `handle_sync` (deferred replay),
//! and `handle_push`/`handle_notification_click` (directives back to the
//! host). The host decides when signals fire; the engine decides what
//! they mean.
//!
//! Handlers for independent signals may run concurrently; the only shared
//! mutable state is the cache itself, where every write is an atomic
//! full-entry replace, so last-write-wins is the whole coordination story.

mod lifecycle;
mod notify;
mod refresh;
mod replay;
mod response;
mod strategies;

use std::sync::Arc;

use tracing::debug;

use crate::backend::Backend;
use crate::cache::CacheDb;
use crate::error::Error;
use crate::policy::CacheNames;
use crate::request::{RequestDescriptor, Route, classify};

pub use lifecycle::{ActivateReport, InstallReport};
pub use notify::{HostDirective, PushPayload};
pub use refresh::RefreshReport;
pub use replay::{NoopReplay, ReplayQueue};
pub use response::{AgentResponse, ResponseSource};

/// The caching agent: classifier plus strategy executors over the three
/// namespaces of the current version.
#[derive(Clone)]
pub struct CacheAgent {
    db: CacheDb,
    backend: Arc<dyn Backend>,
    replay: Arc<dyn ReplayQueue>,
    names: CacheNames,
}

impl CacheAgent {
    /// Build an agent for the compiled-in cache version, with the no-op
    /// replay queue.
    pub fn new(db: CacheDb, backend: Arc<dyn Backend>) -> Self {
        Self {
            db,
            backend,
            replay: Arc::new(NoopReplay),
            names: CacheNames::current(),
        }
    }

    /// Replace the deferred-replay queue.
    pub fn with_replay(mut self, replay: Arc<dyn ReplayQueue>) -> Self {
        self.replay = replay;
        self
    }

    pub fn names(&self) -> &CacheNames {
        &self.names
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Handle one intercepted request.
    ///
    /// Returns `Ok(None)` for requests the agent does not intercept; the
    /// host forwards those to the network untouched. Per request the
    /// order is fixed: classify, look up, optionally fetch, optionally
    /// store, respond. Across requests there is no ordering guarantee.
    pub async fn handle_fetch(&self, request: &RequestDescriptor) -> Result<Option<AgentResponse>, Error> {
        let route = classify(request);
        debug!(path = %request.path_and_query, route = ?route, "classified request");

        match route {
            Route::Api => self.api_request(request).await.map(Some),
            Route::StaticAsset => self.static_asset(request).await.map(Some),
            Route::Page => self.page_request(request).await.map(Some),
            Route::Bypass => Ok(None),
        }
    }
}
