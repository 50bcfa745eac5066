//! The three caching strategies.
//!
//! - API: stale-while-revalidate over the api namespace
//! - static assets: cache-first over the static namespace
//! - pages: network-first over the pages namespace
//!
//! Every successful 2xx fetch that lands in a caching strategy produces
//! exactly one full-entry cache write before the response is returned.
//! Non-2xx upstream answers pass through uncached.

use tracing::{debug, warn};

use crate::backend::Backend;
use crate::cache::StoredResponse;
use crate::error::Error;
use crate::policy::OFFLINE_PAGE;
use crate::request::{Destination, RequestDescriptor};

use super::CacheAgent;
use super::response::{
    AgentResponse, ResponseSource, empty_stylesheet_response, offline_api_response, offline_page_response,
};

impl CacheAgent {
    /// Stale-while-revalidate: a hit answers immediately and refreshes in
    /// the background; a miss fetches synchronously; a dead network
    /// synthesizes an offline marker.
    pub(super) async fn api_request(&self, request: &RequestDescriptor) -> Result<AgentResponse, Error> {
        let url = &request.path_and_query;

        if let Some(stored) = self.db().get_entry(&self.names().api, url).await? {
            debug!(url = %url, outcome = "hit", "serving cached api response, revalidating");
            self.spawn_revalidate(url.clone());
            return Ok(AgentResponse::from_stored(stored, ResponseSource::Cache));
        }

        match self.backend().fetch(url).await {
            Ok(response) => {
                if response.is_success() {
                    self.db()
                        .put_entry(&StoredResponse::capture(&self.names().api, url, &response))
                        .await?;
                }
                Ok(AgentResponse::from_backend(response))
            }
            Err(err) => {
                warn!(url = %url, error = %err, "api fetch failed, synthesizing offline response");
                Ok(offline_api_response())
            }
        }
    }

    /// Detached refresh of one api entry. Completion is only observable
    /// through the next read of the same key; failures are dropped.
    fn spawn_revalidate(&self, url: String) {
        let agent = self.clone();
        tokio::spawn(async move {
            if let Err(err) = agent.revalidate(&url).await {
                debug!(url = %url, error = %err, "background api refresh failed");
            }
        });
    }

    /// Fetch `url` and, on a 2xx, replace its api namespace entry.
    /// Non-2xx answers leave the stale entry in place.
    pub async fn revalidate(&self, url: &str) -> Result<(), Error> {
        let response = self.backend().fetch(url).await?;
        if response.is_success() {
            self.db()
                .put_entry(&StoredResponse::capture(&self.names().api, url, &response))
                .await?;
        }
        Ok(())
    }

    /// Cache-first: a hit never touches the network. A transport failure
    /// degrades to an empty stylesheet for style requests and surfaces
    /// for every other asset kind.
    pub(super) async fn static_asset(&self, request: &RequestDescriptor) -> Result<AgentResponse, Error> {
        let url = &request.path_and_query;

        if let Some(stored) = self.db().get_entry(&self.names().static_assets, url).await? {
            debug!(url = %url, outcome = "hit", "serving cached static asset");
            return Ok(AgentResponse::from_stored(stored, ResponseSource::Cache));
        }

        match self.backend().fetch(url).await {
            Ok(response) => {
                if response.is_success() {
                    self.db()
                        .put_entry(&StoredResponse::capture(&self.names().static_assets, url, &response))
                        .await?;
                }
                Ok(AgentResponse::from_backend(response))
            }
            Err(err) if request.destination == Destination::Style => {
                warn!(url = %url, error = %err, "stylesheet fetch failed, serving empty fallback");
                Ok(empty_stylesheet_response())
            }
            Err(err) => Err(err),
        }
    }

    /// Network-first: freshness is preferred whenever the network is
    /// reachable; staleness is tolerated only as a last resort, in the
    /// order exact copy, offline page, synthesized marker.
    pub(super) async fn page_request(&self, request: &RequestDescriptor) -> Result<AgentResponse, Error> {
        let url = &request.path_and_query;

        match self.backend().fetch(url).await {
            Ok(response) => {
                if response.is_success() {
                    self.db()
                        .put_entry(&StoredResponse::capture(&self.names().pages, url, &response))
                        .await?;
                }
                Ok(AgentResponse::from_backend(response))
            }
            Err(err) => {
                warn!(url = %url, error = %err, "page fetch failed, falling back to cache");

                if let Some(stored) = self.db().get_entry(&self.names().pages, url).await? {
                    return Ok(AgentResponse::from_stored(stored, ResponseSource::Cache));
                }

                if let Some(offline) = self.db().get_entry(&self.names().pages, OFFLINE_PAGE).await? {
                    return Ok(AgentResponse::from_stored(offline, ResponseSource::Fallback));
                }

                Ok(offline_page_response())
            }
        }
    }

    fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }
}
