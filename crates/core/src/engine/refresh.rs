//! Periodic refresh of the api namespace.
//!
//! Driven by a recurring host timer, independent of any page request.
//! Fire-and-forget: a single endpoint failure never aborts the batch and
//! nothing is retried before the next scheduled run.

use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::cache::StoredResponse;
use crate::error::Error;
use crate::policy::{API_REFRESH_ENDPOINTS, REFRESH_TAG};

use super::CacheAgent;

/// Per-run summary of the periodic refresher.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub refreshed: Vec<String>,
    pub failed: Vec<String>,
}

impl CacheAgent {
    /// Handle a periodic trigger. Foreign tags are ignored.
    pub async fn handle_periodic_sync(&self, tag: &str) -> Option<RefreshReport> {
        if tag != REFRESH_TAG {
            debug!(tag, "ignoring periodic signal with foreign tag");
            return None;
        }
        Some(self.refresh_api_endpoints().await)
    }

    /// Refresh every compiled-in endpoint, replacing api entries on 2xx.
    /// Failures are logged and swallowed.
    pub async fn refresh_api_endpoints(&self) -> RefreshReport {
        let mut report = RefreshReport::default();

        for endpoint in API_REFRESH_ENDPOINTS {
            match self.refresh_endpoint(endpoint).await {
                Ok(()) => report.refreshed.push(endpoint.to_string()),
                Err(err) => {
                    warn!(endpoint, error = %err, "endpoint refresh failed, continuing");
                    report.failed.push(endpoint.to_string());
                }
            }
        }

        info!(
            refreshed = report.refreshed.len(),
            failed = report.failed.len(),
            "periodic cache refresh complete"
        );
        report
    }

    async fn refresh_endpoint(&self, endpoint: &str) -> Result<(), Error> {
        let response = self.backend.fetch(endpoint).await?;
        if !response.is_success() {
            return Err(Error::FetchFailed(format!("upstream returned {}", response.status)));
        }
        self.db()
            .put_entry(&StoredResponse::capture(&self.names().api, endpoint, &response))
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::test_support::{MockBackend, agent_with};

    use super::*;

    #[tokio::test]
    async fn test_refresh_replaces_entries() {
        let backend = MockBackend::new();
        for endpoint in API_REFRESH_ENDPOINTS {
            backend.set_ok_with(endpoint, 200, "application/json", "[]");
        }
        let agent = agent_with(backend).await;

        let report = agent.handle_periodic_sync(REFRESH_TAG).await.unwrap();
        assert_eq!(report.refreshed.len(), API_REFRESH_ENDPOINTS.len());
        assert!(report.failed.is_empty());

        for endpoint in API_REFRESH_ENDPOINTS {
            let entry = agent.db().get_entry(&agent.names().api, endpoint).await.unwrap();
            assert!(entry.is_some(), "{endpoint} should be refreshed");
        }
    }

    #[tokio::test]
    async fn test_one_failure_never_aborts_the_batch() {
        let backend = MockBackend::new();
        for endpoint in API_REFRESH_ENDPOINTS {
            backend.set_ok_with(endpoint, 200, "application/json", "[]");
        }
        backend.set_offline(API_REFRESH_ENDPOINTS[0]);
        let agent = agent_with(backend).await;

        let report = agent.refresh_api_endpoints().await;
        assert_eq!(report.failed, vec![API_REFRESH_ENDPOINTS[0].to_string()]);
        assert_eq!(report.refreshed.len(), API_REFRESH_ENDPOINTS.len() - 1);

        // The failed endpoint kept no entry; the others landed.
        assert!(
            agent
                .db()
                .get_entry(&agent.names().api, API_REFRESH_ENDPOINTS[0])
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            agent
                .db()
                .get_entry(&agent.names().api, API_REFRESH_ENDPOINTS[1])
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_foreign_tag_is_ignored() {
        let backend = MockBackend::new();
        let agent = agent_with(backend.clone()).await;

        assert!(agent.handle_periodic_sync("some-other-tag").await.is_none());
        assert_eq!(backend.total_calls(), 0);
    }
}
