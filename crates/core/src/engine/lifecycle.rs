//! Install and activate.
//!
//! Install always completes (or fails) before activate begins, and
//! activate completes before the host serves any intercepted request
//! through this version. The host enforces that ordering at startup.

use tracing::info;

use crate::backend::Backend;
use crate::cache::StoredResponse;
use crate::error::Error;
use crate::policy::PRECACHE_MANIFEST;

use super::CacheAgent;

/// Outcome of a successful install.
#[derive(Debug)]
pub struct InstallReport {
    pub namespace: String,
    pub entries: usize,
}

/// Outcome of activation.
#[derive(Debug)]
pub struct ActivateReport {
    /// Namespaces from other versions that were deleted.
    pub removed: Vec<String>,
    /// Open clients are governed by this version from now on, without a
    /// reload.
    pub clients_claimed: bool,
}

impl CacheAgent {
    /// Populate the static namespace from the precache manifest.
    ///
    /// Bulk all-or-nothing: every manifest entry must fetch with a 2xx,
    /// and all entries land in one transaction. On any failure the new
    /// static namespace is not registered and the previous version keeps
    /// serving. Readiness is signalled immediately on success; there is
    /// no handoff delay.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let namespace = &self.names().static_assets;
        let mut entries = Vec::with_capacity(PRECACHE_MANIFEST.len());

        for path in PRECACHE_MANIFEST {
            let response = self
                .backend
                .fetch(path)
                .await
                .map_err(|err| Error::InstallFailed(format!("{path}: {err}")))?;

            if !response.is_success() {
                return Err(Error::InstallFailed(format!(
                    "{path}: upstream returned {}",
                    response.status
                )));
            }

            entries.push(StoredResponse::capture(namespace, path, &response));
        }

        let count = entries.len();
        self.db().install_namespace(namespace, entries).await?;

        info!(namespace = %namespace, entries = count, "precache installed, skipping waiting");

        Ok(InstallReport {
            namespace: namespace.clone(),
            entries: count,
        })
    }

    /// Retire namespaces from other versions and claim open clients.
    ///
    /// Deleting by namespace never mutates entries of the surviving
    /// namespaces; version switches are create-then-delete, never
    /// in-place edits.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let mut removed = Vec::new();

        for name in self.db().list_namespaces().await? {
            if !self.names().contains(&name) {
                let deleted = self.db().delete_namespace(&name).await?;
                info!(namespace = %name, entries = deleted, "deleted stale cache namespace");
                removed.push(name);
            }
        }

        info!(removed = removed.len(), "activation complete, claiming open clients");

        Ok(ActivateReport {
            removed,
            clients_claimed: true,
        })
    }
}
