//! Deferred-action replay (background sync).
//!
//! Extension point only: the agent guarantees the hook runs exactly once
//! per matching trigger signal and that it completes or fails
//! independently of in-flight request handling. No queued-action format
//! is defined here.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Error;
use crate::policy::SYNC_TAG;

use super::CacheAgent;

/// Flushes actions that were deferred while offline.
#[async_trait]
pub trait ReplayQueue: Send + Sync {
    async fn replay(&self) -> Result<(), Error>;
}

/// Default queue: nothing is persisted while offline, so a sync signal
/// only logs.
pub struct NoopReplay;

#[async_trait]
impl ReplayQueue for NoopReplay {
    async fn replay(&self) -> Result<(), Error> {
        tracing::info!("background sync triggered, no deferred actions queued");
        Ok(())
    }
}

impl CacheAgent {
    /// Handle a sync trigger. Returns true when the tag matched and the
    /// replay hook was invoked; foreign tags are ignored.
    pub async fn handle_sync(&self, tag: &str) -> Result<bool, Error> {
        if tag != SYNC_TAG {
            debug!(tag, "ignoring sync signal with foreign tag");
            return Ok(false);
        }
        self.replay.replay().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::engine::test_support::{MockBackend, agent_with};

    use super::*;

    #[derive(Default)]
    struct CountingReplay {
        invocations: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ReplayQueue for CountingReplay {
        async fn replay(&self) -> Result<(), Error> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::FetchFailed("replay upstream unreachable".into()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sync_invokes_replay_exactly_once_per_signal() {
        let replay = Arc::new(CountingReplay::default());
        let agent = agent_with(MockBackend::new()).await.with_replay(replay.clone());

        assert!(agent.handle_sync(SYNC_TAG).await.unwrap());
        assert_eq!(replay.invocations.load(Ordering::SeqCst), 1);

        assert!(agent.handle_sync(SYNC_TAG).await.unwrap());
        assert_eq!(replay.invocations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_foreign_tag_skips_replay() {
        let replay = Arc::new(CountingReplay::default());
        let agent = agent_with(MockBackend::new()).await.with_replay(replay.clone());

        assert!(!agent.handle_sync("one-off-sync").await.unwrap());
        assert_eq!(replay.invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_replay_failure_propagates() {
        let replay = Arc::new(CountingReplay {
            invocations: AtomicUsize::new(0),
            fail: true,
        });
        let agent = agent_with(MockBackend::new()).await.with_replay(replay.clone());

        assert!(agent.handle_sync(SYNC_TAG).await.is_err());
        assert_eq!(replay.invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_noop_replay_succeeds() {
        let agent = agent_with(MockBackend::new()).await;
        assert!(agent.handle_sync(SYNC_TAG).await.unwrap());
    }
}
