//! Check queue contract
//!
//! The queue accepts resource identities and schedules convergence checks
//! for them, at-least-once and deduplicated. Check execution happens on the
//! consumer side and is outside the daemon.

use async_trait::async_trait;
use caravel_types::ResourceIdentity;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Failure to hand a single identity to the queue.
///
/// These are per-resource failures; the scheduler logs and swallows them so
/// one bad resource never blocks the rest of the fleet.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    #[error("check queue rejected {identity}: {reason}")]
    Rejected { identity: String, reason: String },

    #[error("check queue is full")]
    QueueFull,
}

/// Accepts resource identities for convergence checking
#[async_trait]
pub trait CheckQueue: Send + Sync {
    /// Schedule a convergence check for the identity.
    ///
    /// Returns once the identity has been accepted; never waits on the check
    /// itself. Duplicate submissions are absorbed by the queue.
    async fn schedule_check(&self, identity: &ResourceIdentity) -> Result<(), DispatchError>;
}

/// In-memory check queue for development and testing.
///
/// Pending identities live in a set, which gives deduplication for free.
#[derive(Debug)]
pub struct InMemoryCheckQueue {
    pending: RwLock<HashSet<ResourceIdentity>>,
    capacity: usize,
}

impl InMemoryCheckQueue {
    /// Create a queue bounded to `capacity` pending identities
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: RwLock::new(HashSet::new()),
            capacity,
        }
    }

    /// Take everything currently pending
    pub async fn drain(&self) -> Vec<ResourceIdentity> {
        let mut pending = self.pending.write().await;
        pending.drain().collect()
    }

    /// Number of identities currently pending
    pub async fn len(&self) -> usize {
        self.pending.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.read().await.is_empty()
    }
}

impl Default for InMemoryCheckQueue {
    fn default() -> Self {
        Self::with_capacity(10_000)
    }
}

#[async_trait]
impl CheckQueue for InMemoryCheckQueue {
    async fn schedule_check(&self, identity: &ResourceIdentity) -> Result<(), DispatchError> {
        let mut pending = self.pending.write().await;

        if pending.contains(identity) {
            // Already queued; at-least-once means this submission is covered
            return Ok(());
        }

        if pending.len() >= self.capacity {
            return Err(DispatchError::QueueFull);
        }

        pending.insert(identity.clone());
        tracing::trace!(resource = %identity, "Scheduled convergence check");
        Ok(())
    }
}
