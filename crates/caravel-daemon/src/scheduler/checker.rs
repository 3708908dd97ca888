//! Periodic check scheduling
//!
//! The check scheduler is the liveness guarantee of the system: every managed
//! resource is re-offered to the check queue on a fixed interval, whether or
//! not anything external has touched it.

use crate::config::SchedulerConfig;
use crate::error::StorageError;
use crate::scheduler::queue::CheckQueue;
use crate::storage::ResourceInventory;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;

/// Outcome of a single check cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Identities accepted by the queue
    pub submitted: usize,

    /// Identities the queue refused; logged and left for the next cycle
    pub failed: usize,
}

/// Fires on a fixed interval and offers every managed resource identity to
/// the check queue.
///
/// Cycles are independent and memoryless. A cycle may still be dispatching
/// when the next one fires; the queue deduplicates, so no mutual exclusion
/// is taken here.
pub struct CheckScheduler {
    config: SchedulerConfig,
    inventory: Arc<dyn ResourceInventory>,
    queue: Arc<dyn CheckQueue>,
    trigger_tx: mpsc::Sender<()>,
    running: Arc<RwLock<bool>>,
}

impl CheckScheduler {
    /// Create a new scheduler.
    ///
    /// Returns the scheduler and the receiver to pass to [`start`](Self::start).
    pub fn new(
        config: SchedulerConfig,
        inventory: Arc<dyn ResourceInventory>,
        queue: Arc<dyn CheckQueue>,
    ) -> (Arc<Self>, mpsc::Receiver<()>) {
        let (trigger_tx, trigger_rx) = mpsc::channel(10);

        let scheduler = Arc::new(Self {
            config,
            inventory,
            queue,
            trigger_tx,
            running: Arc::new(RwLock::new(false)),
        });

        (scheduler, trigger_rx)
    }

    /// Request an immediate check cycle
    pub async fn trigger_check_cycle(&self) {
        let _ = self.trigger_tx.send(()).await;
    }

    /// Run the timer loop until [`stop`](Self::stop) is called.
    ///
    /// A failed cycle never stops the timer; the next tick always happens.
    pub async fn start(self: Arc<Self>, mut trigger_rx: mpsc::Receiver<()>) {
        {
            let mut running = self.running.write().await;
            *running = true;
        }

        tracing::info!(
            interval_ms = self.config.check_interval_ms,
            "Check scheduler started"
        );

        let mut ticker = interval(self.config.check_interval());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        tracing::error!(error = %e, "Check cycle aborted");
                    }
                }
                Some(_) = trigger_rx.recv() => {
                    if let Err(e) = self.run_cycle().await {
                        tracing::error!(error = %e, "Triggered check cycle aborted");
                    }
                }
                else => break,
            }

            let running = self.running.read().await;
            if !*running {
                break;
            }
        }

        tracing::info!("Check scheduler stopped");
    }

    /// Stop the scheduler after the current cycle
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        *running = false;
    }

    /// Enumerate the inventory and offer every identity to the check queue.
    ///
    /// Fire-and-forget: "done" means every identity was offered, not that any
    /// check ran. A dispatch failure for one identity is logged and the rest
    /// of the fleet still gets submitted. Only an enumeration failure aborts
    /// the cycle.
    pub async fn run_cycle(&self) -> Result<CycleSummary, StorageError> {
        tracing::debug!("Starting check cycle");

        let mut identities = self.inventory.resource_identities().await?;
        let mut summary = CycleSummary::default();

        while let Some(item) = identities.next().await {
            let identity = item?;

            match self.queue.schedule_check(&identity).await {
                Ok(()) => summary.submitted += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(
                        resource = %identity,
                        error = %e,
                        "Failed to schedule check, continuing with remaining resources"
                    );
                }
            }
        }

        tracing::debug!(
            submitted = summary.submitted,
            failed = summary.failed,
            "Check cycle complete"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::scheduler::queue::DispatchError;
    use crate::storage::{ResourceIdentityStream, StorageResult};
    use async_trait::async_trait;
    use caravel_types::ResourceIdentity;
    use futures::stream::{self, StreamExt};
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct StaticInventory {
        identities: Vec<ResourceIdentity>,
    }

    #[async_trait]
    impl ResourceInventory for StaticInventory {
        async fn resource_identities(&self) -> StorageResult<ResourceIdentityStream> {
            let snapshot = self.identities.clone();
            Ok(stream::iter(snapshot.into_iter().map(Ok)).boxed())
        }

        async fn register_resource(&self, _identity: ResourceIdentity) -> StorageResult<()> {
            Ok(())
        }

        async fn deregister_resource(&self, _identity: &ResourceIdentity) -> StorageResult<bool> {
            Ok(false)
        }
    }

    struct UnavailableInventory;

    #[async_trait]
    impl ResourceInventory for UnavailableInventory {
        async fn resource_identities(&self) -> StorageResult<ResourceIdentityStream> {
            Err(StorageError::Unavailable("inventory offline".to_string()))
        }

        async fn register_resource(&self, _identity: ResourceIdentity) -> StorageResult<()> {
            Ok(())
        }

        async fn deregister_resource(&self, _identity: &ResourceIdentity) -> StorageResult<bool> {
            Ok(false)
        }
    }

    #[derive(Default)]
    struct RecordingQueue {
        submissions: Mutex<Vec<ResourceIdentity>>,
        reject_names: HashSet<String>,
    }

    impl RecordingQueue {
        fn rejecting(names: &[&str]) -> Self {
            Self {
                submissions: Mutex::new(Vec::new()),
                reject_names: names.iter().map(|n| n.to_string()).collect(),
            }
        }

        fn submitted(&self) -> Vec<ResourceIdentity> {
            self.submissions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CheckQueue for RecordingQueue {
        async fn schedule_check(&self, identity: &ResourceIdentity) -> Result<(), DispatchError> {
            if self.reject_names.contains(&identity.name) {
                return Err(DispatchError::Rejected {
                    identity: identity.to_string(),
                    reason: "queue said no".to_string(),
                });
            }
            self.submissions.lock().unwrap().push(identity.clone());
            Ok(())
        }
    }

    fn identities(names: &[&str]) -> Vec<ResourceIdentity> {
        names
            .iter()
            .map(|n| ResourceIdentity::new(*n, "ec2/v1", "cluster"))
            .collect()
    }

    fn scheduler_with(
        inventory: Arc<dyn ResourceInventory>,
        queue: Arc<dyn CheckQueue>,
    ) -> Arc<CheckScheduler> {
        let (scheduler, _trigger_rx) = CheckScheduler::new(SchedulerConfig::default(), inventory, queue);
        scheduler
    }

    #[tokio::test]
    async fn test_cycle_submits_every_identity_once() {
        let inventory = Arc::new(StaticInventory {
            identities: identities(&["r1", "r2"]),
        });
        let queue = Arc::new(RecordingQueue::default());
        let scheduler = scheduler_with(inventory, queue.clone());

        let summary = scheduler.run_cycle().await.unwrap();

        assert_eq!(summary.submitted, 2);
        assert_eq!(summary.failed, 0);

        let submitted = queue.submitted();
        assert_eq!(submitted.len(), 2);
        let names: HashSet<_> = submitted.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, HashSet::from(["r1", "r2"]));
    }

    #[tokio::test]
    async fn test_one_failed_dispatch_does_not_abort_the_cycle() {
        let inventory = Arc::new(StaticInventory {
            identities: identities(&["r1", "bad", "r3"]),
        });
        let queue = Arc::new(RecordingQueue::rejecting(&["bad"]));
        let scheduler = scheduler_with(inventory, queue.clone());

        let summary = scheduler.run_cycle().await.unwrap();

        assert_eq!(summary.submitted, 2);
        assert_eq!(summary.failed, 1);

        let names: HashSet<_> = queue
            .submitted()
            .iter()
            .map(|i| i.name.clone())
            .collect();
        assert_eq!(
            names,
            HashSet::from(["r1".to_string(), "r3".to_string()])
        );
    }

    #[tokio::test]
    async fn test_unavailable_inventory_aborts_the_cycle() {
        let queue = Arc::new(RecordingQueue::default());
        let scheduler = scheduler_with(Arc::new(UnavailableInventory), queue.clone());

        let err = scheduler.run_cycle().await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert!(queue.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_empty_inventory_is_a_quiet_cycle() {
        let inventory = Arc::new(StaticInventory { identities: vec![] });
        let queue = Arc::new(RecordingQueue::default());
        let scheduler = scheduler_with(inventory, queue.clone());

        let summary = scheduler.run_cycle().await.unwrap();
        assert_eq!(summary, CycleSummary::default());
    }

    #[tokio::test]
    async fn test_cycles_are_memoryless() {
        let inventory = Arc::new(StaticInventory {
            identities: identities(&["r1"]),
        });
        let queue = Arc::new(RecordingQueue::default());
        let scheduler = scheduler_with(inventory, queue.clone());

        scheduler.run_cycle().await.unwrap();
        scheduler.run_cycle().await.unwrap();

        // Both cycles offered the identity; deduplication is the queue's job
        assert_eq!(queue.submitted().len(), 2);
    }
}
