//! In-memory storage implementation

use super::traits::*;
use async_trait::async_trait;
use caravel_types::{ConstraintKey, ConstraintState, DeliveryConfig, ResourceIdentity};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// In-memory storage for development and testing
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    resources: RwLock<HashSet<ResourceIdentity>>,
    configs: RwLock<HashMap<String, DeliveryConfig>>,
    constraints: RwLock<HashMap<ConstraintKey, ConstraintState>>,
    // Append log per (config, environment); history reads walk it backwards
    constraint_log: RwLock<HashMap<(String, String), Vec<ConstraintState>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {}

#[async_trait]
impl ResourceInventory for InMemoryStorage {
    async fn resource_identities(&self) -> StorageResult<ResourceIdentityStream> {
        // The in-memory backend has the full set resident anyway; a snapshot
        // keeps the stream detached from the lock.
        let snapshot: Vec<ResourceIdentity> = self.resources.read().await.iter().cloned().collect();
        Ok(stream::iter(snapshot.into_iter().map(Ok)).boxed())
    }

    async fn register_resource(&self, identity: ResourceIdentity) -> StorageResult<()> {
        let mut resources = self.resources.write().await;
        resources.insert(identity);
        Ok(())
    }

    async fn deregister_resource(&self, identity: &ResourceIdentity) -> StorageResult<bool> {
        let mut resources = self.resources.write().await;
        Ok(resources.remove(identity))
    }
}

#[async_trait]
impl ConfigStore for InMemoryStorage {
    async fn get_delivery_config(&self, name: &str) -> StorageResult<Option<DeliveryConfig>> {
        let configs = self.configs.read().await;
        Ok(configs.get(name).cloned())
    }

    async fn list_delivery_configs(&self) -> StorageResult<Vec<DeliveryConfig>> {
        let configs = self.configs.read().await;
        Ok(configs.values().cloned().collect())
    }

    async fn upsert_delivery_config(&self, config: DeliveryConfig) -> StorageResult<()> {
        let mut configs = self.configs.write().await;
        configs.insert(config.name.clone(), config);
        Ok(())
    }

    async fn delete_delivery_config(&self, name: &str) -> StorageResult<bool> {
        let mut configs = self.configs.write().await;
        Ok(configs.remove(name).is_some())
    }
}

#[async_trait]
impl ConstraintStore for InMemoryStorage {
    async fn get_constraint_state(
        &self,
        key: &ConstraintKey,
    ) -> StorageResult<Option<ConstraintState>> {
        let constraints = self.constraints.read().await;
        Ok(constraints.get(key).cloned())
    }

    async fn store_constraint_state(&self, state: ConstraintState) -> StorageResult<()> {
        let log_key = (state.key.delivery_config.clone(), state.key.environment.clone());

        let mut constraints = self.constraints.write().await;
        let mut log = self.constraint_log.write().await;

        log.entry(log_key).or_default().push(state.clone());
        constraints.insert(state.key.clone(), state);
        Ok(())
    }

    async fn constraint_state_history(
        &self,
        delivery_config: &str,
        environment: &str,
        limit: usize,
    ) -> StorageResult<Vec<ConstraintState>> {
        let log = self.constraint_log.read().await;
        let entries = log
            .get(&(delivery_config.to_string(), environment.to_string()))
            .map(|writes| writes.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caravel_types::ConstraintStatus;
    use chrono::Utc;

    fn identity(name: &str) -> ResourceIdentity {
        ResourceIdentity::new(name, "ec2/v1", "cluster")
    }

    #[tokio::test]
    async fn test_resource_registration_deduplicates() {
        let storage = InMemoryStorage::new();
        storage.register_resource(identity("web")).await.unwrap();
        storage.register_resource(identity("web")).await.unwrap();

        let identities: Vec<_> = storage
            .resource_identities()
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await;
        assert_eq!(identities.len(), 1);
    }

    #[tokio::test]
    async fn test_deregister_missing_resource_is_false() {
        let storage = InMemoryStorage::new();
        assert!(!storage.deregister_resource(&identity("web")).await.unwrap());
    }

    #[tokio::test]
    async fn test_constraint_save_overwrites_current_and_keeps_history() {
        let storage = InMemoryStorage::new();
        let key = ConstraintKey::new("app1", "prod", "1.2.3", "manual-judgement");

        let pending = ConstraintState::pending(key.clone(), None);
        storage.store_constraint_state(pending.clone()).await.unwrap();

        let judged = pending.with_judgement(ConstraintStatus::Pass, None, "alice", Utc::now());
        storage.store_constraint_state(judged.clone()).await.unwrap();

        // Single current record at the key
        let current = storage.get_constraint_state(&key).await.unwrap().unwrap();
        assert_eq!(current.status, ConstraintStatus::Pass);

        // Both writes retained, newest first
        let history = storage
            .constraint_state_history("app1", "prod", 10)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, ConstraintStatus::Pass);
        assert_eq!(history[1].status, ConstraintStatus::Pending);
    }

    #[tokio::test]
    async fn test_constraint_history_respects_limit() {
        let storage = InMemoryStorage::new();
        for version in ["1.0.0", "1.0.1", "1.0.2"] {
            let key = ConstraintKey::new("app1", "prod", version, "manual-judgement");
            storage
                .store_constraint_state(ConstraintState::pending(key, None))
                .await
                .unwrap();
        }

        let history = storage
            .constraint_state_history("app1", "prod", 2)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].key.artifact_version, "1.0.2");
        assert_eq!(history[1].key.artifact_version, "1.0.1");
    }

    #[tokio::test]
    async fn test_history_for_unknown_environment_is_empty() {
        let storage = InMemoryStorage::new();
        let history = storage
            .constraint_state_history("app1", "staging", 10)
            .await
            .unwrap();
        assert!(history.is_empty());
    }
}
