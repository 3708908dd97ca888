//! Storage trait definitions
//!
//! External collaborators are modelled as plain async traits, constructed
//! once at process start and shared by reference. All state lives behind
//! these contracts; the services on top hold no caches of their own.

use crate::error::StorageError;
use async_trait::async_trait;
use caravel_types::{ConstraintKey, ConstraintState, DeliveryConfig, ResourceIdentity};
use futures::stream::BoxStream;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Stream of managed resource identities
pub type ResourceIdentityStream = BoxStream<'static, StorageResult<ResourceIdentity>>;

/// Combined storage trait
#[async_trait]
pub trait Storage: ResourceInventory + ConfigStore + ConstraintStore + Send + Sync {}

/// Inventory of all currently managed resources
#[async_trait]
pub trait ResourceInventory: Send + Sync {
    /// Enumerate every managed resource identity.
    ///
    /// The result is a stream so backends with large fleets can yield
    /// identities without materializing the full set. The initial call fails
    /// if the inventory is unavailable; individual items may also fail for
    /// backends that page lazily.
    async fn resource_identities(&self) -> StorageResult<ResourceIdentityStream>;

    /// Put a resource under management
    async fn register_resource(&self, identity: ResourceIdentity) -> StorageResult<()>;

    /// Remove a resource from management
    async fn deregister_resource(&self, identity: &ResourceIdentity) -> StorageResult<bool>;
}

/// Storage for delivery config manifests
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Get a delivery config by name
    async fn get_delivery_config(&self, name: &str) -> StorageResult<Option<DeliveryConfig>>;

    /// List all delivery configs
    async fn list_delivery_configs(&self) -> StorageResult<Vec<DeliveryConfig>>;

    /// Create or replace a delivery config
    async fn upsert_delivery_config(&self, config: DeliveryConfig) -> StorageResult<()>;

    /// Delete a delivery config by name
    async fn delete_delivery_config(&self, name: &str) -> StorageResult<bool>;
}

/// Storage for constraint-state records
///
/// Saving overwrites the single current record at the key while retaining
/// prior writes for `constraint_state_history`.
#[async_trait]
pub trait ConstraintStore: Send + Sync {
    /// Get the current record at a key
    async fn get_constraint_state(
        &self,
        key: &ConstraintKey,
    ) -> StorageResult<Option<ConstraintState>>;

    /// Overwrite the current record at the state's key
    async fn store_constraint_state(&self, state: ConstraintState) -> StorageResult<()>;

    /// List records for an environment, newest write first, bounded by `limit`
    async fn constraint_state_history(
        &self,
        delivery_config: &str,
        environment: &str,
        limit: usize,
    ) -> StorageResult<Vec<ConstraintState>>;
}
