//! Delivery config manifest service
//!
//! Thin orchestration over the config store: validated upsert, lookup,
//! delete-returning-prior-value, and diff delegation. Upserts and deletes
//! also keep the resource inventory in step with what the manifests declare,
//! which is what the check scheduler cycles over.

use crate::diff::Differ;
use crate::error::ManifestError;
use crate::storage::{ConfigStore, ResourceInventory};
use caravel_types::{DeliveryConfig, EnvironmentDiff};
use std::collections::HashSet;
use std::sync::Arc;

/// Manages delivery config manifests
pub struct ManifestService {
    configs: Arc<dyn ConfigStore>,
    inventory: Arc<dyn ResourceInventory>,
    differ: Arc<dyn Differ>,
}

impl ManifestService {
    pub fn new(
        configs: Arc<dyn ConfigStore>,
        inventory: Arc<dyn ResourceInventory>,
        differ: Arc<dyn Differ>,
    ) -> Self {
        Self {
            configs,
            inventory,
            differ,
        }
    }

    /// Create or replace a manifest by name.
    ///
    /// Registers every declared resource with the inventory and deregisters
    /// resources the previous revision declared but this one dropped.
    pub async fn upsert(&self, config: DeliveryConfig) -> Result<DeliveryConfig, ManifestError> {
        self.validate(&config)?;

        let declared: HashSet<_> = config.resource_identities().cloned().collect();

        if let Some(previous) = self.configs.get_delivery_config(&config.name).await? {
            for identity in previous.resource_identities() {
                if !declared.contains(identity) {
                    self.inventory.deregister_resource(identity).await?;
                    tracing::debug!(resource = %identity, "Deregistered dropped resource");
                }
            }
        }

        for identity in &declared {
            self.inventory.register_resource(identity.clone()).await?;
        }

        self.configs.upsert_delivery_config(config.clone()).await?;

        tracing::info!(
            name = %config.name,
            environments = config.environments.len(),
            resources = declared.len(),
            "Upserted delivery config"
        );

        Ok(config)
    }

    /// Fetch a manifest by name.
    pub async fn get(&self, name: &str) -> Result<DeliveryConfig, ManifestError> {
        self.configs
            .get_delivery_config(name)
            .await?
            .ok_or_else(|| ManifestError::NotFound(name.to_string()))
    }

    /// Delete a manifest and return it as it existed immediately before.
    ///
    /// Every resource the manifest declared leaves management.
    pub async fn delete(&self, name: &str) -> Result<DeliveryConfig, ManifestError> {
        let config = self.get(name).await?;

        for identity in config.resource_identities() {
            self.inventory.deregister_resource(identity).await?;
        }

        self.configs.delete_delivery_config(name).await?;

        tracing::info!(name = %name, "Deleted delivery config");

        Ok(config)
    }

    /// Compute environment diffs for an unsaved manifest.
    pub async fn diff(&self, config: &DeliveryConfig) -> Result<Vec<EnvironmentDiff>, ManifestError> {
        self.validate(config)?;
        Ok(self.differ.calculate(config).await?)
    }

    /// Structural validation only; content semantics belong to the
    /// promotion machinery.
    pub fn validate(&self, config: &DeliveryConfig) -> Result<(), ManifestError> {
        if config.name.is_empty() {
            return Err(ManifestError::InvalidManifest(
                "manifest name must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for env in &config.environments {
            if env.name.is_empty() {
                return Err(ManifestError::InvalidManifest(format!(
                    "manifest {} has an environment with an empty name",
                    config.name
                )));
            }
            if !seen.insert(env.name.as_str()) {
                return Err(ManifestError::InvalidManifest(format!(
                    "duplicate environment {} in manifest {}",
                    env.name, config.name
                )));
            }
        }

        let artifact_names: HashSet<_> = config.artifacts.iter().map(|a| a.name.as_str()).collect();
        for env in &config.environments {
            for artifact_ref in &env.artifact_refs {
                if !artifact_names.contains(artifact_ref.as_str()) {
                    return Err(ManifestError::InvalidManifest(format!(
                        "environment {} references undeclared artifact {}",
                        env.name, artifact_ref
                    )));
                }
            }
        }

        Ok(())
    }
}
