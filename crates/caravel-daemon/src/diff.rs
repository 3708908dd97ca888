//! Ad-hoc manifest diffing

use crate::storage::{ConfigStore, StorageResult};
use async_trait::async_trait;
use caravel_types::{DeliveryConfig, Environment, EnvironmentDiff, ResourceIdentity};
use std::collections::HashSet;
use std::sync::Arc;

/// Computes environment diffs for an unsaved manifest
#[async_trait]
pub trait Differ: Send + Sync {
    async fn calculate(&self, submitted: &DeliveryConfig) -> StorageResult<Vec<EnvironmentDiff>>;
}

/// Compares a submitted manifest against the stored revision, per
/// environment, at the resource-identity level.
pub struct AdHocDiffer {
    configs: Arc<dyn ConfigStore>,
}

impl AdHocDiffer {
    pub fn new(configs: Arc<dyn ConfigStore>) -> Self {
        Self { configs }
    }
}

#[async_trait]
impl Differ for AdHocDiffer {
    async fn calculate(&self, submitted: &DeliveryConfig) -> StorageResult<Vec<EnvironmentDiff>> {
        let stored = self.configs.get_delivery_config(&submitted.name).await?;

        let mut diffs: Vec<EnvironmentDiff> = submitted
            .environments
            .iter()
            .map(|env| {
                let stored_env = stored
                    .as_ref()
                    .and_then(|c| c.environments.iter().find(|e| e.name == env.name));
                diff_environment(env, stored_env)
            })
            .collect();

        // Environments that only the stored revision knows about
        if let Some(stored) = &stored {
            for env in &stored.environments {
                if !submitted.environments.iter().any(|e| e.name == env.name) {
                    diffs.push(EnvironmentDiff {
                        name: env.name.clone(),
                        added: vec![],
                        removed: env.resources.iter().map(ResourceIdentity::to_string).collect(),
                        unchanged: vec![],
                    });
                }
            }
        }

        Ok(diffs)
    }
}

fn diff_environment(submitted: &Environment, stored: Option<&Environment>) -> EnvironmentDiff {
    let stored_resources: HashSet<&ResourceIdentity> = stored
        .map(|e| e.resources.iter().collect())
        .unwrap_or_default();
    let submitted_resources: HashSet<&ResourceIdentity> = submitted.resources.iter().collect();

    let mut added: Vec<String> = submitted_resources
        .difference(&stored_resources)
        .map(|i| i.to_string())
        .collect();
    let mut removed: Vec<String> = stored_resources
        .difference(&submitted_resources)
        .map(|i| i.to_string())
        .collect();
    let mut unchanged: Vec<String> = submitted_resources
        .intersection(&stored_resources)
        .map(|i| i.to_string())
        .collect();

    added.sort();
    removed.sort();
    unchanged.sort();

    EnvironmentDiff {
        name: submitted.name.clone(),
        added,
        removed,
        unchanged,
    }
}
