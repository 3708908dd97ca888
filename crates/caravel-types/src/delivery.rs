//! Delivery config manifests

use crate::resource::ResourceIdentity;
use serde::{Deserialize, Serialize};

/// A named manifest describing the environments, resources and artifacts
/// under management.
///
/// Identity is the `name` field (unique, case-sensitive). Manifests are
/// created or replaced via upsert and destroyed via explicit delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Unique manifest name
    pub name: String,

    /// Application the manifest belongs to
    pub application: String,

    /// Artifacts whose versions flow through the environments
    #[serde(default)]
    pub artifacts: Vec<DeliveryArtifact>,

    /// Environments in promotion order
    #[serde(default)]
    pub environments: Vec<Environment>,
}

impl DeliveryConfig {
    /// All resource identities declared across every environment.
    pub fn resource_identities(&self) -> impl Iterator<Item = &ResourceIdentity> {
        self.environments.iter().flat_map(|e| e.resources.iter())
    }
}

/// A deployable artifact declared by a delivery config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryArtifact {
    /// Reference name used by environments
    pub name: String,

    /// Artifact kind (e.g. "docker", "deb")
    pub kind: String,

    /// Upstream reference the artifact versions are resolved from
    pub reference: String,
}

/// A single environment within a delivery config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Environment name, unique within the manifest
    pub name: String,

    /// Resources managed in this environment
    #[serde(default)]
    pub resources: Vec<ResourceIdentity>,

    /// Names of declared artifacts this environment deploys
    #[serde(default)]
    pub artifact_refs: Vec<String>,
}
