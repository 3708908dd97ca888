//! Environment diff results

use serde::{Deserialize, Serialize};

/// Per-environment summary of how a submitted manifest differs from the
/// stored revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentDiff {
    /// Environment name
    pub name: String,

    /// Resources present only in the submitted manifest
    pub added: Vec<String>,

    /// Resources present only in the stored manifest
    pub removed: Vec<String>,

    /// Resources present in both
    pub unchanged: Vec<String>,
}

impl EnvironmentDiff {
    /// Whether the submitted environment matches the stored one.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
