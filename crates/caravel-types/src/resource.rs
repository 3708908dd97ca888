//! Identity of a managed resource

use serde::{Deserialize, Serialize};
use std::fmt;

/// Uniquely identifies a managed resource across the system.
///
/// Equality is structural: two identities are the same resource exactly when
/// all three components match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentity {
    /// Resource name, unique within (api_version, kind)
    pub name: String,

    /// API version of the resource definition
    pub api_version: String,

    /// Resource kind
    pub kind: String,
}

impl ResourceIdentity {
    pub fn new(
        name: impl Into<String>,
        api_version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.api_version, self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        let a = ResourceIdentity::new("web", "ec2/v1", "cluster");
        let b = ResourceIdentity::new("web", "ec2/v1", "cluster");
        let c = ResourceIdentity::new("web", "ec2/v2", "cluster");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_includes_all_components() {
        let identity = ResourceIdentity::new("web", "ec2/v1", "cluster");
        assert_eq!(identity.to_string(), "ec2/v1/cluster/web");
    }
}
