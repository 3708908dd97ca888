//! Caravel Types - Core types for declarative continuous delivery
//!
//! Caravel keeps a fleet of managed resources converged on the state declared
//! in delivery config manifests, and gates environment promotions behind
//! explicit, attributable judgements.
//!
//! ## Key Concepts
//!
//! - **ResourceIdentity**: Who a managed resource is, independent of its state
//! - **DeliveryConfig**: Manifest declaring environments, resources, artifacts
//! - **ConstraintState**: One manual-judgement decision point per
//!   (config, environment, artifact version, constraint type)
//! - **EnvironmentDiff**: Per-environment summary of drift against the stored
//!   manifest

#![deny(unsafe_code)]

pub mod constraint;
pub mod delivery;
pub mod diff;
pub mod resource;

// Re-export main types
pub use constraint::{ConstraintKey, ConstraintState, ConstraintStatus};
pub use delivery::{DeliveryArtifact, DeliveryConfig, Environment};
pub use diff::EnvironmentDiff;
pub use resource::ResourceIdentity;
