//! Caravel Daemon library
//!
//! This module provides the core components for the Caravel daemon:
//! - Check scheduler: periodic re-examination of every managed resource
//! - Constraint gate: auditable manual-judgement state machine
//! - Manifest service: delivery config upsert/get/delete/diff
//! - Storage contracts and an in-memory backend
//! - REST API and server lifecycle management

pub mod api;
pub mod config;
pub mod constraints;
pub mod diff;
pub mod error;
pub mod manifests;
pub mod scheduler;
pub mod server;
pub mod storage;

pub use config::DaemonConfig;
pub use constraints::{ConstraintGate, DEFAULT_CONSTRAINT_HISTORY_LIMIT};
pub use error::{ApiError, DaemonError, GateError, ManifestError, StorageError};
pub use manifests::ManifestService;
pub use scheduler::{CheckQueue, CheckScheduler, InMemoryCheckQueue};
pub use server::Server;
pub use storage::{InMemoryStorage, Storage};
