//! Storage backends

mod memory;
mod traits;

pub use memory::InMemoryStorage;
pub use traits::{
    ConfigStore, ConstraintStore, ResourceIdentityStream, ResourceInventory, Storage,
    StorageResult,
};
