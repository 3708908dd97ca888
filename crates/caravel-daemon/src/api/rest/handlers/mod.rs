//! API request handlers

mod constraints;
mod delivery_configs;
mod health;

pub use constraints::*;
pub use delivery_configs::*;
pub use health::*;
