//! Check scheduling

mod checker;
mod queue;

pub use checker::{CheckScheduler, CycleSummary};
pub use queue::{CheckQueue, DispatchError, InMemoryCheckQueue};
