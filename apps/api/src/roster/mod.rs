// Employee roster and office scheduling rules.

pub mod handlers;
pub mod models;
pub mod store;

pub use models::{Employee, SchedulingRules};
pub use store::RosterStore;
