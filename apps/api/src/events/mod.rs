// Event store reconciler: the canonical schedule event log and everything that
// mutates it (rollover, merge, manual edits).

pub mod handlers;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod sweeper;
pub mod timefmt;

pub use model::Event;
pub use store::EventStore;
