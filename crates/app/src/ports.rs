//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the hub and the adapter layer
//! can depend on them without creating circular dependencies.

pub mod clock;
pub mod config_store;
pub mod event_log;
pub mod observer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config_store::ConfigStore;
pub use event_log::EventLog;
pub use observer::Observer;
