//! # smarthub-app
//!
//! Application layer: the hub, observer fan-out, reports and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Observer`: sink notified of every hub event
//!   - `EventLog`: read access to the durable command log
//!   - `ConfigStore`: load & save the hub configuration
//!   - `Clock`: source of timestamps
//! - Provide the **driving** side:
//!   - `Hub`: device registry, command dispatch, routines
//!   - `report`: pure aggregations over the log and live devices
//! - Provide **in-process infrastructure** (observer bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `smarthub-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod bus;
pub mod hub;
pub mod ports;
pub mod report;

pub use bus::ObserverBus;
pub use hub::{CommandOutcome, Hub, RoutineReport, StepOutcome, StepReport};
