//! # smarthub-domain
//!
//! Pure domain model for the smarthub home automation hub.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** and their per-kind finite-state machines
//!   (doors, lights, outlets, alarms, microwaves, TVs)
//! - Define the **Device registry** (kind → constructor)
//! - Define **Events** (device added/removed, command executed) and the
//!   durable **log records** derived from them
//! - Define **Routines** (named batches of device commands)
//! - Define the persisted **snapshot** schema and its validation
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod event;
pub mod routine;
pub mod snapshot;
