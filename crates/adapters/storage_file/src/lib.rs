//! # smarthub-adapter-storage-file
//!
//! Flat-file persistence adapter.
//!
//! ## Responsibilities
//! - Implement `ConfigStore` with a JSON document replaced atomically on save
//! - Implement the durable event log as a CSV file: an `Observer` that
//!   appends state changes, and an `EventLog` that reads them back for reports
//! - Map between domain types and file rows
//!
//! ## Dependency rule
//! Depends on `smarthub-app` (for port traits) and `smarthub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod config_file;
pub mod error;
pub mod event_log;

pub use config_file::JsonConfigStore;
pub use error::StorageError;
pub use event_log::CsvEventLog;
