//! Leadsync core library: domain types, status policy, record-source
//! contracts, configuration, errors.
//!
//! - [`types`]: newtypes and records
//! - [`policy`]: [`StatusPolicy`]
//! - [`source`]: [`LeadSource`] / [`TaskBoard`]
//! - [`config`]: [`Settings`]
//! - [`memory`]: in-memory record sources
//! - [`error`]: [`SourceError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod memory;
pub mod policy;
pub mod source;
pub mod types;

pub use config::Settings;
pub use error::{ConfigError, SourceError};
pub use policy::StatusPolicy;
pub use source::{LeadSource, TaskBoard};
pub use types::{Lead, LeadId, LeadStatus, ListId, NewTask, Task, TaskId, TaskPatch};
