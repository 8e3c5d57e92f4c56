//! # leadsync-sync
//!
//! Lead ↔ task reconciliation.
//!
//! Build a [`Reconciler`] from a lead source, a task board and a
//! [`StatusPolicy`](leadsync_core::StatusPolicy), then call
//! [`Reconciler::run_cycle`] for a bi-directional cycle or
//! [`Reconciler::run_initial`] for the bootstrap pass.

pub mod codec;
pub mod engine;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod plan;

pub use engine::{Direction, PassReport, RecordFailure, Reconciler, MUTATION_PAUSE};
pub use error::SyncError;
pub use index::{CorrelationIndex, Lookup};
pub use pipeline::{CycleReport, Snapshot};
