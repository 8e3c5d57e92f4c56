//! Polling runtime: runs a reconciliation cycle, sleeps for the configured
//! interval, repeats until interrupted.

mod error;
mod runtime;

pub use error::DaemonError;
pub use runtime::{init_tracing, run, run_until, start_blocking, LoopSummary};
