use thiserror::Error;

/// Error surface for the polling runtime.
///
/// Nothing that happens inside a cycle is represented here: cycle failures
/// are logged and the loop moves on.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("interrupt handler failed: {0}")]
    Signal(#[source] std::io::Error),

    #[error("{task} task join failure: {message}")]
    Join { task: &'static str, message: String },
}
