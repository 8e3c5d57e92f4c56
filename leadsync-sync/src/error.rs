//! Error types for leadsync-sync.

use thiserror::Error;

use leadsync_core::SourceError;

/// Errors that stop a whole cycle or bootstrap run.
///
/// Per-record write failures never surface here; they are collected in the
/// pass report and the pass moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// One of the two collections could not be fetched, so no consistent
    /// snapshot exists for this cycle.
    #[error("could not fetch {collection} snapshot: {source}")]
    Snapshot {
        collection: &'static str,
        #[source]
        source: SourceError,
    },
}

pub(crate) fn snapshot_err(collection: &'static str, source: SourceError) -> SyncError {
    SyncError::Snapshot { collection, source }
}
