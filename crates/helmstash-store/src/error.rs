//! Error types for helmstash-store.

use miette::Diagnostic;
use thiserror::Error;

/// Error type for release store operations.
#[derive(Error, Diagnostic, Debug)]
pub enum StoreError {
    /// The requested release does not exist. Recoverable; callers branch
    /// on this for create-vs-update decisions.
    #[error("Release '{unique_id}' not found")]
    #[diagnostic(code(helmstash_store::not_found))]
    NotFound { unique_id: String },

    #[error("Release has no unique_id")]
    #[diagnostic(
        code(helmstash_store::missing_unique_id),
        help("Assign a unique_id before persisting a release")
    )]
    MissingUniqueId,

    #[error("Invalid batch size {0}")]
    #[diagnostic(code(helmstash_store::invalid_batch_size))]
    InvalidBatchSize(usize),

    #[error("{backend} {op} failed: {message}")]
    #[diagnostic(
        code(helmstash_store::backend),
        help("Check backend connectivity, credentials, and provisioning")
    )]
    Backend {
        backend: &'static str,
        op: &'static str,
        message: String,
    },

    /// A bulk load aborted mid-sequence. Chunks before `failed_chunk` were
    /// written and are not rolled back.
    #[error("Bulk load aborted at chunk {failed_chunk} of {total_chunks}")]
    #[diagnostic(
        code(helmstash_store::partial_load),
        help("Some unknown prefix of the input was written; re-loading is safe (last writer wins)")
    )]
    PartialLoad {
        failed_chunk: usize,
        total_chunks: usize,
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub(crate) fn backend(
        backend: &'static str,
        op: &'static str,
        err: impl std::fmt::Display,
    ) -> Self {
        StoreError::Backend {
            backend,
            op,
            message: err.to_string(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
