use sheetlink_model::AddressError;
use thiserror::Error;

use crate::transport::RemoteError;

/// Errors surfaced by the synchronization client.
#[derive(Debug, Error)]
pub enum Error {
    /// Local address/label/range parsing failure; caller misuse, never
    /// retried.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// The remote reported a non-success status for a single request.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// One or more flush batches failed while others may have already
    /// landed. There is no rollback; the cells of failed batches stay dirty,
    /// so re-invoking synchronize retries exactly the outstanding work.
    #[error("{failed} of {total} flush batches failed; first error: {first}")]
    PartialFlush {
        failed: usize,
        total: usize,
        first: RemoteError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
