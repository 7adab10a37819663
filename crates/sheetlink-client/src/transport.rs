use std::future::Future;

use sheetlink_model::Document;
use thiserror::Error;

use crate::request::Request;

/// A structured non-success reported by the remote API, propagated verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("remote rejected request: status {status}, code {code}, message: {message}")]
pub struct RemoteError {
    pub status: String,
    pub code: u16,
    pub message: String,
}

/// The remote collaborator the synchronization engine talks to.
///
/// Implementations own authentication and the actual HTTP/JSON exchange;
/// everything above this trait treats the remote as three primitives.
pub trait Transport {
    /// Fetch a full document: its properties, each sheet's rectangular grid
    /// of formatted values and notes, and per-row/column visibility metadata.
    fn fetch_document(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Document, RemoteError>> + Send;

    /// The single write primitive: apply a batch of update requests to a
    /// document. Used for structural resizes and cell field updates alike.
    fn post_batch_update(
        &self,
        document_id: &str,
        requests: Vec<Request>,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Values-only write path with coarse per-range granularity, for
    /// integrations that do not need field-masked updates.
    fn post_values_update(
        &self,
        document_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
