//! Offline-style synchronization client for remote spreadsheet documents.
//!
//! A fetched [`Document`](sheetlink_model::Document) mirrors the remote grid
//! in memory; cell edits are tracked per changed field, and
//! [`Service::synchronize`] flushes only those changes back, batched and
//! dispatched under bounded concurrency. The HTTP/auth layer stays behind
//! the [`Transport`] trait.

mod cache;
mod error;
pub mod request;
mod service;
mod transport;

pub use error::{Error, Result};
pub use request::{Dimension, Request};
pub use service::{Service, SyncConfig};
pub use transport::{RemoteError, Transport};

pub use sheetlink_model as model;
