use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::Semaphore;

use sheetlink_model::{Document, RangeRef, Sheet, SheetProperties};

use crate::cache::DocumentCache;
use crate::error::{Error, Result};
use crate::request::{Dimension, Request};
use crate::transport::{RemoteError, Transport};

/// Tuning knobs for the batched flush protocol.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Maximum number of dirty cells per batch-update request
    /// (default: 1000), bounding payload size against remote limits.
    pub max_cells_per_batch: usize,
    /// Maximum number of simultaneously in-flight batches (default: 300);
    /// the sole backpressure mechanism for the flush.
    pub max_inflight_batches: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_cells_per_batch: 1000,
            max_inflight_batches: 300,
        }
    }
}

/// The main entry point: fetches documents (optionally through the read
/// cache) and flushes locally edited sheets back to the remote.
///
/// A single sheet must not be synchronized by more than one call at a time;
/// the `&mut Sheet` receiver enforces that per sheet.
#[derive(Debug)]
pub struct Service<T> {
    transport: T,
    config: SyncConfig,
    cache: DocumentCache,
}

impl<T: Transport> Service<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SyncConfig::default())
    }

    pub fn with_config(transport: T, config: SyncConfig) -> Self {
        Service {
            transport,
            config,
            cache: DocumentCache::default(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch a document, bypassing the read cache.
    pub async fn fetch(&self, id: &str) -> Result<Document> {
        self.fetch_with_cache(id, Duration::ZERO).await
    }

    /// Fetch a document, returning a cached snapshot while one younger than
    /// `ttl` exists. A zero `ttl` always refetches.
    pub async fn fetch_with_cache(&self, id: &str, ttl: Duration) -> Result<Document> {
        if let Some(cached) = self.cache.get(id, ttl) {
            log::debug!("document {id}: serving cached snapshot");
            return Ok(cached);
        }
        let document = self.transport.fetch_document(id).await?;
        if !ttl.is_zero() {
            self.cache.store(id, &document);
        }
        Ok(document)
    }

    /// Re-fetch a document and replace its contents in place.
    pub async fn reload(&self, document: &mut Document) -> Result<()> {
        *document = self.fetch(&document.id).await?;
        Ok(())
    }

    /// Flush a sheet's locally edited cells to the remote document.
    ///
    /// If local writes grew the sheet beyond its committed bounds, a single
    /// structural resize precedes the flush; a resize failure aborts before
    /// any cell update is sent. Dirty cells are then partitioned into
    /// batches and dispatched concurrently under the configured in-flight
    /// limit; the call returns once every batch has finished.
    ///
    /// Batches are independent and there is no cross-batch atomicity: cells
    /// of batches that landed are no longer dirty even when another batch
    /// fails, in which case [`Error::PartialFlush`] carries the first error
    /// and the still-dirty cells describe exactly the work a retry resends.
    pub async fn synchronize(&self, sheet: &mut Sheet) -> Result<()> {
        if sheet.needs_resize() {
            let (rows, columns) = sheet.pending_bounds();
            let request = Request::expand_grid(sheet.sheet_id(), rows, columns);
            self.transport
                .post_batch_update(sheet.document_id(), vec![request])
                .await?;
        }
        if !sheet.has_dirty() {
            sheet.commit_sync();
            return Ok(());
        }

        let sheet_id = sheet.sheet_id();
        let document_id = sheet.document_id().to_string();

        // Snapshot the dirty set: per batch, the requests to send plus the
        // coordinates to acknowledge when the batch lands.
        let mut batches: Vec<(Vec<(u32, u32)>, Vec<Request>)> = Vec::new();
        {
            let dirty: Vec<_> = sheet.dirty_cells().collect();
            for chunk in dirty.chunks(self.config.max_cells_per_batch) {
                let coords = chunk.iter().map(|c| (c.row(), c.column())).collect();
                let requests = chunk
                    .iter()
                    .map(|c| Request::update_cell(sheet_id, c))
                    .collect();
                batches.push((coords, requests));
            }
            log::debug!(
                "sheet {sheet_id}: flushing {} dirty cells in {} batches",
                dirty.len(),
                batches.len()
            );
        }

        let semaphore = Semaphore::new(self.config.max_inflight_batches);
        let outcomes = join_all(batches.iter().map(|(_, requests)| {
            let semaphore = &semaphore;
            let document_id = document_id.as_str();
            let requests = requests.clone();
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                self.transport.post_batch_update(document_id, requests).await
            }
        }))
        .await;

        let total = batches.len();
        let mut failed = 0usize;
        let mut first_error: Option<RemoteError> = None;
        for ((coords, _), outcome) in batches.iter().zip(outcomes) {
            match outcome {
                Ok(()) => sheet.mark_flushed(coords),
                Err(err) => {
                    log::warn!("sheet {sheet_id}: flush batch failed: {err}");
                    failed += 1;
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        match first_error {
            None => {
                sheet.commit_sync();
                Ok(())
            }
            Some(first) => Err(Error::PartialFlush {
                failed,
                total,
                first,
            }),
        }
    }

    /// Grow the remote grid (and the local pending bounds) to
    /// `rows` × `columns`.
    pub async fn expand_sheet(&self, sheet: &mut Sheet, rows: u32, columns: u32) -> Result<()> {
        let request = Request::expand_grid(sheet.sheet_id(), rows, columns);
        self.transport
            .post_batch_update(sheet.document_id(), vec![request])
            .await?;
        sheet.raise_pending(rows, columns);
        Ok(())
    }

    /// Apply a field-masked sheet-properties update (title, index, frozen
    /// counts, visibility, …). A no-op when nothing differs.
    pub async fn update_sheet_properties(
        &self,
        sheet: &mut Sheet,
        desired: SheetProperties,
    ) -> Result<()> {
        let Some(request) = Request::sheet_properties_diff(&sheet.properties, &desired) else {
            return Ok(());
        };
        self.transport
            .post_batch_update(sheet.document_id(), vec![request])
            .await?;
        sheet.properties = desired;
        Ok(())
    }

    /// Add a sheet to a document, then reload the document so the new sheet
    /// is mirrored locally.
    pub async fn add_sheet(
        &self,
        document: &mut Document,
        properties: SheetProperties,
    ) -> Result<()> {
        self.transport
            .post_batch_update(&document.id, vec![Request::add_sheet(properties)])
            .await?;
        self.reload(document).await
    }

    /// Delete a sheet from a document, then reload.
    pub async fn delete_sheet(&self, document: &mut Document, sheet_id: u32) -> Result<()> {
        self.transport
            .post_batch_update(&document.id, vec![Request::delete_sheet(sheet_id)])
            .await?;
        self.reload(document).await
    }

    /// Duplicate a sheet's contents at `insert_index` under `title`, then
    /// reload.
    pub async fn duplicate_sheet(
        &self,
        document: &mut Document,
        sheet_id: u32,
        insert_index: u32,
        title: &str,
    ) -> Result<()> {
        self.transport
            .post_batch_update(
                &document.id,
                vec![Request::duplicate_sheet(sheet_id, insert_index, title)],
            )
            .await?;
        self.reload(document).await
    }

    /// Delete rows `[start, end)` from a sheet, adjusting the local bounds.
    pub async fn delete_rows(&self, sheet: &mut Sheet, start: u32, end: u32) -> Result<()> {
        let request = Request::delete_dimension(sheet.sheet_id(), Dimension::Rows, start, end);
        self.transport
            .post_batch_update(sheet.document_id(), vec![request])
            .await?;
        sheet.shrink_rows(end.saturating_sub(start));
        Ok(())
    }

    /// Delete columns `[start, end)` from a sheet, adjusting the local
    /// bounds.
    pub async fn delete_columns(&self, sheet: &mut Sheet, start: u32, end: u32) -> Result<()> {
        let request = Request::delete_dimension(sheet.sheet_id(), Dimension::Columns, start, end);
        self.transport
            .post_batch_update(sheet.document_id(), vec![request])
            .await?;
        sheet.shrink_columns(end.saturating_sub(start));
        Ok(())
    }

    /// Values-only write path: overwrite a rectangular range with raw rows,
    /// without per-field masks.
    pub async fn update_values(
        &self,
        document_id: &str,
        range: &RangeRef,
        rows: Vec<Vec<String>>,
    ) -> Result<()> {
        self.transport
            .post_values_update(document_id, &range.to_string(), rows)
            .await?;
        Ok(())
    }
}
