use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use sheetlink_client::model::Document;
use sheetlink_client::{Error, RemoteError, Request, Service, SyncConfig, Transport};

/// In-memory transport recording every call and failing the batch-update
/// calls whose sequence index was marked ahead of time.
#[derive(Default)]
struct MockTransport {
    document: serde_json::Value,
    fetches: AtomicUsize,
    batch_calls: Mutex<Vec<(String, Vec<Request>)>>,
    values_calls: Mutex<Vec<(String, String, Vec<Vec<String>>)>>,
    fail_calls: Mutex<HashSet<usize>>,
    batch_delay: Option<Duration>,
    inflight: AtomicUsize,
    max_inflight: AtomicUsize,
}

impl MockTransport {
    fn with_document(document: serde_json::Value) -> Self {
        MockTransport {
            document,
            ..MockTransport::default()
        }
    }

    fn fail_call(&self, index: usize) {
        self.fail_calls.lock().unwrap().insert(index);
    }

    fn batch_call_count(&self) -> usize {
        self.batch_calls.lock().unwrap().len()
    }

    fn batch_call(&self, index: usize) -> (String, Vec<Request>) {
        self.batch_calls.lock().unwrap()[index].clone()
    }
}

impl Transport for MockTransport {
    async fn fetch_document(&self, _id: &str) -> Result<Document, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::from_value(self.document.clone()).expect("fixture deserializes"))
    }

    async fn post_batch_update(
        &self,
        document_id: &str,
        requests: Vec<Request>,
    ) -> Result<(), RemoteError> {
        let index = {
            let mut calls = self.batch_calls.lock().unwrap();
            calls.push((document_id.to_string(), requests));
            calls.len() - 1
        };
        let current = self.inflight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_inflight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.batch_delay {
            tokio::time::sleep(delay).await;
        }
        self.inflight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_calls.lock().unwrap().contains(&index) {
            return Err(RemoteError {
                status: "INVALID_ARGUMENT".to_string(),
                code: 400,
                message: format!("call {index} rejected"),
            });
        }
        Ok(())
    }

    async fn post_values_update(
        &self,
        document_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), RemoteError> {
        self.values_calls
            .lock()
            .unwrap()
            .push((document_id.to_string(), range.to_string(), rows));
        Ok(())
    }
}

fn fixture() -> serde_json::Value {
    json!({
        "spreadsheetId": "doc-1",
        "properties": { "title": "Fixture" },
        "sheets": [
            {
                "properties": {
                    "sheetId": 1,
                    "title": "Main",
                    "gridProperties": { "rowCount": 10, "columnCount": 10 }
                },
                "data": [
                    {
                        "rowData": [
                            { "values": [ { "formattedValue": "seeded" } ] }
                        ]
                    }
                ]
            }
        ]
    })
}

fn service() -> Service<MockTransport> {
    Service::new(MockTransport::with_document(fixture()))
}

fn one_cell_per_batch() -> Service<MockTransport> {
    Service::with_config(
        MockTransport::with_document(fixture()),
        SyncConfig {
            max_cells_per_batch: 1,
            max_inflight_batches: 300,
        },
    )
}

#[tokio::test]
async fn synchronize_on_a_clean_sheet_is_a_silent_no_op() {
    let service = service();
    let mut document = service.fetch("doc-1").await.unwrap();
    let sheet = document.sheet_by_title_mut("Main").unwrap();

    service.synchronize(sheet).await.unwrap();
    assert_eq!(service.transport().batch_call_count(), 0);
}

#[tokio::test]
async fn field_masks_cover_exactly_the_changed_fields() {
    let service = service();
    let mut document = service.fetch("doc-1").await.unwrap();
    let sheet = document.sheet_by_title_mut("Main").unwrap();

    sheet.write_note(0, 0, "annotated");
    sheet.write(2, 3, "42");
    service.synchronize(sheet).await.unwrap();

    assert_eq!(service.transport().batch_call_count(), 1);
    let (document_id, requests) = service.transport().batch_call(0);
    assert_eq!(document_id, "doc-1");
    assert_eq!(
        serde_json::to_value(&requests).unwrap(),
        json!([
            {
                "updateCells": {
                    "rows": [ { "values": [ { "note": "annotated" } ] } ],
                    "fields": "note",
                    "start": { "sheetId": 1, "rowIndex": 0, "columnIndex": 0 },
                }
            },
            {
                "updateCells": {
                    "rows": [ { "values": [ { "userEnteredValue": { "numberValue": 42.0 } } ] } ],
                    "fields": "userEnteredValue",
                    "start": { "sheetId": 1, "rowIndex": 2, "columnIndex": 3 },
                }
            }
        ])
    );
}

#[tokio::test]
async fn successful_synchronize_commits_and_is_idempotent() {
    let service = service();
    let mut document = service.fetch("doc-1").await.unwrap();
    let sheet = document.sheet_by_title_mut("Main").unwrap();

    sheet.write(0, 0, "edited");
    service.synchronize(sheet).await.unwrap();
    assert!(!sheet.has_dirty());
    assert_eq!(service.transport().batch_call_count(), 1);

    // Nothing dirty, nothing to resize: no further remote requests.
    service.synchronize(sheet).await.unwrap();
    service.synchronize(sheet).await.unwrap();
    assert_eq!(service.transport().batch_call_count(), 1);
}

#[tokio::test]
async fn writes_beyond_bounds_resize_before_flushing() {
    let service = service();
    let mut document = service.fetch("doc-1").await.unwrap();
    let sheet = document.sheet_by_title_mut("Main").unwrap();

    sheet.write(12, 3, "deep");
    assert_eq!(sheet.pending_bounds(), (13, 10));
    service.synchronize(sheet).await.unwrap();

    assert_eq!(service.transport().batch_call_count(), 2);
    let (_, resize) = service.transport().batch_call(0);
    assert_eq!(
        serde_json::to_value(&resize).unwrap(),
        json!([
            {
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": 1,
                        "gridProperties": { "rowCount": 13, "columnCount": 10 },
                    },
                    "fields": "gridProperties.rowCount,gridProperties.columnCount",
                }
            }
        ])
    );
    assert_eq!(sheet.committed_bounds(), (13, 10));
    assert_eq!(sheet.properties.grid_properties.row_count, 13);
}

#[tokio::test]
async fn resize_failure_aborts_with_dirty_state_intact() {
    let service = service();
    service.transport().fail_call(0);
    let mut document = service.fetch("doc-1").await.unwrap();
    let sheet = document.sheet_by_title_mut("Main").unwrap();

    sheet.write(20, 0, "far");
    let err = service.synchronize(sheet).await.unwrap_err();
    assert!(matches!(err, Error::Remote(_)));

    // Only the resize went out; the edit is still pending locally.
    assert_eq!(service.transport().batch_call_count(), 1);
    assert!(sheet.has_dirty());
    assert_eq!(sheet.pending_bounds(), (21, 10));
    assert_eq!(sheet.committed_bounds(), (10, 10));
}

#[tokio::test]
async fn partial_failure_leaves_exactly_the_failed_batch_dirty() {
    let service = one_cell_per_batch();
    let mut document = service.fetch("doc-1").await.unwrap();
    let sheet = document.sheet_by_title_mut("Main").unwrap();

    sheet.write(0, 0, "a");
    sheet.write(0, 1, "b");
    sheet.write(0, 2, "c");

    // Three one-cell batches; fail the middle one.
    service.transport().fail_call(1);
    let err = service.synchronize(sheet).await.unwrap_err();
    match err {
        Error::PartialFlush {
            failed,
            total,
            first,
        } => {
            assert_eq!((failed, total), (1, 3));
            assert_eq!(first.message, "call 1 rejected");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Batches 1 and 3 landed and are no longer pending; only the failed
    // batch's cell survives for retry. No rollback, no bounds commit.
    let still_dirty: Vec<_> = sheet.dirty_cells().map(|c| (c.row(), c.column())).collect();
    assert_eq!(still_dirty, vec![(0, 1)]);

    // Retrying resends exactly the still-dirty cell, then commits.
    service.synchronize(sheet).await.unwrap();
    assert!(!sheet.has_dirty());
    assert_eq!(service.transport().batch_call_count(), 4);
    let (_, retry) = service.transport().batch_call(3);
    assert_eq!(retry.len(), 1);
    let retry_json = serde_json::to_value(&retry).unwrap();
    assert_eq!(retry_json[0]["updateCells"]["start"]["columnIndex"], 1);
}

#[tokio::test(start_paused = true)]
async fn inflight_batches_are_bounded_by_the_semaphore() {
    let transport = MockTransport {
        document: fixture(),
        batch_delay: Some(Duration::from_millis(10)),
        ..MockTransport::default()
    };
    let service = Service::with_config(
        transport,
        SyncConfig {
            max_cells_per_batch: 1,
            max_inflight_batches: 2,
        },
    );
    let mut document = service.fetch("doc-1").await.unwrap();
    let sheet = document.sheet_by_title_mut("Main").unwrap();

    for column in 0..6 {
        sheet.write(0, column, "v");
    }
    service.synchronize(sheet).await.unwrap();

    assert_eq!(service.transport().batch_call_count(), 6);
    assert_eq!(service.transport().max_inflight.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn read_cache_ttl_controls_refetching() {
    let service = service();

    let a = service
        .fetch_with_cache("doc-1", Duration::from_secs(60))
        .await
        .unwrap();
    let b = service
        .fetch_with_cache("doc-1", Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(service.transport().fetches.load(Ordering::SeqCst), 1);
    assert_eq!(a.id, b.id);

    // A zero TTL bypasses the cache entirely.
    service
        .fetch_with_cache("doc-1", Duration::ZERO)
        .await
        .unwrap();
    service.fetch("doc-1").await.unwrap();
    assert_eq!(service.transport().fetches.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn structural_requests_reuse_the_batch_primitive() {
    let service = service();
    let mut document = service.fetch("doc-1").await.unwrap();

    service
        .delete_rows(document.sheet_by_title_mut("Main").unwrap(), 0, 2)
        .await
        .unwrap();
    {
        let sheet = document.sheet_by_title("Main").unwrap();
        assert_eq!(sheet.properties.grid_properties.row_count, 8);
        assert_eq!(sheet.committed_bounds(), (8, 10));
    }

    service.delete_sheet(&mut document, 1).await.unwrap();
    // delete_rows + delete_sheet requests, plus one reload fetch.
    assert_eq!(service.transport().batch_call_count(), 2);
    assert_eq!(service.transport().fetches.load(Ordering::SeqCst), 2);

    let (_, delete) = service.transport().batch_call(1);
    assert_eq!(
        serde_json::to_value(&delete).unwrap(),
        json!([ { "deleteSheet": { "sheetId": 1 } } ])
    );
}

#[tokio::test]
async fn values_only_path_renders_the_range_reference() {
    let service = service();
    let range = sheetlink_client::model::parse_range_reference("'Main'!A1:B2").unwrap();

    service
        .update_values(
            "doc-1",
            &range,
            vec![vec!["1".to_string(), "2".to_string()]],
        )
        .await
        .unwrap();

    let calls = service.transport().values_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "doc-1");
    assert_eq!(calls[0].1, "'Main'!A1:B2");
}
