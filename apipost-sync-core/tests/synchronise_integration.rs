use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Barrier;

use apipost_sync_core::config::UploadTarget;
use apipost_sync_core::contract::{Api, ChunkOutcome, MockUploader, Uploader};
use apipost_sync_core::convert::{OpenApiConverter, OpenApiDocument};
use apipost_sync_core::synchronise::{synchronise, SyncOutcome, SynchroniseConfig, UploadReport};

fn make_apis(n: usize) -> Vec<Api> {
    (0..n)
        .map(|i| Api {
            name: format!("api {i}"),
            path: format!("/api/{i}"),
            method: "GET".to_string(),
            summary: None,
            description: None,
            category: None,
            parameters: vec![],
            request_body: None,
            response: None,
        })
        .collect()
}

fn config() -> SynchroniseConfig {
    SynchroniseConfig::new(
        UploadTarget::new("https://apipost.example.com/open/import", "tok", "p-1"),
        "user-service",
    )
}

fn report_of(outcome: SyncOutcome) -> UploadReport {
    match outcome {
        SyncOutcome::Completed(report) => report,
        other => panic!("Expected a completed run, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_input_reports_no_work_without_uploading() {
    let mut uploader = MockUploader::new();
    uploader.expect_upload().never();

    let outcome = synchronise(
        &config(),
        &[],
        Arc::new(OpenApiConverter::new()),
        Arc::new(uploader),
    )
    .await;

    assert_eq!(outcome, SyncOutcome::NoWork);
    assert_eq!(outcome.notification(), ("Upload Result", "Api not found!".to_string()));
}

#[tokio::test]
async fn test_single_chunk_success() {
    let mut uploader = MockUploader::new();
    uploader
        .expect_upload()
        .times(1)
        .withf(|doc: &OpenApiDocument, target: &UploadTarget, count: &usize| {
            doc.info.title == "user-service"
                && doc.operation_count() == 150
                && target.project_id == "p-1"
                && *count == 150
        })
        .returning(|_, _, count| ChunkOutcome::Success { count });

    let apis = make_apis(150);
    let outcome = synchronise(
        &config(),
        &apis,
        Arc::new(OpenApiConverter::new()),
        Arc::new(uploader),
    )
    .await;

    let (_, message) = outcome.notification();
    assert_eq!(message, "Upload 150 Api success!");
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_one_failing_chunk_does_not_affect_others() {
    let mut uploader = MockUploader::new();
    uploader
        .expect_upload()
        .times(3)
        .returning(|_, _, count| {
            if count == 50 {
                ChunkOutcome::failure(count, "network error")
            } else {
                ChunkOutcome::Success { count }
            }
        });

    let apis = make_apis(450);
    let outcome = synchronise(
        &config(),
        &apis,
        Arc::new(OpenApiConverter::new()),
        Arc::new(uploader),
    )
    .await;
    assert!(!outcome.is_success());

    let report = report_of(outcome);
    assert_eq!(report.succeeded, 400);
    assert_eq!(report.failed, 50);
    let summary = report.summary();
    assert!(summary.contains("Upload 400 Api success!"), "got: {summary}");
    assert!(summary.contains("Upload 50 Api fail! {network error}"), "got: {summary}");
}

#[tokio::test]
async fn test_identical_remote_rejections_are_deduplicated() {
    let mut uploader = MockUploader::new();
    uploader
        .expect_upload()
        .times(2)
        .returning(|_, _, count| ChunkOutcome::failure(count, "duplicate project"));

    let apis = make_apis(20);
    let outcome = synchronise(
        &config().with_chunk_size(10),
        &apis,
        Arc::new(OpenApiConverter::new()),
        Arc::new(uploader),
    )
    .await;

    let report = report_of(outcome);
    assert_eq!(report.failed, 20);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.messages.len(), 1);
    assert_eq!(report.summary(), "Upload 20 Api fail! {duplicate project}");
}

#[tokio::test]
async fn test_counts_always_sum_to_input_size() {
    for n in [1usize, 7, 199, 200, 201, 999] {
        let mut uploader = MockUploader::new();
        uploader.expect_upload().returning(|_, _, count| {
            if count % 2 == 0 {
                ChunkOutcome::Success { count }
            } else {
                ChunkOutcome::failure(count, "system error")
            }
        });

        let apis = make_apis(n);
        let outcome = synchronise(
            &config().with_chunk_size(13),
            &apis,
            Arc::new(OpenApiConverter::new()),
            Arc::new(uploader),
        )
        .await;
        let report = report_of(outcome);
        assert_eq!(report.total(), n, "sum of outcomes must equal input size for n={n}");
    }
}

/// Uploader that only proceeds once every chunk is in flight at the same time.
struct RendezvousUploader {
    barrier: Barrier,
}

#[async_trait]
impl Uploader for RendezvousUploader {
    async fn upload(&self, _: &OpenApiDocument, _: &UploadTarget, count: usize) -> ChunkOutcome {
        self.barrier.wait().await;
        ChunkOutcome::Success { count }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_chunks_are_uploaded_concurrently() {
    let uploader = Arc::new(RendezvousUploader {
        barrier: Barrier::new(5),
    });
    let apis = make_apis(50);

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        synchronise(
            &config().with_chunk_size(10),
            &apis,
            Arc::new(OpenApiConverter::new()),
            uploader,
        ),
    )
    .await
    .expect("All five chunks should be in flight together");

    assert_eq!(report_of(outcome).succeeded, 50);
}

/// Uploader whose task dies on the chunk holding exactly `poison` APIs.
struct PanickingUploader {
    poison: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl Uploader for PanickingUploader {
    async fn upload(&self, _: &OpenApiDocument, _: &UploadTarget, count: usize) -> ChunkOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if count == self.poison {
            panic!("simulated worker crash");
        }
        ChunkOutcome::Success { count }
    }
}

#[tokio::test]
async fn test_task_crash_reports_generic_failure_and_keeps_partial_results() {
    let uploader = Arc::new(PanickingUploader {
        poison: 5,
        calls: AtomicUsize::new(0),
    });
    let apis = make_apis(25);

    let outcome = synchronise(
        &config().with_chunk_size(10),
        &apis,
        Arc::new(OpenApiConverter::new()),
        Arc::clone(&uploader),
    )
    .await;

    assert_eq!(uploader.calls.load(Ordering::SeqCst), 3);
    assert_eq!(outcome.notification(), ("Upload Result", "Upload fail".to_string()));
    match outcome {
        SyncOutcome::Interrupted {
            partial,
            lost_chunks,
            lost_apis,
        } => {
            assert_eq!(partial.succeeded, 20);
            assert_eq!(lost_chunks, 1);
            assert_eq!(lost_apis, 5);
        }
        other => panic!("Expected an interrupted run, got: {other:?}"),
    }
}

#[test]
fn test_summary_has_both_clauses_only_when_nonzero() {
    let report: UploadReport = vec![
        ChunkOutcome::Success { count: 3 },
        ChunkOutcome::failure(2, "system error"),
        ChunkOutcome::failure(1, "network error"),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        report.summary(),
        "Upload 3 Api success! Upload 3 Api fail! {network error, system error}"
    );

    assert_eq!(UploadReport::default().summary(), "");
}
