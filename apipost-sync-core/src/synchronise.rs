//! High-level pipeline: split → convert → upload → report.
//!
//! This module provides the upload coordinator. For one invocation it:
//!   - Splits the APIs into fixed-size chunks (see [`crate::split`])
//!   - Spawns one task per chunk that converts the chunk into an OpenAPI
//!     document titled after the module and hands it to the [`Uploader`]
//!   - Waits for every task, folding each [`ChunkOutcome`] into a single
//!     [`UploadReport`]
//!
//! # Major Types
//! - [`SynchroniseConfig`]: target, module name and chunk size for a run
//! - [`UploadReport`]: aggregated success/failure counts and failure messages
//! - [`SyncOutcome`]: what the host should tell the user
//!
//! # Error Handling
//! Chunk failures are isolated: they are recorded in the report and never
//! stop other chunks. A chunk task that panics or is cancelled does not
//! abort the fan-in either; the remaining tasks are drained and the run is
//! reported as [`SyncOutcome::Interrupted`], keeping the partial report.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::UploadTarget;
use crate::contract::{Api, ChunkOutcome, DocumentConverter, Uploader};
use crate::split::{split, DEFAULT_CHUNK_SIZE};

pub const NOTIFICATION_TITLE: &str = "Upload Result";
pub const NO_WORK_MESSAGE: &str = "Api not found!";
pub const INTERRUPTED_MESSAGE: &str = "Upload fail";

/// Everything one run needs besides the APIs and collaborators.
#[derive(Debug, Clone)]
pub struct SynchroniseConfig {
    pub target: UploadTarget,
    /// Becomes the title of every uploaded document.
    pub module_name: String,
    pub chunk_size: usize,
}

impl SynchroniseConfig {
    pub fn new(target: UploadTarget, module_name: impl Into<String>) -> Self {
        Self {
            target,
            module_name: module_name.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// Aggregate of all chunk outcomes of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Distinct failure messages.
    pub messages: BTreeSet<String>,
}

impl UploadReport {
    pub fn record(&mut self, outcome: ChunkOutcome) {
        match outcome {
            ChunkOutcome::Success { count } => self.succeeded += count,
            ChunkOutcome::Failure { count, message } => {
                self.failed += count;
                self.messages.insert(message);
            }
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Human-readable summary, e.g.
    /// `Upload 400 Api success! Upload 50 Api fail! {network error}`.
    pub fn summary(&self) -> String {
        let mut clauses = Vec::new();
        if self.succeeded != 0 {
            clauses.push(format!("Upload {} Api success!", self.succeeded));
        }
        if self.failed != 0 {
            let messages: Vec<&str> = self.messages.iter().map(String::as_str).collect();
            clauses.push(format!(
                "Upload {} Api fail! {{{}}}",
                self.failed,
                messages.join(", ")
            ));
        }
        clauses.join(" ")
    }
}

impl FromIterator<ChunkOutcome> for UploadReport {
    fn from_iter<I: IntoIterator<Item = ChunkOutcome>>(iter: I) -> Self {
        let mut report = UploadReport::default();
        for outcome in iter {
            report.record(outcome);
        }
        report
    }
}

/// Result of one run, as surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No APIs were given; nothing was sent.
    NoWork,
    /// Every chunk task ran to completion (successfully or not).
    Completed(UploadReport),
    /// At least one chunk task died before producing an outcome.
    Interrupted {
        partial: UploadReport,
        lost_chunks: usize,
        lost_apis: usize,
    },
}

impl SyncOutcome {
    /// `(title, message)` pair for the notification sink.
    pub fn notification(&self) -> (&'static str, String) {
        let message = match self {
            SyncOutcome::NoWork => NO_WORK_MESSAGE.to_string(),
            SyncOutcome::Completed(report) => report.summary(),
            SyncOutcome::Interrupted { .. } => INTERRUPTED_MESSAGE.to_string(),
        };
        (NOTIFICATION_TITLE, message)
    }

    /// True only when every API was uploaded successfully.
    pub fn is_success(&self) -> bool {
        match self {
            SyncOutcome::NoWork => true,
            SyncOutcome::Completed(report) => report.failed == 0,
            SyncOutcome::Interrupted { .. } => false,
        }
    }
}

/// Uploads `apis` in concurrent chunks and reports the aggregate outcome.
pub async fn synchronise<C, U>(
    config: &SynchroniseConfig,
    apis: &[Api],
    converter: Arc<C>,
    uploader: Arc<U>,
) -> SyncOutcome
where
    C: DocumentConverter + ?Sized + 'static,
    U: Uploader + ?Sized + 'static,
{
    if apis.is_empty() {
        info!(module = %config.module_name, "[SYNC] No APIs found, nothing to upload");
        return SyncOutcome::NoWork;
    }

    let chunks = split(apis, config.chunk_size);
    info!(
        module = %config.module_name,
        apis = apis.len(),
        chunks = chunks.len(),
        chunk_size = config.chunk_size,
        "[SYNC] Starting chunked upload"
    );

    let target = Arc::new(config.target.clone());
    let title: Arc<str> = Arc::from(config.module_name.as_str());
    let mut tasks = JoinSet::new();

    for (index, chunk) in chunks.into_iter().enumerate() {
        let chunk = chunk.to_vec();
        let converter = Arc::clone(&converter);
        let uploader = Arc::clone(&uploader);
        let target = Arc::clone(&target);
        let title = Arc::clone(&title);

        tasks.spawn(async move {
            let count = chunk.len();
            let mut document = converter.convert(&chunk);
            document.set_title(&*title);
            debug!(chunk = index, count, "[SYNC][UPLOAD] Uploading chunk");
            let outcome = uploader.upload(&document, &target, count).await;
            (index, outcome)
        });
    }

    let mut report = UploadReport::default();
    let mut lost_chunks = 0;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                match &outcome {
                    ChunkOutcome::Success { count } => {
                        info!(chunk = index, count, "[SYNC][UPLOAD] Chunk uploaded");
                    }
                    ChunkOutcome::Failure { count, message } => {
                        error!(chunk = index, count, %message, "[SYNC][ERROR][UPLOAD] Chunk upload failed");
                    }
                }
                report.record(outcome);
            }
            Err(e) => {
                error!(error = %e, "[SYNC][ERROR] Chunk task did not complete");
                lost_chunks += 1;
            }
        }
    }

    if lost_chunks > 0 {
        let lost_apis = apis.len().saturating_sub(report.total());
        warn!(
            succeeded = report.succeeded,
            failed = report.failed,
            lost_chunks,
            lost_apis,
            "[SYNC] Upload interrupted, partial results kept"
        );
        return SyncOutcome::Interrupted {
            partial: report,
            lost_chunks,
            lost_apis,
        };
    }

    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "[SYNC] Upload complete"
    );
    SyncOutcome::Completed(report)
}
