#![doc = "Uploader integration for CLI and core: the reqwest-backed client that posts OpenAPI documents to ApiPost."]
//
//! # ApiPost client (CLI <-> Core)
//!
//! This module wires the [`Uploader`] trait from [`apipost_sync_core::contract`]
//! to the ApiPost import endpoint.
//!
//! ## Wire format
//! - `POST <endpoint>` with `Content-Type: application/json` and a `token` header
//! - body: `{"openApi": <document>, "projectId": "<id>"}`
//! - response: `{"success": bool, "message": string?}`
//!
//! ## Failure mapping
//! Every failure becomes a [`ChunkOutcome::Failure`] for the chunk at hand:
//! transport problems and unreadable responses report `network error`, a
//! non-2xx status reports `system error`, and a rejection reports the
//! message sent by ApiPost.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use apipost_sync_core::config::UploadTarget;
use apipost_sync_core::contract::{ChunkOutcome, Uploader};
use apipost_sync_core::convert::OpenApiDocument;

pub const NETWORK_ERROR: &str = "network error";
pub const SYSTEM_ERROR: &str = "system error";
pub const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("request to ApiPost failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("ApiPost answered with HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("could not decode ApiPost response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("ApiPost rejected the upload: {0}")]
    Rejected(String),
}

impl UploadError {
    /// Message recorded in the upload report for this failure.
    pub fn outcome_message(&self) -> String {
        match self {
            UploadError::Transport(_) | UploadError::Decode(_) => NETWORK_ERROR.to_string(),
            UploadError::Status(_) => SYSTEM_ERROR.to_string(),
            UploadError::Rejected(message) => message.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncRequest<'a> {
    open_api: &'a OpenApiDocument,
    project_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SyncResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

pub struct ApiPostClient {
    http: reqwest::Client,
}

impl ApiPostClient {
    /// Builds a client whose every request gives up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        tracing::info!(timeout_secs = timeout.as_secs(), "Initialized ApiPostClient");
        Ok(ApiPostClient { http })
    }

    async fn send(
        &self,
        document: &OpenApiDocument,
        target: &UploadTarget,
    ) -> Result<(), UploadError> {
        let body = SyncRequest {
            open_api: document,
            project_id: &target.project_id,
        };

        let response = self
            .http
            .post(&target.endpoint)
            .header("token", &target.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status));
        }

        let text = response.text().await?;
        tracing::debug!(bytes = text.len(), "Received ApiPost response");
        let parsed: SyncResponse = serde_json::from_str(&text)?;

        if parsed.success {
            Ok(())
        } else {
            let message = parsed
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            Err(UploadError::Rejected(message))
        }
    }
}

#[async_trait]
impl Uploader for ApiPostClient {
    async fn upload(
        &self,
        document: &OpenApiDocument,
        target: &UploadTarget,
        count: usize,
    ) -> ChunkOutcome {
        tracing::info!(
            endpoint = %target.endpoint,
            project_id = %target.project_id,
            count,
            "Uploading OpenAPI document"
        );

        match self.send(document, target).await {
            Ok(()) => {
                tracing::info!(count, "Successfully uploaded OpenAPI document");
                ChunkOutcome::Success { count }
            }
            Err(e) => {
                tracing::error!(error = %e, count, "API error uploading OpenAPI document");
                ChunkOutcome::failure(count, e.outcome_message())
            }
        }
    }
}
