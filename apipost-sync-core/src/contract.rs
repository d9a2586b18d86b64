#![allow(unused)]

//! # contract: data model and collaborator interfaces of the upload pipeline
//!
//! This module defines the unit of work ([`Api`]), the per-chunk result
//! ([`ChunkOutcome`]) and the two collaborator traits the coordinator is
//! generic over:
//! - [`DocumentConverter`]: turns a chunk of APIs into an OpenAPI document.
//! - [`Uploader`]: sends one document to the remote service and interprets
//!   the answer.
//!
//! ## Mocking & Testing
//! - [`Uploader`] is annotated for `mockall`; `MockUploader` is exported when
//!   the `test-export-mocks` feature is enabled (default), so downstream
//!   crates can script per-chunk outcomes.
//!
//! ## Adding New Upload Destinations
//! - Implement [`Uploader`] for your destination.
//! - Never return early with an error: every failure becomes a
//!   [`ChunkOutcome::Failure`] carrying the number of APIs it covered.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mockall::{automock, predicate::*};

use crate::config::UploadTarget;
use crate::convert::OpenApiDocument;

/// One API endpoint discovered in a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Api {
    /// Human-readable name, used as the operation summary when `summary` is absent.
    pub name: String,
    /// Request path, e.g. `/users/{id}`.
    pub path: String,
    /// HTTP method; matched case-insensitively.
    pub method: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// ApiPost folder the API is filed under. Overridden by the work dir.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ApiParameter>,
    /// JSON schema of the request body.
    #[serde(default)]
    pub request_body: Option<serde_json::Value>,
    /// JSON schema of the successful response body.
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiParameter {
    pub name: String,
    /// `query`, `path`, `header` or `cookie`.
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema: Option<serde_json::Value>,
}

/// Result of uploading one chunk. Produced once per chunk, folded once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Success { count: usize },
    Failure { count: usize, message: String },
}

impl ChunkOutcome {
    pub fn failure(count: usize, message: impl Into<String>) -> Self {
        ChunkOutcome::Failure {
            count,
            message: message.into(),
        }
    }

    /// Number of APIs this outcome accounts for.
    pub fn count(&self) -> usize {
        match self {
            ChunkOutcome::Success { count } | ChunkOutcome::Failure { count, .. } => *count,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChunkOutcome::Success { .. })
    }
}

/// Maps a chunk of APIs to an OpenAPI document.
///
/// Conversion is pure: the same chunk always yields the same document. The
/// coordinator sets the document title afterwards.
pub trait DocumentConverter: Send + Sync {
    fn convert(&self, chunk: &[Api]) -> OpenApiDocument;
}

/// Sends one OpenAPI document to the remote service.
///
/// Exactly one network call per invocation, no retry. `count` is the number
/// of APIs the document represents and is echoed back in the outcome.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(
        &self,
        document: &OpenApiDocument,
        target: &UploadTarget,
        count: usize,
    ) -> ChunkOutcome;
}
