use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Resolved destination for one upload run: where to POST, how to authenticate
/// and which ApiPost project receives the documents.
///
/// Built once by the caller and shared read-only by every chunk upload.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadTarget {
    pub endpoint: String,
    pub token: String,
    pub project_id: String,
}

impl std::fmt::Debug for UploadTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadTarget")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("upload target field `{0}` must not be blank")]
    Blank(&'static str),
    #[error("upload endpoint is not a valid http(s) URL: {0}")]
    InvalidEndpoint(String),
}

impl UploadTarget {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            project_id: project_id.into(),
        }
    }

    /// Checks that every field is usable before any upload is attempted.
    pub fn validate(&self) -> Result<(), TargetError> {
        if self.endpoint.trim().is_empty() {
            return Err(TargetError::Blank("endpoint"));
        }
        if self.token.trim().is_empty() {
            return Err(TargetError::Blank("token"));
        }
        if self.project_id.trim().is_empty() {
            return Err(TargetError::Blank("project_id"));
        }
        match url::Url::parse(&self.endpoint) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Ok(()),
            _ => Err(TargetError::InvalidEndpoint(self.endpoint.clone())),
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            endpoint = %self.endpoint,
            project_id = %self.project_id,
            token_set = !self.token.is_empty(),
            "Loaded UploadTarget"
        );
        debug!(?self, "UploadTarget loaded (full debug)");
    }
}
