//! `load_config` module: Loads a static YAML config and injects the ApiPost token from the environment.
//!
//! This module is the only place where user-supplied YAML is parsed and mapped to the
//! [`UploadTarget`] consumed by the core pipeline.
//!
//! # Responsibilities
//! - Parse the `upload` section (endpoint, project, work dir, batch size, timeout)
//! - Inject the secret token from `APIPOST_TOKEN`; the token never lives in YAML
//! - Reject unusable values before any network activity
//!
//! # Errors
//! All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use apipost_sync_core::config::UploadTarget;
use apipost_sync_core::split::DEFAULT_CHUNK_SIZE;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

/// Environment variable holding the ApiPost token.
pub const TOKEN_ENV: &str = "APIPOST_TOKEN";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize)]
pub struct UploadSection {
    pub remote_url: String,
    pub project_id: String,
    /// Folder every uploaded API is filed under.
    #[serde(default)]
    pub work_dir: Option<String>,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

pub struct CliConfig {
    pub upload: UploadSection,
    pub token: String,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("upload", &self.upload)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl CliConfig {
    pub fn target(&self) -> UploadTarget {
        UploadTarget::new(
            self.upload.remote_url.clone(),
            self.token.clone(),
            self.upload.project_id.clone(),
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.upload.timeout_secs)
    }
}

/// Loads a static YAML config file (no secrets) and injects the token from the environment.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    #[derive(Debug, Deserialize)]
    struct RawConfig {
        upload: UploadSection,
    }

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let token = std::env::var(TOKEN_ENV).map_err(|e| {
        error!(error = ?e, "{TOKEN_ENV} environment variable not set");
        anyhow::anyhow!("{TOKEN_ENV} environment variable not set: {e}")
    })?;

    if raw.upload.chunk_size == 0 {
        anyhow::bail!("upload.chunk_size must be greater than zero");
    }
    if raw.upload.timeout_secs == 0 {
        anyhow::bail!("upload.timeout_secs must be greater than zero");
    }

    let config = CliConfig {
        upload: raw.upload,
        token,
    };
    config
        .target()
        .validate()
        .context("Invalid upload configuration")?;

    info!(
        remote_url = %config.upload.remote_url,
        project_id = %config.upload.project_id,
        chunk_size = config.upload.chunk_size,
        "Config loaded and merged successfully"
    );
    Ok(config)
}
