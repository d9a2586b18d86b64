//! Work-directory override: files every API under one ApiPost folder.

use thiserror::Error;
use tracing::info;

use crate::contract::Api;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    /// Several comma-separated folders were configured; one must be chosen.
    #[error("work dir is ambiguous, choose one of: {}", .0.join(", "))]
    Ambiguous(Vec<String>),
}

/// Applies `work_dir` as the category of every API.
///
/// Blank or absent is a no-op. A comma-separated list is rejected with the
/// candidate folders so the caller can ask for exactly one.
pub fn apply_work_dir(apis: &mut [Api], work_dir: Option<&str>) -> Result<(), CategoryError> {
    let Some(work_dir) = work_dir.map(str::trim).filter(|w| !w.is_empty()) else {
        return Ok(());
    };

    if work_dir.contains(',') {
        let choices = work_dir
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        return Err(CategoryError::Ambiguous(choices));
    }

    for api in apis.iter_mut() {
        api.category = Some(work_dir.to_string());
    }
    info!(work_dir, apis = apis.len(), "Applied work dir to all APIs");
    Ok(())
}
