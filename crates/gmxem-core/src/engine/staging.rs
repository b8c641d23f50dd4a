//! Artifact allocation and scoped cleanup.
//!
//! Temporary artifact paths are generated with process- and call-unique
//! names so that independent pipeline runs can execute concurrently without
//! collisions. Cleanup is expressed through [`CleanupGuard`], an RAII guard
//! bound to a stage's artifact set: tracked paths are removed when the guard
//! goes out of scope unless ownership was explicitly transferred with
//! [`CleanupGuard::release`].

use crate::core::models::artifact::{ArtifactRole, StagedArtifact};
use crate::engine::error::EngineError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const ARTIFACT_PREFIX: &str = "gmxem-";

fn unique_tempfile(role: ArtifactRole) -> Result<tempfile::NamedTempFile, EngineError> {
    let suffix = format!(".{}", role.extension());
    tempfile::Builder::new()
        .prefix(ARTIFACT_PREFIX)
        .suffix(&suffix)
        .tempfile()
        .map_err(|source| EngineError::Staging { role, source })
}

/// Allocates a uniquely named artifact and creates it on disk, ready to be
/// written by the pipeline itself.
pub fn allocate_artifact(role: ArtifactRole) -> Result<StagedArtifact, EngineError> {
    let path = unique_tempfile(role)?
        .into_temp_path()
        .keep()
        .map_err(|e| EngineError::Staging {
            role,
            source: std::io::Error::other(e.to_string()),
        })?;
    Ok(StagedArtifact::new(role, path))
}

/// Reserves a uniquely named artifact path for the engine to create.
///
/// The path does not exist on disk afterwards; the random name component
/// keeps it collision-free. Declared outputs must be reserved, not
/// allocated, so that a missing output is detectable after the invocation.
pub fn reserve_artifact(role: ArtifactRole) -> Result<StagedArtifact, EngineError> {
    let file = unique_tempfile(role)?;
    let path = file.path().to_path_buf();
    drop(file);
    Ok(StagedArtifact::new(role, path))
}

/// Removes a file or directory tree. Already-deleted paths are a no-op, so
/// sweeping the same artifact list twice is harmless.
pub fn remove_path(path: &Path) {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else if path.is_file() {
        fs::remove_file(path)
    } else {
        return;
    };
    if let Err(e) = result {
        warn!("Failed to remove staged path '{}': {e}", path.display());
    }
}

pub fn remove_paths<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        remove_path(path);
    }
}

/// RAII guard over a stage's artifact set.
///
/// Tracked paths are removed when the guard drops, which covers early
/// returns, error propagation, and unwinding alike. A stage that completes
/// successfully calls [`release`](Self::release) to transfer artifact
/// ownership to its caller, or [`sweep`](Self::sweep) to delete at a
/// deliberate point instead of scope end.
#[must_use]
#[derive(Default)]
pub struct CleanupGuard {
    paths: Vec<PathBuf>,
    armed: bool,
}

impl CleanupGuard {
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            armed: true,
        }
    }

    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Disarms the guard; tracked paths now belong to the caller.
    pub fn release(mut self) {
        self.armed = false;
    }

    /// Deletes the tracked paths now rather than at scope end.
    pub fn sweep(self) {
        drop(self);
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if self.armed {
            remove_paths(self.paths.iter().map(PathBuf::as_path));
        }
    }
}
