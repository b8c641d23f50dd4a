use crate::core::models::artifact::ArtifactRole;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine mismatch: request targets '{found}', this pipeline drives '{expected}'")]
    EngineMismatch { expected: &'static str, found: String },

    #[error("The system must contain exactly one molecule/force-field pair, found {count}")]
    UnsupportedSystemSize { count: usize },

    #[error("Failed to allocate a {role} artifact: {source}")]
    Staging {
        role: ArtifactRole,
        #[source]
        source: std::io::Error,
    },

    #[error("Preparation failed for artifact '{path}': {message}", path = path.display())]
    Preparation { path: PathBuf, message: String },

    #[error("Engine invocation '{command}' failed: {diagnostics}")]
    Compute { command: String, diagnostics: String },

    #[error("Post-processing failed to import '{path}': {message}", path = path.display())]
    PostProcessing { path: PathBuf, message: String },
}
