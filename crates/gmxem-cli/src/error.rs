use gmxem::core::runner::traits::InvocationError;
use gmxem::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Engine probe failed: {0}")]
    Probe(#[from] InvocationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load job file '{path}': {source}", path = path.display())]
    JobFile {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
