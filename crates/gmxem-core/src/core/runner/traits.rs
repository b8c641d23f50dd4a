use crate::core::models::artifact::{ArtifactRole, StagedArtifact};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Input artifact '{path}' does not exist", path = path.display())]
    MissingInput { path: PathBuf },

    #[error("Command '{command}' exited with status {status}: {stderr}")]
    NonZeroExit {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Command '{command}' exceeded the {timeout:?} timeout and was killed")]
    Timeout { command: String, timeout: Duration },

    #[error("Declared {role} output '{path}' was not produced by '{command}'", path = path.display())]
    MissingOutput {
        command: String,
        role: ArtifactRole,
        path: PathBuf,
    },

    #[error("Scratch directory error: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("I/O error during invocation: {0}")]
    Io(#[from] std::io::Error),
}

/// Disposal policy for the per-invocation scratch directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScratchPolicy {
    /// The scratch directory is returned in the [`InvocationResult`]; the
    /// requesting stage owns its disposal.
    #[default]
    Retain,
    /// The runner deletes the scratch directory before returning.
    Discard,
}

/// A declared output of an invocation, tagged with the role it plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub role: ArtifactRole,
    pub path: PathBuf,
}

/// A single external-engine invocation.
///
/// Environment overrides are explicit and apply to the spawned process only;
/// the runner never copies or mutates the global process environment.
#[derive(Debug, Clone)]
pub struct InvocationSpec {
    pub program: String,
    pub args: Vec<String>,
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<OutputSpec>,
    pub env: Vec<(String, String)>,
    pub scratch: ScratchPolicy,
    pub timeout: Option<Duration>,
}

impl InvocationSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            env: Vec::new(),
            scratch: ScratchPolicy::default(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.inputs.push(path.into());
        self
    }

    pub fn output(mut self, role: ArtifactRole, path: impl Into<PathBuf>) -> Self {
        self.outputs.push(OutputSpec {
            role,
            path: path.into(),
        });
        self
    }

    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The full command line, for diagnostics.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// The engine subcommand, i.e. the first argument.
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// The outcome of a completed invocation.
///
/// Output artifacts are tagged with their declared role; consumers look them
/// up with [`InvocationResult::output`] instead of relying on positional
/// ordering.
#[derive(Debug)]
pub struct InvocationResult {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
    /// The invocation's scratch directory, present under
    /// [`ScratchPolicy::Retain`]. The caller owns its disposal.
    pub scratch_dir: Option<PathBuf>,
    pub outputs: Vec<StagedArtifact>,
}

impl InvocationResult {
    /// Looks up the produced artifact with the given role.
    pub fn output(&self, role: ArtifactRole) -> Option<&StagedArtifact> {
        self.outputs.iter().find(|artifact| artifact.role == role)
    }
}

/// The sole boundary through which the external engine binary is driven.
///
/// # Contract
///
/// * The runner creates one scratch directory per invocation and runs the
///   child inside it. Under [`ScratchPolicy::Retain`] the directory is
///   returned in the result and the caller must delete it once outputs have
///   been copied out; it is never left for a later stage to delete
///   implicitly.
/// * On failure there is no result object to carry the scratch directory
///   out, so the runner disposes of it before returning the error.
/// * Every declared output must exist on disk when the invocation succeeds;
///   a missing output is reported as [`InvocationError::MissingOutput`].
/// * A timeout kills the child and surfaces as [`InvocationError::Timeout`],
///   never as an indefinite hang.
pub trait CommandRunner {
    fn invoke(&self, spec: &InvocationSpec) -> Result<InvocationResult, InvocationError>;
}
