//! Scripted engine stand-in for tests.
//!
//! Simulates the external engine: every declared output is written to disk,
//! a real scratch directory is created, and the full invocation (including a
//! snapshot of input-file contents, which the stages may delete right after
//! the call) is recorded for assertions.

use super::traits::{
    CommandRunner, InvocationError, InvocationResult, InvocationSpec, ScratchPolicy,
};
use crate::core::models::artifact::StagedArtifact;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

pub(crate) struct RecordedInvocation {
    pub spec: InvocationSpec,
    /// Contents of each input artifact at invocation time, keyed by path.
    pub input_contents: Vec<(PathBuf, String)>,
    /// The scratch directory handed back for this invocation, if retained.
    pub scratch_dir: Option<PathBuf>,
}

#[derive(Default)]
pub(crate) struct ScriptedRunner {
    recorded: Mutex<Vec<RecordedInvocation>>,
    fail_subcommand: Option<String>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates an engine whose `subcommand` invocation fails.
    pub fn failing(subcommand: &str) -> Self {
        Self {
            recorded: Mutex::new(Vec::new()),
            fail_subcommand: Some(subcommand.to_string()),
        }
    }

    pub fn subcommands(&self) -> Vec<String> {
        self.recorded
            .lock()
            .unwrap()
            .iter()
            .map(|inv| inv.spec.subcommand().unwrap_or("").to_string())
            .collect()
    }

    pub fn with_recorded<T>(&self, f: impl FnOnce(&[RecordedInvocation]) -> T) -> T {
        f(&self.recorded.lock().unwrap())
    }

    /// Content snapshot of the input with the given extension, from the
    /// `index`-th invocation.
    pub fn input_snapshot(&self, index: usize, extension: &str) -> Option<String> {
        self.with_recorded(|recorded| {
            recorded.get(index).and_then(|inv| {
                inv.input_contents
                    .iter()
                    .find(|(path, _)| path.extension().is_some_and(|ext| ext == extension))
                    .map(|(_, contents)| contents.clone())
            })
        })
    }

    /// Scratch directories handed out across all recorded invocations.
    pub fn scratch_dirs(&self) -> Vec<PathBuf> {
        self.with_recorded(|recorded| {
            recorded
                .iter()
                .filter_map(|inv| inv.scratch_dir.clone())
                .collect()
        })
    }

    /// Every path that appeared in any invocation, inputs and outputs alike.
    pub fn touched_paths(&self) -> Vec<PathBuf> {
        self.with_recorded(|recorded| {
            recorded
                .iter()
                .flat_map(|inv| {
                    inv.spec
                        .inputs
                        .iter()
                        .cloned()
                        .chain(inv.spec.outputs.iter().map(|out| out.path.clone()))
                })
                .collect()
        })
    }
}

impl CommandRunner for ScriptedRunner {
    fn invoke(&self, spec: &InvocationSpec) -> Result<InvocationResult, InvocationError> {
        // Inputs must already exist; a stage that invokes before its inputs
        // are on disk has broken the pipeline ordering.
        let mut input_contents = Vec::new();
        for input in &spec.inputs {
            if !input.exists() {
                return Err(InvocationError::MissingInput {
                    path: input.clone(),
                });
            }
            input_contents.push((input.clone(), fs::read_to_string(input).unwrap_or_default()));
        }

        if self
            .fail_subcommand
            .as_deref()
            .is_some_and(|fail| spec.subcommand() == Some(fail))
        {
            self.recorded.lock().unwrap().push(RecordedInvocation {
                spec: spec.clone(),
                input_contents,
                scratch_dir: None,
            });
            return Err(InvocationError::NonZeroExit {
                command: spec.command_line(),
                status: 1,
                stderr: "simulated engine failure".to_string(),
            });
        }

        let mut outputs = Vec::with_capacity(spec.outputs.len());
        for declared in &spec.outputs {
            fs::write(&declared.path, format!("simulated {}", declared.role))?;
            outputs.push(StagedArtifact::new(declared.role, declared.path.clone()));
        }

        let scratch_dir = match spec.scratch {
            ScratchPolicy::Retain => Some(
                tempfile::Builder::new()
                    .prefix("gmxem-scripted-")
                    .tempdir()
                    .map_err(InvocationError::Scratch)?
                    .keep(),
            ),
            ScratchPolicy::Discard => None,
        };

        self.recorded.lock().unwrap().push(RecordedInvocation {
            spec: spec.clone(),
            input_contents,
            scratch_dir: scratch_dir.clone(),
        });

        Ok(InvocationResult {
            status: 0,
            stdout: String::new(),
            stderr: String::new(),
            scratch_dir,
            outputs,
        })
    }
}
