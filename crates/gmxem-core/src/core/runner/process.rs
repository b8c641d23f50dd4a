use super::traits::{
    CommandRunner, InvocationError, InvocationResult, InvocationSpec, ScratchPolicy,
};
use crate::core::models::artifact::StagedArtifact;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Checks that the engine binary is available, returning its version banner.
///
/// # Errors
///
/// Returns [`InvocationError::Spawn`] if the binary is not installed or not
/// in PATH, and [`InvocationError::NonZeroExit`] if the probe itself fails.
pub fn check_engine_available(program: &str) -> Result<String, InvocationError> {
    let output = Command::new(program)
        .arg("--version")
        .output()
        .map_err(|source| InvocationError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(InvocationError::NonZeroExit {
            command: format!("{program} --version"),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let banner = String::from_utf8_lossy(&output.stdout);
    Ok(banner.lines().next().unwrap_or("unknown").to_string())
}

/// Production [`CommandRunner`] backed by [`std::process::Command`].
///
/// Each invocation runs inside a fresh scratch directory created under the
/// configured root (the system temporary directory by default). The child's
/// stdout and stderr are captured to files inside the scratch directory, so
/// arbitrarily large engine output never blocks the pipeline on a pipe.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    scratch_root: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places scratch directories under `root` instead of the system
    /// temporary directory.
    pub fn with_scratch_root(root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: Some(root.into()),
        }
    }

    fn create_scratch(&self) -> Result<tempfile::TempDir, InvocationError> {
        let root = self
            .scratch_root
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        tempfile::Builder::new()
            .prefix("gmxem-scratch-")
            .tempdir_in(root)
            .map_err(InvocationError::Scratch)
    }

    fn wait_with_timeout(
        child: &mut std::process::Child,
        spec: &InvocationSpec,
    ) -> Result<ExitStatus, InvocationError> {
        let Some(timeout) = spec.timeout else {
            return Ok(child.wait()?);
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                if let Err(e) = child.kill() {
                    warn!("Failed to kill timed-out child process: {e}");
                }
                let _ = child.wait();
                return Err(InvocationError::Timeout {
                    command: spec.command_line(),
                    timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

fn read_captured(path: &Path) -> String {
    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

impl CommandRunner for ProcessRunner {
    #[instrument(skip_all, fields(program = %spec.program, subcommand = spec.subcommand().unwrap_or("")))]
    fn invoke(&self, spec: &InvocationSpec) -> Result<InvocationResult, InvocationError> {
        for input in &spec.inputs {
            if !input.exists() {
                return Err(InvocationError::MissingInput {
                    path: input.clone(),
                });
            }
        }

        // The scratch directory doubles as the child's working directory;
        // dropping the handle on any error path below removes it.
        let scratch = self.create_scratch()?;
        let stdout_path = scratch.path().join("stdout.log");
        let stderr_path = scratch.path().join("stderr.log");
        let stdout_file = File::create(&stdout_path)?;
        let stderr_file = File::create(&stderr_path)?;

        debug!("Invoking: {}", spec.command_line());
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(scratch.path())
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file))
            .stderr(Stdio::from(stderr_file))
            .spawn()
            .map_err(|source| InvocationError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        let status = Self::wait_with_timeout(&mut child, spec)?;
        let stdout = read_captured(&stdout_path);
        let stderr = read_captured(&stderr_path);

        if !status.success() {
            return Err(InvocationError::NonZeroExit {
                command: spec.command_line(),
                status: status.code().unwrap_or(-1),
                stderr,
            });
        }

        let mut outputs = Vec::with_capacity(spec.outputs.len());
        for declared in &spec.outputs {
            if !declared.path.exists() {
                return Err(InvocationError::MissingOutput {
                    command: spec.command_line(),
                    role: declared.role,
                    path: declared.path.clone(),
                });
            }
            outputs.push(StagedArtifact::new(declared.role, declared.path.clone()));
        }

        let scratch_dir = match spec.scratch {
            ScratchPolicy::Retain => Some(scratch.keep()),
            ScratchPolicy::Discard => {
                scratch.close().map_err(InvocationError::Scratch)?;
                None
            }
        };

        Ok(InvocationResult {
            status: status.code().unwrap_or(0),
            stdout,
            stderr,
            scratch_dir,
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::artifact::ArtifactRole;

    fn shell(script: String) -> InvocationSpec {
        InvocationSpec::new("sh").arg("-c").arg(script)
    }

    #[test]
    fn invoke_captures_output_and_tags_artifacts_by_role() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("boxed.gro");
        let spec = shell(format!("echo padding; printf boxed > {}", out.display()))
            .output(ArtifactRole::Coordinate, &out);

        let result = ProcessRunner::new().invoke(&spec).unwrap();
        assert!(result.stdout.contains("padding"));
        let artifact = result.output(ArtifactRole::Coordinate).unwrap();
        assert_eq!(artifact.path, out);
        assert_eq!(fs::read_to_string(&artifact.path).unwrap(), "boxed");

        // Retained scratch is the caller's to delete.
        let scratch = result.scratch_dir.unwrap();
        assert!(scratch.is_dir());
        fs::remove_dir_all(scratch).unwrap();
    }

    #[test]
    fn nonzero_exit_reports_captured_stderr() {
        let spec = shell("echo kernel panic >&2; exit 3".to_string());
        let err = ProcessRunner::new().invoke(&spec).unwrap_err();
        match err {
            InvocationError::NonZeroExit { status, stderr, .. } => {
                assert_eq!(status, 3);
                assert!(stderr.contains("kernel panic"));
            }
            other => panic!("expected NonZeroExit, got {other:?}"),
        }
    }

    #[test]
    fn timeout_kills_the_child_instead_of_hanging() {
        let spec = shell("sleep 30".to_string()).timeout(Some(Duration::from_millis(100)));
        let started = Instant::now();
        let err = ProcessRunner::new().invoke(&spec).unwrap_err();
        assert!(matches!(err, InvocationError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn missing_declared_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let never_written = dir.path().join("ghost.tpr");
        let spec = shell("true".to_string()).output(ArtifactRole::CompiledRun, &never_written);

        let err = ProcessRunner::new().invoke(&spec).unwrap_err();
        match err {
            InvocationError::MissingOutput { role, path, .. } => {
                assert_eq!(role, ArtifactRole::CompiledRun);
                assert_eq!(path, never_written);
            }
            other => panic!("expected MissingOutput, got {other:?}"),
        }
    }

    #[test]
    fn env_overrides_reach_the_child_without_touching_the_global_env() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("env.txt");
        let spec = shell(format!("printf \"$GMXEM_TEST_THREADS\" > {}", out.display()))
            .env_var("GMXEM_TEST_THREADS", "4")
            .output(ArtifactRole::DiagnosticLog, &out);

        ProcessRunner::new().invoke(&spec).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "4");
        assert!(std::env::var("GMXEM_TEST_THREADS").is_err());
    }

    #[test]
    fn missing_input_is_rejected_before_spawning() {
        let spec = shell("true".to_string()).input("/nonexistent/input.gro");
        let err = ProcessRunner::new().invoke(&spec).unwrap_err();
        assert!(matches!(err, InvocationError::MissingInput { .. }));
    }

    #[test]
    fn discard_policy_removes_the_scratch_directory() {
        let root = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::with_scratch_root(root.path());
        let mut spec = shell("true".to_string());
        spec.scratch = ScratchPolicy::Discard;

        let result = runner.invoke(&spec).unwrap();
        assert!(result.scratch_dir.is_none());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
