use crate::core::models::artifact::ArtifactRole;
use crate::core::runner::traits::{InvocationError, InvocationSpec};
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use crate::engine::staging::{self, CleanupGuard};
use crate::engine::state::{ComputeRequest, ComputeResult};
use tracing::{info, instrument};

fn invocation_failed(spec: &InvocationSpec, error: InvocationError) -> EngineError {
    let diagnostics = match error {
        InvocationError::NonZeroExit { stderr, .. } if !stderr.is_empty() => stderr,
        other => other.to_string(),
    };
    EngineError::Compute {
        command: spec.command_line(),
        diagnostics,
    }
}

fn missing_role(spec: &InvocationSpec, role: ArtifactRole) -> EngineError {
    EngineError::Compute {
        command: spec.command_line(),
        diagnostics: format!("required {role} output missing from invocation result"),
    }
}

/// Runs the two-phase engine invocation: preprocess, then execute.
///
/// The two invocations are strictly sequential; the execute invocation's
/// input is the compiled-run artifact the preprocess invocation writes, so
/// it cannot be issued until the first has completed. Consumed inputs are
/// deleted at fixed points between the invocations, and on failure every
/// artifact still owned by this stage is removed before the error
/// propagates.
#[instrument(skip_all, name = "compute_stage")]
pub fn run(input: ComputeRequest, ctx: &PipelineContext) -> Result<ComputeResult, EngineError> {
    ctx.reporter.report(Progress::StageStart { name: "Compute" });

    let ComputeRequest {
        request,
        parameters,
        topology,
        coordinates,
        scratch_dir: inherited_scratch,
    } = input;

    let compiled = staging::reserve_artifact(ArtifactRole::CompiledRun)?;

    // Alive until the execute invocation returns; also the failure sweep for
    // everything this stage still owns if either invocation goes wrong.
    let mut run_inputs = CleanupGuard::new();
    run_inputs.track(&compiled.path);
    run_inputs.track(&coordinates.path);

    // --- Preprocess: compile parameters, coordinates and topology into one
    // binary run description. ---
    let preprocess_spec = InvocationSpec::new(&request.engine)
        .args(["grompp", "-f"])
        .arg(parameters.path.display().to_string())
        .arg("-c")
        .arg(coordinates.path.display().to_string())
        .arg("-p")
        .arg(topology.path.display().to_string())
        .arg("-o")
        .arg(compiled.path.display().to_string())
        .args(["-maxwarn", "-1"])
        .input(&parameters.path)
        .input(&coordinates.path)
        .input(&topology.path)
        .output(ArtifactRole::CompiledRun, &compiled.path)
        .timeout(ctx.timeout);

    let preprocess = {
        // The parameter and topology artifacts and the inherited scratch
        // directory are consumed here; they are deleted as soon as the
        // preprocess invocation returns, success or failure.
        let mut consumed = CleanupGuard::new();
        consumed.track(&parameters.path);
        consumed.track(&topology.path);
        if let Some(dir) = &inherited_scratch {
            consumed.track(dir);
        }
        ctx.invoke(&preprocess_spec)
    }
    .map_err(|e| invocation_failed(&preprocess_spec, e))?;

    if let Some(dir) = &preprocess.scratch_dir {
        run_inputs.track(dir);
    }
    let compiled = preprocess
        .output(ArtifactRole::CompiledRun)
        .cloned()
        .ok_or_else(|| missing_role(&preprocess_spec, ArtifactRole::CompiledRun))?;
    info!("Compiled run description staged at '{}'.", compiled.path.display());

    // --- Execute: the minimization itself. ---
    let trajectory = staging::reserve_artifact(ArtifactRole::Trajectory)?;
    let final_structure = staging::reserve_artifact(ArtifactRole::FinalStructure)?;
    let energy_log = staging::reserve_artifact(ArtifactRole::EnergyLog)?;
    let diagnostic_log = staging::reserve_artifact(ArtifactRole::DiagnosticLog)?;

    let mut declared = CleanupGuard::new();
    declared.track(&trajectory.path);
    declared.track(&final_structure.path);
    declared.track(&energy_log.path);
    declared.track(&diagnostic_log.path);

    let mut execute_spec = InvocationSpec::new(&request.engine)
        .args(["mdrun", "-s"])
        .arg(compiled.path.display().to_string())
        .arg("-o")
        .arg(trajectory.path.display().to_string())
        .arg("-c")
        .arg(final_structure.path.display().to_string())
        .arg("-e")
        .arg(energy_log.path.display().to_string())
        .arg("-g")
        .arg(diagnostic_log.path.display().to_string())
        .input(&compiled.path)
        .output(ArtifactRole::Trajectory, &trajectory.path)
        .output(ArtifactRole::FinalStructure, &final_structure.path)
        .output(ArtifactRole::EnergyLog, &energy_log.path)
        .output(ArtifactRole::DiagnosticLog, &diagnostic_log.path)
        .timeout(ctx.timeout);

    // Extra keyword arguments pass through verbatim; an empty value means a
    // bare flag.
    for (key, value) in &request.keywords {
        execute_spec = execute_spec.arg(key);
        if !value.is_empty() {
            execute_spec = execute_spec.arg(value);
        }
    }

    let outcome = ctx.invoke(&execute_spec);
    // The compiled run, the boxed coordinates and the preprocess scratch
    // directory are spent once the execute invocation returns.
    run_inputs.sweep();
    let execute = outcome.map_err(|e| invocation_failed(&execute_spec, e))?;

    if let Some(dir) = &execute.scratch_dir {
        declared.track(dir);
    }
    let trajectory = execute
        .output(ArtifactRole::Trajectory)
        .cloned()
        .ok_or_else(|| missing_role(&execute_spec, ArtifactRole::Trajectory))?;
    let final_structure = execute
        .output(ArtifactRole::FinalStructure)
        .cloned()
        .ok_or_else(|| missing_role(&execute_spec, ArtifactRole::FinalStructure))?;
    let energy_log = execute
        .output(ArtifactRole::EnergyLog)
        .cloned()
        .ok_or_else(|| missing_role(&execute_spec, ArtifactRole::EnergyLog))?;
    let diagnostic_log = execute
        .output(ArtifactRole::DiagnosticLog)
        .cloned()
        .ok_or_else(|| missing_role(&execute_spec, ArtifactRole::DiagnosticLog))?;

    declared.release();

    // This pipeline does not persist the engine logs, and this is the last
    // point at which they can be removed.
    staging::remove_paths([energy_log.path.as_path(), diagnostic_log.path.as_path()]);

    ctx.reporter.report(Progress::StageFinish);

    Ok(ComputeResult {
        request,
        final_structure,
        trajectory,
        scratch_dir: execute.scratch_dir,
    })
}
