use crate::core::models::schema::{Molecule, Trajectory};
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use crate::engine::staging::CleanupGuard;
use crate::engine::state::{ComputeResult, MinimizationOutcome};
use tracing::{info, instrument};

/// Loads the raw engine outputs into domain objects and releases every
/// remaining staged resource.
///
/// Trajectory labels come from the request when given explicitly; otherwise
/// one label is derived per molecule name in system order, consuming
/// trajectory source files in the order encountered. The current pipeline
/// produces exactly one trajectory file per molecule; splitting a combined
/// trajectory across molecules is not supported.
#[instrument(skip_all, name = "post_processing_stage")]
pub fn run(
    result: ComputeResult,
    ctx: &PipelineContext,
) -> Result<MinimizationOutcome, EngineError> {
    ctx.reporter.report(Progress::StageStart {
        name: "Post-processing",
    });

    let ComputeResult {
        request,
        final_structure,
        trajectory,
        scratch_dir,
    } = result;

    // Everything this stage inherits is released on every exit path; the
    // outcome carries loaded objects, never file paths.
    let mut staged = CleanupGuard::new();
    staged.track(&trajectory.path);
    staged.track(&final_structure.path);
    if let Some(dir) = &scratch_dir {
        staged.track(dir);
    }

    let labels: Vec<String> = match &request.trajectory_labels {
        Some(labels) => labels.clone(),
        None => request
            .system
            .iter()
            .map(|(molecule, _)| molecule.name().to_string())
            .collect(),
    };

    let mut trajectories = Vec::with_capacity(labels.len());
    for label in labels {
        let loaded =
            Trajectory::from_file(&trajectory.path).map_err(|e| EngineError::PostProcessing {
                path: trajectory.path.clone(),
                message: format!("trajectory import failed: {e}"),
            })?;
        trajectories.push((label, loaded));
    }

    let molecule =
        Molecule::from_file(&final_structure.path).map_err(|e| EngineError::PostProcessing {
            path: final_structure.path.clone(),
            message: format!("final-structure import failed: {e}"),
        })?;

    staged.sweep();
    info!(
        "Minimized structure and {} trajectory label(s) loaded; staged resources released.",
        trajectories.len()
    );
    ctx.reporter.report(Progress::StageFinish);

    Ok(MinimizationOutcome {
        request,
        molecules: vec![molecule],
        trajectories,
        success: true,
    })
}
