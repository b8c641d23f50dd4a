use crate::core::models::artifact::ArtifactRole;
use crate::core::models::request::MinimizationRequest;
use crate::core::runner::traits::InvocationSpec;
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::params::EngineParams;
use crate::engine::progress::Progress;
use crate::engine::staging::{self, CleanupGuard};
use crate::engine::state::ComputeRequest;
use tracing::{info, instrument};

/// Identifier of the engine this pipeline drives.
pub const EXPECTED_ENGINE: &str = "gmx";

/// Margin, in nm, between the structure and the simulation box wall.
const BOX_PADDING_NM: &str = "2";

/// Translates a minimization request into staged engine inputs.
///
/// Produces the parameter artifact, exports the molecule and force field,
/// and pads the structure into a simulation box through the runner. On
/// failure every artifact this stage created is removed before the error
/// propagates; on success their ownership transfers into the returned
/// [`ComputeRequest`].
#[instrument(skip_all, name = "preparation_stage")]
pub fn run(
    request: MinimizationRequest,
    ctx: &PipelineContext,
) -> Result<ComputeRequest, EngineError> {
    ctx.reporter.report(Progress::StageStart {
        name: "Preparation",
    });

    // Both preconditions run before anything reaches the disk: a rejected
    // request leaves zero artifacts behind.
    if request.engine != EXPECTED_ENGINE {
        return Err(EngineError::EngineMismatch {
            expected: EXPECTED_ENGINE,
            found: request.engine.clone(),
        });
    }
    if request.system.len() != 1 {
        return Err(EngineError::UnsupportedSystemSize {
            count: request.system.len(),
        });
    }

    let mut created = CleanupGuard::new();

    let parameters = staging::allocate_artifact(ArtifactRole::Parameter)?;
    created.track(&parameters.path);
    EngineParams::from_request(&request)
        .write_to_path(&parameters.path)
        .map_err(|e| EngineError::Preparation {
            path: parameters.path.clone(),
            message: format!("failed to write parameter file: {e}"),
        })?;

    let (molecule, forcefield) = &request.system[0];

    let topology = staging::allocate_artifact(ArtifactRole::Topology)?;
    created.track(&topology.path);
    forcefield
        .to_file(&topology.path)
        .map_err(|e| EngineError::Preparation {
            path: topology.path.clone(),
            message: format!("force-field export failed: {e}"),
        })?;

    let coordinates = staging::allocate_artifact(ArtifactRole::Coordinate)?;
    created.track(&coordinates.path);
    molecule
        .to_file(&coordinates.path)
        .map_err(|e| EngineError::Preparation {
            path: coordinates.path.clone(),
            message: format!("molecule export failed: {e}"),
        })?;

    let boxed = staging::reserve_artifact(ArtifactRole::Coordinate)?;
    created.track(&boxed.path);

    info!(
        "Padding structure '{}' into a simulation box.",
        molecule.name()
    );
    let spec = InvocationSpec::new(&request.engine)
        .args(["editconf", "-f"])
        .arg(coordinates.path.display().to_string())
        .args(["-d", BOX_PADDING_NM, "-o"])
        .arg(boxed.path.display().to_string())
        .input(&coordinates.path)
        .output(ArtifactRole::Coordinate, &boxed.path)
        .timeout(ctx.timeout);

    let invocation = {
        // The pre-boxed coordinates are superseded the moment the boxing
        // invocation returns, success or failure.
        let mut superseded = CleanupGuard::new();
        superseded.track(&coordinates.path);
        ctx.invoke(&spec)
    };
    let invocation = invocation.map_err(|e| EngineError::Preparation {
        path: boxed.path.clone(),
        message: format!("boxing invocation failed: {e}"),
    })?;

    if let Some(dir) = &invocation.scratch_dir {
        created.track(dir);
    }
    let boxed = invocation
        .output(ArtifactRole::Coordinate)
        .cloned()
        .ok_or_else(|| EngineError::Preparation {
            path: boxed.path.clone(),
            message: "boxing invocation produced no coordinate artifact".to_string(),
        })?;

    created.release();
    ctx.reporter.report(Progress::StageFinish);

    Ok(ComputeRequest {
        request,
        parameters,
        topology,
        coordinates: boxed,
        scratch_dir: invocation.scratch_dir,
    })
}
