use crate::core::models::artifact::StagedArtifact;
use crate::core::models::request::MinimizationRequest;
use crate::core::models::schema::{Molecule, Trajectory};
use std::path::PathBuf;

/// Output of the preparation stage and input to the compute stage.
///
/// The artifacts and the scratch directory referenced here are owned by the
/// receiver: the compute stage deletes each of them at its designated point
/// in the invocation sequence.
#[derive(Debug)]
pub struct ComputeRequest {
    /// The original request, carried through for traceability.
    pub request: MinimizationRequest,
    pub parameters: StagedArtifact,
    pub topology: StagedArtifact,
    /// Boxed structure coordinates.
    pub coordinates: StagedArtifact,
    /// Scratch directory of the boxing invocation, to be deleted by the
    /// compute stage after the preprocess invocation returns.
    pub scratch_dir: Option<PathBuf>,
}

/// Output of the compute stage and input to the post-processing stage.
#[derive(Debug)]
pub struct ComputeResult {
    pub request: MinimizationRequest,
    pub final_structure: StagedArtifact,
    pub trajectory: StagedArtifact,
    /// Scratch directory of the execute invocation, to be deleted by
    /// post-processing.
    pub scratch_dir: Option<PathBuf>,
}

/// The completed minimization: loaded domain objects, never file paths.
#[derive(Debug)]
pub struct MinimizationOutcome {
    pub request: MinimizationRequest,
    pub molecules: Vec<Molecule>,
    /// Trajectories keyed by label, in label order.
    pub trajectories: Vec<(String, Trajectory)>,
    pub success: bool,
}
