use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The role a staged artifact plays in the pipeline.
///
/// Output artifacts are matched between the command runner and the stages by
/// role, never by position in an argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactRole {
    /// Engine parameter file (`.mdp`).
    Parameter,
    /// Structure coordinates (`.gro`).
    Coordinate,
    /// System topology (`.top`).
    Topology,
    /// Compiled binary run description (`.tpr`).
    CompiledRun,
    /// Minimization trajectory (`.trr`).
    Trajectory,
    /// Final minimized structure (`.gro`).
    FinalStructure,
    /// Energy log (`.edr`).
    EnergyLog,
    /// Diagnostic log (`.log`).
    DiagnosticLog,
}

impl ArtifactRole {
    /// The engine's conventional file extension for this role.
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactRole::Parameter => "mdp",
            ArtifactRole::Coordinate | ArtifactRole::FinalStructure => "gro",
            ArtifactRole::Topology => "top",
            ArtifactRole::CompiledRun => "tpr",
            ArtifactRole::Trajectory => "trr",
            ArtifactRole::EnergyLog => "edr",
            ArtifactRole::DiagnosticLog => "log",
        }
    }
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactRole::Parameter => "parameter",
            ArtifactRole::Coordinate => "coordinate",
            ArtifactRole::Topology => "topology",
            ArtifactRole::CompiledRun => "compiled-run",
            ArtifactRole::Trajectory => "trajectory",
            ArtifactRole::FinalStructure => "final-structure",
            ArtifactRole::EnergyLog => "energy-log",
            ArtifactRole::DiagnosticLog => "diagnostic-log",
        };
        f.write_str(name)
    }
}

/// A role-tagged temporary file passed between pipeline stages.
///
/// The stage that created an artifact owns it until the artifact is either
/// consumed (handed to the next stage inside a staged payload) or deleted
/// during that stage's cleanup. An artifact must never be read after its
/// owning stage's cleanup has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedArtifact {
    pub role: ArtifactRole,
    pub path: PathBuf,
}

impl StagedArtifact {
    pub fn new(role: ArtifactRole, path: impl Into<PathBuf>) -> Self {
        Self {
            role,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
