use crate::error::{CliError, Result};
use gmxem::core::models::request::{MinimizationRequest, MinimizationRequestBuilder, Periodicity};
use gmxem::core::models::schema::{ForceField, Molecule};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct JobFile {
    engine: String,
    method: Option<String>,
    tolerance: Option<f64>,
    step_size: Option<f64>,
    max_steps: Option<u64>,
    boundary: Option<[Periodicity; 3]>,
    trajectory_labels: Option<Vec<String>>,
    #[serde(default)]
    forces: ForcesSection,
    system: SystemSection,
    /// Keyword/value pairs appended verbatim to the execute invocation; an
    /// empty value means a bare flag. An array of pairs keeps the order the
    /// job file wrote them in.
    #[serde(default)]
    keywords: Vec<(String, String)>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct ForcesSection {
    short_range: Option<String>,
    long_range: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct SystemSection {
    molecule: PathBuf,
    forcefield: PathBuf,
}

fn job_file_error(path: &Path, source: impl Into<anyhow::Error>) -> CliError {
    CliError::JobFile {
        path: path.to_path_buf(),
        source: source.into(),
    }
}

/// Loads a TOML job file and assembles the minimization request, importing
/// the referenced molecule and force-field files.
pub fn load_request(path: &Path) -> Result<MinimizationRequest> {
    debug!("Loading job file from '{}'.", path.display());
    let text = fs::read_to_string(path).map_err(|e| job_file_error(path, e))?;
    let job: JobFile = toml::from_str(&text).map_err(|e| job_file_error(path, e))?;

    let molecule = Molecule::from_file(&job.system.molecule)
        .map_err(|e| job_file_error(&job.system.molecule, e))?;
    let forcefield = ForceField::from_file(&job.system.forcefield)
        .map_err(|e| job_file_error(&job.system.forcefield, e))?;

    let mut builder = MinimizationRequestBuilder::new()
        .engine(job.engine)
        .add_molecule(molecule, forcefield);
    if let Some(method) = job.method {
        builder = builder.method(method);
    }
    if let Some(tolerance) = job.tolerance {
        builder = builder.tolerance(tolerance);
    }
    if let Some(step_size) = job.step_size {
        builder = builder.step_size(step_size);
    }
    if let Some(max_steps) = job.max_steps {
        builder = builder.max_steps(max_steps);
    }
    if let Some(boundary) = job.boundary {
        builder = builder.boundary(boundary);
    }
    if let Some(labels) = job.trajectory_labels {
        builder = builder.trajectory_labels(labels);
    }
    if let Some(short_range) = job.forces.short_range {
        builder = builder.short_range_method(short_range);
    }
    if let Some(long_range) = job.forces.long_range {
        builder = builder.long_range_method(long_range);
    }
    for (key, value) in job.keywords {
        builder = builder.keyword(key, value);
    }

    builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}
