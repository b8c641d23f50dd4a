use super::schema::{ForceField, Molecule};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RequestError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Boundary treatment of one box axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Periodicity {
    Periodic,
    NonPeriodic,
}

/// An abstract energy-minimization request.
///
/// This is the fixed external contract consumed by the pipeline. It is
/// immutable once built and is carried through every stage unchanged for
/// traceability.
#[derive(Debug, Clone)]
pub struct MinimizationRequest {
    /// Free-form minimization method name; substrings indicating
    /// steepest-descent or conjugate-gradient are recognized during
    /// preparation. Unset defaults to steepest-descent.
    pub method: Option<String>,
    /// Force tolerance terminating the minimization (engine units).
    pub tolerance: Option<f64>,
    /// Initial step size in nm.
    pub step_size: Option<f64>,
    /// Maximum number of minimization steps.
    pub max_steps: Option<u64>,
    /// Boundary flags for the x, y, z axes, in that order.
    pub boundary: [Periodicity; 3],
    /// Short-range (van der Waals) force-evaluation method name.
    pub short_range_method: Option<String>,
    /// Long-range (electrostatics) force-evaluation method name.
    pub long_range_method: Option<String>,
    /// The molecular system: molecule/force-field pairs in caller order.
    pub system: Vec<(Molecule, ForceField)>,
    /// Explicit trajectory labels for the outcome; derived from molecule
    /// names when unset.
    pub trajectory_labels: Option<Vec<String>>,
    /// Identifier of the execution engine the request targets.
    pub engine: String,
    /// Extra keyword arguments appended verbatim to the execute invocation.
    /// An empty value means the key is passed as a bare flag.
    pub keywords: Vec<(String, String)>,
}

#[derive(Default)]
pub struct MinimizationRequestBuilder {
    method: Option<String>,
    tolerance: Option<f64>,
    step_size: Option<f64>,
    max_steps: Option<u64>,
    boundary: Option<[Periodicity; 3]>,
    short_range_method: Option<String>,
    long_range_method: Option<String>,
    system: Vec<(Molecule, ForceField)>,
    trajectory_labels: Option<Vec<String>>,
    engine: Option<String>,
    keywords: Vec<(String, String)>,
}

impl MinimizationRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
    pub fn step_size(mut self, step_size: f64) -> Self {
        self.step_size = Some(step_size);
        self
    }
    pub fn max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
    pub fn boundary(mut self, boundary: [Periodicity; 3]) -> Self {
        self.boundary = Some(boundary);
        self
    }
    pub fn short_range_method(mut self, method: impl Into<String>) -> Self {
        self.short_range_method = Some(method.into());
        self
    }
    pub fn long_range_method(mut self, method: impl Into<String>) -> Self {
        self.long_range_method = Some(method.into());
        self
    }
    pub fn add_molecule(mut self, molecule: Molecule, forcefield: ForceField) -> Self {
        self.system.push((molecule, forcefield));
        self
    }
    pub fn trajectory_labels(mut self, labels: Vec<String>) -> Self {
        self.trajectory_labels = Some(labels);
        self
    }
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }
    pub fn keyword(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keywords.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<MinimizationRequest, RequestError> {
        Ok(MinimizationRequest {
            method: self.method,
            tolerance: self.tolerance,
            step_size: self.step_size,
            max_steps: self.max_steps,
            boundary: self
                .boundary
                .unwrap_or([Periodicity::NonPeriodic; 3]),
            short_range_method: self.short_range_method,
            long_range_method: self.long_range_method,
            system: self.system,
            trajectory_labels: self.trajectory_labels,
            engine: self.engine.ok_or(RequestError::MissingParameter("engine"))?,
            keywords: self.keywords,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_fails_without_an_engine() {
        let result = MinimizationRequestBuilder::new().build();
        assert_eq!(result.unwrap_err(), RequestError::MissingParameter("engine"));
    }

    #[test]
    fn boundary_defaults_to_non_periodic_axes() {
        let request = MinimizationRequestBuilder::new()
            .engine("gmx")
            .build()
            .unwrap();
        assert_eq!(request.boundary, [Periodicity::NonPeriodic; 3]);
        assert!(request.system.is_empty());
    }

    #[test]
    fn keywords_preserve_insertion_order() {
        let request = MinimizationRequestBuilder::new()
            .engine("gmx")
            .keyword("-nt", "4")
            .keyword("-v", "")
            .build()
            .unwrap();
        assert_eq!(
            request.keywords,
            vec![("-nt".to_string(), "4".to_string()), ("-v".to_string(), String::new())]
        );
    }
}
