//! Translation of abstract minimization requests into engine parameters.
//!
//! The engine consumes a flat `key = value` parameter file. The mapping is
//! ordered; entries are serialized exactly in the order they were derived
//! from the request.

use crate::core::models::request::{MinimizationRequest, Periodicity};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Force tolerance applied when the request leaves it unset (engine units).
pub const DEFAULT_TOLERANCE: f64 = 1000.0;
/// Initial step size in nm applied when the request leaves it unset.
pub const DEFAULT_STEP_SIZE: f64 = 0.01;
/// Long-range electrostatics method applied when the request leaves it unset.
pub const DEFAULT_LONG_RANGE_METHOD: &str = "PME";

const INTEGRATOR_STEEPEST_DESCENT: &str = "steep";
const INTEGRATOR_CONJUGATE_GRADIENT: &str = "cg";

/// Maps the free-form method name onto the engine's integrator keyword.
///
/// Substring matching is deliberate: callers write "steepest-descent",
/// "steepest descent", or just "steep", and equally "conjugate-gradient" or
/// "conjugate gradients". An unset method means steepest descent.
fn integrator_keyword(method: Option<&str>) -> &'static str {
    match method {
        Some(name) if name.contains("conjugate") => INTEGRATOR_CONJUGATE_GRADIENT,
        Some(name) if name.contains("steep") => INTEGRATOR_STEEPEST_DESCENT,
        Some(_) | None => INTEGRATOR_STEEPEST_DESCENT,
    }
}

/// Compacts the per-axis boundary flags into the engine's directional code:
/// the letters of the periodic axes concatenated in x, y, z order. All axes
/// non-periodic yields the empty code.
fn periodicity_code(boundary: &[Periodicity; 3]) -> String {
    ["x", "y", "z"]
        .iter()
        .zip(boundary)
        .filter(|(_, flag)| **flag == Periodicity::Periodic)
        .map(|(axis, _)| *axis)
        .collect()
}

/// The ordered engine parameter mapping derived from a request.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams {
    entries: Vec<(&'static str, String)>,
}

impl EngineParams {
    pub fn from_request(request: &MinimizationRequest) -> Self {
        let mut entries = Vec::with_capacity(7);
        entries.push(("integrator", integrator_keyword(request.method.as_deref()).to_string()));
        entries.push((
            "emtol",
            request.tolerance.unwrap_or(DEFAULT_TOLERANCE).to_string(),
        ));
        entries.push((
            "emstep",
            request.step_size.unwrap_or(DEFAULT_STEP_SIZE).to_string(),
        ));
        if let Some(max_steps) = request.max_steps {
            entries.push(("nsteps", max_steps.to_string()));
        }
        entries.push(("pbc", periodicity_code(&request.boundary)));
        if let Some(vdw) = &request.short_range_method {
            entries.push(("vdwtype", vdw.clone()));
        }
        entries.push((
            "coulombtype",
            request
                .long_range_method
                .clone()
                .unwrap_or_else(|| DEFAULT_LONG_RANGE_METHOD.to_string()),
        ));
        Self { entries }
    }

    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the mapping, one `key = value` line per entry, in mapping
    /// order.
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        for (key, value) in &self.entries {
            writeln!(writer, "{key} = {value}")?;
        }
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()
    }
}
