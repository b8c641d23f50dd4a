use crate::core::models::request::MinimizationRequest;
use crate::core::runner::traits::CommandRunner;
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::stages;
use crate::engine::state::MinimizationOutcome;
use std::time::Duration;
use tracing::{info, instrument};

/// Runs the complete energy-minimization pipeline.
///
/// Pure composition in fixed order: preparation, compute, post-processing.
/// There is no retry and no branching; the first stage error aborts the run
/// and propagates to the caller. Each stage releases the resources it
/// created before raising, so no cross-stage compensation is performed here.
///
/// The optional `timeout` bounds every individual engine invocation issued
/// during the run.
#[instrument(skip_all, name = "minimization_workflow")]
pub fn run(
    request: MinimizationRequest,
    runner: &dyn CommandRunner,
    reporter: &ProgressReporter,
    timeout: Option<Duration>,
) -> Result<MinimizationOutcome, EngineError> {
    info!(
        "Starting energy-minimization pipeline against engine '{}'.",
        request.engine
    );
    let ctx = PipelineContext::new(runner, reporter).with_timeout(timeout);

    let compute_request = stages::preparation::run(request, &ctx)?;
    let compute_result = stages::compute::run(compute_request, &ctx)?;
    let outcome = stages::post_processing::run(compute_result, &ctx)?;

    info!(
        "Minimization complete: {} molecule(s), {} trajectory label(s).",
        outcome.molecules.len(),
        outcome.trajectories.len()
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::request::{MinimizationRequest, MinimizationRequestBuilder, Periodicity};
    use crate::core::models::schema::{ForceField, Molecule};
    use crate::core::runner::scripted::ScriptedRunner;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn request() -> MinimizationRequestBuilder {
        MinimizationRequestBuilder::new()
            .engine("gmx")
            .add_molecule(Molecule::new("water", "coords"), ForceField::new("bonds"))
    }

    fn run_scripted(
        runner: &ScriptedRunner,
        request: MinimizationRequest,
    ) -> Result<MinimizationOutcome, EngineError> {
        let reporter = ProgressReporter::new();
        run(request, runner, &reporter, None)
    }

    #[test]
    fn pipeline_runs_the_three_invocations_in_order() {
        let runner = ScriptedRunner::new();
        let outcome = run_scripted(&runner, request().build().unwrap()).unwrap();

        assert_eq!(runner.subcommands(), ["editconf", "grompp", "mdrun"]);
        assert!(outcome.success);
        assert_eq!(outcome.molecules.len(), 1);
        assert_eq!(outcome.trajectories.len(), 1);
        assert_eq!(outcome.trajectories[0].0, "water");
    }

    #[test]
    fn explicit_request_translates_into_engine_parameters() {
        let runner = ScriptedRunner::new();
        let req = request()
            .method("steepest-descent")
            .tolerance(500.0)
            .boundary([
                Periodicity::Periodic,
                Periodicity::Periodic,
                Periodicity::NonPeriodic,
            ])
            .build()
            .unwrap();
        run_scripted(&runner, req).unwrap();

        // The parameter artifact is consumed by the preprocess invocation;
        // its content snapshot is taken at invocation time.
        let mdp = runner.input_snapshot(1, "mdp").unwrap();
        assert!(mdp.contains("integrator = steep"));
        assert!(mdp.contains("emtol = 500"));
        assert!(mdp.contains("pbc = xy"));
    }

    #[test]
    fn unset_method_and_tolerance_fall_back_to_defaults() {
        let runner = ScriptedRunner::new();
        run_scripted(&runner, request().build().unwrap()).unwrap();

        let mdp = runner.input_snapshot(1, "mdp").unwrap();
        assert!(mdp.contains("integrator = steep"));
        assert!(mdp.contains("emtol = 1000"));
        assert!(mdp.contains("emstep = 0.01"));
    }

    #[test]
    fn failing_execute_invocation_aborts_with_a_compute_error() {
        let runner = ScriptedRunner::failing("mdrun");
        let err = run_scripted(&runner, request().build().unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::Compute { .. }));

        // The compiled run and the boxed coordinates from the preceding
        // steps are gone from disk afterwards.
        let (boxed, compiled) = runner.with_recorded(|recorded| {
            (
                recorded[0].spec.outputs[0].path.clone(),
                recorded[1].spec.outputs[0].path.clone(),
            )
        });
        assert!(!boxed.exists());
        assert!(!compiled.exists());
    }

    #[test]
    fn completed_pipeline_leaves_no_staged_files_behind() {
        let runner = ScriptedRunner::new();
        run_scripted(&runner, request().build().unwrap()).unwrap();

        for path in runner.touched_paths() {
            assert!(!path.exists(), "leaked artifact: {}", path.display());
        }
        for scratch in runner.scratch_dirs() {
            assert!(!scratch.exists(), "leaked scratch: {}", scratch.display());
        }
    }

    #[test]
    fn concurrent_runs_use_disjoint_temporary_paths() {
        let handles: Vec<_> = ["water", "ethanol"]
            .into_iter()
            .map(|name| {
                let name = name.to_string();
                std::thread::spawn(move || {
                    let runner = ScriptedRunner::new();
                    let req = MinimizationRequestBuilder::new()
                        .engine("gmx")
                        .add_molecule(
                            Molecule::new(name, "coords"),
                            ForceField::new("bonds"),
                        )
                        .build()
                        .unwrap();
                    run_scripted(&runner, req).unwrap();
                    runner.touched_paths()
                })
            })
            .collect();

        let sets: Vec<HashSet<PathBuf>> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().into_iter().collect())
            .collect();
        assert!(sets[0].is_disjoint(&sets[1]));
    }
}
