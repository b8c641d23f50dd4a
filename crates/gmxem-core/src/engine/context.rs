use crate::core::runner::traits::{
    CommandRunner, InvocationError, InvocationResult, InvocationSpec,
};
use crate::engine::progress::{Progress, ProgressReporter};
use std::time::Duration;

/// Collaborators shared by every stage of one pipeline run.
///
/// The context is read-only from the stages' point of view; the optional
/// timeout is threaded into every external invocation issued through it.
pub struct PipelineContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub reporter: &'a ProgressReporter<'a>,
    pub timeout: Option<Duration>,
}

impl<'a> PipelineContext<'a> {
    pub fn new(runner: &'a dyn CommandRunner, reporter: &'a ProgressReporter<'a>) -> Self {
        Self {
            runner,
            reporter,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Issues an invocation through the runner, bracketed by progress events.
    pub fn invoke(&self, spec: &InvocationSpec) -> Result<InvocationResult, InvocationError> {
        self.reporter.report(Progress::InvocationStart {
            subcommand: spec.subcommand().unwrap_or(&spec.program).to_string(),
        });
        let result = self.runner.invoke(spec);
        self.reporter.report(Progress::InvocationFinish);
        result
    }
}
