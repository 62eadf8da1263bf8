// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::ops::{Deref, DerefMut};

use massa_scenario_exports::{FileResolver, RunScenarioOptions, ScenarioError};
use massa_scenario_io::ScenarioController;
use massa_scenario_logging::massa_scenario_trace;
use massa_scenario_models::scenario::ExternalStepsStep;
use tracing::debug;

use crate::executor::ScenarioExecutor;

/// Executor state of the outer scenario, restored when the nested run ends,
/// whether it failed or not
struct ExternalStepsGuard<'a> {
    executor: &'a mut ScenarioExecutor,
    file_resolver: Option<Box<dyn FileResolver>>,
    check_gas: bool,
}

impl<'a> ExternalStepsGuard<'a> {
    fn enter(executor: &'a mut ScenarioExecutor, trace_gas: bool) -> Self {
        executor.gas_trace.push(trace_gas);
        executor.external_depth += 1;
        ExternalStepsGuard {
            file_resolver: executor.file_resolver.clone(),
            check_gas: executor.check_gas,
            executor,
        }
    }
}

impl Drop for ExternalStepsGuard<'_> {
    fn drop(&mut self) {
        self.executor.file_resolver = self.file_resolver.take();
        self.executor.check_gas = self.check_gas;
        self.executor.gas_trace.pop();
        self.executor.external_depth -= 1;
    }
}

impl Deref for ExternalStepsGuard<'_> {
    type Target = ScenarioExecutor;

    fn deref(&self) -> &Self::Target {
        self.executor
    }
}

impl DerefMut for ExternalStepsGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.executor
    }
}

impl ScenarioExecutor {
    /// Runs the steps of another scenario file over the current world.
    ///
    /// The path is relative to the file being run. Without an explicit
    /// `traceGas` the nested steps inherit the current gas tracing switch.
    pub(crate) fn execute_external_steps_step(
        &mut self,
        step: &ExternalStepsStep,
    ) -> Result<(), ScenarioError> {
        massa_scenario_trace!("external_steps_step", {
            "path": step.path,
            "comment": step.comment,
            "depth": self.external_depth
        });
        if self.external_depth >= self.config.max_external_steps_depth {
            return Err(ScenarioError::ExecutionError(format!(
                "external steps nesting exceeds maximum depth of {}: {}",
                self.config.max_external_steps_depth, step.path
            )));
        }
        let file_resolver = self.file_resolver.as_ref().ok_or_else(|| {
            ScenarioError::ExecutionError(format!(
                "no scenario file is being run, cannot resolve external steps {}",
                step.path
            ))
        })?;
        let nested_resolver = file_resolver.clone_box();
        let path = file_resolver.resolve_absolute_path(&step.path);
        let trace_gas = step.trace_gas.unwrap_or_else(|| self.peek_trace_gas());
        debug!(
            "running external steps {} (gas tracing {}, {} nested)",
            path.display(),
            trace_gas,
            self.gas_trace.len()
        );

        let mut guard = ExternalStepsGuard::enter(self, trace_gas);
        let mut controller = ScenarioController::new(&mut *guard, nested_resolver);
        controller.run_single_json_scenario(&path, RunScenarioOptions::default())
    }
}
