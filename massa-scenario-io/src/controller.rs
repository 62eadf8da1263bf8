// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::path::{Path, PathBuf};

use console::style;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

use massa_scenario_exports::{FileResolver, RunScenarioOptions, ScenarioError, ScenarioRunner};
use massa_scenario_json::Parser;
use massa_scenario_logging::massa_scenario_trace;

/// Loads scenario files and hands them to an executor.
///
/// Borrows the executor, so a nested controller can run `externalSteps`
/// files over the state of the executor that is running the outer scenario.
pub struct ScenarioController<'a> {
    executor: &'a mut dyn ScenarioRunner,
    parser: Parser,
    runs_new_test: bool,
}

impl<'a> ScenarioController<'a> {
    pub fn new(executor: &'a mut dyn ScenarioRunner, file_resolver: Box<dyn FileResolver>) -> Self {
        let parser = Parser::new(executor.vm_type(), file_resolver);
        ScenarioController {
            executor,
            parser,
            runs_new_test: false,
        }
    }

    /// Parses and runs one scenario file
    pub fn run_single_json_scenario(
        &mut self,
        path: &Path,
        options: RunScenarioOptions,
    ) -> Result<(), ScenarioError> {
        let path = absolute_path(path)?;
        massa_scenario_trace!("run_single_json_scenario", {
            "path": path.display().to_string()
        });
        let contents = std::fs::read(&path).map_err(|err| {
            ScenarioError::IoError(format!("error reading file {}: {}", path.display(), err))
        })?;
        self.parser.file_resolver_mut().set_context(&path);
        let mut scenario = self.parser.parse_scenario_file(&contents)?;

        if self.runs_new_test {
            scenario.is_new_test = true;
            self.runs_new_test = false;
        }
        if options.force_trace_gas {
            scenario.trace_gas = true;
        }
        self.executor
            .run_scenario(&mut scenario, self.parser.file_resolver())
    }

    /// Runs every file ending with `suffix` under `general_test_path/specific_test_path`.
    ///
    /// Files matching one of the `excluded` glob patterns (relative to
    /// `general_test_path`) are skipped. Failures are reported and the run
    /// goes on; `SomeTestsFailed` is returned at the end if any test failed.
    pub fn run_all_json_scenarios_in_directory(
        &mut self,
        general_test_path: &Path,
        specific_test_path: &str,
        suffix: &str,
        excluded: &[String],
        options: RunScenarioOptions,
    ) -> Result<(), ScenarioError> {
        let main_dir = general_test_path.join(specific_test_path);
        let excluded = exclusion_set(general_test_path, excluded)?;

        let mut passed = 0usize;
        let mut failed = 0usize;
        let mut skipped = 0usize;
        for entry in WalkDir::new(&main_dir).sort_by_file_name() {
            let entry = entry
                .map_err(|err| ScenarioError::IoError(format!("error walking tests: {}", err)))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !path.to_string_lossy().ends_with(suffix) {
                continue;
            }

            let short_path = path.strip_prefix(general_test_path).unwrap_or(path);
            print!("Scenario: {} ... ", short_path.display());
            if excluded.is_match(path) {
                skipped += 1;
                println!("  {}", style("skip").yellow());
                continue;
            }

            self.executor.reset();
            self.runs_new_test = true;
            match self.run_single_json_scenario(path, options) {
                Ok(()) => {
                    passed += 1;
                    println!("  {}", style("ok").green());
                }
                Err(err) => {
                    failed += 1;
                    warn!("scenario {} failed: {}", short_path.display(), err);
                    println!("  {}", style(format!("FAIL: {}", err)).red());
                }
            }
        }
        println!(
            "Done. Passed: {}. Failed: {}. Skipped: {}.",
            passed, failed, skipped
        );
        debug!(
            "scenario directory {} done: {} passed, {} failed, {} skipped",
            main_dir.display(),
            passed,
            failed,
            skipped
        );

        if failed > 0 {
            return Err(ScenarioError::SomeTestsFailed);
        }
        Ok(())
    }
}

fn absolute_path(path: &Path) -> Result<PathBuf, ScenarioError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn exclusion_set(general_test_path: &Path, excluded: &[String]) -> Result<GlobSet, ScenarioError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in excluded {
        let pattern = general_test_path.join(pattern);
        let glob = GlobBuilder::new(&pattern.to_string_lossy())
            .literal_separator(true)
            .build()
            .map_err(|err| {
                ScenarioError::IoError(format!("bad exclusion pattern {}: {}", pattern.display(), err))
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| ScenarioError::IoError(format!("bad exclusion patterns: {}", err)))
}
