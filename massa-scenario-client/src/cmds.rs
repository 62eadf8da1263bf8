// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::path::Path;

use anyhow::{bail, Result};
use tracing::debug;

use massa_scenario_exports::VmBuilder;
use massa_scenario_io::ScenarioController;
use massa_scenario_json::DefaultFileResolver;
use massa_scenario_worker::ScenarioExecutor;

use crate::settings::ScenarioSettings;

/// Runs `path`: every scenario under it when it is a directory, the
/// scenario itself when it is a scenario file
pub fn run_scenarios_at_path(
    vm_builder: Box<dyn VmBuilder>,
    path: &Path,
    settings: &ScenarioSettings,
    force_trace_gas: bool,
) -> Result<()> {
    let mut options = settings.run_options();
    options.force_trace_gas |= force_trace_gas;
    debug!("running scenarios at {} ({:?})", path.display(), options);

    let mut executor = ScenarioExecutor::new(vm_builder, settings.config());
    let mut controller =
        ScenarioController::new(&mut executor, Box::new(DefaultFileResolver::new()));
    if path.is_dir() {
        controller.run_all_json_scenarios_in_directory(
            path,
            "",
            &settings.file_suffix,
            &settings.excluded,
            options,
        )?;
    } else if path.is_file() && path.to_string_lossy().ends_with(&settings.file_suffix) {
        controller.run_single_json_scenario(path, options)?;
    } else {
        bail!("only directories and scenario files accepted as path");
    }
    Ok(())
}
