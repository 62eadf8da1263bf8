// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Helpers shared by the scenario crates' tests.

use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;
use tracing_subscriber::filter::LevelFilter;

static TRACING: Once = Once::new();

/// Installs a debug-level fmt subscriber once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        use tracing_subscriber::prelude::*;
        let tracing_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_filter(LevelFilter::DEBUG);
        let _ = tracing_subscriber::registry().with(tracing_layer).try_init();
    });
}

/// A module under test together with the things it is plugged into
pub trait TestUniverse {
    type ModuleController;
    type ForeignControllers;
    type Config;

    fn new(controllers: Self::ForeignControllers, config: Self::Config) -> Self;

    fn initialize(&self) {
        init_tracing();
    }

    fn get_module_controller(&self) -> &Self::ModuleController;
    fn get_module_controller_mut(&mut self) -> &mut Self::ModuleController;
}

/// Temporary directory holding scenario files, removed on drop
pub struct ScenarioDir {
    dir: TempDir,
}

impl ScenarioDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("could not create temporary scenario dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `contents` at `relative_path`, creating parent directories
    pub fn write(&self, relative_path: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("could not create scenario sub dir");
        }
        std::fs::write(&path, contents).expect("could not write scenario file");
        path
    }
}

impl Default for ScenarioDir {
    fn default() -> Self {
        Self::new()
    }
}
