// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! # Overview
//!
//! This crate provides the interfaces shared by the scenario controller
//! (massa-scenario-io), the scenario executor (massa-scenario-worker) and
//! the VM implementations they drive.
//!
//! # Architecture
//!
//! ## controller_traits.rs
//! Defines the `VmInterface`, `VmBuilder`, `ScenarioRunner` and
//! `FileResolver` traits.
//!
//! ## error.rs
//! Defines the error type of scenario runs.
//!
//! ## settings.rs
//! Contains configuration parameters for scenario runs.
//!
//! ## dummy_vm.rs
//! A VM that cannot execute contracts, for world-only scenarios.
//!
//! ## Test exports
//!
//! When the crate feature `test-exports` is enabled, tooling useful for testing purposes is exported.
//! See test_exports/mod.rs for details.

mod controller_traits;
pub mod dummy_vm;
mod error;
mod settings;

pub use controller_traits::{FileResolver, ScenarioRunner, VmBuilder, VmInterface};
pub use dummy_vm::{DummyVm, DummyVmBuilder};
pub use error::ScenarioError;
pub use settings::{
    RunScenarioOptions, ScenarioConfig, DEFAULT_MAX_EXTERNAL_STEPS_DEPTH, DEFAULT_SCENARIO_SUFFIX,
};

#[cfg(any(test, feature = "test-exports"))]
pub mod test_exports;
