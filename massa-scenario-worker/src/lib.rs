// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! # Overview
//!
//! Scenario executor: runs the steps of parsed scenarios against a world
//! it owns, driving a VM created by a `VmBuilder`.
//!
//! # Architecture
//!
//! ## executor.rs
//! `ScenarioExecutor`, the `ScenarioRunner` handed to the scenario
//! controller. Owns the world and the VM, dispatches steps by kind.
//!
//! ## step_set_state.rs
//! Writes accounts, tokens, block info and new address mocks into the world.
//!
//! ## step_tx.rs
//! Runs transactions inside a backup bracket: commit on success, rollback
//! on failure.
//!
//! ## tx_results.rs
//! Compares the VM output of a transaction with its `expect` section.
//!
//! ## step_check_state.rs
//! Compares world accounts, storage and tokens with a `checkState` step and
//! reports every mismatch.
//!
//! ## step_external.rs
//! Runs `externalSteps` files over the same world through a nested controller.
//!
//! ## step_dump.rs
//! Prints the world as scenario JSON.
//!
//! ## gas_trace.rs
//! Gas tracing switches inherited by nested scenarios, and the trace report.

mod executor;
mod gas_trace;
mod step_check_state;
mod step_dump;
mod step_external;
mod step_set_state;
mod step_tx;
mod tx_results;

pub use executor::ScenarioExecutor;
pub use step_tx::generate_tx_hash;

#[cfg(test)]
mod tests;
