// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! # Overview
//!
//! Entry point of scenario runs: reads scenario files from disk, parses
//! them and drives a `ScenarioRunner` over them, one file or a whole
//! directory at a time.
//!
//! # Architecture
//!
//! ## controller.rs
//! `ScenarioController`, also used by the executor to run `externalSteps`.

mod controller;

pub use controller::ScenarioController;

#[cfg(test)]
mod tests;
