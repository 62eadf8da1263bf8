// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! this file defines all possible scenario error categories

use displaydoc::Display;
use massa_scenario_world::WorldError;
use thiserror::Error;

/// Errors of a scenario run.
#[non_exhaustive]
#[derive(Clone, Display, Error, Debug)]
pub enum ScenarioError {
    /// {0}
    ParseError(String),
    /// {0}
    ValidationError(String),
    /// {0}
    ExecutionError(String),
    /// {0}
    CheckStateError(String),
    /// {0}
    WorldError(#[from] WorldError),
    /// {0}
    IoError(String),
    /// {0}
    VmError(String),
    /// some tests failed
    SomeTestsFailed,
}

impl From<std::io::Error> for ScenarioError {
    fn from(err: std::io::Error) -> Self {
        ScenarioError::IoError(err.to_string())
    }
}
