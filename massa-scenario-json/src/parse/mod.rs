// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! JSON scenario parser.
//!
//! Every value keeps its original JSON next to the interpreted bytes, and
//! every error names the field that could not be parsed.

mod account;
mod check_account;
mod esdt;
mod steps;
mod tx;
mod value;

use std::str::FromStr;

use serde_json::Value;

use massa_scenario_exports::{FileResolver, ScenarioError};
use massa_scenario_models::scenario::{GasSchedule, Scenario};

use crate::interpreter::ExprInterpreter;
use value::{context, parse_bool, parse_string};

pub(crate) fn parse_error(message: String) -> ScenarioError {
    ScenarioError::ParseError(message)
}

/// Turns scenario files into [`Scenario`] values
pub struct Parser {
    pub(crate) interpreter: ExprInterpreter,
}

impl Parser {
    /// Parser for a VM of type `vm_type`, reading files through `file_resolver`
    pub fn new(vm_type: Vec<u8>, file_resolver: Box<dyn FileResolver>) -> Self {
        Parser {
            interpreter: ExprInterpreter::new(vm_type, file_resolver),
        }
    }

    pub fn file_resolver(&self) -> &dyn FileResolver {
        self.interpreter.file_resolver()
    }

    /// Used to set the context path before parsing a file
    pub fn file_resolver_mut(&mut self) -> &mut dyn FileResolver {
        self.interpreter.file_resolver_mut()
    }

    /// Parses the contents of a `.scen.json` file
    pub fn parse_scenario_file(&self, contents: &[u8]) -> Result<Scenario, ScenarioError> {
        let json: Value = serde_json::from_slice(contents)
            .map_err(|err| parse_error(format!("invalid JSON: {}", err)))?;
        let fields = json
            .as_object()
            .ok_or_else(|| parse_error("scenario file is not a JSON object".to_string()))?;

        let mut scenario = Scenario::default();
        for (key, value) in fields {
            match key.as_str() {
                "name" => scenario.name = parse_string(value).map_err(context("bad scenario name"))?,
                "comment" => {
                    scenario.comment = parse_string(value).map_err(context("bad scenario comment"))?
                }
                "checkGas" => {
                    scenario.check_gas = parse_bool(value).map_err(context("bad scenario checkGas flag"))?
                }
                "traceGas" => {
                    scenario.trace_gas = parse_bool(value).map_err(context("bad scenario traceGas flag"))?
                }
                "gasSchedule" => {
                    let name = parse_string(value).map_err(context("bad scenario gasSchedule"))?;
                    scenario.gas_schedule = GasSchedule::from_str(&name)
                        .map_err(|_| parse_error(format!("invalid gas schedule: {}", name)))?;
                }
                "steps" => {
                    scenario.steps = self
                        .process_steps(value)
                        .map_err(context("error processing steps"))?
                }
                _ => return Err(parse_error(format!("unknown scenario field: {}", key))),
            }
        }
        Ok(scenario)
    }
}
