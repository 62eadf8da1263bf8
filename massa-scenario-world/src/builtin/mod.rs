// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Protocol operations executed directly against the world, without the VM.

mod account_functions;
mod convert;
mod esdt_functions;

use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};

use massa_scenario_logging::massa_scenario_trace;
use massa_scenario_models::vm::{ContractCallInput, ReturnCode, VmOutput};

use crate::error::WorldError;
use crate::world::World;

pub use convert::convert_to_builtin_function;

/// Every function the bridge knows, named as in call inputs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum BuiltinFunction {
    #[strum(serialize = "ESDTTransfer")]
    EsdtTransfer,
    #[strum(serialize = "ESDTNFTTransfer")]
    EsdtNftTransfer,
    #[strum(serialize = "MultiESDTNFTTransfer")]
    MultiEsdtNftTransfer,
    #[strum(serialize = "ESDTLocalMint")]
    EsdtLocalMint,
    #[strum(serialize = "ESDTLocalBurn")]
    EsdtLocalBurn,
    #[strum(serialize = "ESDTNFTCreate")]
    EsdtNftCreate,
    #[strum(serialize = "ESDTNFTAddQuantity")]
    EsdtNftAddQuantity,
    #[strum(serialize = "ESDTNFTBurn")]
    EsdtNftBurn,
    #[strum(serialize = "ESDTNFTAddURI")]
    EsdtNftAddUri,
    #[strum(serialize = "ESDTNFTUpdateAttributes")]
    EsdtNftUpdateAttributes,
    #[strum(serialize = "ESDTSetRole")]
    EsdtSetRole,
    #[strum(serialize = "ESDTUnSetRole")]
    EsdtUnSetRole,
    #[strum(serialize = "ChangeOwnerAddress")]
    ChangeOwnerAddress,
    #[strum(serialize = "ClaimDeveloperRewards")]
    ClaimDeveloperRewards,
    #[strum(serialize = "SetUserName")]
    SetUserName,
    #[strum(serialize = "SaveKeyValue")]
    SaveKeyValue,
}

/// Whether `function` is handled by the bridge rather than by contract code
pub fn is_builtin_function(function: &str) -> bool {
    BuiltinFunction::from_str(function).is_ok()
}

/// Why a builtin function did not complete
#[derive(Debug)]
pub(crate) enum BuiltinError {
    /// refused by the protocol rules, reported through the return code
    Rejected(ReturnCode, String),
    /// the world itself is broken
    World(WorldError),
}

impl From<WorldError> for BuiltinError {
    fn from(err: WorldError) -> Self {
        BuiltinError::World(err)
    }
}

pub(crate) type BuiltinResult = Result<VmOutput, BuiltinError>;

pub(crate) fn reject(message: &str) -> BuiltinError {
    BuiltinError::Rejected(ReturnCode::UserError, message.to_string())
}

pub(crate) const ERR_INVALID_ARGUMENTS: &str = "invalid arguments to process built-in function";
pub(crate) const ERR_INSUFFICIENT_FUNDS: &str = "insufficient funds";
pub(crate) const ERR_ACTION_NOT_ALLOWED: &str = "action is not allowed";
pub(crate) const ERR_INVALID_RECEIVER: &str = "invalid receiver address";
pub(crate) const ERR_OPERATION_NOT_PERMITTED: &str = "operation not permitted";

impl World {
    /// Runs a builtin function.
    ///
    /// Rule violations come back as a non-OK return code with a message, the
    /// caller is expected to roll the world back. `Err` is only returned when
    /// the bridge is not usable or the world data is corrupted.
    pub fn process_builtin_function(
        &mut self,
        input: &ContractCallInput,
    ) -> Result<VmOutput, WorldError> {
        let gas_costs = self
            .builtin_gas_costs
            .as_ref()
            .ok_or(WorldError::BuiltinFunctionsNotInitialized)?;
        let function = BuiltinFunction::from_str(&input.function)
            .map_err(|_| WorldError::FunctionNotFound(input.function.clone()))?;
        let gas_cost = gas_costs.get(&input.function).copied().unwrap_or_default();
        massa_scenario_trace!("process_builtin_function", {
            "function": input.function,
            "gas_cost": gas_cost,
            "gas_provided": input.vm_input.gas_provided
        });
        if input.vm_input.gas_provided < gas_cost {
            return Ok(VmOutput::failure(ReturnCode::OutOfGas, "not enough gas"));
        }

        let result = match function {
            BuiltinFunction::EsdtTransfer => esdt_functions::esdt_transfer(self, input),
            BuiltinFunction::EsdtNftTransfer => esdt_functions::esdt_nft_transfer(self, input),
            BuiltinFunction::MultiEsdtNftTransfer => {
                esdt_functions::multi_esdt_nft_transfer(self, input)
            }
            BuiltinFunction::EsdtLocalMint => esdt_functions::esdt_local_mint(self, input),
            BuiltinFunction::EsdtLocalBurn => esdt_functions::esdt_local_burn(self, input),
            BuiltinFunction::EsdtNftCreate => esdt_functions::esdt_nft_create(self, input),
            BuiltinFunction::EsdtNftAddQuantity => {
                esdt_functions::esdt_nft_add_quantity(self, input)
            }
            BuiltinFunction::EsdtNftBurn => esdt_functions::esdt_nft_burn(self, input),
            BuiltinFunction::EsdtNftAddUri => esdt_functions::esdt_nft_add_uri(self, input),
            BuiltinFunction::EsdtNftUpdateAttributes => {
                esdt_functions::esdt_nft_update_attributes(self, input)
            }
            BuiltinFunction::EsdtSetRole => esdt_functions::esdt_set_role(self, input, true),
            BuiltinFunction::EsdtUnSetRole => esdt_functions::esdt_set_role(self, input, false),
            BuiltinFunction::ChangeOwnerAddress => {
                account_functions::change_owner_address(self, input)
            }
            BuiltinFunction::ClaimDeveloperRewards => {
                account_functions::claim_developer_rewards(self, input)
            }
            BuiltinFunction::SetUserName => account_functions::set_user_name(self, input),
            BuiltinFunction::SaveKeyValue => account_functions::save_key_value(self, input),
        };
        match result {
            Ok(mut output) => {
                output.gas_remaining = input.vm_input.gas_provided - gas_cost;
                Ok(output)
            }
            Err(BuiltinError::Rejected(return_code, message)) => {
                Ok(VmOutput::failure(return_code, message))
            }
            Err(BuiltinError::World(err)) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests;
