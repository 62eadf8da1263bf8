// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! # Overview
//!
//! In-memory blockchain world the scenario executor and the VM run against.
//!
//! # Architecture
//!
//! * `world`: the ledger, block information and transaction snapshots
//! * `esdt`: token data stored under protected keys of account storage
//! * `builtin`: protocol functions (token transfers, roles, ownership)
//!   executed without the VM

pub mod account;
pub mod account_map;
pub mod block_info;
pub mod builtin;
mod error;
pub mod esdt;
pub mod world;

pub use account::{Account, DEFAULT_CODE_METADATA};
pub use account_map::AccountMap;
pub use block_info::BlockInfo;
pub use builtin::{convert_to_builtin_function, is_builtin_function, BuiltinFunction};
pub use error::WorldError;
pub use world::{NewAddressMock, World};
