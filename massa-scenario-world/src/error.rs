// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use thiserror::Error;

/// World model errors
#[non_exhaustive]
#[derive(Clone, Display, Error, Debug, PartialEq, Eq)]
pub enum WorldError {
    /// no snapshots
    NoSnapshots,
    /// snapshot {index} out of bounds (min 0, max {max})
    SnapshotOutOfBounds { index: isize, max: isize },
    /// account not found. could not update
    AccountNotFound,
    /// sender account not found: 0x{0}
    SenderNotFound(String),
    /// insufficient funds
    InsufficientFunds,
    /// {0}
    InvalidAccount(String),
    /// builtin functions not initialized
    BuiltinFunctionsNotInitialized,
    /// function not found: {0}
    FunctionNotFound(String),
    /// ESDT storage error: {0}
    EsdtStorageError(String),
}
