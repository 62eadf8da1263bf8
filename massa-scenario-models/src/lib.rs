// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! # Overview
//!
//! Typed model of scenario files and of the data exchanged with the VM.
//!
//! Values parsed from JSON keep their original JSON text next to the
//! interpreted bytes ([`Parsed`]) so that diagnostics can show the test
//! author exactly what was written. Expectations are expressed with the
//! three-state [`Check`] type.
//!
//! # Architecture
//!
//! * `scenario` / `transaction` / `account`: the parsed scenario tree
//! * `vm`: inputs and outputs of a VM or builtin function invocation
//! * `reconstructor`: renders raw bytes back into readable expressions

pub mod account;
pub mod address;
pub mod check;
pub mod reconstructor;
pub mod scenario;
pub mod transaction;
pub mod value;
pub mod vm;

pub use check::{Check, CheckValueList, Original};
pub use reconstructor::{ExprReconstructor, ReconstructorHint};
pub use value::Parsed;
