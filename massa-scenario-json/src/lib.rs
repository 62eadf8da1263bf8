// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! # Overview
//!
//! Reads scenario files.
//!
//! # Architecture
//!
//! ## interpreter.rs
//! Evaluates value expressions (`"address:owner"`, `"u32:5"`, `"file:x.wasm"`...)
//! into bytes.
//!
//! ## file_resolver.rs
//! Default implementation of `FileResolver`: paths are relative to the
//! scenario file, with optional replacements.
//!
//! ## parse
//! Builds the scenario model from JSON, reporting the offending field on error.

mod file_resolver;
mod interpreter;
mod parse;

pub use file_resolver::DefaultFileResolver;
pub use interpreter::{biguint_to_bytes, ExprInterpreter};
pub use parse::Parser;

#[cfg(test)]
mod tests;
