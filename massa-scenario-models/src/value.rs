// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::check::Original;

/// A value interpreted from a scenario file, together with the JSON it came from
#[derive(Clone, Debug, PartialEq)]
pub struct Parsed<T> {
    /// interpreted value
    pub value: T,
    /// JSON exactly as written by the test author
    pub original: Original,
}

impl<T> Parsed<T> {
    /// Wraps an interpreted value and its source
    pub fn new(value: T, original: Original) -> Self {
        Parsed { value, original }
    }

    /// Source text: raw contents for JSON strings, compact JSON otherwise
    pub fn original_str(&self) -> String {
        original_to_string(&self.original)
    }

    /// Source as JSON text, strings keep their quotes
    pub fn original_json(&self) -> String {
        original_to_json(&self.original)
    }
}

/// Raw contents for JSON strings, compact JSON for anything else
pub fn original_to_string(original: &Original) -> String {
    match original {
        Original::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Compact JSON representation
pub fn original_to_json(original: &Original) -> String {
    original.to_string()
}
