// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use massa_scenario_exports::{FileResolver, ScenarioError};
use tracing::debug;

/// Resolves file references relative to the scenario file being parsed
#[derive(Clone, Debug, Default)]
pub struct DefaultFileResolver {
    context_path: PathBuf,
    contract_path_replacements: BTreeMap<String, PathBuf>,
}

impl DefaultFileResolver {
    pub fn new() -> Self {
        Default::default()
    }

    /// Makes every reference to `path` point to `new_path` instead.
    /// Used by VM test suites to swap contracts without editing scenarios.
    pub fn replace_path(mut self, path: &str, new_path: impl Into<PathBuf>) -> Self {
        self.contract_path_replacements
            .insert(path.to_string(), new_path.into());
        self
    }
}

impl FileResolver for DefaultFileResolver {
    fn set_context(&mut self, context_path: &Path) {
        self.context_path = context_path.to_path_buf();
    }

    fn resolve_absolute_path(&self, value: &str) -> PathBuf {
        if let Some(replacement) = self.contract_path_replacements.get(value) {
            debug!("path {} replaced by {}", value, replacement.display());
            return replacement.clone();
        }
        let directory = self.context_path.parent().unwrap_or_else(|| Path::new(""));
        directory.join(value)
    }

    fn resolve_file_value(&self, value: &str) -> Result<Vec<u8>, ScenarioError> {
        if value.is_empty() {
            return Ok(Vec::new());
        }
        let path = self.resolve_absolute_path(value);
        debug!("loading scenario file value from {}", path.display());
        std::fs::read(&path).map_err(|err| {
            ScenarioError::IoError(format!("error loading file {}: {}", path.display(), err))
        })
    }

    fn resolve_mxsc_value(&self, value: &str) -> Result<Vec<u8>, ScenarioError> {
        let contents = self.resolve_file_value(value)?;
        let json: serde_json::Value = serde_json::from_slice(&contents).map_err(|err| {
            ScenarioError::ParseError(format!("invalid contract file {}: {}", value, err))
        })?;
        let code = json
            .get("code")
            .and_then(|code| code.as_str())
            .ok_or_else(|| {
                ScenarioError::ParseError(format!("missing contract code in {}", value))
            })?;
        hex::decode(code).map_err(|err| {
            ScenarioError::ParseError(format!("invalid contract code in {}: {}", value, err))
        })
    }

    fn clone_box(&self) -> Box<dyn FileResolver> {
        Box::new(self.clone())
    }
}
