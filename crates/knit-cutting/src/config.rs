use std::fs;
use std::path::Path;

use knit_core::errors::{ErrorInfo, KnitError};
use serde::{Deserialize, Serialize};

fn config_error(code: &str, err: impl ToString) -> KnitError {
    KnitError::Config(ErrorInfo::new(code, err.to_string()))
}

/// YAML-configurable options of a [`crate::CuttingEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuttingOptions {
    /// Master seed for Monte Carlo sampling of joint choices.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Sampling stream of `seed`; distinct streams draw independent choices.
    #[serde(default)]
    pub stream: u64,
    /// Worker threads used to assemble joint choices; 1 runs sequentially.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_seed() -> u64 {
    0x6b6e_6974
}

fn default_parallelism() -> usize {
    1
}

impl Default for CuttingOptions {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            stream: 0,
            parallelism: default_parallelism(),
        }
    }
}

impl CuttingOptions {
    /// Returns a copy with a different seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns a copy drawing from another sampling stream.
    pub fn with_stream(mut self, stream: u64) -> Self {
        self.stream = stream;
        self
    }

    /// Returns a copy with a different worker count.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Parses options from a YAML document; missing fields take defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, KnitError> {
        let options: Self =
            serde_yaml::from_str(contents).map_err(|err| config_error("yaml-deserialize", err))?;
        options.validate()?;
        Ok(options)
    }

    /// Reads options from a YAML file.
    pub fn from_yaml_path(path: &Path) -> Result<Self, KnitError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            KnitError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Renders the options as YAML.
    pub fn to_yaml_string(&self) -> Result<String, KnitError> {
        serde_yaml::to_string(self).map_err(|err| config_error("yaml-serialize", err))
    }

    /// Rejects option combinations the engine cannot run with.
    pub fn validate(&self) -> Result<(), KnitError> {
        if self.parallelism == 0 {
            return Err(KnitError::Config(
                ErrorInfo::new("invalid-parallelism", "parallelism must be at least 1")
                    .with_hint("use 1 for sequential assembly"),
            ));
        }
        Ok(())
    }
}
