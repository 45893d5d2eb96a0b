//! Plan configuration.
//!
//! Stored as TOML; unspecified values use defaults, so a partial file such as
//!
//! ```toml
//! methodology = "bs7671-4f1a"
//! ```
//!
//! is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cable_data::Methodology;
use crate::error::{PlanError, PlanResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Cable table used to derive per-metre impedance from CSA
    pub methodology: Methodology,

    /// Maximum hops walked upstream or downstream before a query gives up.
    /// Real installations are well under 10 deep.
    pub max_depth: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            methodology: Methodology::Eland,
            max_depth: 32,
        }
    }
}

impl PlanConfig {
    pub fn from_toml_str(contents: &str) -> PlanResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> PlanResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), ?config, "loaded plan config");
        Ok(config)
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.max_depth == 0 {
            return Err(PlanError::Config("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }
}
