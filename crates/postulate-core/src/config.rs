//! Run configuration.

use serde::{Deserialize, Serialize};

use postulate_explore::expand::ExpansionConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid run config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    /// Independent invocations run on the rayon pool.
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub execution: ExecutionMode,
    /// Cap on invocations per theory (0 = unbounded).
    pub max_invocations_per_theory: usize,
    /// Keep discarded branches in the run report.
    pub record_discarded: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionMode::Sequential,
            max_invocations_per_theory: 0,
            record_discarded: true,
        }
    }
}

impl RunConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn parallel() -> Self {
        Self {
            execution: ExecutionMode::Parallel,
            ..Self::default()
        }
    }

    pub fn expansion_config(&self) -> ExpansionConfig {
        ExpansionConfig {
            max_assignments: self.max_invocations_per_theory,
        }
    }
}
