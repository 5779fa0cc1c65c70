use serde::{Deserialize, Serialize};

/// Tuning knobs for the engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many times a workflow write is re-read and re-applied after
    /// losing an optimistic revision race.
    #[serde(default = "default_max_write_retries")]
    pub max_write_retries: u32,
}

fn default_max_write_retries() -> u32 {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_write_retries: default_max_write_retries(),
        }
    }
}
