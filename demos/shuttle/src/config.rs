//! Run configuration loaded from JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use pax_core::{AgentConfig, SimConfig, StopConfig};
use pax_stop::StopLayout;

/// Stops served when the file does not say.
const DEFAULT_STOPS: u32 = 10;

/// Everything one demo run needs.  Every field is optional in the file;
/// missing ones take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShuttleConfig {
    pub sim:    SimConfig,
    pub stop:   StopConfig,
    pub agent:  AgentConfig,
    /// Number of stop visits to run.
    pub stops:  u32,
    /// Custom vehicle geometry.  `None` runs the built-in city bus on its
    /// walkable floor; a custom layout runs on an unbounded floor.
    pub layout: Option<StopLayout>,
}

impl Default for ShuttleConfig {
    fn default() -> Self {
        Self {
            sim:    SimConfig::default(),
            stop:   StopConfig::default(),
            agent:  AgentConfig::default(),
            stops:  DEFAULT_STOPS,
            layout: None,
        }
    }
}

impl ShuttleConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
