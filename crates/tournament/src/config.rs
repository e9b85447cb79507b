//! Runner configuration

use std::fs;
use std::path::{Path, PathBuf};

use arena_core::{elo, ArenaError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the tournament runner, loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// External environment runner executed per match
    pub harness_command: String,
    /// Extra arguments passed before the agent executables
    pub harness_args: Vec<String>,
    /// Number of arms in the bandit environment
    pub num_bandits: usize,
    /// K-factor for rating updates
    pub k_factor: f64,
    /// Agents registered at startup
    pub agents: Vec<AgentSpec>,
    /// Where ratings are dumped after a run
    pub ratings_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub executable: PathBuf,
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            harness_command: "mab-env".to_string(),
            harness_args: Vec::new(),
            num_bandits: 100,
            k_factor: elo::K_FACTOR,
            agents: Vec::new(),
            ratings_path: PathBuf::from("arena_ratings.json"),
        }
    }
}

impl RunnerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ArenaError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| ArenaError::Config(format!("failed to parse {}: {e}", path.display())))
    }
}
