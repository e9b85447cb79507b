//! Match execution boundary
//!
//! The environment that actually samples rewards is an external program; the
//! arena only hands it two executables and reads back a compact log.

use std::process::Command;

use arena_core::{Agent, ArenaError, CompactLog, Result};

/// Executes one match between two agents and returns its compact log.
///
/// Implementations are treated as opaque synchronous calls: any failure maps
/// to `ArenaError::Harness` and abandons the match.
pub trait MatchHarness {
    fn run_match(&mut self, left: &Agent, right: &Agent) -> Result<CompactLog>;
}

/// Harness that spawns an external environment runner.
///
/// The command is invoked as
/// `<command> <args..> --bandits <n> <left_exe> <right_exe>` and must print a
/// JSON `CompactLog` on stdout.
pub struct CommandHarness {
    command: String,
    args: Vec<String>,
    num_bandits: usize,
}

impl CommandHarness {
    pub fn new(command: impl Into<String>, args: Vec<String>, num_bandits: usize) -> Self {
        Self {
            command: command.into(),
            args,
            num_bandits,
        }
    }
}

impl MatchHarness for CommandHarness {
    fn run_match(&mut self, left: &Agent, right: &Agent) -> Result<CompactLog> {
        let left_exe = left.executable.as_deref().ok_or_else(|| {
            ArenaError::Harness(format!("agent '{}' has no executable", left.name))
        })?;
        let right_exe = right.executable.as_deref().ok_or_else(|| {
            ArenaError::Harness(format!("agent '{}' has no executable", right.name))
        })?;

        tracing::debug!(command = %self.command, left = %left.name, right = %right.name, "spawning harness");
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg("--bandits")
            .arg(self.num_bandits.to_string())
            .arg(left_exe)
            .arg(right_exe)
            .output()
            .map_err(|e| ArenaError::Harness(format!("failed to spawn '{}': {e}", self.command)))?;

        if !output.status.success() {
            return Err(ArenaError::Harness(format!(
                "harness exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| ArenaError::Harness(format!("invalid harness output: {e}")))
    }
}
