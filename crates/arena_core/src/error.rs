//! Error taxonomy for the arena core

use thiserror::Error;

use crate::model::{AgentId, MatchId, MatchOutcome};

/// Failures surfaced by the arena core.
///
/// None of these are retried internally; retry policy belongs to the
/// orchestration layer.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// A rating update was requested for an unsettled outcome.
    #[error("cannot update ratings for outcome {0:?}")]
    InvalidOutcome(MatchOutcome),

    /// Fewer than two agents are enabled and have an executable.
    #[error("need at least 2 eligible agents, found {0}")]
    InsufficientAgents(usize),

    /// A record is missing data required for the requested operation,
    /// e.g. trajectory reconstruction on an unfinished match.
    #[error("incomplete match record: {0}")]
    IncompleteRecord(String),

    /// Stored arrays are internally inconsistent. Data corruption, not a
    /// recoverable condition.
    #[error("malformed match record: {0}")]
    MalformedRecord(String),

    /// The external match execution harness failed. The match is abandoned;
    /// no record is finalized and no ratings change.
    #[error("harness execution failed: {0}")]
    Harness(String),

    #[error("no agent with id {0}")]
    AgentNotFound(AgentId),

    #[error("no match with id {0}")]
    MatchNotFound(MatchId),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
