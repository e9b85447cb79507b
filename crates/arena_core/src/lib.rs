//! Core data model and algorithms for the bandit arena
//!
//! This crate provides:
//! - The `Agent` and `MatchRecord` entities and their lifecycle
//! - Elo-style rating updates (`elo`)
//! - Deterministic trajectory reconstruction from compact match logs (`replay`)
//! - Aggregate statistics over finished matches (`stats`)
//! - A repository abstraction with an in-memory implementation (`store`)
//!
//! Everything here is pure in-process logic: match execution, rendering and
//! durable persistence live behind the `store` and harness seams.

pub mod elo;
pub mod error;
pub mod model;
pub mod replay;
pub mod stats;
pub mod store;

pub use elo::{expected_scores, update_ratings, DEFAULT_RATING, K_FACTOR};
pub use error::{ArenaError, Result};
pub use model::{Agent, AgentId, CompactLog, MatchId, MatchOutcome, MatchRecord, MatchStatus};
pub use replay::{StepRecord, Trajectory, DECAY_RATE, SAMPLE_RESOLUTION};
pub use stats::{arm_usage, head_to_head, leaderboard, rank, side_stats, ArmUsage, HeadToHead, SideStats};
pub use store::{AgentStore, InMemoryStore, MatchStore};
