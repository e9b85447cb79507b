//! Tournament runner for the bandit arena
//!
//! This crate provides infrastructure for:
//! - Picking random agent pairs from the eligible pool
//! - Executing matches through an external environment harness
//! - Settling results: rating updates and record finalization
//!
//! # Usage
//!
//! ```bash
//! # Play 20 matches with the configured harness
//! cargo run -p tournament -- run -n 20 --config arena.toml
//!
//! # Show current ratings
//! cargo run -p tournament -- leaderboard
//! ```

mod config;
mod harness;
mod runner;
mod scheduler;

pub use config::*;
pub use harness::*;
pub use runner::*;
pub use scheduler::*;
