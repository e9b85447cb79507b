//! Agents, match records, and the compact match log

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::elo::DEFAULT_RATING;
use crate::error::{ArenaError, Result};
use crate::replay::{self, Trajectory};

pub type AgentId = Uuid;
pub type MatchId = Uuid;

/// A registered competitor.
///
/// `rating` is mutated only when a finished match settles. An agent with no
/// uploaded executable is never schedulable, regardless of `enabled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// URL of the agent's published source, if any
    #[serde(default)]
    pub source: Option<String>,
    /// Path to the uploaded executable
    #[serde(default)]
    pub executable: Option<PathBuf>,
    pub rating: f64,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            source: None,
            executable: None,
            rating: DEFAULT_RATING,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_executable(name: &str, executable: PathBuf) -> Self {
        Self {
            executable: Some(executable),
            ..Self::new(name)
        }
    }

    /// Whether the scheduler may pick this agent.
    pub fn is_eligible(&self) -> bool {
        self.enabled && self.executable.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Started,
    Finished,
    /// Soft-removed; excluded from every aggregate view.
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    LeftWon,
    RightWon,
    Draw,
    /// Only while the match is unsettled.
    Unknown,
}

/// Compact per-match log returned by the execution harness.
///
/// Thresholds are fixed-point probabilities (x100) in `[0, 100]`. Reward
/// arrays are cumulative totals, one entry per step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactLog {
    pub initial_thresholds: Vec<u8>,
    pub left_actions: Vec<u8>,
    pub right_actions: Vec<u8>,
    pub left_rewards: Vec<u32>,
    pub right_rewards: Vec<u32>,
}

impl CompactLog {
    pub fn num_bandits(&self) -> usize {
        self.initial_thresholds.len()
    }

    pub fn num_steps(&self) -> usize {
        self.left_actions.len()
    }

    /// Final cumulative totals, `(left, right)`.
    pub fn total_rewards(&self) -> (u32, u32) {
        (
            self.left_rewards.last().copied().unwrap_or(0),
            self.right_rewards.last().copied().unwrap_or(0),
        )
    }

    /// Outcome decided by the final cumulative totals.
    pub fn outcome(&self) -> MatchOutcome {
        let (left, right) = self.total_rewards();
        match left.cmp(&right) {
            std::cmp::Ordering::Greater => MatchOutcome::LeftWon,
            std::cmp::Ordering::Less => MatchOutcome::RightWon,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        }
    }

    /// Integrity check over the stored arrays. A violation is data corruption
    /// and fails the whole operation, it is never patched over.
    pub fn validate(&self) -> Result<()> {
        let steps = self.left_actions.len();
        if self.right_actions.len() != steps
            || self.left_rewards.len() != steps
            || self.right_rewards.len() != steps
        {
            return Err(ArenaError::MalformedRecord(format!(
                "array lengths disagree: actions {}/{}, rewards {}/{}",
                self.left_actions.len(),
                self.right_actions.len(),
                self.left_rewards.len(),
                self.right_rewards.len()
            )));
        }

        let num_bandits = self.num_bandits();
        for (i, &t) in self.initial_thresholds.iter().enumerate() {
            if t > 100 {
                return Err(ArenaError::MalformedRecord(format!(
                    "threshold {t} out of range at arm {i}"
                )));
            }
        }
        for (side, actions) in [("left", &self.left_actions), ("right", &self.right_actions)] {
            for (i, &a) in actions.iter().enumerate() {
                if a as usize >= num_bandits {
                    return Err(ArenaError::MalformedRecord(format!(
                        "{side} action {a} out of range [0, {num_bandits}) at step {i}"
                    )));
                }
            }
        }
        for (side, rewards) in [("left", &self.left_rewards), ("right", &self.right_rewards)] {
            for (i, pair) in rewards.windows(2).enumerate() {
                if pair[1] < pair[0] {
                    return Err(ArenaError::MalformedRecord(format!(
                        "{side} cumulative rewards decrease at step {}: {} -> {}",
                        i + 1,
                        pair[0],
                        pair[1]
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One scheduled match between two agents.
///
/// Created at schedule time with both "before" ratings snapshotted, finalized
/// exactly once, and immutable afterwards (history is never re-simulated).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub left_agent: AgentId,
    pub right_agent: AgentId,
    pub status: MatchStatus,
    pub outcome: MatchOutcome,
    pub left_rating_before: f64,
    pub right_rating_before: f64,
    pub left_rating_after: Option<f64>,
    pub right_rating_after: Option<f64>,
    pub log: Option<CompactLog>,
    pub started: DateTime<Utc>,
    pub finished: Option<DateTime<Utc>>,
    #[serde(skip)]
    trajectory: OnceCell<Trajectory>,
}

impl MatchRecord {
    /// Create a record at schedule time, snapshotting both current ratings.
    pub fn start(left: &Agent, right: &Agent) -> Self {
        Self {
            id: Uuid::new_v4(),
            left_agent: left.id,
            right_agent: right.id,
            status: MatchStatus::Started,
            outcome: MatchOutcome::Unknown,
            left_rating_before: left.rating,
            right_rating_before: right.rating,
            left_rating_after: None,
            right_rating_after: None,
            log: None,
            started: Utc::now(),
            finished: None,
            trajectory: OnceCell::new(),
        }
    }

    /// Finalize the match: store the compact log, the outcome derived from
    /// its final totals, and both "after" ratings. Transitions to `Finished`
    /// exactly once.
    pub fn finish(
        &mut self,
        log: CompactLog,
        left_rating_after: f64,
        right_rating_after: f64,
    ) -> Result<()> {
        if self.status != MatchStatus::Started {
            return Err(ArenaError::IncompleteRecord(format!(
                "cannot finish a match in status {:?}",
                self.status
            )));
        }
        log.validate()?;

        self.outcome = log.outcome();
        self.log = Some(log);
        self.left_rating_after = Some(left_rating_after);
        self.right_rating_after = Some(right_rating_after);
        self.finished = Some(Utc::now());
        self.status = MatchStatus::Finished;
        Ok(())
    }

    /// Soft removal; the record stays in history but is excluded from
    /// aggregates.
    pub fn soft_delete(&mut self) {
        self.status = MatchStatus::Deleted;
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    pub fn execution_time(&self) -> Option<Duration> {
        self.finished.map(|end| end - self.started)
    }

    /// Final cumulative totals, `(left, right)`. O(1), no reconstruction.
    pub fn total_rewards(&self) -> Result<(u32, u32)> {
        let log = self.require_log()?;
        Ok(log.total_rewards())
    }

    /// The reconstructed per-step trajectory, computed on first access and
    /// memoized for the lifetime of this record instance.
    pub fn trajectory(&self) -> Result<&Trajectory> {
        self.trajectory.get_or_try_init(|| replay::reconstruct(self))
    }

    /// Sum of per-step expected rewards, `(left, right)`.
    pub fn total_expected_rewards(&self) -> Result<(f32, f32)> {
        Ok(self.trajectory()?.total_expected_rewards())
    }

    /// Per-arm thresholds after the final step.
    pub fn thresholds_at_end(&self) -> Result<Vec<f32>> {
        Ok(self.trajectory()?.thresholds_at_end().to_vec())
    }

    pub(crate) fn require_log(&self) -> Result<&CompactLog> {
        if !self.is_finished() {
            return Err(ArenaError::IncompleteRecord(format!(
                "match {} is not finished (status {:?})",
                self.id, self.status
            )));
        }
        self.log.as_ref().ok_or_else(|| {
            ArenaError::IncompleteRecord(format!("match {} has no compact log", self.id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> CompactLog {
        CompactLog {
            initial_thresholds: vec![80, 20],
            left_actions: vec![0],
            right_actions: vec![1],
            left_rewards: vec![10],
            right_rewards: vec![2],
        }
    }

    #[test]
    fn outcome_from_final_totals() {
        let mut log = sample_log();
        assert_eq!(log.outcome(), MatchOutcome::LeftWon);
        log.right_rewards = vec![10];
        assert_eq!(log.outcome(), MatchOutcome::Draw);
        log.right_rewards = vec![11];
        assert_eq!(log.outcome(), MatchOutcome::RightWon);
    }

    #[test]
    fn finish_is_terminal() {
        let left = Agent::new("left");
        let right = Agent::new("right");
        let mut record = MatchRecord::start(&left, &right);
        assert_eq!(record.outcome, MatchOutcome::Unknown);
        assert!(record.finished.is_none());

        record.finish(sample_log(), 610.0, 590.0).unwrap();
        assert_eq!(record.status, MatchStatus::Finished);
        assert_eq!(record.outcome, MatchOutcome::LeftWon);
        assert_eq!(record.left_rating_after, Some(610.0));
        assert!(record.finished.is_some());

        let err = record.finish(sample_log(), 620.0, 580.0).unwrap_err();
        assert!(matches!(err, ArenaError::IncompleteRecord(_)));
    }

    #[test]
    fn finish_rejects_malformed_log() {
        let left = Agent::new("left");
        let right = Agent::new("right");
        let mut record = MatchRecord::start(&left, &right);

        let mut log = sample_log();
        log.left_actions = vec![2]; // == num_bandits, out of range
        let err = record.finish(log, 610.0, 590.0).unwrap_err();
        assert!(matches!(err, ArenaError::MalformedRecord(_)));
        assert_eq!(record.status, MatchStatus::Started);
    }

    #[test]
    fn validate_rejects_length_mismatch() {
        let mut log = sample_log();
        log.right_rewards = vec![2, 3];
        assert!(matches!(
            log.validate(),
            Err(ArenaError::MalformedRecord(_))
        ));
    }

    #[test]
    fn validate_rejects_decreasing_rewards() {
        let log = CompactLog {
            initial_thresholds: vec![50],
            left_actions: vec![0, 0],
            right_actions: vec![0, 0],
            left_rewards: vec![5, 3],
            right_rewards: vec![0, 0],
        };
        assert!(matches!(
            log.validate(),
            Err(ArenaError::MalformedRecord(_))
        ));
    }

    #[test]
    fn record_round_trips_without_the_trajectory_cache() {
        let left = Agent::new("left");
        let right = Agent::new("right");
        let mut record = MatchRecord::start(&left, &right);
        record.finish(sample_log(), 610.0, 590.0).unwrap();
        record.trajectory().unwrap(); // warm the cache

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("trajectory"));

        let restored: MatchRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, record.id);
        assert_eq!(restored.status, MatchStatus::Finished);
        assert_eq!(restored.log, record.log);
        // The cache rebuilds to the same sequence on the restored record
        assert_eq!(restored.trajectory().unwrap(), record.trajectory().unwrap());
    }

    #[test]
    fn eligibility_requires_enabled_and_executable() {
        let mut agent = Agent::new("no-exe");
        assert!(!agent.is_eligible());

        agent.executable = Some(PathBuf::from("/tmp/agent.py"));
        assert!(agent.is_eligible());

        agent.enabled = false;
        assert!(!agent.is_eligible());
    }
}
