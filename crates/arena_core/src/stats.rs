//! Aggregate statistics over agents and finished matches
//!
//! Everything here consumes the stored records and the reconstructed
//! trajectories; no decay logic is re-derived.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Agent, AgentId, MatchOutcome, MatchRecord};
use crate::replay::Trajectory;

/// Win/draw/loss tally against a single opponent, from one agent's
/// perspective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeadToHead {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl HeadToHead {
    pub fn total(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    pub fn win_ratio(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| f64::from(self.wins) / f64::from(total))
    }
}

/// Per-opponent win/draw/loss tallies for `agent`.
///
/// Only finished matches count; self-play records are recorded history but
/// never a rivalry, so they are skipped.
pub fn head_to_head<'a, I>(agent: AgentId, matches: I) -> BTreeMap<AgentId, HeadToHead>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut tallies: BTreeMap<AgentId, HeadToHead> = BTreeMap::new();

    for record in matches {
        if !record.is_finished() || record.left_agent == record.right_agent {
            continue;
        }
        let (opponent, outcome) = if record.left_agent == agent {
            (record.right_agent, record.outcome)
        } else if record.right_agent == agent {
            // Flip to the agent's perspective
            let flipped = match record.outcome {
                MatchOutcome::LeftWon => MatchOutcome::RightWon,
                MatchOutcome::RightWon => MatchOutcome::LeftWon,
                other => other,
            };
            (record.left_agent, flipped)
        } else {
            continue;
        };

        let tally = tallies.entry(opponent).or_default();
        match outcome {
            MatchOutcome::LeftWon => tally.wins += 1,
            MatchOutcome::RightWon => tally.losses += 1,
            MatchOutcome::Draw => tally.draws += 1,
            MatchOutcome::Unknown => {}
        }
    }

    tallies
}

/// Per-side game and win counts for one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SideStats {
    pub left_games: u32,
    pub left_wins: u32,
    pub right_games: u32,
    pub right_wins: u32,
}

impl SideStats {
    pub fn left_win_ratio(&self) -> Option<f64> {
        (self.left_games > 0).then(|| f64::from(self.left_wins) / f64::from(self.left_games))
    }

    pub fn right_win_ratio(&self) -> Option<f64> {
        (self.right_games > 0).then(|| f64::from(self.right_wins) / f64::from(self.right_games))
    }
}

/// How an agent performs on each seat, over its finished matches.
pub fn side_stats<'a, I>(agent: AgentId, matches: I) -> SideStats
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut stats = SideStats::default();
    for record in matches {
        if !record.is_finished() {
            continue;
        }
        if record.left_agent == agent {
            stats.left_games += 1;
            if record.outcome == MatchOutcome::LeftWon {
                stats.left_wins += 1;
            }
        }
        if record.right_agent == agent {
            stats.right_games += 1;
            if record.outcome == MatchOutcome::RightWon {
                stats.right_wins += 1;
            }
        }
    }
    stats
}

fn by_rating_descending(a: &Agent, b: &Agent) -> Ordering {
    b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
}

/// All agents sorted by rating, best first.
pub fn leaderboard(agents: &[Agent]) -> Vec<&Agent> {
    let mut entries: Vec<&Agent> = agents.iter().collect();
    entries.sort_by(|a, b| by_rating_descending(a, b));
    entries
}

/// 1-based position of `agent` in the rating order, or None if unknown.
///
/// Full re-sort per call; fine at arena-sized agent pools.
pub fn rank(agent: AgentId, agents: &[Agent]) -> Option<usize> {
    leaderboard(agents)
        .iter()
        .position(|a| a.id == agent)
        .map(|i| i + 1)
}

/// Per-arm pull counts and accumulated rewards over a whole match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArmUsage {
    pub left_pulls: Vec<u32>,
    pub right_pulls: Vec<u32>,
    pub left_rewards: Vec<u32>,
    pub right_rewards: Vec<u32>,
}

/// How often each arm was pulled and how much it paid out, per side.
pub fn arm_usage(trajectory: &Trajectory) -> ArmUsage {
    let n = trajectory.num_bandits();
    let mut usage = ArmUsage {
        left_pulls: vec![0; n],
        right_pulls: vec![0; n],
        left_rewards: vec![0; n],
        right_rewards: vec![0; n],
    };
    for step in trajectory.steps() {
        usage.left_pulls[step.left_action as usize] += 1;
        usage.right_pulls[step.right_action as usize] += 1;
        usage.left_rewards[step.left_action as usize] += step.left_reward_delta;
        usage.right_rewards[step.right_action as usize] += step.right_reward_delta;
    }
    usage
}
