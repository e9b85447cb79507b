//! Trajectory reconstruction from compact match logs
//!
//! A match only persists its initial thresholds, per-step action indices and
//! cumulative reward totals. Everything else - per-step reward deltas,
//! expected-reward estimates and the full decaying threshold vector - is
//! rederived here with a single deterministic forward pass.

use serde::Serialize;

use crate::error::Result;
use crate::model::{CompactLog, MatchRecord};

/// Multiplicative threshold decay applied per pull
pub const DECAY_RATE: f32 = 0.97;

/// Thresholds are fixed-point probabilities x100
pub const SAMPLE_RESOLUTION: f32 = 100.0;

/// Fully reconstructed state for one step of a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub left_action: u8,
    pub right_action: u8,
    pub left_reward_delta: u32,
    pub right_reward_delta: u32,
    pub total_left_reward: u32,
    pub total_right_reward: u32,
    /// Threshold of the pulled arm read *before* this step's decay, scaled
    /// to a probability
    pub left_expected_reward: f32,
    pub right_expected_reward: f32,
    /// Full per-arm threshold vector *after* this step's decay
    pub thresholds: Vec<f32>,
}

/// The reconstructed per-step sequence for one match.
///
/// Precomputed as a flat vector so playback can jump to arbitrary, possibly
/// non-monotonic step indices without re-scanning from step 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    initial_thresholds: Vec<f32>,
    steps: Vec<StepRecord>,
}

impl Trajectory {
    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn num_bandits(&self) -> usize {
        self.initial_thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&StepRecord> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn initial_thresholds(&self) -> &[f32] {
        &self.initial_thresholds
    }

    /// Per-arm thresholds after the final step, or the initial vector for a
    /// zero-step match.
    pub fn thresholds_at_end(&self) -> &[f32] {
        match self.steps.last() {
            Some(step) => &step.thresholds,
            None => &self.initial_thresholds,
        }
    }

    /// Sum of per-step expected rewards, `(left, right)`.
    pub fn total_expected_rewards(&self) -> (f32, f32) {
        self.steps.iter().fold((0.0, 0.0), |(left, right), step| {
            (
                left + step.left_expected_reward,
                right + step.right_expected_reward,
            )
        })
    }
}

/// Reconstruct the full trajectory of a finished match.
///
/// Fails with `IncompleteRecord` for an unfinished record or a missing log,
/// and with `MalformedRecord` when the stored arrays are inconsistent.
pub fn reconstruct(record: &MatchRecord) -> Result<Trajectory> {
    reconstruct_log(record.require_log()?)
}

/// Reconstruct directly from a compact log. Single O(num_steps) pass.
pub fn reconstruct_log(log: &CompactLog) -> Result<Trajectory> {
    log.validate()?;

    let initial_thresholds: Vec<f32> = log.initial_thresholds.iter().map(|&t| t as f32).collect();
    let mut thresholds = initial_thresholds.clone();
    let mut steps = Vec::with_capacity(log.num_steps());
    let mut prev_left = 0u32;
    let mut prev_right = 0u32;

    for i in 0..log.num_steps() {
        let left_action = log.left_actions[i];
        let right_action = log.right_actions[i];
        let left_arm = left_action as usize;
        let right_arm = right_action as usize;

        // Expected rewards are read before the decay, then both pulled arms
        // decay independently: a shared arm decays twice, once per pull.
        let left_expected_reward = thresholds[left_arm] / SAMPLE_RESOLUTION;
        let right_expected_reward = thresholds[right_arm] / SAMPLE_RESOLUTION;
        thresholds[left_arm] *= DECAY_RATE;
        thresholds[right_arm] *= DECAY_RATE;

        let total_left_reward = log.left_rewards[i];
        let total_right_reward = log.right_rewards[i];

        steps.push(StepRecord {
            left_action,
            right_action,
            left_reward_delta: total_left_reward - prev_left,
            right_reward_delta: total_right_reward - prev_right,
            total_left_reward,
            total_right_reward,
            left_expected_reward,
            right_expected_reward,
            thresholds: thresholds.clone(),
        });
        prev_left = total_left_reward;
        prev_right = total_right_reward;
    }

    Ok(Trajectory {
        initial_thresholds,
        steps,
    })
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod replay_tests;
