//! Sequential schedule / execute / settle loop

use arena_core::{
    elo, AgentStore, MatchId, MatchRecord, MatchStore, Result,
};
use rand::Rng;

use crate::harness::MatchHarness;
use crate::scheduler::select_pair;

/// Drives matches one at a time: pick a pair, execute, settle, repeat.
///
/// Strictly sequential within one runner; no match overlaps another. Rating
/// settlement goes through the store's atomic read-modify-write, so several
/// runners sharing one agent pool cannot lose updates.
pub struct Runner<'a, S, H, R> {
    store: &'a S,
    harness: H,
    rng: R,
    k_factor: f64,
}

impl<'a, S, H, R> Runner<'a, S, H, R>
where
    S: AgentStore + MatchStore,
    H: MatchHarness,
    R: Rng,
{
    pub fn new(store: &'a S, harness: H, k_factor: f64, rng: R) -> Self {
        Self {
            store,
            harness,
            rng,
            k_factor,
        }
    }

    /// Play matches until the count is reached (`None` = run until an error,
    /// e.g. the eligible pool shrinking below two). Returns how many matches
    /// settled.
    pub fn run(&mut self, num_matches: Option<u64>) -> Result<u64> {
        let mut played = 0;
        while num_matches.map_or(true, |n| played < n) {
            let match_id = self.run_one()?;
            played += 1;
            tracing::info!(%match_id, played, "match settled");
        }
        Ok(played)
    }

    /// Schedule, execute and settle a single match.
    ///
    /// On harness failure the started record is left unfinalized, ratings are
    /// untouched, and the error propagates; retrying is the caller's call.
    pub fn run_one(&mut self) -> Result<MatchId> {
        let eligible = self.store.eligible_ids();
        let (left_id, right_id) = select_pair(&eligible, &mut self.rng)?;
        let left = self.store.agent(left_id)?;
        let right = self.store.agent(right_id)?;

        let mut record = MatchRecord::start(&left, &right);
        let match_id = record.id;
        self.store.insert_match(record.clone())?;
        tracing::debug!(%match_id, left = %left.name, right = %right.name, "match started");

        let log = match self.harness.run_match(&left, &right) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(%match_id, "match abandoned: {e}");
                return Err(e);
            }
        };

        let outcome = log.outcome();
        let (left_after, right_after) =
            elo::update_ratings(left.rating, right.rating, outcome, self.k_factor)?;

        record.finish(log, left_after, right_after)?;
        self.store.update_match(record)?;

        // Settle as deltas against whatever is stored now, not the ratings
        // snapshotted at schedule time.
        let left_delta = left_after - left.rating;
        let right_delta = right_after - right.rating;
        self.store.update_rating(left_id, &|r| r + left_delta)?;
        self.store.update_rating(right_id, &|r| r + right_delta)?;

        tracing::info!(
            %match_id,
            ?outcome,
            left = %left.name,
            right = %right.name,
            left_delta,
            right_delta,
            "match finished"
        );
        Ok(match_id)
    }
}
