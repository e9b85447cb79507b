//! Repository abstraction over agents and match records
//!
//! The scheduler and the statistics views talk to these traits, not to a
//! storage engine. `InMemoryStore` is the reference implementation; a durable
//! backend plugs in behind the same seams.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{ArenaError, Result};
use crate::model::{Agent, AgentId, MatchId, MatchRecord, MatchStatus};

pub trait AgentStore {
    fn insert_agent(&self, agent: Agent) -> Result<()>;

    fn agent(&self, id: AgentId) -> Result<Agent>;

    fn agents(&self) -> Vec<Agent>;

    /// Ids of agents the scheduler may pick: enabled, with an executable.
    fn eligible_ids(&self) -> Vec<AgentId>;

    /// Atomic read-modify-write of one agent's rating.
    ///
    /// `apply` receives the rating stored at call time, not a snapshot the
    /// caller read earlier, so two matches settling close together for the
    /// same agent cannot lose an update. Returns the new rating.
    fn update_rating(&self, id: AgentId, apply: &dyn Fn(f64) -> f64) -> Result<f64>;

    fn set_enabled(&self, id: AgentId, enabled: bool) -> Result<()>;
}

pub trait MatchStore {
    fn insert_match(&self, record: MatchRecord) -> Result<()>;

    fn match_record(&self, id: MatchId) -> Result<MatchRecord>;

    fn update_match(&self, record: MatchRecord) -> Result<()>;

    /// Finished matches involving `agent`, soft-deleted ones excluded.
    fn finished_matches(&self, agent: AgentId) -> Vec<MatchRecord>;
}

/// Map-backed store for tests, demos, and single-process runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    agents: RwLock<HashMap<AgentId, Agent>>,
    matches: RwLock<HashMap<MatchId, MatchRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn agents_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<AgentId, Agent>> {
        self.agents.read().unwrap_or_else(|e| e.into_inner())
    }

    fn agents_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<AgentId, Agent>> {
        self.agents.write().unwrap_or_else(|e| e.into_inner())
    }

    fn matches_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<MatchId, MatchRecord>> {
        self.matches.read().unwrap_or_else(|e| e.into_inner())
    }

    fn matches_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<MatchId, MatchRecord>> {
        self.matches.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl AgentStore for InMemoryStore {
    fn insert_agent(&self, agent: Agent) -> Result<()> {
        self.agents_write().insert(agent.id, agent);
        Ok(())
    }

    fn agent(&self, id: AgentId) -> Result<Agent> {
        self.agents_read()
            .get(&id)
            .cloned()
            .ok_or(ArenaError::AgentNotFound(id))
    }

    fn agents(&self) -> Vec<Agent> {
        self.agents_read().values().cloned().collect()
    }

    fn eligible_ids(&self) -> Vec<AgentId> {
        self.agents_read()
            .values()
            .filter(|a| a.is_eligible())
            .map(|a| a.id)
            .collect()
    }

    fn update_rating(&self, id: AgentId, apply: &dyn Fn(f64) -> f64) -> Result<f64> {
        let mut agents = self.agents_write();
        let agent = agents.get_mut(&id).ok_or(ArenaError::AgentNotFound(id))?;
        agent.rating = apply(agent.rating);
        Ok(agent.rating)
    }

    fn set_enabled(&self, id: AgentId, enabled: bool) -> Result<()> {
        let mut agents = self.agents_write();
        let agent = agents.get_mut(&id).ok_or(ArenaError::AgentNotFound(id))?;
        agent.enabled = enabled;
        Ok(())
    }
}

impl MatchStore for InMemoryStore {
    fn insert_match(&self, record: MatchRecord) -> Result<()> {
        self.matches_write().insert(record.id, record);
        Ok(())
    }

    fn match_record(&self, id: MatchId) -> Result<MatchRecord> {
        self.matches_read()
            .get(&id)
            .cloned()
            .ok_or(ArenaError::MatchNotFound(id))
    }

    fn update_match(&self, record: MatchRecord) -> Result<()> {
        let mut matches = self.matches_write();
        if !matches.contains_key(&record.id) {
            return Err(ArenaError::MatchNotFound(record.id));
        }
        matches.insert(record.id, record);
        Ok(())
    }

    fn finished_matches(&self, agent: AgentId) -> Vec<MatchRecord> {
        self.matches_read()
            .values()
            .filter(|m| {
                m.status == MatchStatus::Finished
                    && (m.left_agent == agent || m.right_agent == agent)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompactLog;
    use std::path::PathBuf;

    fn eligible_agent(name: &str) -> Agent {
        Agent::with_executable(name, PathBuf::from(format!("/agents/{name}.py")))
    }

    #[test]
    fn eligible_ids_filter_disabled_and_missing_executable() {
        let store = InMemoryStore::new();
        let ready = eligible_agent("ready");
        let no_exe = Agent::new("no-exe");
        let disabled = eligible_agent("disabled");

        store.insert_agent(ready.clone()).unwrap();
        store.insert_agent(no_exe).unwrap();
        store.insert_agent(disabled.clone()).unwrap();
        store.set_enabled(disabled.id, false).unwrap();

        assert_eq!(store.eligible_ids(), vec![ready.id]);
    }

    #[test]
    fn update_rating_applies_to_stored_value() {
        let store = InMemoryStore::new();
        let agent = eligible_agent("a");
        let id = agent.id;
        store.insert_agent(agent).unwrap();

        // A stale snapshot taken here must not be what the closure sees
        store.update_rating(id, &|r| r + 10.0).unwrap();
        let new = store.update_rating(id, &|r| r + 5.0).unwrap();
        assert_eq!(new, 615.0);
        assert_eq!(store.agent(id).unwrap().rating, 615.0);
    }

    #[test]
    fn missing_agent_is_reported() {
        let store = InMemoryStore::new();
        let id = Agent::new("ghost").id;
        assert!(matches!(store.agent(id), Err(ArenaError::AgentNotFound(_))));
        assert!(matches!(
            store.update_rating(id, &|r| r),
            Err(ArenaError::AgentNotFound(_))
        ));
    }

    #[test]
    fn finished_matches_exclude_started_and_deleted() {
        let store = InMemoryStore::new();
        let a = eligible_agent("a");
        let b = eligible_agent("b");
        store.insert_agent(a.clone()).unwrap();
        store.insert_agent(b.clone()).unwrap();

        let log = CompactLog {
            initial_thresholds: vec![50],
            left_actions: vec![0],
            right_actions: vec![0],
            left_rewards: vec![1],
            right_rewards: vec![0],
        };

        let started = MatchRecord::start(&a, &b);
        store.insert_match(started).unwrap();

        let mut finished = MatchRecord::start(&a, &b);
        finished.finish(log.clone(), 610.0, 590.0).unwrap();
        let finished_id = finished.id;
        store.insert_match(finished).unwrap();

        let mut deleted = MatchRecord::start(&a, &b);
        deleted.finish(log, 610.0, 590.0).unwrap();
        deleted.soft_delete();
        store.insert_match(deleted).unwrap();

        let found = store.finished_matches(a.id);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, finished_id);
    }

    #[test]
    fn update_match_requires_existing_record() {
        let store = InMemoryStore::new();
        let a = eligible_agent("a");
        let b = eligible_agent("b");
        let record = MatchRecord::start(&a, &b);
        assert!(matches!(
            store.update_match(record),
            Err(ArenaError::MatchNotFound(_))
        ));
    }
}
