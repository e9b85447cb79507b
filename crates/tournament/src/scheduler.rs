//! Random pair selection

use arena_core::{AgentId, ArenaError, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Pick an unordered pair of distinct agents, uniformly without replacement.
///
/// Which id lands on the left seat is arbitrary but fixed for the resulting
/// match. Fails with `InsufficientAgents` when the pool has fewer than two
/// entries. Intentionally no rating-based matchmaking and no repeat-pairing
/// avoidance.
pub fn select_pair<R: Rng + ?Sized>(eligible: &[AgentId], rng: &mut R) -> Result<(AgentId, AgentId)> {
    if eligible.len() < 2 {
        return Err(ArenaError::InsufficientAgents(eligible.len()));
    }
    let picks: Vec<AgentId> = eligible.choose_multiple(rng, 2).copied().collect();
    Ok((picks[0], picks[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    #[test]
    fn rejects_pools_smaller_than_two() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            select_pair(&[], &mut rng),
            Err(ArenaError::InsufficientAgents(0))
        ));
        assert!(matches!(
            select_pair(&[Uuid::new_v4()], &mut rng),
            Err(ArenaError::InsufficientAgents(1))
        ));
    }

    #[test]
    fn never_pairs_an_agent_with_itself() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool: Vec<AgentId> = (0..5).map(|_| Uuid::new_v4()).collect();
        for _ in 0..500 {
            let (a, b) = select_pair(&pool, &mut rng).unwrap();
            assert_ne!(a, b);
            assert!(pool.contains(&a));
            assert!(pool.contains(&b));
        }
    }

    #[test]
    fn every_agent_eventually_gets_picked() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool: Vec<AgentId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let (a, b) = select_pair(&pool, &mut rng).unwrap();
            seen.insert(a);
            seen.insert(b);
        }
        assert_eq!(seen.len(), pool.len());
    }
}
