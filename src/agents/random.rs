//! Uniform random agent.

use futures::future::{self, FutureExt};

use super::{Decision, PlayerAgent};
use crate::core::{Action, EntityId, GameRng, GameState};

/// Plays uniformly random legal actions.
///
/// Blocks with a random candidate half of the time and never counters.
/// Deterministic for a given seed.
#[derive(Clone, Debug)]
pub struct RandomAgent {
    rng: GameRng,
}

impl RandomAgent {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: GameRng::new(seed) }
    }

    fn pick<T: Clone>(&mut self, items: &[T]) -> Option<T> {
        self.rng.choose(items).cloned()
    }
}

impl PlayerAgent for RandomAgent {
    fn choose_action<'a>(&'a mut self, _state: &'a GameState, legal: &'a [Action]) -> Decision<'a> {
        let choice = self.pick(legal);
        future::ready(choice).boxed_local()
    }

    fn choose_blocker(&mut self, _state: &GameState, _attacker: EntityId, candidates: &[EntityId]) -> Option<EntityId> {
        if candidates.is_empty() || self.rng.one_in(2) {
            return None;
        }
        self.pick(candidates)
    }
}
