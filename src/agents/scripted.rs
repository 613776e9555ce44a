//! Agent that replays a fixed decision list.

use std::collections::VecDeque;

use futures::future::{self, FutureExt};

use super::{Decision, PlayerAgent};
use crate::core::{Action, EntityId, GameState};

/// Replays queued decisions in order.
///
/// Each Main-phase prompt takes the next queued action; once the queue is
/// empty the agent ends the phase. Block and counter prompts take from
/// their own queues and fall back to "no block" / "no counters".
///
/// ## Example
///
/// ```
/// use don_rules::agents::ScriptedAgent;
/// use don_rules::core::{Action, EntityId};
///
/// let agent = ScriptedAgent::new()
///     .then(Action::PlayCard { card: EntityId(12) })
///     .then(Action::EndPhase)
///     .block_with(Some(EntityId(30)));
/// assert_eq!(agent.remaining(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScriptedAgent {
    actions: VecDeque<Action>,
    blocks: VecDeque<Option<EntityId>>,
    counters: VecDeque<Vec<EntityId>>,
}

impl ScriptedAgent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a Main-phase action (builder pattern).
    #[must_use]
    pub fn then(mut self, action: Action) -> Self {
        self.actions.push_back(action);
        self
    }

    /// Queue a block decision (builder pattern).
    #[must_use]
    pub fn block_with(mut self, blocker: Option<EntityId>) -> Self {
        self.blocks.push_back(blocker);
        self
    }

    /// Queue a counter decision (builder pattern).
    #[must_use]
    pub fn counter_with(mut self, cards: Vec<EntityId>) -> Self {
        self.counters.push_back(cards);
        self
    }

    /// Queue more actions after construction.
    pub fn push(&mut self, action: Action) {
        self.actions.push_back(action);
    }

    /// Main-phase actions not yet used.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.actions.len()
    }
}

impl PlayerAgent for ScriptedAgent {
    fn choose_action<'a>(&'a mut self, _state: &'a GameState, _legal: &'a [Action]) -> Decision<'a> {
        let next = self.actions.pop_front();
        future::ready(next).boxed_local()
    }

    fn choose_blocker(&mut self, _state: &GameState, _attacker: EntityId, candidates: &[EntityId]) -> Option<EntityId> {
        self.blocks
            .pop_front()
            .flatten()
            .filter(|b| candidates.contains(b))
    }

    fn choose_counters(&mut self, _state: &GameState, _target: EntityId, _candidates: &[EntityId]) -> Vec<EntityId> {
        self.counters.pop_front().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;

    #[tokio::test]
    async fn test_replays_in_order() {
        let state = GameState::new(PlayerId::FIRST);
        let mut agent = ScriptedAgent::new()
            .then(Action::PlayCard { card: EntityId(4) })
            .then(Action::EndPhase);

        assert_eq!(
            agent.choose_action(&state, &[]).await,
            Some(Action::PlayCard { card: EntityId(4) })
        );
        assert_eq!(agent.choose_action(&state, &[]).await, Some(Action::EndPhase));
        assert_eq!(agent.choose_action(&state, &[]).await, None);
    }

    #[test]
    fn test_block_must_be_a_candidate() {
        let state = GameState::new(PlayerId::FIRST);
        let mut agent = ScriptedAgent::new()
            .block_with(Some(EntityId(9)))
            .block_with(Some(EntityId(7)));

        assert_eq!(agent.choose_blocker(&state, EntityId(1), &[EntityId(7)]), None);
        assert_eq!(agent.choose_blocker(&state, EntityId(1), &[EntityId(7)]), Some(EntityId(7)));
        assert_eq!(agent.choose_blocker(&state, EntityId(1), &[EntityId(7)]), None);
    }
}
