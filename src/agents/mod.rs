//! Player agents.
//!
//! A `PlayerAgent` makes every decision the rules leave to a player: which
//! Main-phase action to take, whether to block, and which counters to use.
//! Action choice is async so an agent can wait on a network peer, a UI, or
//! a search; the engine awaits it and does nothing else in the meantime.
//! Block and counter choices happen inside a battle and are synchronous.
//!
//! ## Bundled Agents
//!
//! - [`PassingAgent`]: Ends every Main phase immediately, never blocks
//! - [`ScriptedAgent`]: Replays a fixed list of decisions
//! - [`RandomAgent`]: Uniform over legal actions, seeded

mod random;
mod scripted;

pub use random::RandomAgent;
pub use scripted::ScriptedAgent;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::core::{Action, EntityId, GameState, PlayerMap};

/// One agent per seat.
pub type Agents = PlayerMap<Box<dyn PlayerAgent>>;

/// A pending action decision.
pub type Decision<'a> = LocalBoxFuture<'a, Option<Action>>;

/// Decision-maker for one seat.
pub trait PlayerAgent {
    /// Choose one of `legal`, or `None` to end the Main phase.
    ///
    /// Returning an action outside `legal` is allowed; the engine rejects
    /// it and asks again.
    fn choose_action<'a>(&'a mut self, state: &'a GameState, legal: &'a [Action]) -> Decision<'a>;

    /// Choose a blocker for an attack on this player, or `None`.
    fn choose_blocker(
        &mut self,
        _state: &GameState,
        _attacker: EntityId,
        _candidates: &[EntityId],
    ) -> Option<EntityId> {
        None
    }

    /// Choose hand cards to use as counters for the attacked card.
    fn choose_counters(
        &mut self,
        _state: &GameState,
        _target: EntityId,
        _candidates: &[EntityId],
    ) -> Vec<EntityId> {
        Vec::new()
    }
}

/// Ends every Main phase without acting.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassingAgent;

impl PlayerAgent for PassingAgent {
    fn choose_action<'a>(&'a mut self, _state: &'a GameState, _legal: &'a [Action]) -> Decision<'a> {
        future::ready(None).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;

    #[tokio::test]
    async fn test_passing_agent() {
        let state = GameState::new(PlayerId::FIRST);
        let mut agent = PassingAgent;

        let choice = agent.choose_action(&state, &[Action::EndPhase]).await;

        assert_eq!(choice, None);
        assert_eq!(agent.choose_blocker(&state, EntityId(1), &[EntityId(2)]), None);
        assert!(agent.choose_counters(&state, EntityId(1), &[EntityId(3)]).is_empty());
    }

    /// Yields to the runtime before answering, like an agent waiting on a peer.
    struct Deferred;

    impl PlayerAgent for Deferred {
        fn choose_action<'a>(&'a mut self, _state: &'a GameState, legal: &'a [Action]) -> Decision<'a> {
            async move {
                tokio::task::yield_now().await;
                legal.iter().find(|a| !a.is_end_phase()).cloned()
            }
            .boxed_local()
        }
    }

    #[tokio::test]
    async fn test_deferred_decision() {
        let state = GameState::new(PlayerId::FIRST);
        let play = Action::PlayCard { card: EntityId(5) };
        let mut seats: Agents = Agents::from_pair(Box::new(Deferred), Box::new(PassingAgent));

        let choice = seats[PlayerId::FIRST].choose_action(&state, &[Action::EndPhase, play.clone()]).await;

        assert_eq!(choice, Some(play));
    }
}
