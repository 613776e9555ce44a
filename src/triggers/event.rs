//! Game events.
//!
//! Every observable state change produces a `GameEvent`. Engine operations
//! collect events for the action in progress and hand them to the
//! `EventSink` only once the action commits, so observers never see events
//! from a rejected action.
//!
//! Events are also the inputs to the trigger queue: `raise` matches AUTO
//! effects against an event before recording it.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::cards::CardState;
use crate::core::{Action, EntityId, Phase, PlayerId, WinReason};
use crate::effects::EffectId;
use crate::zones::Zone;

/// How a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// The defending leader took this much damage.
    LeaderDamaged { damage: usize },
    /// The defending character was knocked out.
    CharacterKnockedOut,
    /// The attacker's power fell short.
    Repelled,
    /// Attacker or target left the field before damage.
    Fizzled,
}

/// Something that happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    // === Zones ===
    CardMoved { card: EntityId, owner: PlayerId, from: Zone, to: Zone },
    StateChanged { entity: EntityId, from: CardState, to: CardState },
    PowerChanged { card: EntityId, old: i64, new: i64 },

    // === DON!! ===
    DonAdded { player: PlayerId, count: usize },
    DonGiven { don: EntityId, target: EntityId, player: PlayerId },
    DonReturned { player: PlayerId, count: usize },

    // === Actions ===
    CardPlayed { card: EntityId, player: PlayerId },
    EffectActivated { card: EntityId, effect: EffectId, player: PlayerId },
    ActionRejected { player: PlayerId, action: Action, reason: String },

    // === Battle ===
    AttackDeclared { attacker: EntityId, target: EntityId, player: PlayerId, power: i64 },
    BlockDeclared { blocker: EntityId, attacker: EntityId, original_target: EntityId, player: PlayerId },
    CounterStep { defender: PlayerId, target: EntityId, cards: Vec<EntityId>, boost: i64 },
    BattleEnded { attacker: EntityId, target: EntityId, outcome: BattleOutcome },
    CardKnockedOut { card: EntityId, owner: PlayerId },
    LifeLost { player: PlayerId, card: EntityId, remaining: usize },

    // === Turn Structure ===
    TurnStarted { turn: u32, player: PlayerId },
    PhaseChanged { turn: u32, player: PlayerId, phase: Phase },
    TurnEnded { turn: u32, player: PlayerId },
    AwaitingInput { player: PlayerId, choices: usize },
    GameOver { winner: PlayerId, reason: WinReason },

    // === Effects ===
    EffectTriggered { source: EntityId, effect: EffectId, controller: PlayerId },
    EffectResolved { source: EntityId, effect: EffectId, success: bool },
}

impl GameEvent {
    /// The card this event is about, if any.
    #[must_use]
    pub fn subject(&self) -> Option<EntityId> {
        match self {
            GameEvent::CardMoved { card, .. }
            | GameEvent::PowerChanged { card, .. }
            | GameEvent::CardPlayed { card, .. }
            | GameEvent::EffectActivated { card, .. }
            | GameEvent::CardKnockedOut { card, .. }
            | GameEvent::LifeLost { card, .. } => Some(*card),
            GameEvent::StateChanged { entity, .. } => Some(*entity),
            GameEvent::DonGiven { target, .. } => Some(*target),
            GameEvent::AttackDeclared { attacker, .. } | GameEvent::BattleEnded { attacker, .. } => {
                Some(*attacker)
            }
            GameEvent::BlockDeclared { blocker, .. } => Some(*blocker),
            GameEvent::CounterStep { target, .. } => Some(*target),
            GameEvent::EffectTriggered { source, .. } | GameEvent::EffectResolved { source, .. } => {
                Some(*source)
            }
            _ => None,
        }
    }

    /// The card this event points at, if any.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        match self {
            GameEvent::AttackDeclared { target, .. } | GameEvent::BattleEnded { target, .. } => Some(*target),
            GameEvent::BlockDeclared { attacker, .. } => Some(*attacker),
            _ => None,
        }
    }
}

/// Outbound event channel.
///
/// Wraps an unbounded tokio channel; a disabled sink drops events. Sends to
/// a closed receiver are ignored.
#[derive(Clone, Debug, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<GameEvent>>,
}

impl EventSink {
    /// A sink and the receiver its events arrive on.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<GameEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    pub fn emit(&self, event: GameEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn emit_all(&self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

/// Collect everything currently buffered on a receiver.
pub fn drain_events(rx: &mut UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_and_target() {
        let attack = GameEvent::AttackDeclared {
            attacker: EntityId(5),
            target: EntityId(9),
            player: PlayerId::FIRST,
            power: 5000,
        };
        assert_eq!(attack.subject(), Some(EntityId(5)));
        assert_eq!(attack.target(), Some(EntityId(9)));

        let turn = GameEvent::TurnStarted { turn: 1, player: PlayerId::FIRST };
        assert_eq!(turn.subject(), None);
    }

    #[test]
    fn test_sink_delivers_in_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.emit(GameEvent::TurnStarted { turn: 1, player: PlayerId::FIRST });
        sink.emit_all([GameEvent::TurnEnded { turn: 1, player: PlayerId::FIRST }]);

        let events = drain_events(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GameEvent::TurnStarted { .. }));
    }

    #[test]
    fn test_disabled_sink_and_closed_receiver() {
        EventSink::disabled().emit(GameEvent::TurnStarted { turn: 1, player: PlayerId::FIRST });

        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit(GameEvent::TurnStarted { turn: 1, player: PlayerId::FIRST });
        assert!(sink.is_enabled());
    }

    #[test]
    fn test_event_serialization() {
        let event = GameEvent::CounterStep {
            defender: PlayerId::SECOND,
            target: EntityId(3),
            cards: vec![EntityId(40)],
            boost: 2000,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }
}
