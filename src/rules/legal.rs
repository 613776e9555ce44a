//! Legal-action enumeration.
//!
//! `legal_actions` is pure and shares its checks with the action executor,
//! so an action is listed exactly when executing it would pass validation.

use crate::cards::{CardCategory, Keyword};
use crate::core::{Action, EngineError, EntityId, GameState, Phase, PlayerId, RulesConfig};
use crate::triggers::can_activate;
use crate::zones::{Zone, ZoneError};

/// Every action `player` may take right now.
///
/// Outside the player's own Main phase (or after the game ended) this is
/// just `EndPhase`.
#[must_use]
pub fn legal_actions(state: &GameState, player: PlayerId, config: &RulesConfig) -> Vec<Action> {
    let mut actions = vec![Action::EndPhase];
    if check_turn(state, player).is_err() {
        return actions;
    }
    let me = state.player(player);

    for &card in &me.hand {
        if can_play(state, player, card, config).is_ok() {
            actions.push(Action::PlayCard { card });
        }
    }

    for card in me.field_cards() {
        let Some(instance) = state.card(card) else { continue };
        for effect in instance.definition.effects_where(|t| t.is_activate()) {
            if can_activate(state, player, card, effect.id).is_ok() {
                actions.push(Action::ActivateEffect { card, effect: effect.id });
            }
        }
    }

    let don_targets = don_targets(state, player);
    for don in state.active_don(player) {
        for &target in &don_targets {
            actions.push(Action::GiveDon { don, target });
        }
    }

    let targets = attack_targets(state, player);
    for attacker in me.field_cards() {
        if can_attack(state, player, attacker, config).is_ok() {
            for &target in &targets {
                actions.push(Action::Attack { attacker, target });
            }
        }
    }

    actions
}

/// Game still running, `player` active, Main phase.
pub fn check_turn(state: &GameState, player: PlayerId) -> Result<(), EngineError> {
    if state.game_over {
        return Err(EngineError::GameOver);
    }
    if state.active_player != player {
        return Err(EngineError::NotYourTurn(player));
    }
    if state.phase != Phase::Main {
        return Err(EngineError::WrongPhase { expected: Phase::Main, actual: state.phase });
    }
    Ok(())
}

/// Check that `player` can pay for and place a hand card.
pub fn can_play(state: &GameState, player: PlayerId, card: EntityId, config: &RulesConfig) -> Result<(), EngineError> {
    let instance = state.card(card).ok_or(EngineError::NotInHand(card))?;
    if instance.owner != player || instance.zone != Zone::Hand {
        return Err(EngineError::NotInHand(card));
    }
    match instance.category() {
        CardCategory::Leader => return Err(ZoneError::InvalidTarget(card).into()),
        CardCategory::Character if state.player(player).characters.len() >= config.max_characters => {
            return Err(ZoneError::ZoneFull { player, zone: Zone::Character }.into());
        }
        _ => {}
    }
    let needed = instance.cost();
    let available = state.active_don_count(player);
    if needed > available {
        return Err(EngineError::InsufficientDon { needed, available });
    }
    Ok(())
}

/// Own leader and characters: the cards DON!! can be given to.
#[must_use]
pub fn don_targets(state: &GameState, player: PlayerId) -> Vec<EntityId> {
    state
        .player(player)
        .field_cards()
        .into_iter()
        .filter(|c| state.card(*c).map_or(false, |i| i.is_leader_or_character()))
        .collect()
}

/// Opponent leader, then each rested opponent character.
#[must_use]
pub fn attack_targets(state: &GameState, player: PlayerId) -> Vec<EntityId> {
    let opponent = state.player(player.opponent());
    opponent
        .leader
        .into_iter()
        .chain(
            opponent
                .characters
                .iter()
                .copied()
                .filter(|c| state.card(*c).map_or(false, |i| i.is_rested())),
        )
        .collect()
}

/// Check that a card may declare an attack this turn.
pub fn can_attack(
    state: &GameState,
    player: PlayerId,
    attacker: EntityId,
    config: &RulesConfig,
) -> Result<(), EngineError> {
    let instance = state.require_card(attacker)?;
    let cannot = |reason: &str| EngineError::CannotAttack { attacker, reason: reason.to_string() };

    if instance.controller != player {
        return Err(ZoneError::NotController { entity: attacker, player }.into());
    }
    if !instance.is_on_field() || !instance.is_leader_or_character() {
        return Err(cannot("not a leader or character on the field"));
    }
    if state.has_attacked(attacker) {
        return Err(EngineError::AlreadyAttacked(attacker));
    }
    if config.restrict_first_turn_attacks && state.is_first_turn_of(player) {
        return Err(cannot("no attacks on a player's first turn"));
    }

    let rush = instance.has_keyword(Keyword::Rush);
    if !(instance.is_active() || (instance.is_rested() && rush)) {
        return Err(cannot("rested"));
    }
    if instance.category() == CardCategory::Character && instance.entered_turn == Some(state.turn_number) && !rush {
        return Err(cannot("played this turn"));
    }
    Ok(())
}

/// Full attack validation: attacker eligibility plus target legality.
pub fn check_attack(
    state: &GameState,
    player: PlayerId,
    attacker: EntityId,
    target: EntityId,
    config: &RulesConfig,
) -> Result<(), EngineError> {
    can_attack(state, player, attacker, config)?;
    if !attack_targets(state, player).contains(&target) {
        return Err(EngineError::InvalidAttackTarget(target));
    }
    Ok(())
}
