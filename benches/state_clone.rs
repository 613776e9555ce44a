//! Snapshot and enumeration costs on a mid-game board.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use don_rules::cards::{CardDefinition, CardId, CardState, Keyword};
use don_rules::core::{EntityId, GameState, Phase, PlayerId, RulesConfig};
use don_rules::rules::{legal_actions, GameBuilder};
use don_rules::zones::{DonLocation, Zone};

fn mid_game() -> GameState {
    let leader = Arc::new(CardDefinition::leader(CardId::new(1), "Captain", 5000, 5));
    let deck: Vec<_> = (0..50)
        .map(|n| {
            let def = CardDefinition::character(CardId::new(10 + n), "Crew", 1 + (n % 5) as i64, 1000 * (2 + (n % 4) as i64))
                .with_counter(1000);
            Arc::new(if n % 7 == 0 { def.with_keyword(Keyword::Blocker) } else { def })
        })
        .collect();
    let mut state = GameBuilder::new(RulesConfig::default())
        .seed(1)
        .leader(PlayerId::FIRST, Arc::clone(&leader))
        .deck(PlayerId::FIRST, deck.clone())
        .leader(PlayerId::SECOND, leader)
        .deck(PlayerId::SECOND, deck)
        .build()
        .expect("valid decks");

    // Put the opening hands on the field and open the cost area.
    for player in PlayerId::both() {
        let hand: Vec<_> = state.player(player).hand.iter().copied().collect();
        for card in hand {
            state.player_mut(player).hand.retain(|c| *c != card);
            state.player_mut(player).characters.push_back(card);
            if let Some(instance) = state.card_mut(card) {
                instance.zone = Zone::Character;
                instance.state = if player == PlayerId::SECOND { CardState::Rested } else { CardState::Active };
            }
        }
        let dons: Vec<_> = state.player(player).don_deck.iter().copied().collect();
        for don in dons {
            state.player_mut(player).don_deck.retain(|d| *d != don);
            state.player_mut(player).cost_area.push_back(don);
            if let Some(token) = state.don_mut(don) {
                token.location = DonLocation::CostArea;
                token.state = CardState::Active;
            }
        }
    }
    state.turn_number = 5;
    state.phase = Phase::Main;
    state
}

fn bench_state(c: &mut Criterion) {
    let state = mid_game();
    let config = RulesConfig::default();

    c.bench_function("state_clone", |b| b.iter(|| black_box(state.clone())));

    c.bench_function("clone_and_mutate", |b| {
        b.iter(|| {
            let mut next = state.clone();
            next.mark_attacked(black_box(EntityId(1)));
            next
        })
    });

    c.bench_function("legal_actions", |b| {
        b.iter(|| legal_actions(black_box(&state), PlayerId::FIRST, &config))
    });

    c.bench_function("snapshot_roundtrip", |b| {
        b.iter(|| {
            let bytes = state.to_snapshot().expect("encode");
            GameState::from_snapshot(&bytes).expect("decode")
        })
    });
}

criterion_group!(benches, bench_state);
criterion_main!(benches);
