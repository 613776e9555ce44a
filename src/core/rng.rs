//! Seeded randomness for setup and bundled agents.
//!
//! Rules resolution never rolls dice; randomness only enters when decks are
//! shuffled at setup and when `RandomAgent` picks an action. Each seat gets
//! its own stream derived from the game seed, so changing one player's
//! deck list does not reshuffle the other player's deck.
//!
//! ```
//! use don_rules::core::{GameRng, PlayerId};
//!
//! let rng = GameRng::new(42);
//! let mut deck_a: Vec<u32> = (0..50).collect();
//! let mut deck_b = deck_a.clone();
//!
//! rng.seat(PlayerId::FIRST).shuffle(&mut deck_a);
//! rng.seat(PlayerId::FIRST).shuffle(&mut deck_b);
//! assert_eq!(deck_a, deck_b);
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::player::PlayerId;

const SEAT_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic ChaCha8 stream.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this stream started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent stream for one seat. Same seed and seat, same stream.
    #[must_use]
    pub fn seat(&self, player: PlayerId) -> Self {
        let offset = (player.index() as u64 + 1).wrapping_mul(SEAT_STRIDE);
        Self::new(self.seed.wrapping_add(offset))
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }

    #[must_use]
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    /// True with probability `1 / n`. Always false for `n == 0`.
    pub fn one_in(&mut self, n: u32) -> bool {
        n > 0 && self.inner.gen_range(0..n) == 0
    }
}
