//! Zone system.
//!
//! Each player owns nine zones: deck, hand, trash, life, DON!! deck, cost
//! area, leader slot, character area and stage slot. Card movement and
//! DON!! handling go through the primitives in this module so every move
//! keeps the per-instance `zone`/`controller`/`state` fields in step with the
//! per-player zone lists.

mod don;
mod transfer;

pub use don::{
    add_don_to_cost_area, give_don, refresh_don, rest_active_don, return_attached_don, DonLocation,
    DonToken,
};
pub use transfer::{draw, move_card, set_card_state, Zone, ZoneError, ZonePosition};

pub(crate) use transfer::{insert_at, remove_from};
