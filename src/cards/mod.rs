//! Card system: definitions, instances, modifiers and the registry.
//!
//! ## Separation of Concerns
//!
//! - `CardDefinition`: Static printed data (cost, power, keywords, effects)
//! - `CardInstance`: Runtime state in a specific game (zone, rested, DON!!)
//! - `Modifier`: Timed adjustments stored on an instance
//! - `CardRegistry`: Lookup table for definitions

mod definition;
mod instance;
mod modifier;
mod registry;

pub use definition::{CardCategory, CardDefinition, CardId, Keyword};
pub use instance::{CardInstance, CardState};
pub use modifier::{Duration, Modifier, ModifierId, ModifierKind};
pub use registry::CardRegistry;
