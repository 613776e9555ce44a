//! Effect system for card abilities.
//!
//! - `EffectDefinition`: One ability on a card (timing, costs, body)
//! - `Effect`: Declarative atomic effects
//! - `EffectTarget`: What an effect applies to, relative to its source
//! - `EffectResolver`: Executes effects on a working copy of the state
//! - `ScriptRegistry`: Named Rust closures for abilities the declarative
//!   vocabulary cannot express

mod effect;
mod resolver;
mod script;
mod targeting;

pub use effect::{Effect, EffectDefinition, EffectId, EffectTiming, TargetedEffect};
pub use resolver::{expire_modifiers, knock_out, EffectOrigin, EffectResolver, ResolveResult};
pub use script::{ScriptContext, ScriptError, ScriptFn, ScriptId, ScriptRegistry};
pub use targeting::{EffectTarget, Target, TargetSelector};
