//! Events and the pending trigger queue.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: Something that happened, with its data
//! - [`EventSink`]: Outbound channel observers subscribe to
//! - [`raise`]: Record an event and queue the AUTO effects it fires
//! - [`TriggerQueue`]: Resolves queued effects, active player first

mod event;
mod queue;

pub use event::{drain_events, BattleOutcome, EventSink, GameEvent};
pub use queue::{auto_triggers, can_activate, enqueue, priority_for, raise, PendingTrigger, TriggerQueue};
