//! Value types describing agents, sessions, and the simulation clock.
//!
//! These types carry no behavior beyond simple arithmetic and ordering; the
//! rules that act on them live in [`crate::manager`].
mod common;
mod side;

pub use common::{AgentId, SessionId, Tick, Vec2};
pub use side::{CombatState, ResourceDelta, Side, Tier, TriggerType, tags};
