//! In-memory reference world driving the battle core.
//!
//! [`SimWorld`] owns a set of [`SimAgent`]s and implements the core's
//! [`battle_core::BattleWorld`] oracle; [`Mixer`] stands in for the audio and
//! effects layer. Both are deterministic and suitable for headless runs.

mod agent;
mod mixer;
mod sim;

pub use agent::{BattleRecord, SimAgent};
pub use mixer::{FieldMarker, Mixer, PlayingCue};
pub use sim::SimWorld;
