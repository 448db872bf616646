//! Runtime orchestration for battle sessions.
//!
//! This crate wires the battle core to an in-memory world and exposes a
//! fixed-step driver. Consumers build a [`BattleRuntime`], spawn agents, and
//! subscribe to events by topic.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the step driver and builder
//! - [`api`] exposes the error types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`world`] provides the reference world and mixer
//! - [`logging`] installs the tracing subscriber
pub mod api;
pub mod events;
pub mod logging;
pub mod runtime;
pub mod world;

pub use api::{Result, RuntimeError};
pub use events::{Event, EventBus, Topic};
pub use runtime::{BattleRuntime, RuntimeBuilder, RuntimeConfig};
pub use world::{BattleRecord, FieldMarker, Mixer, PlayingCue, SimAgent, SimWorld};
