//! Deterministic combat session rules shared by the runtime and tooling.
//!
//! `battle-core` decides when agents enter combat, tracks who is engaged in
//! each session, records directional damage between participants, escalates
//! encounter difficulty, and keeps audio bindings in step with session
//! membership. All state mutation flows through [`manager::BattleManager`];
//! the surrounding world is reached only through the traits in [`env`].
pub mod binder;
pub mod config;
pub mod detection;
pub mod env;
pub mod error;
pub mod events;
pub mod manager;
pub mod registry;
pub mod session;
pub mod state;

pub use binder::AudioBinder;
pub use config::BattleConfig;
pub use detection::{DetectionMatrix, TriggerCandidate};
pub use env::{
    BattleEnv, BattleWorld, Combatant, CueCatalog, CueHandle, CueSpec, Engagement, MarkerHandle,
    Presentation,
};
pub use error::{BattleError, ErrorSeverity};
pub use events::{BattleEvent, EventQueue, ExitReason};
pub use manager::{BattleManager, StepSummary};
pub use registry::SessionRegistry;
pub use session::{DamageLedger, Session};
pub use state::{
    AgentId, CombatState, ResourceDelta, SessionId, Side, Tick, Tier, TriggerType, Vec2, tags,
};
