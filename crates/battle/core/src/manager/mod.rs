//! Session lifecycle controller.
//!
//! The [`BattleManager`] is the only writer of session state. It owns the
//! [`SessionRegistry`], the [`AudioBinder`], and the pending [`EventQueue`],
//! and applies every membership transition:
//!
//! - [`BattleManager::trigger_battle`] forms or extends a session
//! - [`BattleManager::join_battle`] / [`BattleManager::escape_battle`] /
//!   [`BattleManager::dead_in_battle`] toggle active membership
//! - [`BattleManager::finish_battle`] completes a session atomically
//! - [`BattleManager::record_battle`] books damage and forms sessions on hits
//! - [`BattleManager::step`] runs the per-tick sweep and mutual detection
//!
//! Refused transitions are logged and returned as [`BattleError`]; none of
//! them leave partial state behind.

mod escalation;
mod membership;
mod record;
mod sweep;


pub use sweep::StepSummary;

use std::collections::HashMap;

use crate::binder::AudioBinder;
use crate::config::BattleConfig;
use crate::env::{BattleEnv, BattleWorld, Engagement};
use crate::error::BattleError;
use crate::events::{BattleEvent, EventQueue};
use crate::registry::SessionRegistry;
use crate::session::Session;
use crate::state::{AgentId, SessionId, Side, Tick};

pub struct BattleManager {
    config: BattleConfig,
    registry: SessionRegistry,
    audio: AudioBinder,
    events: EventQueue,
    clock: Tick,
}

impl BattleManager {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            config,
            registry: SessionRegistry::new(),
            audio: AudioBinder::new(),
            events: EventQueue::new(),
            clock: Tick::ZERO,
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Current simulation tick, advanced once per [`Self::step`].
    pub fn clock(&self) -> Tick {
        self.clock
    }

    pub fn observer(&self) -> Option<AgentId> {
        self.config.observer
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn audio(&self) -> &AudioBinder {
        &self.audio
    }

    /// Active session `id` (TryGetSession).
    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.registry.get(id)
    }

    pub fn completed_session(&self, id: SessionId) -> Option<&Session> {
        self.registry.completed(id)
    }

    pub fn active_sessions(&self) -> impl Iterator<Item = &Session> {
        self.registry.active_sessions()
    }

    pub fn completed_sessions(&self) -> impl Iterator<Item = &Session> {
        self.registry.completed_sessions()
    }

    /// Active session `agent` currently participates in.
    pub fn session_of(&self, agent: AgentId) -> Option<SessionId> {
        self.registry.session_of(agent)
    }

    pub fn is_in_battle(&self, agent: AgentId) -> bool {
        self.registry.session_of(agent).is_some()
    }

    /// Returns true if the observer is currently active in session `id`.
    pub fn is_observer_active_in_session(&self, id: SessionId) -> bool {
        match (self.config.observer, self.registry.get(id)) {
            (Some(observer), Some(session)) => session.is_active(observer),
            _ => false,
        }
    }

    /// Net value `agent` has applied to each co-participant of its current session.
    pub fn outgoing(&self, agent: AgentId) -> Option<HashMap<AgentId, f32>> {
        self.registry.get(self.session_of(agent)?)?.outgoing(agent)
    }

    /// Net value each co-participant of its current session has applied to `agent`.
    pub fn incoming(&self, agent: AgentId) -> Option<HashMap<AgentId, f32>> {
        self.registry.get(self.session_of(agent)?)?.incoming(agent)
    }

    /// Takes every event emitted since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> &[BattleEvent] {
        self.events.pending()
    }

    /// Enemy and ally subsets of `agent` among the active participants of `id`.
    pub fn engagement(
        &self,
        world: &dyn BattleWorld,
        id: SessionId,
        agent: AgentId,
    ) -> Result<Engagement, BattleError> {
        let session = self.registry.require(id)?;
        let side = world
            .combatant(agent)
            .map(|c| c.side())
            .ok_or(BattleError::UnknownAgent { agent })?;
        Ok(engagement_of(world, session, agent, side))
    }

    /// Active participant counts on the Player and Enemy sides.
    pub fn side_counts(&self, world: &dyn BattleWorld, id: SessionId) -> Option<(usize, usize)> {
        let session = self.registry.get(id)?;
        let mut players = 0;
        let mut enemies = 0;
        for agent in session.active_participants() {
            match world.combatant(agent).map(|c| c.side()) {
                Some(Side::Player) => players += 1,
                Some(Side::Enemy) => enemies += 1,
                _ => {}
            }
        }
        Some((players, enemies))
    }

    /// Drops completed session history.
    pub fn clear_completed(&mut self) -> usize {
        self.registry.clear_completed()
    }

    // ===== audio helpers =====

    fn bind_cue(&mut self, env: &mut BattleEnv<'_>, agent: AgentId) {
        if Some(agent) == self.config.observer {
            return;
        }
        if let Some(combatant) = env.world.combatant(agent) {
            self.audio
                .bind(agent, combatant.prototype(), env.cues, &mut *env.presentation);
        }
    }

    /// Releases the cues an agent's exit ends: its own, plus (for the observer)
    /// the universal cue and every co-participant still active in `session`.
    fn release_cues(
        &mut self,
        env: &mut BattleEnv<'_>,
        agent: AgentId,
        remaining: &[AgentId],
    ) {
        self.audio.unbind(agent, &mut *env.presentation);
        if Some(agent) == self.config.observer {
            self.audio.unbind_universal(&mut *env.presentation);
            for other in remaining {
                self.audio.unbind(*other, &mut *env.presentation);
            }
        }
    }
}

impl Default for BattleManager {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

pub(crate) fn engagement_of(
    world: &dyn BattleWorld,
    session: &Session,
    agent: AgentId,
    side: Side,
) -> Engagement {
    let mut engagement = Engagement::default();
    for other in session.active_participants().filter(|a| *a != agent) {
        let Some(other_side) = world.combatant(other).map(|c| c.side()) else {
            continue;
        };
        if side.is_hostile_to(other_side) {
            engagement.enemies.push(other);
        } else if other_side == side {
            engagement.allies.push(other);
        }
    }
    engagement
}
