//! Lifecycle notifications emitted by the battle manager.
//!
//! The manager appends events to its [`EventQueue`] as transitions are
//! applied; the caller drains the queue after each step and routes events to
//! subscribers.

use crate::state::{AgentId, SessionId, Tick, Tier, TriggerType};

/// Why a participant left a session's active set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ExitReason {
    Escaped,
    Died,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    /// A new session formed.
    BattleStarted {
        session: SessionId,
        trigger: TriggerType,
        trigger_agent: AgentId,
        tick: Tick,
    },

    /// A session moved to the completed registry.
    BattleFinished { session: SessionId, tick: Tick },

    /// A session's tier increased.
    BattleLevelUpgraded {
        session: SessionId,
        from: Tier,
        to: Tier,
    },

    /// An agent became active in a session.
    CharacterJoinBattle {
        session: SessionId,
        agent: AgentId,
        first_entry: bool,
    },

    /// An agent left a session's active set.
    CharacterExitBattle {
        session: SessionId,
        agent: AgentId,
        reason: ExitReason,
    },

    /// An agent hostile to the observer died while sharing its session.
    ObserverKillEnemy { session: SessionId, agent: AgentId },
}

impl BattleEvent {
    /// Session the event belongs to.
    pub fn session(&self) -> SessionId {
        match self {
            Self::BattleStarted { session, .. }
            | Self::BattleFinished { session, .. }
            | Self::BattleLevelUpgraded { session, .. }
            | Self::CharacterJoinBattle { session, .. }
            | Self::CharacterExitBattle { session, .. }
            | Self::ObserverKillEnemy { session, .. } => *session,
        }
    }

    /// Agent the event concerns, for per-agent events.
    pub fn agent(&self) -> Option<AgentId> {
        match self {
            Self::CharacterJoinBattle { agent, .. }
            | Self::CharacterExitBattle { agent, .. }
            | Self::ObserverKillEnemy { agent, .. } => Some(*agent),
            _ => None,
        }
    }
}

/// Ordered buffer of events awaiting delivery.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    pending: Vec<BattleEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BattleEvent) {
        tracing::trace!(?event, "battle event");
        self.pending.push(event);
    }

    /// Takes every pending event in emission order.
    pub fn drain(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Drops events pushed after the queue held `len` entries.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.pending.truncate(len);
    }

    pub fn pending(&self) -> &[BattleEvent] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
