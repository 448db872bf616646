//! Active and completed session storage.
//!
//! The registry issues session identifiers from a single monotonic counter,
//! keeps each session in exactly one of the active or completed maps, and
//! indexes which active session each agent currently belongs to.

use std::collections::{BTreeMap, HashMap};

use crate::error::BattleError;
use crate::session::Session;
use crate::state::{AgentId, SessionId, Tick};

#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    next_id: u32,
    active: BTreeMap<SessionId, Session>,
    completed: BTreeMap<SessionId, Session>,
    membership: HashMap<AgentId, SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier the next inserted session will receive.
    pub fn peek_next_id(&self) -> SessionId {
        SessionId(self.next_id)
    }

    /// Stores a freshly built session and advances the id counter.
    ///
    /// The session must carry the id returned by [`Self::peek_next_id`].
    pub(crate) fn insert(&mut self, session: Session) -> SessionId {
        let id = session.id();
        debug_assert_eq!(id, self.peek_next_id(), "sessions must use the issued id");
        self.next_id += 1;
        self.active.insert(id, session);
        id
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.active.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.active.get_mut(&id)
    }

    /// Active session `id`, or the reason it cannot be used.
    pub fn require(&self, id: SessionId) -> Result<&Session, BattleError> {
        self.active.get(&id).ok_or_else(|| self.missing(id))
    }

    pub(crate) fn require_mut(&mut self, id: SessionId) -> Result<&mut Session, BattleError> {
        let missing = self.missing(id);
        self.active.get_mut(&id).ok_or(missing)
    }

    fn missing(&self, id: SessionId) -> BattleError {
        if self.completed.contains_key(&id) {
            BattleError::AlreadyCompleted { session: id }
        } else {
            BattleError::UnknownSession { session: id }
        }
    }

    pub fn completed(&self, id: SessionId) -> Option<&Session> {
        self.completed.get(&id)
    }

    pub fn is_active(&self, id: SessionId) -> bool {
        self.active.contains_key(&id)
    }

    /// Snapshot of active session ids, safe to iterate while mutating.
    pub fn active_ids(&self) -> Vec<SessionId> {
        self.active.keys().copied().collect()
    }

    pub fn active_sessions(&self) -> impl Iterator<Item = &Session> {
        self.active.values()
    }

    pub fn completed_sessions(&self) -> impl Iterator<Item = &Session> {
        self.completed.values()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    /// Active session `agent` currently participates in.
    pub fn session_of(&self, agent: AgentId) -> Option<SessionId> {
        self.membership.get(&agent).copied()
    }

    pub(crate) fn bind_member(&mut self, agent: AgentId, id: SessionId) {
        let previous = self.membership.insert(agent, id);
        debug_assert!(
            previous.is_none() || previous == Some(id),
            "agent {agent} cannot be active in two sessions"
        );
    }

    pub(crate) fn unbind_member(&mut self, agent: AgentId) {
        self.membership.remove(&agent);
    }

    /// Closes session `id` and moves it to the completed map.
    pub(crate) fn complete(&mut self, id: SessionId, end_tick: Tick) -> Option<&Session> {
        let mut session = self.active.remove(&id)?;
        for agent in session.active_participants().collect::<Vec<_>>() {
            self.membership.remove(&agent);
        }
        session.close(end_tick);
        debug_assert!(!self.completed.contains_key(&id));
        Some(self.completed.entry(id).or_insert(session))
    }

    /// Removes session `id` without completing it, releasing its members.
    pub(crate) fn discard(&mut self, id: SessionId) -> Option<Session> {
        let session = self.active.remove(&id)?;
        for agent in session.active_participants() {
            self.membership.remove(&agent);
        }
        Some(session)
    }

    /// Drops completed history, keeping active sessions untouched.
    pub fn clear_completed(&mut self) -> usize {
        let dropped = self.completed.len();
        self.completed.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Side, TriggerType, Vec2};

    fn build(registry: &SessionRegistry) -> Session {
        Session::new(
            registry.peek_next_id(),
            Tick::ZERO,
            TriggerType::Standoff,
            AgentId(1),
            Side::Enemy,
            Vec2::ZERO,
            10.0,
        )
    }

    #[test]
    fn ids_are_monotonic() {
        let mut registry = SessionRegistry::new();
        let a = registry.insert(build(&registry));
        let b = registry.insert(build(&registry));
        assert!(b > a);
        assert_eq!(registry.active_ids(), vec![a, b]);
    }

    #[test]
    fn completed_session_leaves_active_map() {
        let mut registry = SessionRegistry::new();
        let id = registry.insert(build(&registry));
        registry.get_mut(id).unwrap().admit(AgentId(1));
        registry.bind_member(AgentId(1), id);

        let session = registry.complete(id, Tick(5)).unwrap();
        assert_eq!(session.end_tick(), Some(Tick(5)));
        assert!(!registry.is_active(id));
        assert!(registry.completed(id).is_some());
        assert_eq!(registry.session_of(AgentId(1)), None);
        assert!(registry.complete(id, Tick(6)).is_none());
    }

    #[test]
    fn require_distinguishes_completed_from_unknown() {
        let mut registry = SessionRegistry::new();
        let id = registry.insert(build(&registry));
        registry.complete(id, Tick(1));

        assert_eq!(
            registry.require(id).unwrap_err(),
            BattleError::AlreadyCompleted { session: id }
        );
        assert_eq!(
            registry.require(SessionId(42)).unwrap_err(),
            BattleError::UnknownSession {
                session: SessionId(42)
            }
        );
    }
}
