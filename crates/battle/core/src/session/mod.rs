//! Combat session state: participants, field, tier, and damage ledger.
//!
//! A [`Session`] is only mutated through [`crate::manager::BattleManager`];
//! everything public here is read-only.
mod ledger;

pub use ledger::DamageLedger;

use std::collections::{BTreeSet, HashMap};

use crate::env::MarkerHandle;
use crate::state::{AgentId, SessionId, Side, Tick, Tier, TriggerType, Vec2};

/// One active or completed combat encounter.
///
/// # Invariants
///
/// - `ledger.size() == total_participants.len()`
/// - `active_participants ⊆ total_participants`
/// - `tier` never decreases
/// - a participant's slot (its index in `total_participants`) never changes
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Session {
    id: SessionId,
    start_tick: Tick,
    end_tick: Option<Tick>,
    trigger_type: TriggerType,
    trigger_side: Side,
    trigger_agent: AgentId,
    field_center: Vec2,
    field_radius: f32,
    total_participants: Vec<AgentId>,
    active_participants: BTreeSet<AgentId>,
    tier: Tier,
    ledger: DamageLedger,
    field_marker: Option<MarkerHandle>,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        start_tick: Tick,
        trigger_type: TriggerType,
        trigger_agent: AgentId,
        trigger_side: Side,
        field_center: Vec2,
        field_radius: f32,
    ) -> Self {
        Self {
            id,
            start_tick,
            end_tick: None,
            trigger_type,
            trigger_side,
            trigger_agent,
            field_center,
            field_radius,
            total_participants: Vec::new(),
            active_participants: BTreeSet::new(),
            tier: Tier::Easy,
            ledger: DamageLedger::new(),
            field_marker: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn start_tick(&self) -> Tick {
        self.start_tick
    }

    /// Tick at which the session finished, `None` while active.
    pub fn end_tick(&self) -> Option<Tick> {
        self.end_tick
    }

    pub fn is_finished(&self) -> bool {
        self.end_tick.is_some()
    }

    /// Number of ticks the session ran (or has run so far, at `now`).
    pub fn duration(&self, now: Tick) -> u64 {
        self.end_tick.unwrap_or(now).since(self.start_tick)
    }

    pub fn trigger_type(&self) -> TriggerType {
        self.trigger_type
    }

    /// Side of the agent that triggered the session.
    pub fn trigger_side(&self) -> Side {
        self.trigger_side
    }

    pub fn trigger_agent(&self) -> AgentId {
        self.trigger_agent
    }

    pub fn field_center(&self) -> Vec2 {
        self.field_center
    }

    pub fn field_radius(&self) -> f32 {
        self.field_radius
    }

    /// Returns true if `position` lies within the session's field.
    pub fn contains_point(&self, position: Vec2) -> bool {
        position.distance(self.field_center) <= self.field_radius
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn ledger(&self) -> &DamageLedger {
        &self.ledger
    }

    pub fn field_marker(&self) -> Option<MarkerHandle> {
        self.field_marker
    }

    /// Every agent that ever joined, in slot order.
    pub fn total_participants(&self) -> &[AgentId] {
        &self.total_participants
    }

    pub fn active_participants(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.active_participants.iter().copied()
    }

    pub fn active_count(&self) -> usize {
        self.active_participants.len()
    }

    pub fn is_active(&self, agent: AgentId) -> bool {
        self.active_participants.contains(&agent)
    }

    /// Returns true if `agent` joined this session at any point.
    pub fn has_participated(&self, agent: AgentId) -> bool {
        self.slot_of(agent).is_some()
    }

    /// Stable ledger slot of `agent`, assigned on its first join.
    pub fn slot_of(&self, agent: AgentId) -> Option<usize> {
        self.total_participants.iter().position(|&a| a == agent)
    }

    /// Net value `from` has applied to `to` over the session.
    pub fn ledger_entry(&self, from: AgentId, to: AgentId) -> Option<f32> {
        self.ledger.get(self.slot_of(from)?, self.slot_of(to)?)
    }

    /// Net value `agent` has applied to each co-participant, O(n).
    pub fn outgoing(&self, agent: AgentId) -> Option<HashMap<AgentId, f32>> {
        let row = self.ledger.row(self.slot_of(agent)?)?;
        Some(
            self.total_participants
                .iter()
                .zip(row)
                .filter(|(other, _)| **other != agent)
                .map(|(other, value)| (*other, *value))
                .collect(),
        )
    }

    /// Net value each co-participant has applied to `agent`, O(n).
    pub fn incoming(&self, agent: AgentId) -> Option<HashMap<AgentId, f32>> {
        let column = self.ledger.column(self.slot_of(agent)?)?;
        Some(
            self.total_participants
                .iter()
                .zip(column)
                .filter(|(other, _)| **other != agent)
                .map(|(other, value)| (*other, value))
                .collect(),
        )
    }

    /// Sum of everything `agent` has applied to others.
    pub fn total_outgoing(&self, agent: AgentId) -> f32 {
        self.outgoing(agent)
            .map(|values| values.values().sum())
            .unwrap_or(0.0)
    }

    /// Sum of everything others have applied to `agent`.
    pub fn total_incoming(&self, agent: AgentId) -> f32 {
        self.incoming(agent)
            .map(|values| values.values().sum())
            .unwrap_or(0.0)
    }

    // ===== mutation (crate-private) =====

    /// Marks `agent` active. Returns true if this is its first-ever entry,
    /// in which case it receives a fresh slot and the ledger grows.
    pub(crate) fn admit(&mut self, agent: AgentId) -> bool {
        let first_entry = !self.has_participated(agent);
        if first_entry {
            self.total_participants.push(agent);
            self.ledger.grow(self.total_participants.len());
        }
        self.active_participants.insert(agent);
        self.debug_check_invariants();
        first_entry
    }

    /// Removes `agent` from the active set. Its slot and history remain.
    pub(crate) fn deactivate(&mut self, agent: AgentId) -> bool {
        self.active_participants.remove(&agent)
    }

    /// Raises the tier to `candidate` if higher. Returns the previous tier on change.
    pub(crate) fn raise_tier(&mut self, candidate: Tier) -> Option<Tier> {
        if candidate > self.tier {
            let previous = self.tier;
            self.tier = candidate;
            Some(previous)
        } else {
            None
        }
    }

    pub(crate) fn record(&mut self, from: AgentId, to: AgentId, value: f32) -> bool {
        match (self.slot_of(from), self.slot_of(to)) {
            (Some(row), Some(col)) => self.ledger.accumulate(row, col, value),
            _ => false,
        }
    }

    pub(crate) fn set_field_marker(&mut self, marker: Option<MarkerHandle>) {
        self.field_marker = marker;
    }

    pub(crate) fn take_field_marker(&mut self) -> Option<MarkerHandle> {
        self.field_marker.take()
    }

    /// Clears the active set and stamps the end tick.
    pub(crate) fn close(&mut self, end_tick: Tick) {
        self.active_participants.clear();
        self.end_tick = Some(end_tick);
    }

    fn debug_check_invariants(&self) {
        debug_assert_eq!(
            self.ledger.size(),
            self.total_participants.len(),
            "ledger of {} must match its participant count",
            self.id
        );
        debug_assert!(
            self.active_participants
                .iter()
                .all(|agent| self.total_participants.contains(agent)),
            "active participants of {} must be a subset of all participants",
            self.id
        );
    }
}
