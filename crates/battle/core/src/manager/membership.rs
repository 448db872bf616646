//! Join, stay, escape, death, and finish transitions.

use super::{BattleManager, engagement_of};
use crate::env::{BattleEnv, Engagement};
use crate::error::BattleError;
use crate::events::{BattleEvent, ExitReason};
use crate::session::Session;
use crate::state::{AgentId, SessionId, Tier, TriggerType};

/// Sneak-attack callback owed to an agent on its first entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SneakRole {
    Performed,
    Received,
}

impl BattleManager {
    /// Puts two agents into combat with each other.
    ///
    /// Returns `None` if either agent lacks combat capability, if both are
    /// already in battle, or if an admission predicate refuses. When exactly
    /// one agent is already in a session the other joins that session;
    /// otherwise a new session forms around the pair.
    pub fn trigger_battle(
        &mut self,
        env: &mut BattleEnv<'_>,
        a: AgentId,
        b: AgentId,
        trigger: TriggerType,
    ) -> Option<SessionId> {
        self.trigger_battle_with(env, a, b, trigger, true).ok()
    }

    pub(crate) fn trigger_battle_with(
        &mut self,
        env: &mut BattleEnv<'_>,
        a: AgentId,
        b: AgentId,
        trigger: TriggerType,
        check_sneak: bool,
    ) -> Result<SessionId, BattleError> {
        if a == b {
            return Err(BattleError::SelfEngagement { agent: a }.logged());
        }
        for agent in [a, b] {
            let combatant = env
                .world
                .combatant(agent)
                .ok_or_else(|| BattleError::UnknownAgent { agent }.logged())?;
            if !combatant.has_combat_capability() {
                return Err(BattleError::NoCombatCapability { agent }.logged());
            }
        }

        match (self.registry.session_of(a), self.registry.session_of(b)) {
            (Some(_), Some(_)) => Err(BattleError::BothEngaged {
                first: a,
                second: b,
            }
            .logged()),
            (Some(id), None) => self.join_battle_with(env, id, b, check_sneak).map(|_| id),
            (None, Some(id)) => self.join_battle_with(env, id, a, check_sneak).map(|_| id),
            (None, None) => self.start_battle(env, a, b, trigger, check_sneak),
        }
    }

    fn start_battle(
        &mut self,
        env: &mut BattleEnv<'_>,
        a: AgentId,
        b: AgentId,
        trigger: TriggerType,
        check_sneak: bool,
    ) -> Result<SessionId, BattleError> {
        let world = &*env.world;
        let (Some(first), Some(second)) = (world.combatant(a), world.combatant(b)) else {
            return Err(BattleError::UnknownAgent { agent: a }.logged());
        };
        let anchor_a = world.visual_anchor(a).unwrap_or_else(|| first.position());
        let anchor_b = world.visual_anchor(b).unwrap_or_else(|| second.position());
        let distance = world
            .distance_2d(a, b)
            .unwrap_or_else(|| first.position().distance(second.position()));
        let center = anchor_a.midpoint(anchor_b);
        let radius = self.config.field_radius_for(distance);

        let id = self.registry.peek_next_id();
        let mut session = Session::new(id, self.clock, trigger, a, first.side(), center, radius);

        for (agent, combatant) in [(a, first), (b, second)] {
            if !combatant.allow_join_battle(&session) {
                return Err(BattleError::AdmissionRefused { session: id, agent }.logged());
            }
        }

        session.set_field_marker(env.presentation.spawn_field_marker(id, center, radius));
        self.registry.insert(session);

        let events_mark = self.events.len();
        self.events.push(BattleEvent::BattleStarted {
            session: id,
            trigger,
            trigger_agent: a,
            tick: self.clock,
        });

        let joined = self
            .join_battle_with(env, id, a, check_sneak)
            .and_then(|()| self.join_battle_with(env, id, b, check_sneak));
        if let Err(err) = joined {
            self.abandon_battle(env, id, events_mark);
            return Err(err);
        }

        tracing::info!(
            session = %id,
            trigger = %trigger,
            first = %a,
            second = %b,
            center = %center,
            radius,
            "battle started"
        );
        Ok(id)
    }

    /// Discards a session whose founding pair could not both join. Anyone
    /// already admitted is told the battle is over.
    fn abandon_battle(&mut self, env: &mut BattleEnv<'_>, id: SessionId, events_mark: usize) {
        let Some(mut session) = self.registry.discard(id) else {
            return;
        };
        if let Some(marker) = session.take_field_marker() {
            env.presentation.despawn_field_marker(marker);
        }
        let members: Vec<AgentId> = session.active_participants().collect();
        for agent in &members {
            self.release_cues(env, *agent, &members);
            if let Some(combatant) = env.world.combatant_mut(*agent) {
                combatant.on_finish_battle(&session);
            }
        }
        self.events.truncate(events_mark);
        tracing::debug!(session = %id, admitted = members.len(), "battle abandoned before forming");
    }

    /// Makes `agent` an active participant of session `id`.
    pub fn join_battle(
        &mut self,
        env: &mut BattleEnv<'_>,
        id: SessionId,
        agent: AgentId,
    ) -> Result<(), BattleError> {
        self.join_battle_with(env, id, agent, true)
    }

    /// Like [`Self::join_battle`]; `check_sneak = false` suppresses the
    /// first-entry sneak-attack callbacks (used when the hit that formed the
    /// session already delivered them).
    pub fn join_battle_with(
        &mut self,
        env: &mut BattleEnv<'_>,
        id: SessionId,
        agent: AgentId,
        check_sneak: bool,
    ) -> Result<(), BattleError> {
        let session = self.registry.require(id).map_err(BattleError::logged)?;
        if session.is_active(agent) {
            return Err(BattleError::AlreadyMember { session: id, agent }.logged());
        }
        if let Some(other) = self.registry.session_of(agent) {
            return Err(BattleError::AlreadyMember {
                session: other,
                agent,
            }
            .logged());
        }
        let combatant = env
            .world
            .combatant(agent)
            .ok_or_else(|| BattleError::UnknownAgent { agent }.logged())?;
        if !combatant.allow_join_battle(session) {
            return Err(BattleError::AdmissionRefused { session: id, agent }.logged());
        }

        let side = combatant.side();
        let demanded = Tier::for_tags(|tag| env.world.has_tag(agent, tag));
        let first_entry = !session.has_participated(agent);
        let sneak_role = if check_sneak
            && first_entry
            && session.trigger_type() == TriggerType::SneakAttack
        {
            if side == session.trigger_side() {
                Some(SneakRole::Performed)
            } else if side.is_hostile_to(session.trigger_side()) {
                Some(SneakRole::Received)
            } else {
                None
            }
        } else {
            None
        };
        let observer = self.config.observer;
        let observer_active = observer.is_some_and(|o| session.is_active(o));
        let co_participants: Vec<AgentId> = session.active_participants().collect();

        self.registry.require_mut(id)?.admit(agent);
        self.registry.bind_member(agent, id);

        if let Some(combatant) = env.world.combatant_mut(agent) {
            match sneak_role {
                Some(SneakRole::Performed) => combatant.on_sneak_attack(),
                Some(SneakRole::Received) => combatant.on_sneak_attacked(),
                None => {}
            }
        }

        if Some(agent) == observer {
            self.audio.bind_universal(env.cues, &mut *env.presentation);
            for other in co_participants {
                self.bind_cue(env, other);
            }
        } else if observer_active {
            self.bind_cue(env, agent);
        }

        if let (Some(session), Some(combatant)) =
            (self.registry.get(id), env.world.combatant_mut(agent))
        {
            combatant.on_join_battle(session);
        }

        tracing::debug!(session = %id, agent = %agent, side = %side, first_entry, "joined battle");
        self.events.push(BattleEvent::CharacterJoinBattle {
            session: id,
            agent,
            first_entry,
        });
        self.raise_tier(id, demanded);
        Ok(())
    }

    /// Hands an active participant its current enemies and allies.
    pub fn stay_battle(
        &mut self,
        env: &mut BattleEnv<'_>,
        id: SessionId,
        agent: AgentId,
    ) -> Result<Engagement, BattleError> {
        let session = self.registry.require(id).map_err(BattleError::logged)?;
        if !session.is_active(agent) {
            return Err(BattleError::NotMember { session: id, agent }.logged());
        }
        let side = env
            .world
            .combatant(agent)
            .map(|c| c.side())
            .ok_or_else(|| BattleError::UnknownAgent { agent }.logged())?;

        let engagement = engagement_of(&*env.world, session, agent, side);
        if let Some(combatant) = env.world.combatant_mut(agent) {
            combatant.on_stay_battle(session, &engagement);
        }
        Ok(engagement)
    }

    /// Removes `agent` from the active set if its escape predicate allows.
    pub fn escape_battle(
        &mut self,
        env: &mut BattleEnv<'_>,
        id: SessionId,
        agent: AgentId,
    ) -> Result<(), BattleError> {
        let session = self.registry.require(id).map_err(BattleError::logged)?;
        if !session.is_active(agent) {
            return Err(BattleError::NotMember { session: id, agent }.logged());
        }
        if let Some(combatant) = env.world.combatant(agent)
            && !combatant.allow_escape_battle(session)
        {
            return Err(BattleError::AdmissionRefused { session: id, agent }.logged());
        }

        self.remove_participant(env, id, agent, ExitReason::Escaped)
    }

    /// Removes a dead participant unconditionally.
    pub fn dead_in_battle(
        &mut self,
        env: &mut BattleEnv<'_>,
        id: SessionId,
        agent: AgentId,
    ) -> Result<(), BattleError> {
        let session = self.registry.require(id).map_err(BattleError::logged)?;
        if !session.is_active(agent) {
            return Err(BattleError::NotMember { session: id, agent }.logged());
        }

        let observer_kill = match (self.config.observer, env.world.combatant(agent)) {
            (Some(observer), Some(dying)) if observer != agent && session.is_active(observer) => env
                .world
                .combatant(observer)
                .is_some_and(|o| o.side().is_hostile_to(dying.side())),
            _ => false,
        };

        self.remove_participant(env, id, agent, ExitReason::Died)?;

        if observer_kill {
            tracing::info!(session = %id, agent = %agent, "observer killed enemy");
            self.events
                .push(BattleEvent::ObserverKillEnemy { session: id, agent });
        }
        Ok(())
    }

    fn remove_participant(
        &mut self,
        env: &mut BattleEnv<'_>,
        id: SessionId,
        agent: AgentId,
        reason: ExitReason,
    ) -> Result<(), BattleError> {
        let session = self.registry.require_mut(id)?;
        session.deactivate(agent);
        let remaining: Vec<AgentId> = session.active_participants().collect();
        self.registry.unbind_member(agent);

        self.release_cues(env, agent, &remaining);

        if let (Some(session), Some(combatant)) =
            (self.registry.get(id), env.world.combatant_mut(agent))
        {
            match reason {
                ExitReason::Escaped => combatant.on_escape_battle(session),
                ExitReason::Died => combatant.on_dead_in_battle(session),
            }
        }

        tracing::debug!(session = %id, agent = %agent, reason = %reason, "left battle");
        self.events.push(BattleEvent::CharacterExitBattle {
            session: id,
            agent,
            reason,
        });
        Ok(())
    }

    /// Completes session `id` as one atomic operation: despawns its field
    /// marker, releases all audio, notifies remaining participants, clears the
    /// active set, and moves it to the completed registry.
    pub fn finish_battle(
        &mut self,
        env: &mut BattleEnv<'_>,
        id: SessionId,
    ) -> Result<(), BattleError> {
        let session = self.registry.require_mut(id).map_err(BattleError::logged)?;
        let marker = session.take_field_marker();
        let active: Vec<AgentId> = session.active_participants().collect();
        let observer_active = self.config.observer.is_some_and(|o| active.contains(&o));

        if let Some(marker) = marker {
            env.presentation.despawn_field_marker(marker);
        }
        for agent in &active {
            self.audio.unbind(*agent, &mut *env.presentation);
        }
        if observer_active {
            self.audio.unbind_universal(&mut *env.presentation);
        }

        if let Some(session) = self.registry.get(id) {
            for agent in &active {
                if let Some(combatant) = env.world.combatant_mut(*agent) {
                    combatant.on_finish_battle(session);
                }
            }
        }

        let tick = self.clock;
        if let Some(session) = self.registry.complete(id, tick) {
            tracing::info!(
                session = %id,
                participants = session.total_participants().len(),
                tier = %session.tier(),
                duration = session.duration(tick),
                "battle finished"
            );
        }
        self.events.push(BattleEvent::BattleFinished { session: id, tick });
        Ok(())
    }
}
