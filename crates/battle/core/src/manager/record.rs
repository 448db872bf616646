//! Damage recording and hit-triggered session formation.

use super::BattleManager;
use crate::env::BattleEnv;
use crate::error::BattleError;
use crate::state::{AgentId, ResourceDelta, SessionId, Side, TriggerType};

impl BattleManager {
    /// Books `delta` dealt by `proactive` to `reactive` in their shared session.
    ///
    /// Hits between agents on the same side are ignored. A hit on an agent
    /// that is not in battle is a sneak attack: both sneak callbacks fire
    /// before the session forms, and the join itself skips them. A neutral
    /// target is turned against its attacker. Both agents end up in one
    /// session (new or existing) and `delta.hp` accumulates into
    /// `ledger[slot(proactive), slot(reactive)]`.
    pub fn record_battle(
        &mut self,
        env: &mut BattleEnv<'_>,
        proactive: AgentId,
        reactive: AgentId,
        delta: ResourceDelta,
    ) -> Result<SessionId, BattleError> {
        let world = &*env.world;
        let attacker = world
            .combatant(proactive)
            .ok_or_else(|| BattleError::UnknownAgent { agent: proactive }.logged())?;
        let target = world
            .combatant(reactive)
            .ok_or_else(|| BattleError::UnknownAgent { agent: reactive }.logged())?;

        let attacker_side = attacker.side();
        if attacker_side == target.side() {
            return Err(BattleError::SameSide {
                first: proactive,
                second: reactive,
            }
            .logged());
        }
        for (agent, combatant) in [(proactive, attacker), (reactive, target)] {
            if !combatant.has_combat_capability() {
                return Err(BattleError::NoCombatCapability { agent }.logged());
            }
        }
        let target_neutral = target.side() == Side::Neutral;

        let sneak = self.registry.session_of(reactive).is_none();
        if sneak {
            tracing::debug!(attacker = %proactive, target = %reactive, "sneak attack");
            if let Some(combatant) = env.world.combatant_mut(proactive) {
                combatant.on_sneak_attack();
            }
            if let Some(combatant) = env.world.combatant_mut(reactive) {
                combatant.on_sneak_attacked();
            }
        }

        if target_neutral {
            let side = attacker_side.opposite();
            if let Some(combatant) = env.world.combatant_mut(reactive) {
                combatant.set_side(side);
            }
            tracing::info!(agent = %reactive, side = %side, attacker = %proactive, "neutral agent provoked");
        }

        let id = match (
            self.registry.session_of(proactive),
            self.registry.session_of(reactive),
        ) {
            (Some(first), Some(second)) if first == second => first,
            (Some(first_session), Some(second_session)) => {
                return Err(BattleError::SplitSessions {
                    first: proactive,
                    first_session,
                    second: reactive,
                    second_session,
                }
                .logged());
            }
            _ => {
                let trigger = if sneak {
                    TriggerType::SneakAttack
                } else {
                    TriggerType::Standoff
                };
                self.trigger_battle_with(env, proactive, reactive, trigger, !sneak)?
            }
        };

        let session = self.registry.require_mut(id)?;
        let recorded = session.record(proactive, reactive, delta.hp);
        debug_assert!(recorded, "both agents must hold ledger slots in {id}");
        tracing::trace!(
            session = %id,
            from = %proactive,
            to = %reactive,
            hp = delta.hp,
            "recorded resource delta"
        );
        Ok(id)
    }
}
