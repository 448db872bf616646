//! Per-step session sweep and mutual-detection pass.

use std::collections::HashSet;

use super::BattleManager;
use crate::detection::DetectionMatrix;
use crate::env::{BattleEnv, Combatant};
use crate::state::{AgentId, CombatState, SessionId, Side, Tick, TriggerType};

/// What a single [`BattleManager::step`] changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepSummary {
    pub tick: Tick,
    /// Sessions formed by mutual detection this step.
    pub started: Vec<SessionId>,
    /// Sessions completed because one side emptied.
    pub finished: Vec<SessionId>,
    /// Agents admitted from inside an existing field.
    pub joined: usize,
    pub escaped: usize,
    pub died: usize,
}

/// Outcome of checking one participant during the sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Verdict {
    Stay,
    Escape,
    Dead,
    /// The agent is no longer present in the world.
    Vanished,
}

impl BattleManager {
    /// Advances the clock and runs one simulation step.
    ///
    /// 1. Every active session is swept: participants that disengaged or left
    ///    the field escape, dead ones are removed, the rest receive their
    ///    current engagement. Eligible idle agents inside the field are then
    ///    admitted, the tier is recomputed, and the session finishes if the
    ///    Player or Enemy side has no active participant left.
    /// 2. Agents that were idle before the sweep and are still idle after it
    ///    are sampled for mutual detection, and every mutual pair is turned
    ///    into a Standoff trigger. Agents that left or joined a session
    ///    during this step wait for the next one.
    ///
    /// All iteration runs over snapshots, so transitions fired mid-sweep
    /// never disturb the loop.
    pub fn step(&mut self, env: &mut BattleEnv<'_>) -> StepSummary {
        self.clock = self.clock + 1;
        let mut summary = StepSummary {
            tick: self.clock,
            ..StepSummary::default()
        };

        let idle_before: HashSet<AgentId> = env
            .world
            .agent_ids()
            .into_iter()
            .filter(|agent| self.registry.session_of(*agent).is_none())
            .collect();

        for id in self.registry.active_ids() {
            self.sweep_session(env, id, &mut summary);
        }
        self.detect(env, &idle_before, &mut summary);

        if !summary.started.is_empty() || !summary.finished.is_empty() {
            tracing::debug!(
                tick = %summary.tick,
                started = summary.started.len(),
                finished = summary.finished.len(),
                active = self.registry.active_len(),
                "battle step"
            );
        }
        summary
    }

    /// Finishes every active session, as on world teardown.
    pub fn shutdown(&mut self, env: &mut BattleEnv<'_>) -> usize {
        let ids = self.registry.active_ids();
        let mut finished = 0;
        for id in ids {
            if self.finish_battle(env, id).is_ok() {
                finished += 1;
            }
        }
        tracing::info!(finished, "battle manager shut down");
        finished
    }

    fn sweep_session(&mut self, env: &mut BattleEnv<'_>, id: SessionId, summary: &mut StepSummary) {
        let Some(session) = self.registry.get(id) else {
            return;
        };
        let participants: Vec<AgentId> = session.active_participants().collect();

        for agent in participants {
            let verdict = {
                let Some(session) = self.registry.get(id) else {
                    return;
                };
                match env.world.combatant(agent) {
                    None => Verdict::Vanished,
                    Some(c)
                        if c.combat_state() != CombatState::Battle
                            || !session.contains_point(c.position()) =>
                    {
                        Verdict::Escape
                    }
                    Some(c) if c.is_dead() => Verdict::Dead,
                    Some(_) => Verdict::Stay,
                }
            };

            match verdict {
                Verdict::Escape => {
                    if self.escape_battle(env, id, agent).is_ok() {
                        summary.escaped += 1;
                    }
                }
                Verdict::Dead | Verdict::Vanished => {
                    if verdict == Verdict::Vanished {
                        tracing::warn!(session = %id, agent = %agent, "participant vanished from world");
                    }
                    if self.dead_in_battle(env, id, agent).is_ok() {
                        summary.died += 1;
                    }
                }
                Verdict::Stay => {
                    if let Err(err) = self.stay_battle(env, id, agent) {
                        tracing::trace!(
                            session = %id,
                            agent = %agent,
                            code = err.error_code(),
                            "stay skipped"
                        );
                    }
                }
            }
        }

        summary.joined += self.admit_from_field(env, id);
        self.recompute_tier(&*env.world, id);

        if let Some((players, enemies)) = self.side_counts(&*env.world, id)
            && (players == 0 || enemies == 0)
            && self.finish_battle(env, id).is_ok()
        {
            summary.finished.push(id);
        }
    }

    /// Admits idle, alerted agents standing inside session `id`'s field.
    fn admit_from_field(&mut self, env: &mut BattleEnv<'_>, id: SessionId) -> usize {
        let Some(session) = self.registry.get(id) else {
            return 0;
        };
        let candidates: Vec<AgentId> = env
            .world
            .agent_ids()
            .into_iter()
            .filter(|agent| {
                self.registry.session_of(*agent).is_none()
                    && env.world.combatant(*agent).is_some_and(|c| {
                        is_field_eligible(c) && session.contains_point(c.position())
                    })
            })
            .collect();

        let mut joined = 0;
        for agent in candidates {
            if self.join_battle(env, id, agent).is_ok() {
                joined += 1;
            }
        }
        joined
    }

    fn detect(
        &mut self,
        env: &mut BattleEnv<'_>,
        idle_before: &HashSet<AgentId>,
        summary: &mut StepSummary,
    ) {
        let idle: Vec<AgentId> = env
            .world
            .agent_ids()
            .into_iter()
            .filter(|agent| {
                idle_before.contains(agent)
                    && self.registry.session_of(*agent).is_none()
                    && env
                        .world
                        .combatant(*agent)
                        .is_some_and(|c| c.has_combat_capability() && !c.is_dead())
            })
            .collect();
        if idle.len() < 2 {
            return;
        }

        let matrix = DetectionMatrix::build(&*env.world, &idle);
        let first_new = self.registry.peek_next_id();

        for candidate in matrix.mutual_pairs() {
            if self.registry.session_of(candidate.first).is_some()
                && self.registry.session_of(candidate.second).is_some()
            {
                continue;
            }
            if let Some(id) = self.trigger_battle(
                env,
                candidate.first,
                candidate.second,
                TriggerType::Standoff,
            ) && id >= first_new
                && !summary.started.contains(&id)
            {
                summary.started.push(id);
            }
        }
    }
}

/// Idle agents pulled into a field must be alive, able to fight, take a side,
/// and already be on alert.
fn is_field_eligible(combatant: &dyn Combatant) -> bool {
    combatant.has_combat_capability()
        && !combatant.is_dead()
        && combatant.side() != Side::Neutral
        && combatant.combat_state() != CombatState::Idle
}
