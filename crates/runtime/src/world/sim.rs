use std::collections::BTreeMap;

use battle_core::{AgentId, BattleWorld, Combatant};

use super::SimAgent;
use crate::api::{Result, RuntimeError};

/// Agent store implementing [`BattleWorld`] over a sorted map.
///
/// Iteration order is ascending [`AgentId`], which keeps every sweep
/// deterministic.
#[derive(Clone, Debug, Default)]
pub struct SimWorld {
    agents: BTreeMap<AgentId, SimAgent>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, agent: SimAgent) -> Result<()> {
        let id = agent.id();
        if self.agents.contains_key(&id) {
            return Err(RuntimeError::DuplicateAgent { agent: id });
        }
        tracing::debug!(agent = %id, side = %agent.side(), "spawned agent");
        self.agents.insert(id, agent);
        Ok(())
    }

    /// Removes an agent from the world. Sessions still listing it treat it as dead.
    pub fn despawn(&mut self, id: AgentId) -> Option<SimAgent> {
        self.agents.remove(&id)
    }

    pub fn agent(&self, id: AgentId) -> Option<&SimAgent> {
        self.agents.get(&id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut SimAgent> {
        self.agents.get_mut(&id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &SimAgent> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Refreshes every agent's detected-enemy list.
    ///
    /// A living, combat-capable agent detects each living, combat-capable,
    /// hostile agent within its sight radius. Agents that want to flee detect
    /// nothing. Agents with something in sight are put on alert.
    pub fn perceive(&mut self) {
        let snapshot: Vec<_> = self
            .agents
            .values()
            .map(|a| {
                let unavailable = a.is_dead() || !a.has_combat_capability();
                (a.id(), a.side(), a.position(), unavailable)
            })
            .collect();

        for agent in self.agents.values_mut() {
            agent.detected.clear();
            if agent.is_dead() || !agent.has_combat_capability() || agent.wants_to_flee() {
                continue;
            }
            let (me, side, position, sight) =
                (agent.id(), agent.side(), agent.position(), agent.sight());
            agent.detected.extend(
                snapshot
                    .iter()
                    .filter(|(other, other_side, other_position, unavailable)| {
                        *other != me
                            && !unavailable
                            && side.is_hostile_to(*other_side)
                            && position.distance(*other_position) <= sight
                    })
                    .map(|(other, ..)| *other),
            );
            agent.alert();
        }
    }
}

impl BattleWorld for SimWorld {
    fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    fn combatant(&self, id: AgentId) -> Option<&dyn Combatant> {
        self.agents.get(&id).map(|agent| agent as &dyn Combatant)
    }

    fn combatant_mut(&mut self, id: AgentId) -> Option<&mut dyn Combatant> {
        self.agents
            .get_mut(&id)
            .map(|agent| agent as &mut dyn Combatant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{CombatState, ResourceDelta, Side, Vec2};

    fn world() -> SimWorld {
        let mut world = SimWorld::new();
        world
            .spawn(SimAgent::new(AgentId(0), Side::Player, Vec2::ZERO))
            .unwrap();
        world
            .spawn(SimAgent::new(AgentId(1), Side::Enemy, Vec2::new(5.0, 0.0)))
            .unwrap();
        world
            .spawn(SimAgent::new(AgentId(2), Side::Enemy, Vec2::new(50.0, 0.0)))
            .unwrap();
        world
            .spawn(SimAgent::new(AgentId(3), Side::Neutral, Vec2::new(1.0, 0.0)))
            .unwrap();
        world
    }

    #[test]
    fn duplicate_spawn_is_rejected() {
        let mut world = world();
        let err = world
            .spawn(SimAgent::new(AgentId(1), Side::Enemy, Vec2::ZERO))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::DuplicateAgent { agent } if agent == AgentId(1)));
    }

    #[test]
    fn perception_is_hostile_and_range_limited() {
        let mut world = world();
        world.perceive();

        let player = world.agent(AgentId(0)).unwrap();
        assert_eq!(player.detected_enemies(), &[AgentId(1)]);
        assert_eq!(player.combat_state(), CombatState::Warning);
        assert_eq!(world.agent(AgentId(1)).unwrap().detected_enemies(), &[AgentId(0)]);
        assert!(world.agent(AgentId(2)).unwrap().detected_enemies().is_empty());
        assert!(world.agent(AgentId(3)).unwrap().detected_enemies().is_empty());
    }

    #[test]
    fn the_dead_are_not_seen() {
        let mut world = world();
        world
            .agent_mut(AgentId(1))
            .unwrap()
            .apply(ResourceDelta::damage(1000.0));
        world.perceive();
        assert!(world.agent(AgentId(0)).unwrap().detected_enemies().is_empty());
    }

    #[test]
    fn world_oracle_defaults() {
        let world = world();
        assert_eq!(world.distance_2d(AgentId(0), AgentId(1)), Some(5.0));
        assert_eq!(world.agent_ids().len(), 4);
        assert!(world.combatant(AgentId(9)).is_none());
    }
}
