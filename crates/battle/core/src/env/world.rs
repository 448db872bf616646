use super::Combatant;
use crate::state::{AgentId, Vec2};

/// World-side oracle: agent enumeration plus geometry and tag queries.
///
/// Geometry and tag lookups default to the combatant's own accessors; worlds
/// with a spatial index or a separate tag store override them.
pub trait BattleWorld {
    /// Every agent currently present, in a stable order.
    fn agent_ids(&self) -> Vec<AgentId>;

    fn combatant(&self, id: AgentId) -> Option<&dyn Combatant>;

    fn combatant_mut(&mut self, id: AgentId) -> Option<&mut dyn Combatant>;

    /// Ground-plane distance between two agents.
    fn distance_2d(&self, a: AgentId, b: AgentId) -> Option<f32> {
        let a = self.combatant(a)?.position();
        let b = self.combatant(b)?.position();
        Some(a.distance(b))
    }

    fn has_tag(&self, agent: AgentId, tag: &str) -> bool {
        self.combatant(agent)
            .is_some_and(|combatant| combatant.has_tag(tag))
    }

    fn visual_anchor(&self, agent: AgentId) -> Option<Vec2> {
        self.combatant(agent).map(|combatant| combatant.visual_anchor())
    }
}
