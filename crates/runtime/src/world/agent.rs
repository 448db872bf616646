use battle_core::{
    AgentId, CombatState, Combatant, Engagement, ResourceDelta, Session, Side, Vec2,
};

/// Callback tally kept by every [`SimAgent`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleRecord {
    pub joins: u32,
    pub stays: u32,
    pub escapes: u32,
    pub deaths: u32,
    pub finishes: u32,
    pub sneak_attacks: u32,
    pub sneak_attacked: u32,
}

/// Simple agent with hit points, a sight radius, and an optional flee threshold.
///
/// Perception is refreshed by [`super::SimWorld::perceive`]. Joining a battle
/// puts the agent into [`CombatState::Battle`]; once its health drops below
/// the flee threshold it falls back to `Warning`, which the core treats as a
/// wish to escape.
#[derive(Clone, Debug)]
pub struct SimAgent {
    id: AgentId,
    side: Side,
    position: Vec2,
    hp: f32,
    max_hp: f32,
    state: CombatState,
    tags: Vec<String>,
    prototype: String,
    capable: bool,
    sight: f32,
    flee_below: Option<f32>,
    pub(super) detected: Vec<AgentId>,
    engagement: Engagement,
    record: BattleRecord,
}

impl SimAgent {
    pub const DEFAULT_HP: f32 = 100.0;
    pub const DEFAULT_SIGHT: f32 = 8.0;

    pub fn new(id: AgentId, side: Side, position: Vec2) -> Self {
        Self {
            id,
            side,
            position,
            hp: Self::DEFAULT_HP,
            max_hp: Self::DEFAULT_HP,
            state: CombatState::Idle,
            tags: Vec::new(),
            prototype: String::new(),
            capable: true,
            sight: Self::DEFAULT_SIGHT,
            flee_below: None,
            detected: Vec::new(),
            engagement: Engagement::default(),
            record: BattleRecord::default(),
        }
    }

    pub fn with_hp(mut self, hp: f32) -> Self {
        self.hp = hp;
        self.max_hp = hp;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_prototype(mut self, prototype: impl Into<String>) -> Self {
        self.prototype = prototype.into();
        self
    }

    pub fn with_sight(mut self, sight: f32) -> Self {
        self.sight = sight.max(0.0);
        self
    }

    /// Agent gives up the fight once `hp / max_hp` falls below `ratio`.
    pub fn flees_below(mut self, ratio: f32) -> Self {
        self.flee_below = Some(ratio.clamp(0.0, 1.0));
        self
    }

    /// Agent is scenery: never detected, never admitted.
    pub fn without_combat(mut self) -> Self {
        self.capable = false;
        self
    }

    pub fn hp(&self) -> f32 {
        self.hp
    }

    pub fn sight(&self) -> f32 {
        self.sight
    }

    pub fn record(&self) -> &BattleRecord {
        &self.record
    }

    /// Engagement handed out on the most recent stay.
    pub fn engagement(&self) -> &Engagement {
        &self.engagement
    }

    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_combat_state(&mut self, state: CombatState) {
        self.state = state;
    }

    /// Applies a hit-point change, clamped to `[0, max_hp]`.
    pub fn apply(&mut self, delta: ResourceDelta) {
        self.hp = (self.hp + delta.hp).clamp(0.0, self.max_hp);
    }

    pub(super) fn wants_to_flee(&self) -> bool {
        match self.flee_below {
            Some(ratio) if self.max_hp > 0.0 => self.hp / self.max_hp < ratio,
            _ => false,
        }
    }

    /// Raises the agent's alert level when hostiles are in sight. Agents that
    /// already lost their nerve stay idle.
    pub(super) fn alert(&mut self) {
        if self.state == CombatState::Idle
            && !self.detected.is_empty()
            && !self.is_dead()
            && !self.wants_to_flee()
        {
            self.state = CombatState::Warning;
        }
    }
}

impl Combatant for SimAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn side(&self) -> Side {
        self.side
    }

    fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    fn combat_state(&self) -> CombatState {
        self.state
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    fn prototype(&self) -> &str {
        &self.prototype
    }

    fn has_combat_capability(&self) -> bool {
        self.capable
    }

    fn detected_enemies(&self) -> &[AgentId] {
        &self.detected
    }

    fn on_sneak_attack(&mut self) {
        self.record.sneak_attacks += 1;
    }

    fn on_sneak_attacked(&mut self) {
        self.record.sneak_attacked += 1;
        self.state = CombatState::Warning;
    }

    fn on_join_battle(&mut self, _session: &Session) {
        self.record.joins += 1;
        self.state = CombatState::Battle;
    }

    fn on_stay_battle(&mut self, _session: &Session, engagement: &Engagement) {
        self.record.stays += 1;
        self.engagement = engagement.clone();
        if self.wants_to_flee() {
            tracing::debug!(agent = %self.id, hp = self.hp, "agent losing nerve");
            self.state = CombatState::Warning;
        }
    }

    fn on_escape_battle(&mut self, _session: &Session) {
        self.record.escapes += 1;
        self.state = CombatState::Idle;
        self.engagement = Engagement::default();
    }

    fn on_dead_in_battle(&mut self, _session: &Session) {
        self.record.deaths += 1;
        self.state = CombatState::Idle;
        self.engagement = Engagement::default();
    }

    fn on_finish_battle(&mut self, _session: &Session) {
        self.record.finishes += 1;
        self.state = CombatState::Idle;
        self.engagement = Engagement::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_clamps_and_kills() {
        let mut agent = SimAgent::new(AgentId(1), Side::Enemy, Vec2::ZERO).with_hp(20.0);
        agent.apply(ResourceDelta::damage(15.0));
        assert_eq!(agent.hp(), 5.0);
        assert!(!agent.is_dead());

        agent.apply(ResourceDelta::damage(15.0));
        assert_eq!(agent.hp(), 0.0);
        assert!(agent.is_dead());

        agent.apply(ResourceDelta::healing(500.0));
        assert_eq!(agent.hp(), 20.0);
    }

    #[test]
    fn flee_threshold() {
        let mut agent = SimAgent::new(AgentId(1), Side::Enemy, Vec2::ZERO)
            .with_hp(10.0)
            .flees_below(0.5);
        assert!(!agent.wants_to_flee());
        agent.apply(ResourceDelta::damage(6.0));
        assert!(agent.wants_to_flee());
    }

    #[test]
    fn alert_requires_detection() {
        let mut agent = SimAgent::new(AgentId(1), Side::Enemy, Vec2::ZERO);
        agent.alert();
        assert_eq!(agent.combat_state(), CombatState::Idle);

        agent.detected.push(AgentId(0));
        agent.alert();
        assert_eq!(agent.combat_state(), CombatState::Warning);
    }
}
