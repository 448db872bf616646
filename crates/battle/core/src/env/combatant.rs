use crate::session::Session;
use crate::state::{AgentId, CombatState, Side, Vec2};

/// Enemy and ally subsets handed to a participant on every stay tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Engagement {
    /// Active participants hostile to the agent.
    pub enemies: Vec<AgentId>,
    /// Active participants on the agent's side, excluding the agent itself.
    pub allies: Vec<AgentId>,
}

/// Narrow capability interface implemented by any agent that can fight.
///
/// State accessors are read every step; callbacks notify the agent of
/// membership transitions after the core has applied them. Admission
/// predicates are consulted before any join or escape and may veto it.
pub trait Combatant {
    fn id(&self) -> AgentId;

    fn side(&self) -> Side;

    /// Reassigns allegiance (used when a neutral agent is struck).
    fn set_side(&mut self, side: Side);

    fn position(&self) -> Vec2;

    /// Anchor used when placing field effects. Defaults to [`Self::position`].
    fn visual_anchor(&self) -> Vec2 {
        self.position()
    }

    fn is_dead(&self) -> bool;

    /// The agent's own engagement state. Anything other than
    /// [`CombatState::Battle`] while in a session means it wants out.
    fn combat_state(&self) -> CombatState;

    fn has_tag(&self, tag: &str) -> bool;

    /// Prototype key used to look up this agent's battle cue.
    fn prototype(&self) -> &str;

    fn has_combat_capability(&self) -> bool;

    /// Agents currently perceived as hostile, as computed by perception.
    fn detected_enemies(&self) -> &[AgentId];

    fn allow_join_battle(&self, _session: &Session) -> bool {
        true
    }

    fn allow_escape_battle(&self, _session: &Session) -> bool {
        true
    }

    fn on_sneak_attack(&mut self) {}

    fn on_sneak_attacked(&mut self) {}

    fn on_join_battle(&mut self, _session: &Session) {}

    fn on_stay_battle(&mut self, _session: &Session, _engagement: &Engagement) {}

    fn on_escape_battle(&mut self, _session: &Session) {}

    fn on_dead_in_battle(&mut self, _session: &Session) {}

    fn on_finish_battle(&mut self, _session: &Session) {}
}
