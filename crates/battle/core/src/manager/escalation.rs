//! Monotonic difficulty escalation.

use super::BattleManager;
use crate::env::BattleWorld;
use crate::events::BattleEvent;
use crate::state::{SessionId, Tier};

impl BattleManager {
    /// Recomputes the tier of session `id` from its active participants' tags.
    ///
    /// The session only moves up: a lower demanded tier leaves it unchanged.
    /// Returns the session's tier after the update.
    pub fn recompute_tier(&mut self, world: &dyn BattleWorld, id: SessionId) -> Option<Tier> {
        let session = self.registry.get(id)?;
        let demanded = session
            .active_participants()
            .map(|agent| Tier::for_tags(|tag| world.has_tag(agent, tag)))
            .max()
            .unwrap_or_default();
        self.raise_tier(id, demanded);
        self.registry.get(id).map(|session| session.tier())
    }

    pub(super) fn raise_tier(&mut self, id: SessionId, demanded: Tier) {
        let Some(session) = self.registry.get_mut(id) else {
            return;
        };
        if let Some(from) = session.raise_tier(demanded) {
            tracing::info!(session = %id, from = %from, to = %demanded, "battle tier raised");
            self.events.push(BattleEvent::BattleLevelUpgraded {
                session: id,
                from,
                to: demanded,
            });
        }
    }
}
