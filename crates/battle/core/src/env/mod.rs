//! Traits describing the collaborators the battle core depends on.
//!
//! The core never sees concrete agent types. Agents are reached through the
//! [`Combatant`] capability, the world through [`BattleWorld`] (enumeration,
//! geometry, tags), audio and field effects through [`Presentation`], and
//! per-prototype cue data through [`CueCatalog`]. [`BattleEnv`] bundles them
//! for a single call into the manager.
mod combatant;
mod presentation;
mod world;

pub use combatant::{Combatant, Engagement};
pub use presentation::{CueCatalog, CueHandle, CueSpec, MarkerHandle, Presentation};
pub use world::BattleWorld;

/// Aggregates the collaborators required by [`crate::manager::BattleManager`].
///
/// Fields are borrowed independently so the manager can read the world while
/// driving audio without aliasing conflicts.
pub struct BattleEnv<'a> {
    pub(crate) world: &'a mut dyn BattleWorld,
    pub(crate) presentation: &'a mut dyn Presentation,
    pub(crate) cues: &'a dyn CueCatalog,
}

impl<'a> BattleEnv<'a> {
    pub fn new(
        world: &'a mut dyn BattleWorld,
        presentation: &'a mut dyn Presentation,
        cues: &'a dyn CueCatalog,
    ) -> Self {
        Self {
            world,
            presentation,
            cues,
        }
    }

    pub fn world(&self) -> &dyn BattleWorld {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut dyn BattleWorld {
        &mut *self.world
    }

    pub fn presentation(&self) -> &dyn Presentation {
        &*self.presentation
    }

    pub fn cues(&self) -> &dyn CueCatalog {
        self.cues
    }
}
