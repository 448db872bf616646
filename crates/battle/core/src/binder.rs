//! Reference-counted audio cue bindings tied to session membership.
//!
//! Each agent holds at most one per-prototype binding, recorded by id so that
//! repeated binds and unbinds are idempotent. The universal cue occupies a
//! single global slot bound to the observer's own membership.

use std::collections::HashMap;

use crate::env::{CueCatalog, CueHandle, Presentation};
use crate::state::AgentId;

#[derive(Clone, Debug, Default)]
pub struct AudioBinder {
    bindings: HashMap<AgentId, CueHandle>,
    universal: Option<CueHandle>,
}

impl AudioBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the prototype cue for `agent` unless one is already bound.
    ///
    /// Returns true if a new cue started playing. A prototype with no cue in
    /// the catalog binds nothing.
    pub fn bind(
        &mut self,
        agent: AgentId,
        prototype: &str,
        cues: &dyn CueCatalog,
        presentation: &mut dyn Presentation,
    ) -> bool {
        if self.bindings.contains_key(&agent) {
            return false;
        }
        let Some(cue) = cues.battle_cue(prototype) else {
            tracing::trace!(agent = %agent, prototype, "no battle cue for prototype");
            return false;
        };

        let handle = presentation.add_cue(&cue.clip, cue.priority, cue.volume);
        tracing::debug!(agent = %agent, clip = %cue.clip, handle = %handle, "bound battle cue");
        self.bindings.insert(agent, handle);
        true
    }

    /// Stops and forgets the cue bound for `agent`, if any.
    pub fn unbind(&mut self, agent: AgentId, presentation: &mut dyn Presentation) -> bool {
        match self.bindings.remove(&agent) {
            Some(handle) => {
                presentation.remove_cue(handle);
                tracing::debug!(agent = %agent, handle = %handle, "unbound battle cue");
                true
            }
            None => false,
        }
    }

    /// Starts the universal cue if the slot is empty.
    pub fn bind_universal(
        &mut self,
        cues: &dyn CueCatalog,
        presentation: &mut dyn Presentation,
    ) -> bool {
        if self.universal.is_some() {
            return false;
        }
        let Some(cue) = cues.universal_cue() else {
            return false;
        };

        let handle = presentation.add_cue(&cue.clip, cue.priority, cue.volume);
        tracing::debug!(clip = %cue.clip, handle = %handle, "bound universal cue");
        self.universal = Some(handle);
        true
    }

    pub fn unbind_universal(&mut self, presentation: &mut dyn Presentation) -> bool {
        match self.universal.take() {
            Some(handle) => {
                presentation.remove_cue(handle);
                tracing::debug!(handle = %handle, "unbound universal cue");
                true
            }
            None => false,
        }
    }

    pub fn binding(&self, agent: AgentId) -> Option<CueHandle> {
        self.bindings.get(&agent).copied()
    }

    pub fn is_bound(&self, agent: AgentId) -> bool {
        self.bindings.contains_key(&agent)
    }

    pub fn universal(&self) -> Option<CueHandle> {
        self.universal
    }

    /// Number of per-agent bindings currently held.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.universal.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::CueSpec;

    #[derive(Default)]
    struct Mixer {
        next: u64,
        playing: Vec<CueHandle>,
    }

    impl Presentation for Mixer {
        fn add_cue(&mut self, _clip: &str, _priority: i32, _volume: f32) -> CueHandle {
            self.next += 1;
            let handle = CueHandle(self.next);
            self.playing.push(handle);
            handle
        }

        fn remove_cue(&mut self, handle: CueHandle) {
            self.playing.retain(|h| *h != handle);
        }
    }

    struct Cues {
        goblin: CueSpec,
        universal: CueSpec,
    }

    impl CueCatalog for Cues {
        fn battle_cue(&self, prototype: &str) -> Option<&CueSpec> {
            (prototype == "goblin").then_some(&self.goblin)
        }

        fn universal_cue(&self) -> Option<&CueSpec> {
            Some(&self.universal)
        }
    }

    fn cues() -> Cues {
        Cues {
            goblin: CueSpec::new("goblin_drums", 1, 0.8),
            universal: CueSpec::new("battle_theme", 10, 1.0),
        }
    }

    #[test]
    fn bind_is_idempotent() {
        let (cues, mut mixer, mut binder) = (cues(), Mixer::default(), AudioBinder::new());

        assert!(binder.bind(AgentId(1), "goblin", &cues, &mut mixer));
        assert!(!binder.bind(AgentId(1), "goblin", &cues, &mut mixer));
        assert_eq!(mixer.playing.len(), 1);

        assert!(binder.unbind(AgentId(1), &mut mixer));
        assert!(!binder.unbind(AgentId(1), &mut mixer));
        assert!(mixer.playing.is_empty());
    }

    #[test]
    fn unknown_prototype_binds_nothing() {
        let (cues, mut mixer, mut binder) = (cues(), Mixer::default(), AudioBinder::new());
        assert!(!binder.bind(AgentId(2), "rat", &cues, &mut mixer));
        assert!(!binder.is_bound(AgentId(2)));
        assert!(mixer.playing.is_empty());
    }

    #[test]
    fn universal_slot_holds_one_cue() {
        let (cues, mut mixer, mut binder) = (cues(), Mixer::default(), AudioBinder::new());
        assert!(binder.bind_universal(&cues, &mut mixer));
        assert!(!binder.bind_universal(&cues, &mut mixer));
        assert_eq!(mixer.playing.len(), 1);

        assert!(binder.unbind_universal(&mut mixer));
        assert!(!binder.unbind_universal(&mut mixer));
        assert!(binder.is_empty());
    }
}
