//! In-memory cue catalog.

use std::collections::BTreeMap;

use battle_core::{CueCatalog, CueSpec};

/// Battle cues keyed by agent prototype, plus the cue played for the observer.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CueTable {
    #[cfg_attr(feature = "serde", serde(default))]
    pub universal: Option<CueSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub prototypes: BTreeMap<String, CueSpec>,
}

impl CueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_universal(mut self, cue: CueSpec) -> Self {
        self.universal = Some(cue);
        self
    }

    pub fn with_prototype(mut self, prototype: impl Into<String>, cue: CueSpec) -> Self {
        self.prototypes.insert(prototype.into(), cue);
        self
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty() && self.universal.is_none()
    }
}

impl CueCatalog for CueTable {
    fn battle_cue(&self, prototype: &str) -> Option<&CueSpec> {
        self.prototypes.get(prototype)
    }

    fn universal_cue(&self) -> Option<&CueSpec> {
        self.universal.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_prototype() {
        let table = CueTable::new()
            .with_universal(CueSpec::new("battle_theme", 10, 1.0))
            .with_prototype("goblin", CueSpec::new("goblin_drums", 1, 0.8));

        assert_eq!(table.battle_cue("goblin").map(|c| c.clip.as_str()), Some("goblin_drums"));
        assert!(table.battle_cue("wolf").is_none());
        assert_eq!(table.universal_cue().map(|c| c.priority), Some(10));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn empty_table_has_no_cues() {
        let table = CueTable::new();
        assert!(table.is_empty());
        assert!(table.universal_cue().is_none());
    }
}
