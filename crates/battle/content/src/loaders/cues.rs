//! Cue table loader.

use std::path::Path;

use crate::cues::CueTable;
use crate::loaders::{LoadResult, read_file};

/// Loader for battle cue tables from RON files.
pub struct CueLoader;

impl CueLoader {
    /// Load a [`CueTable`] from a RON file.
    pub fn load(path: &Path) -> LoadResult<CueTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CueTable> {
        let table: CueTable = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse cue table RON: {}", e))?;

        if let Some((prototype, _)) = table.prototypes.iter().find(|(_, cue)| cue.clip.is_empty()) {
            anyhow::bail!("cue for prototype '{}' has an empty clip", prototype);
        }
        Ok(table)
    }
}
