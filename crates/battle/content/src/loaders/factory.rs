//! Content factory for building battle collaborators from data files.

use std::path::{Path, PathBuf};

use battle_core::BattleConfig;

use crate::cues::CueTable;
use crate::loaders::{ConfigLoader, CueLoader, LoadResult};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── cues.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `config.toml`.
    ///
    /// A missing file yields [`BattleConfig::default`].
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the cue table from `cues.ron`.
    pub fn load_cues(&self) -> LoadResult<CueTable> {
        let path = self.data_dir.join("cues.ron");
        CueLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::CueCatalog;
    use tempfile::TempDir;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn loads_from_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "minimum_field_radius = 8.0\n").unwrap();
        std::fs::write(
            dir.path().join("cues.ron"),
            r#"(universal: Some((clip: "theme")), prototypes: {})"#,
        )
        .unwrap();

        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap().minimum_field_radius, 8.0);
        assert_eq!(
            factory.load_cues().unwrap().universal_cue().map(|c| c.clip.as_str()),
            Some("theme")
        );
    }

    #[test]
    fn missing_config_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), BattleConfig::default());
        assert!(factory.load_cues().is_err());
    }

    #[test]
    fn bundled_data_loads() {
        let factory = ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        let config = factory.load_config().unwrap();
        assert_eq!(config.field_radius_for(6.0), 10.0);

        let cues = factory.load_cues().unwrap();
        assert!(cues.battle_cue("goblin").is_some());
        assert!(cues.universal_cue().is_some());
    }
}
