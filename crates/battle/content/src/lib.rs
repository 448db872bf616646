//! Data-driven battle content and loaders.
//!
//! This crate holds the static data the battle core consumes through its
//! collaborator traits:
//! - Per-prototype battle cues plus the universal battle cue (data-driven via RON)
//! - Battle configuration (data-driven via TOML)
//!
//! Content is read once at startup and never appears in session state.

pub mod cues;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use cues::CueTable;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, CueLoader, LoadResult};
