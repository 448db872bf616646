use std::fmt;

use crate::state::{SessionId, Vec2};

/// Handle to a playing audio cue, issued by the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CueHandle(pub u64);

impl fmt::Display for CueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cue:{}", self.0)
    }
}

/// Handle to a spawned field marker effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerHandle(pub u64);

/// Playback parameters for a cue.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CueSpec {
    pub clip: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i32,
    #[cfg_attr(feature = "serde", serde(default = "CueSpec::default_volume"))]
    pub volume: f32,
}

impl CueSpec {
    pub fn new(clip: impl Into<String>, priority: i32, volume: f32) -> Self {
        Self {
            clip: clip.into(),
            priority,
            volume,
        }
    }

    #[cfg(feature = "serde")]
    fn default_volume() -> f32 {
        1.0
    }
}

/// Audio mixing and field-effect collaborator.
pub trait Presentation {
    fn add_cue(&mut self, clip: &str, priority: i32, volume: f32) -> CueHandle;

    fn remove_cue(&mut self, handle: CueHandle);

    /// Places a marker visualizing a session's field. Headless worlds return `None`.
    fn spawn_field_marker(
        &mut self,
        _session: SessionId,
        _center: Vec2,
        _radius: f32,
    ) -> Option<MarkerHandle> {
        None
    }

    fn despawn_field_marker(&mut self, _handle: MarkerHandle) {}
}

/// Read-only cue data keyed by agent prototype.
pub trait CueCatalog {
    /// Cue bound while an agent of `prototype` shares a session with the observer.
    fn battle_cue(&self, prototype: &str) -> Option<&CueSpec>;

    /// Cue bound while the observer itself is in any session.
    fn universal_cue(&self) -> Option<&CueSpec>;
}
