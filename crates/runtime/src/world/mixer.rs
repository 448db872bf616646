use std::collections::BTreeMap;

use battle_core::{CueHandle, MarkerHandle, Presentation, SessionId, Vec2};

#[derive(Clone, Debug, PartialEq)]
pub struct PlayingCue {
    pub clip: String,
    pub priority: i32,
    pub volume: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldMarker {
    pub session: SessionId,
    pub center: Vec2,
    pub radius: f32,
}

/// Headless audio mixer and effect layer.
///
/// Tracks what is playing and which field markers are visible; nothing is
/// rendered. Handles are never reused.
#[derive(Clone, Debug, Default)]
pub struct Mixer {
    next_handle: u64,
    cues: BTreeMap<CueHandle, PlayingCue>,
    markers: BTreeMap<MarkerHandle, FieldMarker>,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn cue(&self, handle: CueHandle) -> Option<&PlayingCue> {
        self.cues.get(&handle)
    }

    pub fn playing(&self) -> impl Iterator<Item = &PlayingCue> {
        self.cues.values()
    }

    pub fn playing_count(&self) -> usize {
        self.cues.len()
    }

    pub fn is_playing(&self, clip: &str) -> bool {
        self.cues.values().any(|cue| cue.clip == clip)
    }

    /// The cue that wins the mix: highest priority, earliest started on ties.
    pub fn dominant(&self) -> Option<&PlayingCue> {
        self.cues
            .values()
            .rev()
            .max_by_key(|cue| cue.priority)
    }

    pub fn markers(&self) -> impl Iterator<Item = &FieldMarker> {
        self.markers.values()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

impl Presentation for Mixer {
    fn add_cue(&mut self, clip: &str, priority: i32, volume: f32) -> CueHandle {
        let handle = CueHandle(self.issue());
        tracing::trace!(cue = %handle, clip, priority, "cue started");
        self.cues.insert(
            handle,
            PlayingCue {
                clip: clip.to_string(),
                priority,
                volume: volume.clamp(0.0, 1.0),
            },
        );
        handle
    }

    fn remove_cue(&mut self, handle: CueHandle) {
        if self.cues.remove(&handle).is_none() {
            tracing::warn!(cue = %handle, "removing a cue that is not playing");
        }
    }

    fn spawn_field_marker(
        &mut self,
        session: SessionId,
        center: Vec2,
        radius: f32,
    ) -> Option<MarkerHandle> {
        let handle = MarkerHandle(self.issue());
        self.markers.insert(
            handle,
            FieldMarker {
                session,
                center,
                radius,
            },
        );
        Some(handle)
    }

    fn despawn_field_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_cue_prefers_priority_then_age() {
        let mut mixer = Mixer::new();
        let drums = mixer.add_cue("drums", 1, 0.5);
        let theme = mixer.add_cue("theme", 10, 1.0);
        mixer.add_cue("horns", 10, 1.0);

        assert_eq!(mixer.dominant().map(|c| c.clip.as_str()), Some("theme"));
        mixer.remove_cue(theme);
        assert_eq!(mixer.dominant().map(|c| c.clip.as_str()), Some("horns"));
        assert_eq!(mixer.cue(drums).map(|c| c.volume), Some(0.5));
        assert_eq!(mixer.playing_count(), 2);
    }

    #[test]
    fn markers_come_and_go() {
        let mut mixer = Mixer::new();
        let marker = mixer
            .spawn_field_marker(SessionId(0), Vec2::new(3.0, 0.0), 10.0)
            .unwrap();
        assert_eq!(mixer.marker_count(), 1);
        mixer.despawn_field_marker(marker);
        assert_eq!(mixer.marker_count(), 0);
    }
}
