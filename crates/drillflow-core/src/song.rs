//! Song metadata and tempo math
//!
//! The playback clock, audio mixing and asset loading live outside the
//! core; what the engine needs from a song is its tempo map and length so
//! it can convert between beats and seconds and evaluate tempo ramps.

use serde::{Deserialize, Serialize};

use crate::template::FormationTemplate;

/// Convert a beat count to seconds at a fixed tempo. A non-positive tempo
/// yields 0 rather than a division by zero.
pub fn beats_to_seconds(beats: f32, bpm: f32) -> f32 {
    if bpm > 0.0 {
        beats * 60.0 / bpm
    } else {
        0.0
    }
}

/// Convert seconds to a beat count at a fixed tempo. A non-positive tempo
/// yields 0.
pub fn seconds_to_beats(seconds: f32, bpm: f32) -> f32 {
    if bpm > 0.0 {
        seconds * bpm / 60.0
    } else {
        0.0
    }
}

/// A tempo change somewhere in a song.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoChange {
    /// Beat at which the change begins.
    pub at_beat: f32,
    /// Tempo after the change.
    pub new_bpm: f32,
    /// Beats over which the tempo ramps; 0 = instant.
    pub transition_beats: f32,
}

/// Metadata for a song in the content catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongMeta {
    /// Catalog id.
    pub id: String,
    /// Title.
    pub title: String,
    /// Composer credit.
    #[serde(default)]
    pub composer: String,
    /// Base tempo in beats per minute.
    pub bpm: f32,
    /// Time signature numerator.
    pub beats_per_measure: u32,
    /// Song length in beats.
    pub total_beats: f32,
    /// Author-assigned difficulty, 1-10.
    #[serde(default)]
    pub difficulty: u8,
    /// Tempo changes, in beat order.
    #[serde(default)]
    pub tempo_changes: Vec<TempoChange>,
}

impl SongMeta {
    /// Effective tempo at a given beat, walking the tempo changes and
    /// interpolating inside a ramp.
    pub fn bpm_at_beat(&self, beat: f32) -> f32 {
        let mut current = self.bpm;

        for change in &self.tempo_changes {
            if beat >= change.at_beat + change.transition_beats {
                current = change.new_bpm;
            } else if beat >= change.at_beat {
                if change.transition_beats > 0.0 {
                    let progress = (beat - change.at_beat) / change.transition_beats;
                    current += (change.new_bpm - current) * progress;
                } else {
                    current = change.new_bpm;
                }
                break;
            }
        }

        current
    }

    /// Song length in seconds at the base tempo.
    pub fn duration_seconds(&self) -> f32 {
        beats_to_seconds(self.total_beats, self.bpm)
    }
}

/// Read-only resolution of catalog content consumed by the core.
///
/// Implemented outside the core (drillflow-io ships a directory-backed
/// implementation); editor and playback drivers inject it where needed.
pub trait ContentCatalog {
    /// Resolve a song id to its metadata.
    fn song(&self, id: &str) -> Option<SongMeta>;
    /// Resolve a template id to a slot template.
    fn template(&self, id: &str) -> Option<FormationTemplate>;
}
