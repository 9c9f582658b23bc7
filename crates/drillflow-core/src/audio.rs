//! Audio timeline data
//!
//! The audio side of a chart: which song plays over which beat window, plus
//! any number of sound-effect tracks holding beat-positioned regions. The
//! core only models this data; mixing and playback live elsewhere.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a sound-effect track.
pub type TrackId = Uuid;
/// Unique identifier for an audio region within a track.
pub type RegionId = Uuid;

/// Song window and sound-effect tracks for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTimeline {
    /// Catalog id of the song.
    pub song_id: String,
    /// Beat at which the song starts playing.
    pub song_start_beat: f32,
    /// Beat at which the song stops.
    pub song_end_beat: f32,
    /// Song volume, 0-1.
    pub song_volume: f32,
    /// Sound-effect tracks.
    pub sfx_tracks: Vec<AudioTrack>,
}

impl Default for AudioTimeline {
    fn default() -> Self {
        Self {
            song_id: String::new(),
            song_start_beat: 0.0,
            song_end_beat: 0.0,
            song_volume: 1.0,
            sfx_tracks: Vec::new(),
        }
    }
}

impl AudioTimeline {
    /// Create a timeline referencing the given song.
    pub fn for_song(song_id: impl Into<String>) -> Self {
        Self {
            song_id: song_id.into(),
            ..Default::default()
        }
    }

    /// Look up a track by id.
    pub fn track(&self, id: TrackId) -> Option<&AudioTrack> {
        self.sfx_tracks.iter().find(|t| t.id == id)
    }

    /// Mutable lookup of a track by id.
    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut AudioTrack> {
        self.sfx_tracks.iter_mut().find(|t| t.id == id)
    }
}

/// A lane of sound-effect regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Unique ID.
    pub id: TrackId,
    /// Display label.
    pub label: String,
    /// Track volume, 0-1.
    pub volume: f32,
    /// Whether the whole track is muted.
    pub muted: bool,
    /// Regions on this track.
    pub regions: Vec<AudioRegion>,
}

impl AudioTrack {
    /// Create an empty track.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            volume: 1.0,
            muted: false,
            regions: Vec::new(),
        }
    }

    /// Look up a region by id.
    pub fn region(&self, id: RegionId) -> Option<&AudioRegion> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Mutable lookup of a region by id.
    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut AudioRegion> {
        self.regions.iter_mut().find(|r| r.id == id)
    }
}

/// A sound effect placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioRegion {
    /// Unique ID.
    pub id: RegionId,
    /// Catalog id of the sound effect.
    pub sfx_id: String,
    /// Display label.
    pub label: String,
    /// Beat at which the region starts.
    pub start_beat: f32,
    /// Region length in beats.
    pub duration_beats: f32,
    /// Region volume, 0-1.
    pub volume: f32,
    /// Fade-in length in beats.
    pub fade_in_beats: f32,
    /// Fade-out length in beats.
    pub fade_out_beats: f32,
}

impl AudioRegion {
    /// Create a region with default volume and no fades.
    pub fn new(sfx_id: impl Into<String>, label: impl Into<String>, start_beat: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            sfx_id: sfx_id.into(),
            label: label.into(),
            start_beat,
            duration_beats: 4.0,
            volume: 1.0,
            fade_in_beats: 0.0,
            fade_out_beats: 0.0,
        }
    }
}
