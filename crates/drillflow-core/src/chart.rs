//! Drill chart - Core Data Structure
//!
//! A [`DrillChart`] is the beat-indexed timeline of a show: an ordered list
//! of [`Formation`]s, each holding per-member field positions, plus the
//! audio timeline that accompanies them.
//!
//! Invariants maintained by the store (never mutate these directly from
//! outside [`crate::store::FormationStore`]):
//! - formations are sorted ascending by `start_beat`
//! - formation ids are unique within a chart
//! - member positions are clamped to the field bounds on write

use chrono::{DateTime, Utc};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audio::AudioTimeline;

/// Unique identifier for a chart.
pub type ChartId = Uuid;
/// Unique identifier for a formation within a chart.
pub type FormationId = Uuid;
/// Identifier of a band member. Owned by the roster; charts only reference it.
pub type MemberId = Uuid;

/// How members move into a formation from the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TransitionStyle {
    /// Teleport, no marching.
    Snap,
    /// Straight-line march at constant pace.
    #[default]
    LinearMarch,
    /// Curved march path.
    CurvedMarch,
    /// Individually randomized paths.
    Scatter,
    /// Author-defined paths.
    Custom,
}

/// A single member's spot in a formation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberPosition {
    /// The member standing here.
    pub member_id: MemberId,
    /// Field position in yards.
    pub position: Vec2,
    /// Facing angle in degrees, 0 = toward the home side.
    pub facing_deg: f32,
}

/// A named spatial arrangement of members at a point on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    /// Unique ID.
    pub id: FormationId,
    /// Display label ("Opening Set", "Move 3", ...).
    pub label: String,
    /// Beat at which the formation is reached.
    pub start_beat: f32,
    /// How long the formation is held before transitioning onward.
    pub duration_beats: f32,
    /// How members arrive into this formation.
    pub transition_in: TransitionStyle,
    /// One entry per member, unique by member id.
    pub positions: Vec<MemberPosition>,
}

impl Formation {
    /// Create an empty formation.
    pub fn new(start_beat: f32, duration_beats: f32, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            start_beat,
            duration_beats,
            transition_in: TransitionStyle::default(),
            positions: Vec::new(),
        }
    }

    /// Beat at which the hold window ends and the transition out begins.
    pub fn hold_end(&self) -> f32 {
        self.start_beat + self.duration_beats
    }

    /// Look up a member's position in this formation.
    pub fn position_for(&self, member_id: MemberId) -> Option<&MemberPosition> {
        self.positions.iter().find(|p| p.member_id == member_id)
    }

    /// Mutable lookup of a member's position.
    pub fn position_for_mut(&mut self, member_id: MemberId) -> Option<&mut MemberPosition> {
        self.positions.iter_mut().find(|p| p.member_id == member_id)
    }
}

/// A complete drill chart for one show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillChart {
    /// Unique ID.
    pub id: ChartId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Catalog id of the song this chart is set to.
    pub song_id: String,
    /// Total show length in beats.
    pub total_duration_beats: f32,
    /// Formations, sorted ascending by `start_beat`.
    pub formations: Vec<Formation>,
    /// Song window and sound-effect regions.
    #[serde(default)]
    pub audio: AudioTimeline,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified_at: DateTime<Utc>,
}

impl DrillChart {
    /// Create an empty chart.
    pub fn new(name: impl Into<String>, song_id: impl Into<String>) -> Self {
        let now = Utc::now();
        let song_id = song_id.into();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            song_id: song_id.clone(),
            total_duration_beats: 0.0,
            formations: Vec::new(),
            audio: AudioTimeline::for_song(song_id),
            created_at: now,
            modified_at: now,
        }
    }

    /// Index of the formation with the greatest `start_beat` <= `beat`,
    /// or `None` if the chart is empty or `beat` precedes every formation.
    pub fn formation_index_at_beat(&self, beat: f32) -> Option<usize> {
        self.formations.iter().rposition(|f| f.start_beat <= beat)
    }

    /// The formation active at `beat`, if any.
    pub fn formation_at_beat(&self, beat: f32) -> Option<&Formation> {
        self.formation_index_at_beat(beat)
            .map(|ix| &self.formations[ix])
    }

    /// Look up a formation by id.
    pub fn formation(&self, id: FormationId) -> Option<&Formation> {
        self.formations.iter().find(|f| f.id == id)
    }

    /// Mutable lookup of a formation by id.
    pub fn formation_mut(&mut self, id: FormationId) -> Option<&mut Formation> {
        self.formations.iter_mut().find(|f| f.id == id)
    }

    /// Update the modification timestamp.
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}
