//! DrillFlow Core - Show Authoring and Evaluation Engine
//!
//! This crate contains the domain model and engines for DrillFlow,
//! including:
//! - Beat-indexed drill chart model (formations, member positions)
//! - Formation store with sorted-timeline maintenance and any-beat
//!   interpolation
//! - Reversible editor commands with undo/redo history
//! - Transition feasibility validation
//! - Show scoring and grading
//!
//! Rendering, playback, persistence and UI live in other crates; this one
//! is pure domain logic driven through the public surface below.

#![warn(missing_docs)]

pub use glam::Vec2;
use thiserror::Error;

pub mod audio;
pub mod chart;
pub mod command;
pub mod field;
pub mod roster;
pub mod scoring;
pub mod session;
pub mod song;
pub mod store;
pub mod template;
pub mod transition;

// --- Re-exports grouped by category ---

// Chart model
pub use audio::{AudioRegion, AudioTimeline, AudioTrack, RegionId, TrackId};
pub use chart::{
    ChartId, DrillChart, Formation, FormationId, MemberId, MemberPosition, TransitionStyle,
};
pub use template::{auto_map_slots, FormationTemplate, TemplateSlot};

// Band data
pub use roster::{BandMember, InstrumentFamily, InstrumentType, MemberStatus, Roster, SkillKind};
pub use song::{beats_to_seconds, seconds_to_beats, ContentCatalog, SongMeta, TempoChange};

// Editing
pub use command::{
    AddAudioRegionCommand, ChangeSongCommand, CommandHistory, EditorCommand,
    MoveAudioRegionCommand, MoveFormationCommand, MoveMemberCommand, PlaceMemberCommand,
    RemoveAudioRegionCommand, RemoveMemberCommand, ResizeAudioRegionCommand,
    ResizeFormationCommand,
};
pub use session::EditorSession;
pub use store::{FormationStore, StoreEvent};

// Validation & scoring
pub use scoring::{
    letter_grade, MemberSnapshot, NoteCategory, ScoringEngine, ScoringEvent, ScoringFrame,
    ScoringNote, ScoringRubric, ShowScore,
};
pub use transition::{validate_transition, TransitionReport, TransitionSeverity};

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// A chart failed to parse from JSON.
    #[error("chart import failed: {0}")]
    ChartImport(#[from] serde_json::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
