//! Editor commands and undo/redo history
//!
//! Every user-initiated edit is wrapped in an [`EditorCommand`] so it can
//! be reversed. Commands capture value snapshots of the prior state when
//! they are constructed; undo never re-queries live chart data, so a later
//! mutation cannot corrupt an already-pushed history entry.
//!
//! Programmatic/batch edits may call the store directly and bypass history.

use glam::Vec2;

use crate::audio::{AudioRegion, RegionId, TrackId};
use crate::chart::{FormationId, MemberId};
use crate::store::FormationStore;

/// A reversible unit of edit work.
///
/// `apply` and `revert` are assumed not to fail; a command that partially
/// applies is responsible for leaving the chart consistent. The history
/// provides no rollback beyond calling `revert`.
pub trait EditorCommand {
    /// Human-readable description for history UI.
    fn description(&self) -> String;
    /// Perform the edit.
    fn apply(&self, store: &mut FormationStore);
    /// Reverse the edit, restoring the captured prior state.
    fn revert(&self, store: &mut FormationStore);
}

/// Undo/redo stacks over [`EditorCommand`]s.
///
/// Not reentrant: callers must not issue `execute` from inside an
/// in-flight `undo`/`redo` (single-writer discipline).
pub struct CommandHistory {
    undo_stack: Vec<Box<dyn EditorCommand>>,
    redo_stack: Vec<Box<dyn EditorCommand>>,
    max_history: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl CommandHistory {
    /// Create a history with the given capacity; the oldest entries are
    /// silently discarded past it.
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history,
        }
    }

    /// Apply a command and push it onto the undo stack. Any previously
    /// undone future is invalidated.
    pub fn execute(&mut self, command: Box<dyn EditorCommand>, store: &mut FormationStore) {
        command.apply(store);
        self.undo_stack.push(command);
        if self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Reverse the most recent command. No-op on an empty stack; returns
    /// whether anything was undone.
    pub fn undo(&mut self, store: &mut FormationStore) -> bool {
        let Some(command) = self.undo_stack.pop() else {
            return false;
        };
        command.revert(store);
        self.redo_stack.push(command);
        true
    }

    /// Re-apply the most recently undone command. No-op on an empty stack.
    pub fn redo(&mut self, store: &mut FormationStore) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        command.apply(store);
        self.undo_stack.push(command);
        true
    }

    /// Whether undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable entries.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable entries.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

// --- Member commands ---

/// Place a member that previously had no spot in the formation.
pub struct PlaceMemberCommand {
    formation_id: FormationId,
    member_id: MemberId,
    position: Vec2,
    facing_deg: f32,
}

impl PlaceMemberCommand {
    /// Build the command; the member must not already be in the formation.
    pub fn new(
        formation_id: FormationId,
        member_id: MemberId,
        position: Vec2,
        facing_deg: f32,
    ) -> Self {
        Self {
            formation_id,
            member_id,
            position,
            facing_deg,
        }
    }
}

impl EditorCommand for PlaceMemberCommand {
    fn description(&self) -> String {
        format!("Place member {}", self.member_id)
    }

    fn apply(&self, store: &mut FormationStore) {
        store.set_member_position(
            self.formation_id,
            self.member_id,
            self.position,
            self.facing_deg,
        );
    }

    fn revert(&self, store: &mut FormationStore) {
        store.remove_member_from_formation(self.formation_id, self.member_id);
    }
}

/// Move a member that already has a spot, remembering where it was.
pub struct MoveMemberCommand {
    formation_id: FormationId,
    member_id: MemberId,
    old_position: Vec2,
    old_facing_deg: f32,
    new_position: Vec2,
    new_facing_deg: f32,
}

impl MoveMemberCommand {
    /// Build the command from captured old and new placements.
    pub fn new(
        formation_id: FormationId,
        member_id: MemberId,
        old_position: Vec2,
        old_facing_deg: f32,
        new_position: Vec2,
        new_facing_deg: f32,
    ) -> Self {
        Self {
            formation_id,
            member_id,
            old_position,
            old_facing_deg,
            new_position,
            new_facing_deg,
        }
    }
}

impl EditorCommand for MoveMemberCommand {
    fn description(&self) -> String {
        format!("Move member {}", self.member_id)
    }

    fn apply(&self, store: &mut FormationStore) {
        store.set_member_position(
            self.formation_id,
            self.member_id,
            self.new_position,
            self.new_facing_deg,
        );
    }

    fn revert(&self, store: &mut FormationStore) {
        store.set_member_position(
            self.formation_id,
            self.member_id,
            self.old_position,
            self.old_facing_deg,
        );
    }
}

/// Remove a member from a formation, remembering the removed spot.
pub struct RemoveMemberCommand {
    formation_id: FormationId,
    member_id: MemberId,
    saved_position: Vec2,
    saved_facing_deg: f32,
}

impl RemoveMemberCommand {
    /// Build the command from the member's captured placement.
    pub fn new(
        formation_id: FormationId,
        member_id: MemberId,
        saved_position: Vec2,
        saved_facing_deg: f32,
    ) -> Self {
        Self {
            formation_id,
            member_id,
            saved_position,
            saved_facing_deg,
        }
    }
}

impl EditorCommand for RemoveMemberCommand {
    fn description(&self) -> String {
        format!("Remove member {}", self.member_id)
    }

    fn apply(&self, store: &mut FormationStore) {
        store.remove_member_from_formation(self.formation_id, self.member_id);
    }

    fn revert(&self, store: &mut FormationStore) {
        store.set_member_position(
            self.formation_id,
            self.member_id,
            self.saved_position,
            self.saved_facing_deg,
        );
    }
}

// --- Formation commands ---

/// Move a formation to a different start beat.
pub struct MoveFormationCommand {
    formation_id: FormationId,
    old_start_beat: f32,
    new_start_beat: f32,
}

impl MoveFormationCommand {
    /// Build the command from captured old and new start beats.
    pub fn new(formation_id: FormationId, old_start_beat: f32, new_start_beat: f32) -> Self {
        Self {
            formation_id,
            old_start_beat,
            new_start_beat,
        }
    }
}

impl EditorCommand for MoveFormationCommand {
    fn description(&self) -> String {
        format!("Move formation to beat {:.1}", self.new_start_beat)
    }

    fn apply(&self, store: &mut FormationStore) {
        store.update_formation(self.formation_id, Some(self.new_start_beat), None, None);
    }

    fn revert(&self, store: &mut FormationStore) {
        store.update_formation(self.formation_id, Some(self.old_start_beat), None, None);
    }
}

/// Change a formation's start beat and hold duration together.
pub struct ResizeFormationCommand {
    formation_id: FormationId,
    old_start_beat: f32,
    old_duration_beats: f32,
    new_start_beat: f32,
    new_duration_beats: f32,
}

impl ResizeFormationCommand {
    /// Build the command from captured old and new placement.
    pub fn new(
        formation_id: FormationId,
        old_start_beat: f32,
        old_duration_beats: f32,
        new_start_beat: f32,
        new_duration_beats: f32,
    ) -> Self {
        Self {
            formation_id,
            old_start_beat,
            old_duration_beats,
            new_start_beat,
            new_duration_beats,
        }
    }
}

impl EditorCommand for ResizeFormationCommand {
    fn description(&self) -> String {
        format!("Resize formation to {:.1} beats", self.new_duration_beats)
    }

    fn apply(&self, store: &mut FormationStore) {
        store.update_formation(
            self.formation_id,
            Some(self.new_start_beat),
            Some(self.new_duration_beats),
            None,
        );
    }

    fn revert(&self, store: &mut FormationStore) {
        store.update_formation(
            self.formation_id,
            Some(self.old_start_beat),
            Some(self.old_duration_beats),
            None,
        );
    }
}

// --- Audio commands ---

/// Add a region to a sound-effect track.
pub struct AddAudioRegionCommand {
    track_id: TrackId,
    region: AudioRegion,
}

impl AddAudioRegionCommand {
    /// Build the command holding the region to insert.
    pub fn new(track_id: TrackId, region: AudioRegion) -> Self {
        Self { track_id, region }
    }
}

impl EditorCommand for AddAudioRegionCommand {
    fn description(&self) -> String {
        format!("Add audio region '{}'", self.region.label)
    }

    fn apply(&self, store: &mut FormationStore) {
        store.add_audio_region(self.track_id, self.region.clone(), None);
    }

    fn revert(&self, store: &mut FormationStore) {
        store.remove_audio_region(self.track_id, self.region.id);
    }
}

/// Remove a region, remembering its data and index for undo.
pub struct RemoveAudioRegionCommand {
    track_id: TrackId,
    index: usize,
    region: AudioRegion,
}

impl RemoveAudioRegionCommand {
    /// Build the command from the region's captured data and track index.
    pub fn new(track_id: TrackId, index: usize, region: AudioRegion) -> Self {
        Self {
            track_id,
            index,
            region,
        }
    }
}

impl EditorCommand for RemoveAudioRegionCommand {
    fn description(&self) -> String {
        format!("Remove audio region '{}'", self.region.label)
    }

    fn apply(&self, store: &mut FormationStore) {
        store.remove_audio_region(self.track_id, self.region.id);
    }

    fn revert(&self, store: &mut FormationStore) {
        store.add_audio_region(self.track_id, self.region.clone(), Some(self.index));
    }
}

/// Move a region to a different start beat.
pub struct MoveAudioRegionCommand {
    track_id: TrackId,
    region_id: RegionId,
    old_start_beat: f32,
    new_start_beat: f32,
}

impl MoveAudioRegionCommand {
    /// Build the command from captured old and new start beats.
    pub fn new(
        track_id: TrackId,
        region_id: RegionId,
        old_start_beat: f32,
        new_start_beat: f32,
    ) -> Self {
        Self {
            track_id,
            region_id,
            old_start_beat,
            new_start_beat,
        }
    }
}

impl EditorCommand for MoveAudioRegionCommand {
    fn description(&self) -> String {
        format!("Move audio region to beat {:.1}", self.new_start_beat)
    }

    fn apply(&self, store: &mut FormationStore) {
        store.update_audio_region(
            self.track_id,
            self.region_id,
            Some(self.new_start_beat),
            None,
        );
    }

    fn revert(&self, store: &mut FormationStore) {
        store.update_audio_region(
            self.track_id,
            self.region_id,
            Some(self.old_start_beat),
            None,
        );
    }
}

/// Change a region's start beat and duration together.
pub struct ResizeAudioRegionCommand {
    track_id: TrackId,
    region_id: RegionId,
    old_start_beat: f32,
    old_duration_beats: f32,
    new_start_beat: f32,
    new_duration_beats: f32,
}

impl ResizeAudioRegionCommand {
    /// Build the command from captured old and new placement.
    pub fn new(
        track_id: TrackId,
        region_id: RegionId,
        old_start_beat: f32,
        old_duration_beats: f32,
        new_start_beat: f32,
        new_duration_beats: f32,
    ) -> Self {
        Self {
            track_id,
            region_id,
            old_start_beat,
            old_duration_beats,
            new_start_beat,
            new_duration_beats,
        }
    }
}

impl EditorCommand for ResizeAudioRegionCommand {
    fn description(&self) -> String {
        format!("Resize audio region to {:.1} beats", self.new_duration_beats)
    }

    fn apply(&self, store: &mut FormationStore) {
        store.update_audio_region(
            self.track_id,
            self.region_id,
            Some(self.new_start_beat),
            Some(self.new_duration_beats),
        );
    }

    fn revert(&self, store: &mut FormationStore) {
        store.update_audio_region(
            self.track_id,
            self.region_id,
            Some(self.old_start_beat),
            Some(self.old_duration_beats),
        );
    }
}

/// Swap the chart's referenced song, remembering the old song window.
pub struct ChangeSongCommand {
    old_song_id: String,
    new_song_id: String,
    new_total_beats: f32,
    old_total_beats: f32,
    old_song_start_beat: f32,
    old_song_end_beat: f32,
    old_song_volume: f32,
}

impl ChangeSongCommand {
    /// Capture the current song settings from the store and build the
    /// command switching to `new_song_id`.
    pub fn capture(
        store: &FormationStore,
        new_song_id: impl Into<String>,
        new_total_beats: f32,
    ) -> Self {
        let (old_song_id, old_total, old_start, old_end, old_volume) = match store.active_chart() {
            Some(chart) => (
                chart.song_id.clone(),
                chart.total_duration_beats,
                chart.audio.song_start_beat,
                chart.audio.song_end_beat,
                chart.audio.song_volume,
            ),
            None => (String::new(), 0.0, 0.0, 0.0, 1.0),
        };

        Self {
            old_song_id,
            new_song_id: new_song_id.into(),
            new_total_beats,
            old_total_beats: old_total,
            old_song_start_beat: old_start,
            old_song_end_beat: old_end,
            old_song_volume: old_volume,
        }
    }
}

impl EditorCommand for ChangeSongCommand {
    fn description(&self) -> String {
        "Change song".to_string()
    }

    fn apply(&self, store: &mut FormationStore) {
        store.set_song(self.new_song_id.clone(), self.new_total_beats);
    }

    fn revert(&self, store: &mut FormationStore) {
        store.set_song(self.old_song_id.clone(), self.old_total_beats);
        store.set_song_window(
            self.old_song_start_beat,
            self.old_song_end_beat,
            self.old_song_volume,
        );
    }
}
