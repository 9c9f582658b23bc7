//! Formation Store - owner of the active chart
//!
//! The [`FormationStore`] is the single owner of the active [`DrillChart`].
//! Every mutation goes through it so the chart invariants hold at all
//! times: formations stay sorted by `start_beat` and positions stay inside
//! the field. Lookup failures are logged and no-op rather than erroring.
//!
//! Subscribers receive [`StoreEvent`]s over a channel; events are sent at
//! the end of each mutating call, after the chart is consistent. Handlers
//! must not issue further store mutations while draining them.

use std::collections::HashMap;

use crossbeam_channel::{unbounded, Receiver, Sender};
use glam::Vec2;
use tracing::warn;

use crate::audio::{AudioRegion, AudioTrack, RegionId, TrackId};
use crate::chart::{DrillChart, Formation, FormationId, MemberId, MemberPosition};
use crate::field::{clamp_to_field, lerp_angle_deg};
use crate::template::FormationTemplate;
use crate::{CoreError, Result};

/// Change notification fired after a store mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The active chart was replaced, closed, or structurally changed.
    ChartChanged,
    /// A formation was inserted.
    FormationAdded(FormationId),
    /// A formation's fields or positions changed.
    FormationChanged(FormationId),
    /// A formation was removed.
    FormationRemoved(FormationId),
    /// The current selection moved (None = no selection).
    CurrentFormationChanged(Option<usize>),
    /// The audio timeline changed (song or sfx regions).
    AudioTimelineChanged,
}

/// Sole owner of the active chart; all edits and queries go through here.
#[derive(Debug, Default)]
pub struct FormationStore {
    chart: Option<DrillChart>,
    current_index: Option<usize>,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl FormationStore {
    /// Create a store with no active chart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to change notifications. Events are delivered in the order
    /// they were fired; drop the receiver to unsubscribe.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: StoreEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    // --- Chart management ---

    /// The active chart, if any.
    pub fn active_chart(&self) -> Option<&DrillChart> {
        self.chart.as_ref()
    }

    /// Index of the currently selected formation.
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// The currently selected formation.
    pub fn current_formation(&self) -> Option<&Formation> {
        let chart = self.chart.as_ref()?;
        chart.formations.get(self.current_index?)
    }

    /// Replace the active chart with a fresh empty one.
    pub fn create_chart(&mut self, name: impl Into<String>, song_id: impl Into<String>) {
        self.chart = Some(DrillChart::new(name, song_id));
        self.current_index = None;
        self.emit(StoreEvent::ChartChanged);
    }

    /// Install a chart as-is and select its first formation, if any.
    pub fn load_chart(&mut self, chart: DrillChart) {
        self.current_index = if chart.formations.is_empty() {
            None
        } else {
            Some(0)
        };
        self.chart = Some(chart);
        self.emit(StoreEvent::ChartChanged);
        if let Some(ix) = self.current_index {
            self.emit(StoreEvent::CurrentFormationChanged(Some(ix)));
        }
    }

    /// Drop the active chart.
    pub fn close_chart(&mut self) {
        self.chart = None;
        self.current_index = None;
        self.emit(StoreEvent::ChartChanged);
    }

    // --- Formation CRUD ---

    /// Insert a formation, preserving the sort order by `start_beat`.
    /// Returns a snapshot of the new formation.
    pub fn add_formation(
        &mut self,
        start_beat: f32,
        duration_beats: f32,
        label: impl Into<String>,
    ) -> Option<Formation> {
        let Some(chart) = self.chart.as_mut() else {
            warn!("add_formation: no active chart");
            return None;
        };

        let formation = Formation::new(start_beat, duration_beats, label);
        let snapshot = formation.clone();
        let id = formation.id;

        match chart
            .formations
            .iter()
            .position(|f| f.start_beat > start_beat)
        {
            Some(ix) => chart.formations.insert(ix, formation),
            None => chart.formations.push(formation),
        }
        chart.touch();

        self.emit(StoreEvent::FormationAdded(id));
        self.emit(StoreEvent::ChartChanged);
        Some(snapshot)
    }

    /// Remove a formation. Clamps the current selection if it now points
    /// past the end.
    pub fn remove_formation(&mut self, id: FormationId) {
        let Some(chart) = self.chart.as_mut() else {
            warn!("remove_formation: no active chart");
            return;
        };
        let Some(ix) = chart.formations.iter().position(|f| f.id == id) else {
            warn!(%id, "remove_formation: formation not found");
            return;
        };

        chart.formations.remove(ix);
        chart.touch();

        let remaining = chart.formations.len();
        let mut selection_moved = false;
        if let Some(cur) = self.current_index {
            if cur >= remaining {
                self.current_index = remaining.checked_sub(1);
                selection_moved = true;
            }
        }

        self.emit(StoreEvent::FormationRemoved(id));
        self.emit(StoreEvent::ChartChanged);
        if selection_moved {
            self.emit(StoreEvent::CurrentFormationChanged(self.current_index));
        }
    }

    /// Partially update a formation. Re-sorts the sequence when the start
    /// beat changes.
    pub fn update_formation(
        &mut self,
        id: FormationId,
        start_beat: Option<f32>,
        duration_beats: Option<f32>,
        label: Option<&str>,
    ) {
        let Some(chart) = self.chart.as_mut() else {
            warn!("update_formation: no active chart");
            return;
        };
        let Some(formation) = chart.formation_mut(id) else {
            warn!(%id, "update_formation: formation not found");
            return;
        };

        if let Some(start) = start_beat {
            formation.start_beat = start;
        }
        if let Some(duration) = duration_beats {
            formation.duration_beats = duration;
        }
        if let Some(label) = label {
            formation.label = label.to_string();
        }

        if start_beat.is_some() {
            chart.formations.sort_by(|a, b| {
                a.start_beat
                    .partial_cmp(&b.start_beat)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        chart.touch();

        self.emit(StoreEvent::FormationChanged(id));
    }

    /// Move a formation to a new index without changing its beats.
    pub fn reorder_formation(&mut self, id: FormationId, new_index: usize) {
        let Some(chart) = self.chart.as_mut() else {
            warn!("reorder_formation: no active chart");
            return;
        };
        let Some(ix) = chart.formations.iter().position(|f| f.id == id) else {
            warn!(%id, "reorder_formation: formation not found");
            return;
        };

        let formation = chart.formations.remove(ix);
        let new_index = new_index.min(chart.formations.len());
        chart.formations.insert(new_index, formation);
        chart.touch();

        self.emit(StoreEvent::ChartChanged);
    }

    /// Select a formation by index. Out-of-range indices are ignored.
    pub fn set_current_formation(&mut self, index: usize) {
        let Some(chart) = self.chart.as_ref() else {
            return;
        };
        if index >= chart.formations.len() {
            return;
        }
        self.current_index = Some(index);
        self.emit(StoreEvent::CurrentFormationChanged(Some(index)));
    }

    // --- Member positioning ---

    /// Upsert a member's position in a formation, clamping it to the field.
    pub fn set_member_position(
        &mut self,
        formation_id: FormationId,
        member_id: MemberId,
        position: Vec2,
        facing_deg: f32,
    ) {
        let Some(chart) = self.chart.as_mut() else {
            warn!("set_member_position: no active chart");
            return;
        };
        let Some(formation) = chart.formation_mut(formation_id) else {
            warn!(%formation_id, "set_member_position: formation not found");
            return;
        };

        let position = clamp_to_field(position);
        match formation.position_for_mut(member_id) {
            Some(existing) => {
                existing.position = position;
                existing.facing_deg = facing_deg;
            }
            None => formation.positions.push(MemberPosition {
                member_id,
                position,
                facing_deg,
            }),
        }
        chart.touch();

        self.emit(StoreEvent::FormationChanged(formation_id));
    }

    /// Upsert a batch of positions in one call (one event at the end).
    pub fn set_member_positions_batch(
        &mut self,
        formation_id: FormationId,
        positions: &[MemberPosition],
    ) {
        let Some(chart) = self.chart.as_mut() else {
            warn!("set_member_positions_batch: no active chart");
            return;
        };
        let Some(formation) = chart.formation_mut(formation_id) else {
            warn!(%formation_id, "set_member_positions_batch: formation not found");
            return;
        };

        for pos in positions {
            let clamped = clamp_to_field(pos.position);
            match formation.position_for_mut(pos.member_id) {
                Some(existing) => {
                    existing.position = clamped;
                    existing.facing_deg = pos.facing_deg;
                }
                None => formation.positions.push(MemberPosition {
                    position: clamped,
                    ..*pos
                }),
            }
        }
        chart.touch();

        self.emit(StoreEvent::FormationChanged(formation_id));
    }

    /// Remove a member's entry from a formation.
    pub fn remove_member_from_formation(&mut self, formation_id: FormationId, member_id: MemberId) {
        let Some(chart) = self.chart.as_mut() else {
            warn!("remove_member_from_formation: no active chart");
            return;
        };
        let Some(formation) = chart.formation_mut(formation_id) else {
            warn!(%formation_id, "remove_member_from_formation: formation not found");
            return;
        };

        formation.positions.retain(|p| p.member_id != member_id);
        chart.touch();

        self.emit(StoreEvent::FormationChanged(formation_id));
    }

    /// Replace a formation's positions with template slots, using the
    /// supplied slot-to-member mapping. Slots without a mapped member are
    /// skipped. Returns a snapshot of the repopulated formation.
    pub fn apply_template(
        &mut self,
        formation_id: FormationId,
        template: &FormationTemplate,
        slot_to_member: &HashMap<u32, MemberId>,
    ) -> Option<Formation> {
        let Some(chart) = self.chart.as_mut() else {
            warn!("apply_template: no active chart");
            return None;
        };
        let Some(formation) = chart.formation_mut(formation_id) else {
            warn!(%formation_id, "apply_template: formation not found");
            return None;
        };

        formation.positions.clear();
        for slot in &template.slots {
            if let Some(&member_id) = slot_to_member.get(&slot.index) {
                formation.positions.push(MemberPosition {
                    member_id,
                    position: clamp_to_field(slot.position),
                    facing_deg: slot.facing_deg,
                });
            }
        }
        let snapshot = formation.clone();
        chart.touch();

        self.emit(StoreEvent::FormationChanged(formation_id));
        Some(snapshot)
    }

    // --- Audio timeline ---

    /// Point the chart at a different song, resetting the song window.
    pub fn set_song(&mut self, song_id: impl Into<String>, total_beats: f32) {
        let Some(chart) = self.chart.as_mut() else {
            warn!("set_song: no active chart");
            return;
        };

        let song_id = song_id.into();
        chart.song_id = song_id.clone();
        chart.total_duration_beats = total_beats;
        chart.audio.song_id = song_id;
        chart.audio.song_start_beat = 0.0;
        chart.audio.song_end_beat = total_beats;
        chart.audio.song_volume = 1.0;
        chart.touch();

        self.emit(StoreEvent::AudioTimelineChanged);
    }

    /// Restore a previously captured song window (used by undo).
    pub fn set_song_window(&mut self, start_beat: f32, end_beat: f32, volume: f32) {
        let Some(chart) = self.chart.as_mut() else {
            warn!("set_song_window: no active chart");
            return;
        };

        chart.audio.song_start_beat = start_beat;
        chart.audio.song_end_beat = end_beat;
        chart.audio.song_volume = volume;
        chart.touch();

        self.emit(StoreEvent::AudioTimelineChanged);
    }

    /// Append an empty sound-effect track.
    pub fn add_sfx_track(&mut self, label: impl Into<String>) -> Option<TrackId> {
        let Some(chart) = self.chart.as_mut() else {
            warn!("add_sfx_track: no active chart");
            return None;
        };

        let track = AudioTrack::new(label);
        let id = track.id;
        chart.audio.sfx_tracks.push(track);
        chart.touch();

        self.emit(StoreEvent::AudioTimelineChanged);
        Some(id)
    }

    /// Insert a region on a track, at `index` if given, else at the end.
    pub fn add_audio_region(
        &mut self,
        track_id: TrackId,
        region: AudioRegion,
        index: Option<usize>,
    ) {
        let Some(chart) = self.chart.as_mut() else {
            warn!("add_audio_region: no active chart");
            return;
        };
        let Some(track) = chart.audio.track_mut(track_id) else {
            warn!(%track_id, "add_audio_region: track not found");
            return;
        };

        match index {
            Some(ix) if ix <= track.regions.len() => track.regions.insert(ix, region),
            _ => track.regions.push(region),
        }
        chart.touch();

        self.emit(StoreEvent::AudioTimelineChanged);
    }

    /// Remove a region from a track, returning its index and data.
    pub fn remove_audio_region(
        &mut self,
        track_id: TrackId,
        region_id: RegionId,
    ) -> Option<(usize, AudioRegion)> {
        let Some(chart) = self.chart.as_mut() else {
            warn!("remove_audio_region: no active chart");
            return None;
        };
        let Some(track) = chart.audio.track_mut(track_id) else {
            warn!(%track_id, "remove_audio_region: track not found");
            return None;
        };
        let Some(ix) = track.regions.iter().position(|r| r.id == region_id) else {
            warn!(%region_id, "remove_audio_region: region not found");
            return None;
        };

        let region = track.regions.remove(ix);
        chart.touch();

        self.emit(StoreEvent::AudioTimelineChanged);
        Some((ix, region))
    }

    /// Partially update a region's placement.
    pub fn update_audio_region(
        &mut self,
        track_id: TrackId,
        region_id: RegionId,
        start_beat: Option<f32>,
        duration_beats: Option<f32>,
    ) {
        let Some(chart) = self.chart.as_mut() else {
            warn!("update_audio_region: no active chart");
            return;
        };
        let Some(track) = chart.audio.track_mut(track_id) else {
            warn!(%track_id, "update_audio_region: track not found");
            return;
        };
        let Some(region) = track.region_mut(region_id) else {
            warn!(%region_id, "update_audio_region: region not found");
            return;
        };

        if let Some(start) = start_beat {
            region.start_beat = start;
        }
        if let Some(duration) = duration_beats {
            region.duration_beats = duration;
        }
        chart.touch();

        self.emit(StoreEvent::AudioTimelineChanged);
    }

    // --- Import / export ---

    /// Serialize the active chart to JSON, or `None` without a chart.
    pub fn export_chart_json(&self) -> Option<String> {
        let chart = self.chart.as_ref()?;
        match serde_json::to_string_pretty(chart) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "export_chart_json: serialization failed");
                None
            }
        }
    }

    /// Parse a chart from JSON. The result is not installed; pass it to
    /// [`FormationStore::load_chart`] to make it active.
    pub fn import_chart_json(&self, json: &str) -> Result<DrillChart> {
        serde_json::from_str(json).map_err(CoreError::ChartImport)
    }

    // --- Interpolation ---

    /// Positions of every member at an arbitrary beat.
    ///
    /// Inside a formation's hold window the stored positions come back
    /// unchanged; inside a transition window they are blended toward the
    /// next formation with smoothstep easing. A zero-length or inverted
    /// transition window snaps to the next formation rather than dividing
    /// by zero.
    pub fn interpolated_positions(&self, beat: f32) -> Vec<MemberPosition> {
        let Some(chart) = self.chart.as_ref() else {
            return Vec::new();
        };
        let Some(ix) = chart.formation_index_at_beat(beat) else {
            return Vec::new();
        };
        let current = &chart.formations[ix];

        // Last formation: nothing to transition into.
        if ix + 1 >= chart.formations.len() {
            return current.positions.clone();
        }

        let next = &chart.formations[ix + 1];
        let hold_end = current.hold_end();

        if beat < hold_end {
            return current.positions.clone();
        }
        if beat >= next.start_beat || next.start_beat <= hold_end {
            return next.positions.clone();
        }

        let t = ((beat - hold_end) / (next.start_beat - hold_end)).clamp(0.0, 1.0);
        // Smoothstep for ease-in/ease-out marching motion.
        let t = t * t * (3.0 - 2.0 * t);

        blend_formations(current, next, t)
    }
}

/// Blend the union of member positions across two formations. Members
/// present on only one side pass through unchanged (entering or leaving
/// the field between sets).
fn blend_formations(from: &Formation, to: &Formation, t: f32) -> Vec<MemberPosition> {
    let mut result = Vec::with_capacity(from.positions.len().max(to.positions.len()));

    for a in &from.positions {
        match to.position_for(a.member_id) {
            Some(b) => result.push(MemberPosition {
                member_id: a.member_id,
                position: a.position.lerp(b.position, t),
                facing_deg: lerp_angle_deg(a.facing_deg, b.facing_deg, t),
            }),
            None => result.push(*a),
        }
    }
    for b in &to.positions {
        if from.position_for(b.member_id).is_none() {
            result.push(*b);
        }
    }

    result
}
