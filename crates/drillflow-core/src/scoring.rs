//! Scoring engine
//!
//! Grades a performed run. An external simulator drives the engine through
//! one evaluation session: `begin_evaluation`, any number of
//! `record_frame` calls while the show plays, then `finalize_evaluation`
//! (or `cancel_evaluation` to throw the run away). While evaluating, the
//! engine keeps a cheap live "running score" for HUD display; the final
//! sub-scores use the precise rubric formulas.

use crossbeam_channel::{unbounded, Receiver, Sender};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::chart::{DrillChart, MemberId};
use crate::roster::{Roster, SkillKind};

/// Tunable weights and thresholds for a judging rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRubric {
    /// Weight of the formation sub-score.
    pub formation_weight: f32,
    /// Weight of the music sub-score.
    pub music_weight: f32,
    /// Weight of the showmanship sub-score.
    pub showmanship_weight: f32,
    /// Weight of the difficulty bonus inside the weighted sum.
    pub difficulty_weight: f32,
    /// Acceptable position error in yards before penalties.
    pub position_error_threshold: f32,
    /// Acceptable facing error in degrees before penalties.
    pub facing_error_threshold: f32,
    /// Cap on the difficulty bonus.
    pub max_difficulty_bonus: f32,
}

impl Default for ScoringRubric {
    fn default() -> Self {
        Self {
            formation_weight: 0.4,
            music_weight: 0.35,
            showmanship_weight: 0.15,
            difficulty_weight: 0.1,
            position_error_threshold: 0.5,
            facing_error_threshold: 10.0,
            max_difficulty_bonus: 20.0,
        }
    }
}

impl ScoringRubric {
    /// Sum of the four weights; expected to be 1.0.
    pub fn total_weight(&self) -> f32 {
        self.formation_weight + self.music_weight + self.showmanship_weight + self.difficulty_weight
    }

    /// Warn if the weights do not sum to 1.
    pub fn validate(&self) {
        let total = self.total_weight();
        if (total - 1.0).abs() > 0.01 {
            warn!(total, "scoring rubric weights do not sum to 1.0");
        }
    }
}

/// One member's state at one recorded beat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    /// The member sampled.
    pub member_id: MemberId,
    /// Where the member actually is.
    pub actual: Vec2,
    /// Where the chart says they should be.
    pub target: Vec2,
    /// Distance between actual and target, in yards.
    pub position_error: f32,
    /// Facing deviation in degrees.
    pub facing_error: f32,
    /// Playing quality sample, 0-1.
    pub playing_quality: f32,
}

/// Per-beat performance sample produced by the show simulator. Consumed
/// once by the engine and discarded at the end of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringFrame {
    /// Beat this frame was sampled at.
    pub beat: f32,
    /// One snapshot per member on the field.
    pub snapshots: Vec<MemberSnapshot>,
}

/// Which judging caption a note belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteCategory {
    /// Drill and spacing.
    Formation,
    /// Sound and musicianship.
    Music,
    /// General effect.
    Showmanship,
}

/// A notable event recorded during evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringNote {
    /// Beat at which the event happened.
    pub at_beat: f32,
    /// Judging caption.
    pub category: NoteCategory,
    /// Human-readable description.
    pub description: String,
    /// Score impact; positive = good, negative = deduction.
    pub impact: f32,
}

/// Final graded result of one run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowScore {
    /// Weighted overall score, 0-100.
    pub overall: f32,
    /// Formation sub-score, 0-100.
    pub formation: f32,
    /// Music sub-score, 0-100.
    pub music: f32,
    /// Showmanship sub-score, 0-100.
    pub showmanship: f32,
    /// Difficulty bonus, 0-20.
    pub difficulty_bonus: f32,
    /// Letter grade for `overall`.
    pub grade: String,
    /// Notable events collected during the run.
    pub notes: Vec<ScoringNote>,
}

/// Letter grade for a 0-100 score.
pub fn letter_grade(score: f32) -> &'static str {
    match score {
        s if s >= 97.0 => "A+",
        s if s >= 93.0 => "A",
        s if s >= 90.0 => "A-",
        s if s >= 87.0 => "B+",
        s if s >= 83.0 => "B",
        s if s >= 80.0 => "B-",
        s if s >= 77.0 => "C+",
        s if s >= 73.0 => "C",
        s if s >= 70.0 => "C-",
        s if s >= 67.0 => "D+",
        s if s >= 63.0 => "D",
        s if s >= 60.0 => "D-",
        _ => "F",
    }
}

/// Event emitted while an evaluation is in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringEvent {
    /// The live running score changed.
    RunningScoreUpdated(f32),
    /// A notable event was recorded.
    NotableEvent(ScoringNote),
}

/// Aggregates performance frames into a graded [`ShowScore`].
///
/// State machine: Idle -> Evaluating (via `begin_evaluation`) -> Idle
/// (via `finalize_evaluation` or `cancel_evaluation`).
#[derive(Debug)]
pub struct ScoringEngine {
    rubric: ScoringRubric,
    chart: Option<DrillChart>,
    roster: Option<Roster>,
    frames: Vec<ScoringFrame>,
    notes: Vec<ScoringNote>,
    running_score: f32,
    evaluating: bool,
    subscribers: Vec<Sender<ScoringEvent>>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringEngine {
    /// Create an engine with the default rubric.
    pub fn new() -> Self {
        Self::with_rubric(ScoringRubric::default())
    }

    /// Create an engine with a custom rubric.
    pub fn with_rubric(rubric: ScoringRubric) -> Self {
        rubric.validate();
        Self {
            rubric,
            chart: None,
            roster: None,
            frames: Vec::new(),
            notes: Vec::new(),
            running_score: 100.0,
            evaluating: false,
            subscribers: Vec::new(),
        }
    }

    /// Subscribe to live evaluation events.
    pub fn subscribe(&mut self) -> Receiver<ScoringEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: ScoringEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Whether a session is in progress.
    pub fn is_evaluating(&self) -> bool {
        self.evaluating
    }

    /// The live approximate score of the session in progress.
    pub fn running_score(&self) -> f32 {
        self.running_score
    }

    /// Start an evaluation session. The chart and roster are captured as
    /// value snapshots; later editor mutations do not affect the session.
    pub fn begin_evaluation(&mut self, chart: DrillChart, roster: Roster) {
        self.chart = Some(chart);
        self.roster = Some(roster);
        self.frames.clear();
        self.notes.clear();
        self.running_score = 100.0;
        self.evaluating = true;
    }

    /// Record one per-beat frame. Ignored (with a log) outside a session.
    pub fn record_frame(&mut self, frame: ScoringFrame) {
        if !self.evaluating {
            warn!("record_frame called while idle");
            return;
        }

        // Flag members significantly out of position.
        let note_threshold = self.rubric.position_error_threshold * 3.0;
        let mut new_notes = Vec::new();
        for snapshot in &frame.snapshots {
            if snapshot.position_error > note_threshold {
                new_notes.push(ScoringNote {
                    at_beat: frame.beat,
                    category: NoteCategory::Formation,
                    description: "Member significantly out of position".to_string(),
                    impact: -snapshot.position_error,
                });
            }
        }

        self.frames.push(frame);

        for note in new_notes {
            self.notes.push(note.clone());
            self.emit(ScoringEvent::NotableEvent(note));
        }

        self.running_score = self.compute_running_score();
        let score = self.running_score;
        self.emit(ScoringEvent::RunningScoreUpdated(score));
    }

    /// Finish the session and produce the graded result. Returns `None`
    /// (with a log) when no session is in progress. The frame buffer is
    /// discarded once the score is produced.
    pub fn finalize_evaluation(&mut self) -> Option<ShowScore> {
        if !self.evaluating {
            warn!("finalize_evaluation called while idle");
            return None;
        }
        self.evaluating = false;

        let formation = self.formation_score();
        let music = self.music_score();
        let showmanship = self.showmanship_score();
        let difficulty_bonus = self.difficulty_bonus();

        let weighted = formation * self.rubric.formation_weight
            + music * self.rubric.music_weight
            + showmanship * self.rubric.showmanship_weight
            + difficulty_bonus * self.rubric.difficulty_weight;
        let overall = (weighted + difficulty_bonus * 0.2).clamp(0.0, 100.0);

        let score = ShowScore {
            overall,
            formation,
            music,
            showmanship,
            difficulty_bonus,
            grade: letter_grade(overall).to_string(),
            notes: std::mem::take(&mut self.notes),
        };

        self.frames.clear();
        Some(score)
    }

    /// Abort the session, discarding all frames and notes.
    pub fn cancel_evaluation(&mut self) {
        self.evaluating = false;
        self.frames.clear();
        self.notes.clear();
    }

    /// Live estimate: linear penalty on the average raw position error.
    /// Cheaper and coarser than the final formation score.
    fn compute_running_score(&self) -> f32 {
        let mut total_error = 0.0;
        let mut count = 0u32;
        for frame in &self.frames {
            for snapshot in &frame.snapshots {
                total_error += snapshot.position_error;
                count += 1;
            }
        }
        if count == 0 {
            return 100.0;
        }
        let avg_error = total_error / count as f32;
        (100.0 - avg_error * 20.0).clamp(0.0, 100.0)
    }

    /// Final metric: error relative to the rubric threshold, capped at 5x.
    fn formation_score(&self) -> f32 {
        let mut total_ratio = 0.0;
        let mut count = 0u32;
        for frame in &self.frames {
            for snapshot in &frame.snapshots {
                let ratio = snapshot.position_error / self.rubric.position_error_threshold;
                total_ratio += ratio.min(5.0);
                count += 1;
            }
        }
        if count == 0 {
            return 100.0;
        }
        let avg_ratio = total_ratio / count as f32;
        (100.0 - avg_ratio * 20.0).clamp(0.0, 100.0)
    }

    /// Roster musicianship blended with recorded playing quality.
    fn music_score(&self) -> f32 {
        let avg_musicianship = self
            .roster
            .as_ref()
            .map(|r| r.average_skill(SkillKind::Musicianship))
            .unwrap_or(0.5);

        let mut total_quality = 0.0;
        let mut count = 0u32;
        for frame in &self.frames {
            for snapshot in &frame.snapshots {
                total_quality += snapshot.playing_quality;
                count += 1;
            }
        }
        let avg_quality = if count > 0 {
            total_quality / count as f32
        } else {
            0.5
        };

        (avg_musicianship * 0.6 + avg_quality * 0.4) * 100.0
    }

    /// Roster showmanship plus a bonus for formation count.
    fn showmanship_score(&self) -> f32 {
        let avg_showmanship = self
            .roster
            .as_ref()
            .map(|r| r.average_skill(SkillKind::Showmanship))
            .unwrap_or(0.5);

        let formation_count = self
            .chart
            .as_ref()
            .map(|c| c.formations.len())
            .unwrap_or(0);
        let complexity_bonus = (formation_count as f32 * 2.0).min(15.0);

        (avg_showmanship * 85.0 + complexity_bonus).clamp(0.0, 100.0)
    }

    /// More formations and tighter transitions earn bonus points.
    fn difficulty_bonus(&self) -> f32 {
        let Some(chart) = self.chart.as_ref() else {
            return 0.0;
        };

        let mut bonus = (chart.formations.len() as f32 * 1.5).min(10.0);

        for pair in chart.formations.windows(2) {
            let gap = pair[1].start_beat - pair[0].hold_end();
            if gap < 8.0 {
                bonus += 1.0;
            }
        }

        bonus.clamp(0.0, self.rubric.max_difficulty_bonus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_grade_ladder() {
        assert_eq!(letter_grade(97.0), "A+");
        assert_eq!(letter_grade(95.0), "A");
        assert_eq!(letter_grade(90.0), "A-");
        assert_eq!(letter_grade(88.0), "B+");
        assert_eq!(letter_grade(75.0), "C");
        assert_eq!(letter_grade(61.0), "D-");
        assert_eq!(letter_grade(50.0), "F");
    }

    #[test]
    fn test_rubric_default_weights_sum_to_one() {
        let rubric = ScoringRubric::default();
        assert!((rubric.total_weight() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_record_frame_while_idle_is_noop() {
        let mut engine = ScoringEngine::new();
        engine.record_frame(ScoringFrame {
            beat: 0.0,
            snapshots: Vec::new(),
        });
        assert!(!engine.is_evaluating());
        assert!(engine.finalize_evaluation().is_none());
    }
}
