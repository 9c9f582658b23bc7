//! Transition feasibility check
//!
//! Answers "can the band physically march from formation A to formation B
//! at this tempo?". Pure and stateless, cheap enough to run on every edit
//! for live feedback in the timeline.

use serde::{Deserialize, Serialize};

use crate::chart::{Formation, MemberId};

/// Comfortable march ceiling (~120 steps/min at 8-to-5), yards per second.
pub const NORMAL_SPEED_LIMIT: f32 = 2.5;
/// Quick march ceiling (~180 steps/min at 6-to-5), yards per second.
pub const FAST_SPEED_LIMIT: f32 = 4.0;
/// Running ceiling, yards per second.
pub const HARD_SPEED_LIMIT: f32 = 5.0;

/// How demanding a transition is for the fastest member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionSeverity {
    /// Comfortable march.
    Normal,
    /// Quick march.
    Fast,
    /// Running.
    Hard,
    /// Physically not feasible.
    Impossible,
}

impl TransitionSeverity {
    /// Classify a required speed in yards per second. Boundaries are
    /// inclusive on the easier bucket.
    pub fn from_speed(yd_per_sec: f32) -> Self {
        if yd_per_sec <= NORMAL_SPEED_LIMIT {
            TransitionSeverity::Normal
        } else if yd_per_sec <= FAST_SPEED_LIMIT {
            TransitionSeverity::Fast
        } else if yd_per_sec <= HARD_SPEED_LIMIT {
            TransitionSeverity::Hard
        } else {
            TransitionSeverity::Impossible
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            TransitionSeverity::Normal => "Normal",
            TransitionSeverity::Fast => "Fast",
            TransitionSeverity::Hard => "Hard",
            TransitionSeverity::Impossible => "Impossible",
        }
    }
}

/// Result of checking one formation-to-formation transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionReport {
    /// Fastest required member speed, yards per second.
    pub max_speed: f32,
    /// Mean required speed over members present in both formations.
    pub average_speed: f32,
    /// The member who has to move fastest.
    pub fastest_member: Option<MemberId>,
    /// Gap between `from`'s hold end and `to`'s start, in beats.
    pub gap_beats: f32,
    /// The same gap in seconds at the given tempo.
    pub gap_seconds: f32,
    /// Severity bucket for `max_speed`.
    pub severity: TransitionSeverity,
}

/// Check whether the march from `from` to `to` is feasible at `bpm`.
///
/// Only members present in both formations contribute; members entering or
/// leaving the field have no required path. An overlapping or zero-length
/// gap is reported as [`TransitionSeverity::Impossible`] with infinite
/// speed rather than dividing by zero.
pub fn validate_transition(from: &Formation, to: &Formation, bpm: f32) -> TransitionReport {
    let gap_beats = (to.start_beat - from.hold_end()).max(0.0);
    let gap_seconds = if bpm > 0.0 {
        gap_beats * 60.0 / bpm
    } else {
        0.0
    };

    if gap_seconds <= 0.0 {
        return TransitionReport {
            max_speed: f32::INFINITY,
            average_speed: 0.0,
            fastest_member: None,
            gap_beats,
            gap_seconds,
            severity: TransitionSeverity::Impossible,
        };
    }

    let mut max_speed = 0.0f32;
    let mut total_speed = 0.0f32;
    let mut member_count = 0u32;
    let mut fastest_member = None;

    for from_pos in &from.positions {
        let Some(to_pos) = to.position_for(from_pos.member_id) else {
            continue;
        };

        let distance = from_pos.position.distance(to_pos.position);
        let speed = distance / gap_seconds;

        total_speed += speed;
        member_count += 1;

        if speed > max_speed {
            max_speed = speed;
            fastest_member = Some(from_pos.member_id);
        }
    }

    let average_speed = if member_count > 0 {
        total_speed / member_count as f32
    } else {
        0.0
    };

    TransitionReport {
        max_speed,
        average_speed,
        fastest_member,
        gap_beats,
        gap_seconds,
        severity: TransitionSeverity::from_speed(max_speed),
    }
}
