use drillflow_core::scoring::{
    MemberSnapshot, ScoringEngine, ScoringEvent, ScoringFrame, ScoringRubric,
};
use drillflow_core::{
    BandMember, DrillChart, Formation, InstrumentType, MemberStatus, Roster, Vec2,
};
use uuid::Uuid;

fn test_member(id: Uuid, skill: f32) -> BandMember {
    BandMember {
        id,
        first_name: "Test".to_string(),
        last_name: "Member".to_string(),
        instrument: InstrumentType::Trumpet,
        year_in_school: 2,
        status: MemberStatus::Active,
        musicianship: skill,
        marching: skill,
        stamina: skill,
        showmanship: skill,
    }
}

fn test_chart(formation_starts: &[(f32, f32)]) -> DrillChart {
    let mut chart = DrillChart::new("Test Chart", "song_001");
    for (i, &(start, duration)) in formation_starts.iter().enumerate() {
        chart
            .formations
            .push(Formation::new(start, duration, format!("Set {i}")));
    }
    chart
}

fn snapshot(member_id: Uuid, position_error: f32, playing_quality: f32) -> MemberSnapshot {
    MemberSnapshot {
        member_id,
        actual: Vec2::new(50.0 + position_error, 26.67),
        target: Vec2::new(50.0, 26.67),
        position_error,
        facing_error: 0.0,
        playing_quality,
    }
}

fn frame(beat: f32, snapshots: Vec<MemberSnapshot>) -> ScoringFrame {
    ScoringFrame { beat, snapshots }
}

#[test]
fn test_begin_evaluation_enters_evaluating_state() {
    let mut engine = ScoringEngine::new();
    assert!(!engine.is_evaluating());

    engine.begin_evaluation(test_chart(&[(0.0, 8.0)]), Roster::default());
    assert!(engine.is_evaluating());
    assert_eq!(engine.running_score(), 100.0);
}

#[test]
fn test_finalize_returns_to_idle_with_score() {
    let member = Uuid::new_v4();
    let roster = Roster {
        school_id: "s".to_string(),
        members: vec![test_member(member, 0.8)],
    };

    let mut engine = ScoringEngine::new();
    engine.begin_evaluation(test_chart(&[(0.0, 8.0)]), roster);
    engine.record_frame(frame(0.0, vec![snapshot(member, 0.0, 0.9)]));

    let score = engine.finalize_evaluation().expect("score");
    assert!(!engine.is_evaluating());
    assert!(score.overall > 0.0);
    assert!(!score.grade.is_empty());

    // A second finalize without a new session yields nothing.
    assert!(engine.finalize_evaluation().is_none());
}

#[test]
fn test_perfect_performance_scores_high() {
    let member = Uuid::new_v4();
    let roster = Roster {
        school_id: "s".to_string(),
        members: vec![test_member(member, 0.8)],
    };

    let mut engine = ScoringEngine::new();
    engine.begin_evaluation(test_chart(&[(0.0, 8.0)]), roster);
    for i in 0..8 {
        engine.record_frame(frame(i as f32, vec![snapshot(member, 0.0, 1.0)]));
    }

    let score = engine.finalize_evaluation().expect("score");
    assert!(score.formation > 90.0);
    assert_eq!(score.formation, 100.0);
    assert!(engine.running_score() == 100.0);
}

#[test]
fn test_poor_performance_scores_low() {
    let member = Uuid::new_v4();
    let roster = Roster {
        school_id: "s".to_string(),
        members: vec![test_member(member, 0.8)],
    };

    let mut engine = ScoringEngine::new();
    engine.begin_evaluation(test_chart(&[(0.0, 8.0)]), roster);
    for i in 0..8 {
        // 5 yards off: 10x the threshold, capped at 5x.
        engine.record_frame(frame(i as f32, vec![snapshot(member, 5.0, 0.3)]));
    }

    let score = engine.finalize_evaluation().expect("score");
    assert!(score.formation < 50.0);
    assert_eq!(score.formation, 0.0);
}

#[test]
fn test_running_score_tracks_average_error() {
    let member = Uuid::new_v4();
    let mut engine = ScoringEngine::new();
    engine.begin_evaluation(test_chart(&[(0.0, 8.0)]), Roster::default());

    engine.record_frame(frame(0.0, vec![snapshot(member, 1.0, 0.5)]));
    // One snapshot, 1 yard error: 100 - 1*20 = 80.
    assert!((engine.running_score() - 80.0).abs() < 0.001);

    engine.record_frame(frame(1.0, vec![snapshot(member, 0.0, 0.5)]));
    // Average error 0.5: 100 - 10 = 90.
    assert!((engine.running_score() - 90.0).abs() < 0.001);
}

#[test]
fn test_notable_event_on_large_error() {
    let member = Uuid::new_v4();
    let mut engine = ScoringEngine::new();
    let events = engine.subscribe();
    engine.begin_evaluation(test_chart(&[(0.0, 8.0)]), Roster::default());

    // 3x the 0.5 yd threshold is 1.5; 2.0 exceeds it.
    engine.record_frame(frame(12.0, vec![snapshot(member, 2.0, 0.5)]));

    let first = events.try_recv().expect("event");
    match first {
        ScoringEvent::NotableEvent(note) => {
            assert_eq!(note.at_beat, 12.0);
            assert!(note.impact < 0.0);
        }
        other => panic!("expected notable event, got {other:?}"),
    }
    // Followed by the running score update.
    assert!(matches!(
        events.try_recv().expect("event"),
        ScoringEvent::RunningScoreUpdated(_)
    ));

    let score = engine.finalize_evaluation().expect("score");
    assert_eq!(score.notes.len(), 1);
}

#[test]
fn test_small_errors_produce_no_notes() {
    let member = Uuid::new_v4();
    let mut engine = ScoringEngine::new();
    engine.begin_evaluation(test_chart(&[(0.0, 8.0)]), Roster::default());
    engine.record_frame(frame(0.0, vec![snapshot(member, 1.0, 0.5)]));

    let score = engine.finalize_evaluation().expect("score");
    assert!(score.notes.is_empty());
}

#[test]
fn test_cancel_discards_everything() {
    let member = Uuid::new_v4();
    let mut engine = ScoringEngine::new();
    engine.begin_evaluation(test_chart(&[(0.0, 8.0)]), Roster::default());
    engine.record_frame(frame(0.0, vec![snapshot(member, 2.0, 0.5)]));

    engine.cancel_evaluation();
    assert!(!engine.is_evaluating());
    assert!(engine.finalize_evaluation().is_none());
}

#[test]
fn test_music_score_blends_roster_and_playing_quality() {
    let member = Uuid::new_v4();
    let roster = Roster {
        school_id: "s".to_string(),
        members: vec![test_member(member, 1.0)],
    };

    let mut engine = ScoringEngine::new();
    engine.begin_evaluation(test_chart(&[(0.0, 8.0)]), roster);
    engine.record_frame(frame(0.0, vec![snapshot(member, 0.0, 1.0)]));

    let score = engine.finalize_evaluation().expect("score");
    // 0.6 * 1.0 + 0.4 * 1.0, scaled to 100.
    assert!((score.music - 100.0).abs() < 0.001);
}

#[test]
fn test_showmanship_includes_complexity_bonus() {
    let roster = Roster {
        school_id: "s".to_string(),
        members: vec![test_member(Uuid::new_v4(), 1.0)],
    };

    // 10 formations: complexity bonus caps at 15.
    let starts: Vec<(f32, f32)> = (0..10).map(|i| (i as f32 * 16.0, 8.0)).collect();
    let mut engine = ScoringEngine::new();
    engine.begin_evaluation(test_chart(&starts), roster);

    let score = engine.finalize_evaluation().expect("score");
    // 1.0 * 85 + 15 = 100.
    assert!((score.showmanship - 100.0).abs() < 0.001);
}

#[test]
fn test_difficulty_bonus_rewards_tight_transitions() {
    // Two formations with an 8-beat gap: no tight-transition bonus.
    let relaxed = test_chart(&[(0.0, 8.0), (16.0, 8.0)]);
    // Two formations with a 2-beat gap: one bonus point.
    let tight = test_chart(&[(0.0, 8.0), (10.0, 8.0)]);

    let mut engine = ScoringEngine::new();
    engine.begin_evaluation(relaxed, Roster::default());
    let relaxed_score = engine.finalize_evaluation().expect("score");

    engine.begin_evaluation(tight, Roster::default());
    let tight_score = engine.finalize_evaluation().expect("score");

    assert!((relaxed_score.difficulty_bonus - 3.0).abs() < 0.001);
    assert!((tight_score.difficulty_bonus - 4.0).abs() < 0.001);
}

#[test]
fn test_custom_rubric_threshold() {
    let member = Uuid::new_v4();
    let rubric = ScoringRubric {
        position_error_threshold: 1.0,
        ..Default::default()
    };

    let mut engine = ScoringEngine::with_rubric(rubric);
    engine.begin_evaluation(test_chart(&[(0.0, 8.0)]), Roster::default());
    // 2 yards with a 1-yard threshold: ratio 2, formation 100 - 40 = 60.
    engine.record_frame(frame(0.0, vec![snapshot(member, 2.0, 0.5)]));

    let score = engine.finalize_evaluation().expect("score");
    assert!((score.formation - 60.0).abs() < 0.001);
}

#[test]
fn test_grade_matches_overall() {
    let member = Uuid::new_v4();
    let roster = Roster {
        school_id: "s".to_string(),
        members: vec![test_member(member, 1.0)],
    };

    let mut engine = ScoringEngine::new();
    engine.begin_evaluation(test_chart(&[(0.0, 8.0)]), roster);
    for i in 0..4 {
        engine.record_frame(frame(i as f32, vec![snapshot(member, 0.0, 1.0)]));
    }

    let score = engine.finalize_evaluation().expect("score");
    assert_eq!(score.grade, drillflow_core::letter_grade(score.overall));
}
