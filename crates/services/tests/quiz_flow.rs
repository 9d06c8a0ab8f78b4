use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{Phase, QuestionDraft, Tier};
use services::{CommandError, QuizRuntime, QuizSession, RuntimeError};
use source::{ChoiceRecord, InMemorySource, LoadError, QuestionRecord, QuestionSource};

fn single_choice_bank() -> Vec<QuestionRecord> {
    // one choice per question keeps the outcome independent of shuffling
    vec![
        QuestionRecord::new("Q1", vec![ChoiceRecord::new("right", true)]),
        QuestionRecord::new("Q2", vec![ChoiceRecord::new("wrong", false)]),
        QuestionRecord::new("Q3", vec![ChoiceRecord::new("right", true)]),
    ]
}

fn spawn_with_bank(records: Vec<QuestionRecord>) -> services::QuizHandle {
    let source = InMemorySource::new();
    source.insert_bank("questions_en", records);
    QuizRuntime::new(Arc::new(source), QuizSession::new().with_seed(1)).spawn()
}

#[tokio::test(start_paused = true)]
async fn full_quiz_reports_score_and_tier() {
    let handle = spawn_with_bank(single_choice_bank());

    handle.load("questions_en").await.unwrap();
    let ready = handle.snapshot();
    assert_eq!(ready.phase, Phase::Ready);
    assert_eq!(ready.total, 3);

    handle.start().await.unwrap();
    for _ in 0..3 {
        handle.select(0).await.unwrap();
        handle.confirm().await.unwrap();
        handle.advance().await.unwrap();
    }

    let finished = handle.snapshot();
    assert_eq!(finished.phase, Phase::Finished);
    assert_eq!(finished.score, 2);
    assert_eq!(finished.total, 3);
    assert_eq!(finished.tier, Some(Tier::Fair));
}

#[tokio::test(start_paused = true)]
async fn timer_runs_while_active_and_freezes_after_finish() {
    let handle = spawn_with_bank(vec![QuestionRecord::new(
        "Q1",
        vec![ChoiceRecord::new("right", true)],
    )]);

    handle.load("questions_en").await.unwrap();
    handle.start().await.unwrap();

    let mut rx = handle.snapshots();
    rx.borrow_and_update();
    loop {
        rx.changed().await.unwrap();
        if rx.borrow_and_update().elapsed_seconds >= 5 {
            break;
        }
    }

    handle.select(0).await.unwrap();
    handle.confirm().await.unwrap();
    handle.advance().await.unwrap();

    let finished = handle.snapshot();
    assert_eq!(finished.phase, Phase::Finished);
    let frozen = finished.elapsed_seconds;

    // the ticker is disarmed once finished; letting the clock run on must
    // not move the frozen elapsed time
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(handle.snapshot().elapsed_seconds, frozen);
}

#[tokio::test(start_paused = true)]
async fn reveal_auto_advances_without_user_commands() {
    let handle = spawn_with_bank(vec![
        QuestionRecord::new("Q1", vec![ChoiceRecord::new("right", true)]),
        QuestionRecord::new("Q2", vec![ChoiceRecord::new("right", true)]),
    ]);

    handle.load("questions_en").await.unwrap();
    handle.start().await.unwrap();
    handle.select(0).await.unwrap();
    handle.confirm().await.unwrap();
    assert_eq!(handle.snapshot().phase, Phase::AnswerRevealed);

    let mut rx = handle.snapshots();
    loop {
        rx.changed().await.unwrap();
        let snap = rx.borrow_and_update().clone();
        if snap.phase == Phase::InProgress && snap.current_index == 1 {
            break;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn confirm_without_selection_is_rejected() {
    let handle = spawn_with_bank(single_choice_bank());
    handle.load("questions_en").await.unwrap();
    handle.start().await.unwrap();

    let before = handle.snapshot();
    let err = handle.confirm().await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Command(CommandError::NoSelection)
    ));
    assert_eq!(handle.snapshot(), before);
}

#[tokio::test(start_paused = true)]
async fn empty_bank_surfaces_source_empty_and_rejects_start() {
    let handle = spawn_with_bank(Vec::new());

    handle.load("questions_en").await.unwrap();
    let snap = handle.snapshot();
    assert_eq!(snap.phase, Phase::Error);
    assert_eq!(snap.error, Some(LoadError::Empty));

    let err = handle.start().await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Command(CommandError::InvalidInPhase { .. })
    ));
}

struct DownSource;

#[async_trait]
impl QuestionSource for DownSource {
    async fn load_questions(&self, _source_id: &str) -> Result<Vec<QuestionDraft>, LoadError> {
        Err(LoadError::Unreachable("connection refused".into()))
    }
}

#[tokio::test(start_paused = true)]
async fn unreachable_source_reason_passes_through() {
    let handle = QuizRuntime::new(Arc::new(DownSource), QuizSession::new()).spawn();

    handle.load("questions_en").await.unwrap();
    let snap = handle.snapshot();
    assert_eq!(snap.phase, Phase::Error);
    assert_eq!(
        snap.error,
        Some(LoadError::Unreachable("connection refused".into()))
    );
}

#[tokio::test(start_paused = true)]
async fn switching_banks_replaces_the_session() {
    let source = InMemorySource::new();
    source.insert_bank("questions_en", single_choice_bank());
    source.insert_bank(
        "questions_es",
        vec![QuestionRecord::new(
            "P1",
            vec![ChoiceRecord::new("bien", true)],
        )],
    );
    let handle = QuizRuntime::new(Arc::new(source), QuizSession::new()).spawn();

    handle.load("questions_en").await.unwrap();
    let first = handle.snapshot();
    handle.start().await.unwrap();
    handle.select(0).await.unwrap();
    handle.confirm().await.unwrap();

    handle.load("questions_es").await.unwrap();
    let second = handle.snapshot();
    assert_eq!(second.phase, Phase::Ready);
    assert_eq!(second.total, 1);
    assert_eq!(second.score, 0);
    assert_ne!(second.session_id, first.session_id);
}
