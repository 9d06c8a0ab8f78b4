use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use tracing::{debug, warn};

use quiz_core::model::{Phase, Question, QuizSummary, SessionId, Tier};
use quiz_core::Clock;
use source::LoadError;

use crate::engine::snapshot::{ChoiceView, QuestionView, Snapshot};
use crate::error::{CommandError, CommandKind};
use crate::shuffle::shuffle;

/// Default reveal interval, in 1-second timer ticks.
pub const DEFAULT_REVEAL_TICKS: u32 = 2;

//
// ─── SESSION STATE MACHINE ─────────────────────────────────────────────────────
//

/// The quiz session aggregate and its state machine.
///
/// Owns every mutable session field; all mutation goes through the explicit
/// transition methods below. Timer ticks and user commands are both plain
/// inputs here; delivering them one at a time is the runtime's job.
///
/// A load replaces the session wholesale: fresh id, fresh randomization, no
/// carry-over from the previous run.
pub struct QuizSession {
    id: SessionId,
    phase: Phase,
    questions: Vec<Question>,
    current: usize,
    score: u32,
    elapsed_seconds: u64,
    pending: Option<usize>,
    reveal_remaining: u32,
    error: Option<LoadError>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    reveal_ticks: u32,
    clock: Clock,
    rng: StdRng,
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            phase: Phase::Idle,
            questions: Vec::new(),
            current: 0,
            score: 0,
            elapsed_seconds: 0,
            pending: None,
            reveal_remaining: 0,
            error: None,
            started_at: None,
            completed_at: None,
            reveal_ticks: DEFAULT_REVEAL_TICKS,
            clock: Clock::default_clock(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Use the given clock for start/completion timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Number of timer ticks an answer stays revealed before auto-advancing.
    ///
    /// Clamped to at least one tick.
    #[must_use]
    pub fn with_reveal_ticks(mut self, ticks: u32) -> Self {
        self.reveal_ticks = ticks.max(1);
        self
    }

    /// Seed the randomizer, for deterministic ordering in tests.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Total number of questions in this session.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Index of the question being presented; equals `total()` once finished.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    #[must_use]
    pub fn pending_selection(&self) -> Option<usize> {
        self.pending
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn error_reason(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Final report, available once the session is finished.
    #[must_use]
    pub fn summary(&self) -> Option<QuizSummary> {
        if self.phase != Phase::Finished {
            return None;
        }
        let total = u32::try_from(self.questions.len()).ok()?;
        QuizSummary::new(
            self.id,
            self.started_at?,
            self.completed_at?,
            self.score,
            total,
            self.elapsed_seconds,
        )
        .ok()
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────
    //

    /// Begin loading a fresh question set.
    ///
    /// Valid from `Idle` and, as an explicit reload, from `Error`. Any state
    /// left over from a previous session is discarded here.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidInPhase` in any other phase.
    pub fn begin_load(&mut self) -> Result<(), CommandError> {
        match self.phase {
            Phase::Idle | Phase::Error => {
                self.replace_session();
                self.phase = Phase::Loading;
                debug!(session = %self.id, "loading questions");
                Ok(())
            }
            _ => self.reject(CommandKind::Load),
        }
    }

    /// Complete a pending load with the loader's outcome.
    ///
    /// On success the question order and, independently, every question's
    /// choice order are randomized; both stay fixed for the session's
    /// lifetime. An empty sequence and a loader failure both land in the
    /// `Error` phase carrying the reason, which is a valid outcome of this
    /// transition, not a rejection.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidInPhase` unless the session is `Loading`.
    pub fn finish_load(
        &mut self,
        outcome: Result<Vec<Question>, LoadError>,
    ) -> Result<(), CommandError> {
        if self.phase != Phase::Loading {
            return self.reject(CommandKind::Load);
        }

        match outcome {
            Ok(questions) if questions.is_empty() => self.fail_load(LoadError::Empty),
            Ok(mut questions) => {
                shuffle(&mut questions, &mut self.rng);
                self.questions = questions
                    .into_iter()
                    .map(|question| {
                        let (wording, mut choices) = question.into_parts();
                        shuffle(&mut choices, &mut self.rng);
                        Question::from_parts(wording, choices)
                    })
                    .collect();
                self.phase = Phase::Ready;
                debug!(session = %self.id, total = self.questions.len(), "questions ready");
            }
            Err(reason) => self.fail_load(reason),
        }
        Ok(())
    }

    /// Start the quiz.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidInPhase` unless the session is `Ready`.
    pub fn start(&mut self) -> Result<(), CommandError> {
        if self.phase != Phase::Ready {
            return self.reject(CommandKind::Start);
        }
        self.phase = Phase::InProgress;
        self.started_at = Some(self.clock.now());
        debug!(session = %self.id, "session started");
        Ok(())
    }

    /// Select a choice for the current question, replacing any prior pick.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidInPhase` outside `InProgress` (including
    /// during the reveal) and `CommandError::ChoiceOutOfRange` for a bad
    /// index.
    pub fn select(&mut self, index: usize) -> Result<(), CommandError> {
        if self.phase != Phase::InProgress {
            return self.reject(CommandKind::Select);
        }
        let Some(question) = self.questions.get(self.current) else {
            return self.reject(CommandKind::Select);
        };
        let len = question.choices().len();
        if index >= len {
            return Err(CommandError::ChoiceOutOfRange { index, len });
        }
        self.pending = Some(index);
        Ok(())
    }

    /// Confirm the pending selection, scoring it exactly once.
    ///
    /// The score moves by +1 if the selected choice is correct-flagged and
    /// +0 otherwise; a question is never re-evaluated.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NoSelection` when nothing is selected (the
    /// phase is left unchanged) and `CommandError::InvalidInPhase` outside
    /// `InProgress`.
    pub fn confirm(&mut self) -> Result<(), CommandError> {
        if self.phase != Phase::InProgress {
            return self.reject(CommandKind::Confirm);
        }
        let Some(index) = self.pending else {
            return Err(CommandError::NoSelection);
        };
        let Some(question) = self.questions.get(self.current) else {
            return self.reject(CommandKind::Confirm);
        };

        if question.is_correct(index) {
            self.score += 1;
        }
        let resolved = u32::try_from(self.current + 1).unwrap_or(u32::MAX);
        assert!(
            self.score <= resolved,
            "score {} exceeds resolved questions {resolved}",
            self.score
        );

        self.reveal_remaining = self.reveal_ticks;
        self.phase = Phase::AnswerRevealed;
        debug!(
            session = %self.id,
            question = self.current,
            score = self.score,
            "answer confirmed"
        );
        Ok(())
    }

    /// Skip the remaining reveal delay and move on immediately.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidInPhase` unless an answer is revealed.
    pub fn advance(&mut self) -> Result<(), CommandError> {
        if self.phase != Phase::AnswerRevealed {
            return self.reject(CommandKind::Advance);
        }
        self.advance_question();
        Ok(())
    }

    /// Deliver one 1-second timer tick.
    ///
    /// Elapsed time accrues while the session is `InProgress` or
    /// `AnswerRevealed`; the reveal delay counts as session-active time.
    /// Ticks in any other phase are accepted and ignored, so a tick already
    /// queued when the session finishes cannot mutate it.
    pub fn tick(&mut self) {
        if !self.phase.timer_active() {
            return;
        }
        self.elapsed_seconds += 1;
        if self.phase == Phase::AnswerRevealed {
            self.reveal_remaining = self.reveal_remaining.saturating_sub(1);
            if self.reveal_remaining == 0 {
                self.advance_question();
            }
        }
    }

    /// Discard the session and return to `Idle`. Valid from any state.
    pub fn reset(&mut self) {
        debug!(session = %self.id, phase = %self.phase, "session reset");
        self.replace_session();
        self.phase = Phase::Idle;
    }

    //
    // ─── SNAPSHOT ──────────────────────────────────────────────────────────
    //

    /// Read-only view of the session for the presentation layer.
    ///
    /// Choice correctness is masked until the current answer is revealed.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let revealed = self.phase == Phase::AnswerRevealed;
        let question = if self.phase.timer_active() {
            self.questions.get(self.current).map(|q| QuestionView {
                wording: q.wording().to_string(),
                choices: q
                    .choices()
                    .iter()
                    .map(|c| ChoiceView {
                        text: c.text().to_string(),
                        correct: revealed.then(|| c.is_correct()),
                    })
                    .collect(),
                selected: self.pending,
            })
        } else {
            None
        };

        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        Snapshot {
            session_id: self.id,
            phase: self.phase,
            question,
            current_index: self.current,
            score: self.score,
            total: self.questions.len(),
            elapsed_seconds: self.elapsed_seconds,
            error: self.error.clone(),
            tier: (self.phase == Phase::Finished).then(|| Tier::classify(self.score, total)),
        }
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────
    //

    fn advance_question(&mut self) {
        self.current += 1;
        self.pending = None;
        self.reveal_remaining = 0;
        if self.current >= self.questions.len() {
            self.phase = Phase::Finished;
            self.completed_at = Some(self.clock.now());
            debug!(
                session = %self.id,
                score = self.score,
                total = self.questions.len(),
                elapsed = self.elapsed_seconds,
                "session finished"
            );
        } else {
            self.phase = Phase::InProgress;
        }
    }

    fn fail_load(&mut self, reason: LoadError) {
        warn!(session = %self.id, %reason, "load failed");
        self.error = Some(reason);
        self.phase = Phase::Error;
    }

    fn replace_session(&mut self) {
        self.id = SessionId::new();
        self.questions.clear();
        self.current = 0;
        self.score = 0;
        self.elapsed_seconds = 0;
        self.pending = None;
        self.reveal_remaining = 0;
        self.error = None;
        self.started_at = None;
        self.completed_at = None;
    }

    fn reject(&self, command: CommandKind) -> Result<(), CommandError> {
        warn!(%command, phase = %self.phase, "command rejected");
        Err(CommandError::InvalidInPhase {
            command,
            phase: self.phase,
        })
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("elapsed_seconds", &self.elapsed_seconds)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
