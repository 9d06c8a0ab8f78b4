use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{SessionId, Tier};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// State of the quiz session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    InProgress,
    AnswerRevealed,
    Finished,
    Error,
}

impl Phase {
    /// Whether the elapsed-time ticker runs in this phase.
    ///
    /// The reveal interval counts as session-active time, so the timer keeps
    /// running through `AnswerRevealed`.
    #[must_use]
    pub fn timer_active(self) -> bool {
        matches!(self, Self::InProgress | Self::AnswerRevealed)
    }

    /// Whether the session has stopped for good (until the next load).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Error)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::InProgress => "in progress",
            Self::AnswerRevealed => "answer revealed",
            Self::Finished => "finished",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("score ({score}) exceeds total questions ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("summary requires at least one question")]
    NoQuestions,
}

/// Final report for a finished quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    session_id: SessionId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    score: u32,
    total: u32,
    elapsed_seconds: u64,
}

impl QuizSummary {
    /// Build a summary from the final session fields.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::InvalidTimeRange` if `completed_at` precedes
    /// `started_at`, `SummaryError::NoQuestions` for a zero total, and
    /// `SummaryError::ScoreExceedsTotal` if the score is out of range.
    pub fn new(
        session_id: SessionId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        score: u32,
        total: u32,
        elapsed_seconds: u64,
    ) -> Result<Self, SummaryError> {
        if completed_at < started_at {
            return Err(SummaryError::InvalidTimeRange);
        }
        if total == 0 {
            return Err(SummaryError::NoQuestions);
        }
        if score > total {
            return Err(SummaryError::ScoreExceedsTotal { score, total });
        }

        Ok(Self {
            session_id,
            started_at,
            completed_at,
            score,
            total,
            elapsed_seconds,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Qualitative tier for the final score.
    #[must_use]
    pub fn tier(&self) -> Tier {
        Tier::classify(self.score, self.total)
    }

    /// Rounded percentage score.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        crate::model::percentage(self.score, self.total)
    }
}
