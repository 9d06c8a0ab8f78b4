use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use quiz_core::model::Question;
use source::{LoadError, QuestionSource};

use crate::engine::{QuizSession, Snapshot};
use crate::error::{CommandError, RuntimeError};
use crate::timer::TimerCoordinator;

/// Commands accepted by the runtime queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Discard the session and load the named question bank.
    Load { source_id: String },
    Start,
    Select { choice: usize },
    Confirm,
    /// Skip the remaining reveal delay.
    Advance,
    /// Return to `Idle` without loading anything.
    Reset,
}

struct Envelope {
    command: Command,
    reply: oneshot::Sender<Result<(), CommandError>>,
}

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Cloneable handle for submitting commands and observing snapshots.
///
/// Every command returns the session's immediate accept/reject outcome; a
/// rejection means the phase did not change and the caller decides how to
/// surface it.
#[derive(Clone)]
pub struct QuizHandle {
    commands: mpsc::Sender<Envelope>,
    snapshots: watch::Receiver<Snapshot>,
}

impl QuizHandle {
    /// Load (or reload) the named question bank, replacing any session.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError` if the runtime is gone or the command is
    /// rejected. Loader failures are not errors here; they surface as the
    /// `Error` phase in the next snapshot.
    pub async fn load(&self, source_id: impl Into<String>) -> Result<(), RuntimeError> {
        self.submit(Command::Load {
            source_id: source_id.into(),
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `RuntimeError` if the runtime is gone or the command is rejected.
    pub async fn start(&self) -> Result<(), RuntimeError> {
        self.submit(Command::Start).await
    }

    /// # Errors
    ///
    /// Returns `RuntimeError` if the runtime is gone or the command is rejected.
    pub async fn select(&self, choice: usize) -> Result<(), RuntimeError> {
        self.submit(Command::Select { choice }).await
    }

    /// # Errors
    ///
    /// Returns `RuntimeError` if the runtime is gone or the command is rejected.
    pub async fn confirm(&self) -> Result<(), RuntimeError> {
        self.submit(Command::Confirm).await
    }

    /// # Errors
    ///
    /// Returns `RuntimeError` if the runtime is gone or the command is rejected.
    pub async fn advance(&self) -> Result<(), RuntimeError> {
        self.submit(Command::Advance).await
    }

    /// # Errors
    ///
    /// Returns `RuntimeError::Closed` if the runtime is gone; reset itself
    /// never rejects.
    pub async fn reset(&self) -> Result<(), RuntimeError> {
        self.submit(Command::Reset).await
    }

    /// Subscribe to session snapshots; one is published per state change.
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    async fn submit(&self, command: Command) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Envelope { command, reply: tx })
            .await
            .map_err(|_| RuntimeError::Closed)?;
        let outcome = rx.await.map_err(|_| RuntimeError::Closed)?;
        Ok(outcome?)
    }
}

//
// ─── RUNTIME ───────────────────────────────────────────────────────────────────
//

/// Single-threaded event loop owning the quiz session.
///
/// User commands and timer ticks land on one serialized queue: whichever was
/// enqueued first is handled first, handlers never overlap, and nothing
/// blocks the loop. The ticker is armed only while the session phase keeps
/// the timer active, so no tick can reach a finished or superseded session.
pub struct QuizRuntime {
    session: QuizSession,
    source: Arc<dyn QuestionSource>,
    tick_period: Duration,
}

impl QuizRuntime {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>, session: QuizSession) -> Self {
        Self {
            session,
            source,
            tick_period: Duration::from_secs(1),
        }
    }

    /// Override the 1-second tick period (tests).
    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Spawn the event loop and return a handle to it.
    ///
    /// The loop exits when every handle has been dropped.
    #[must_use]
    pub fn spawn(self) -> QuizHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (snap_tx, snap_rx) = watch::channel(self.session.snapshot());
        tokio::spawn(self.run(cmd_rx, snap_tx));
        QuizHandle {
            commands: cmd_tx,
            snapshots: snap_rx,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Envelope>,
        snapshots: watch::Sender<Snapshot>,
    ) {
        let mut timer = TimerCoordinator::new(self.tick_period);
        loop {
            timer.sync(self.session.phase().timer_active());
            let armed = timer.is_armed();
            tokio::select! {
                biased;

                maybe = commands.recv() => {
                    let Some(Envelope { command, reply }) = maybe else {
                        debug!("all handles dropped, stopping quiz runtime");
                        break;
                    };
                    let outcome = self.handle(command, &snapshots).await;
                    // publish before replying so a caller that awaited the
                    // outcome always observes the post-command state
                    let _ = snapshots.send(self.session.snapshot());
                    let _ = reply.send(outcome);
                }
                () = timer.tick(), if armed => {
                    self.session.tick();
                    let _ = snapshots.send(self.session.snapshot());
                }
            }
        }
    }

    async fn handle(
        &mut self,
        command: Command,
        snapshots: &watch::Sender<Snapshot>,
    ) -> Result<(), CommandError> {
        match command {
            Command::Load { source_id } => self.load(&source_id, snapshots).await,
            Command::Start => self.session.start(),
            Command::Select { choice } => self.session.select(choice),
            Command::Confirm => self.session.confirm(),
            Command::Advance => self.session.advance(),
            Command::Reset => {
                self.session.reset();
                Ok(())
            }
        }
    }

    async fn load(
        &mut self,
        source_id: &str,
        snapshots: &watch::Sender<Snapshot>,
    ) -> Result<(), CommandError> {
        self.session.reset();
        self.session.begin_load()?;
        // publish the Loading phase before awaiting the source
        let _ = snapshots.send(self.session.snapshot());

        let outcome = fetch_questions(self.source.as_ref(), source_id).await;
        self.session.finish_load(outcome)
    }
}

/// Fetch and validate a bank, folding validation failures into `Malformed`.
async fn fetch_questions(
    source: &dyn QuestionSource,
    source_id: &str,
) -> Result<Vec<Question>, LoadError> {
    let drafts = source.load_questions(source_id).await?;
    drafts
        .into_iter()
        .map(|draft| {
            draft
                .validate()
                .map_err(|e| LoadError::Malformed(e.to_string()))
        })
        .collect()
}
