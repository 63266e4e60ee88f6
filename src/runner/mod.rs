// src/runner/mod.rs

mod navigate;
mod submit;
mod timing;

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::backend::{BackendError, QuizBackend};
use crate::config::Config;
use crate::error::QuizError;
use crate::models::attempt::QuizAttempt;
use crate::models::question::GeneratedQuiz;
use crate::models::submission::{SubmissionResult, SubmissionType};

/// Cursor movement requested by the presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Sub-state of an active attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivePhase {
    /// Normal flow: the per-second tick is live.
    Ticking,
    /// Submission dialog showing; ticking suspended until the user
    /// confirms or cancels.
    Confirming { unanswered: usize },
    /// Total budget exhausted and the automatic submission failed.
    /// Ticking stays suspended; the user must resubmit manually.
    Expired,
}

/// Discriminated state of the runner, exhaustively matched everywhere
/// so invalid combinations ("submitting" and "confirming" at once)
/// cannot be represented.
#[derive(Debug)]
pub enum RunnerState {
    Idle,
    Generating,
    Active {
        attempt: QuizAttempt,
        phase: ActivePhase,
    },
    Submitting {
        attempt: QuizAttempt,
        kind: SubmissionType,
    },
    Completed {
        result: SubmissionResult,
    },
}

/// One-shot messages for the presentation layer, drained with
/// [`QuizRunner::take_notices`]. None of these is fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    OneMinuteWarning,
    GenerationFailed(String),
    SubmitFailed { auto: bool, message: String },
    QuestionAutoFilled { index: usize },
}

/// Completion of a spawned backend call, tagged with the attempt epoch
/// it belongs to. Completions from a torn-down attempt (retry,
/// navigation away) fail the epoch check in `poll` and are discarded.
#[derive(Debug)]
pub(crate) enum Completion {
    Generated(Result<GeneratedQuiz, BackendError>),
    Submitted(Result<SubmissionResult, BackendError>),
}

/// State machine for an active quiz attempt: cursor, answer vector,
/// elapsed-time accumulation, auto-submit arming, and the
/// submit/confirm dialog flow.
///
/// The host drives it from a single logical thread: `tick()` once per
/// second, `poll()` each frame to apply completed backend calls, and
/// the intent methods (`select_answer`, `navigate`, `initiate_submit`,
/// ...) from user events. Backend calls run as spawned tasks and
/// report back through an internal channel, so the runner never blocks
/// the event loop.
pub struct QuizRunner {
    pub(crate) state: RunnerState,
    pub(crate) backend: Arc<dyn QuizBackend>,
    pub(crate) config: Config,
    session_id: String,
    pub(crate) epoch: u64,
    pub(crate) notices: VecDeque<Notice>,
    pub(crate) completion_tx: UnboundedSender<(u64, Completion)>,
    completion_rx: UnboundedReceiver<(u64, Completion)>,
}

impl QuizRunner {
    pub fn new(backend: Arc<dyn QuizBackend>, config: Config, session_id: impl Into<String>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        Self {
            state: RunnerState::Idle,
            backend,
            config,
            session_id: session_id.into(),
            epoch: 0,
            notices: VecDeque::new(),
            completion_tx,
            completion_rx,
        }
    }

    pub fn state(&self) -> &RunnerState {
        &self.state
    }

    /// Drains queued one-shot messages for the presentation.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Starts a new attempt by spawning the generate call. Valid only
    /// from idle; the outcome arrives through `poll`.
    pub fn start(&mut self, question_count: usize) -> Result<(), QuizError> {
        if !matches!(self.state, RunnerState::Idle) {
            return Err(QuizError::InvalidTransition("start requires the idle state"));
        }
        if question_count == 0 {
            return Err(QuizError::BadRequest(
                "question count must be positive".to_string(),
            ));
        }

        self.state = RunnerState::Generating;

        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        let epoch = self.epoch;
        let session_id = self.session_id.clone();
        tokio::spawn(async move {
            let result = backend.generate(&session_id, question_count).await;
            let _ = tx.send((epoch, Completion::Generated(result)));
        });

        Ok(())
    }

    /// Applies completed backend calls. Stale completions carry an old
    /// epoch and are dropped without touching state.
    pub fn poll(&mut self) {
        while let Ok((epoch, completion)) = self.completion_rx.try_recv() {
            if epoch != self.epoch {
                tracing::debug!("discarding stale backend completion");
                continue;
            }
            match completion {
                Completion::Generated(result) => self.apply_generated(result),
                Completion::Submitted(result) => self.apply_submitted(result),
            }
        }
    }

    fn apply_generated(&mut self, result: Result<GeneratedQuiz, BackendError>) {
        if !matches!(self.state, RunnerState::Generating) {
            return;
        }

        match result {
            Ok(generated) => {
                let attempt = QuizAttempt::new(generated, self.config.per_question_limit_secs);
                tracing::info!(
                    "quiz {} generated with {} questions, {}s budget",
                    attempt.quiz_id,
                    attempt.total_questions(),
                    attempt.total_limit_secs
                );
                let quiz_id = attempt.quiz_id.clone();
                self.state = RunnerState::Active {
                    attempt,
                    phase: ActivePhase::Ticking,
                };
                self.dispatch_question_telemetry(quiz_id, 0);
            }
            Err(e) => {
                tracing::error!("quiz generation failed: {}", e);
                self.state = RunnerState::Idle;
                self.notices.push_back(Notice::GenerationFailed(e.to_string()));
            }
        }
    }

    /// Discards the attempt (or its result) and returns to idle. Any
    /// in-flight backend call is orphaned; its completion fails the
    /// epoch check.
    pub fn retry(&mut self) -> Result<(), QuizError> {
        match self.state {
            RunnerState::Active { .. } | RunnerState::Completed { .. } => {
                self.epoch += 1;
                self.state = RunnerState::Idle;
                self.notices.clear();
                Ok(())
            }
            _ => Err(QuizError::InvalidTransition(
                "retry requires an active or completed attempt",
            )),
        }
    }

    /// Tears the runner down when the user navigates away. Unlike
    /// `retry`, valid from any state: an in-flight backend call keeps
    /// running, but its completion is discarded rather than allowed to
    /// mutate the abandoned attempt.
    pub fn abandon(&mut self) {
        self.epoch += 1;
        self.state = RunnerState::Idle;
        self.notices.clear();
    }

    /// Loads a past attempt straight into the completed state for
    /// review. Ticking never starts for review attempts.
    pub fn load_review(&mut self, result: SubmissionResult) -> Result<(), QuizError> {
        if !matches!(self.state, RunnerState::Idle) {
            return Err(QuizError::InvalidTransition(
                "review requires the idle state",
            ));
        }
        self.state = RunnerState::Completed { result };
        Ok(())
    }

    /// Fire-and-forget time-tracking telemetry. Failure is logged and
    /// swallowed by policy; it never touches quiz state.
    pub(crate) fn dispatch_question_telemetry(&self, quiz_id: String, question_index: usize) {
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            if let Err(e) = backend.track_question_time(&quiz_id, question_index).await {
                tracing::warn!(
                    "question time tracking failed for {} q{}: {}",
                    quiz_id,
                    question_index,
                    e
                );
            }
        });
    }
}
