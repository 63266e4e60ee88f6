// src/runner/submit.rs

use std::sync::Arc;

use super::{ActivePhase, Completion, Notice, QuizRunner, RunnerState};
use crate::backend::BackendError;
use crate::error::QuizError;
use crate::models::submission::{SubmissionResult, SubmissionType, SubmitRequest};

impl QuizRunner {
    /// Starts the submit flow. With unanswered questions the runner
    /// waits in the confirmation sub-state (ticking suspended);
    /// otherwise it goes straight to submitting. A second call while
    /// confirming or submitting is rejected.
    pub fn initiate_submit(&mut self) -> Result<(), QuizError> {
        let unanswered = match &self.state {
            RunnerState::Active { attempt, phase }
                if !matches!(phase, ActivePhase::Confirming { .. }) =>
            {
                attempt.unanswered_count()
            }
            _ => {
                return Err(QuizError::InvalidTransition(
                    "submit requires an active attempt",
                ));
            }
        };

        if unanswered > 0 {
            if let RunnerState::Active { phase, .. } = &mut self.state {
                *phase = ActivePhase::Confirming { unanswered };
            }
            return Ok(());
        }

        self.begin_submit(SubmissionType::Manual);
        Ok(())
    }

    /// Dismisses the confirmation dialog. Ticking resumes unless the
    /// time budget already ran out.
    pub fn cancel_submit(&mut self) -> Result<(), QuizError> {
        match &mut self.state {
            RunnerState::Active { attempt, phase }
                if matches!(phase, ActivePhase::Confirming { .. }) =>
            {
                *phase = if attempt.auto_submit_triggered {
                    ActivePhase::Expired
                } else {
                    ActivePhase::Ticking
                };
                Ok(())
            }
            _ => Err(QuizError::InvalidTransition("no submission to cancel")),
        }
    }

    /// Confirms submission with unanswered questions. The answers
    /// array is sent exactly as stored; the manual path never injects
    /// the sentinel.
    pub fn confirm_submit(&mut self) -> Result<(), QuizError> {
        match &self.state {
            RunnerState::Active { phase, .. }
                if matches!(phase, ActivePhase::Confirming { .. }) =>
            {
                self.begin_submit(SubmissionType::Manual);
                Ok(())
            }
            _ => Err(QuizError::InvalidTransition("no submission to confirm")),
        }
    }

    /// Moves the attempt into the submitting state and spawns the
    /// backend call. While it is in flight, answer selection,
    /// navigation, ticks, and further submits are all rejected.
    pub(crate) fn begin_submit(&mut self, kind: SubmissionType) {
        let state = std::mem::replace(&mut self.state, RunnerState::Idle);
        let attempt = match state {
            RunnerState::Active { attempt, .. } => attempt,
            other => {
                self.state = other;
                return;
            }
        };

        let request = SubmitRequest {
            answers: attempt.answers.clone(),
            time_spent_secs: attempt.elapsed_secs,
            is_auto_submit: kind == SubmissionType::Auto,
        };
        let quiz_id = attempt.quiz_id.clone();

        self.state = RunnerState::Submitting { attempt, kind };

        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = backend.submit(&quiz_id, request).await;
            let _ = tx.send((epoch, Completion::Submitted(result)));
        });
    }

    /// Applies the submit outcome. Success completes the attempt; a
    /// failure reverts to active with answers preserved. Ticking
    /// resumes only when the budget is not yet exhausted; after a
    /// failed auto-submission the user must resubmit manually.
    pub(crate) fn apply_submitted(&mut self, result: Result<SubmissionResult, BackendError>) {
        let state = std::mem::replace(&mut self.state, RunnerState::Idle);
        let (attempt, kind) = match state {
            RunnerState::Submitting { attempt, kind } => (attempt, kind),
            other => {
                self.state = other;
                return;
            }
        };

        match result {
            Ok(result) => {
                tracing::info!(
                    "quiz {} submitted ({:?}), score {}/{}",
                    attempt.quiz_id,
                    kind,
                    result.score,
                    result.total_questions
                );
                self.state = RunnerState::Completed { result };
            }
            Err(e) => {
                tracing::error!("quiz submission failed ({:?}): {}", kind, e);
                let auto = kind == SubmissionType::Auto;
                let phase = if attempt.auto_submit_triggered {
                    ActivePhase::Expired
                } else {
                    ActivePhase::Ticking
                };
                self.state = RunnerState::Active { attempt, phase };
                self.notices.push_back(Notice::SubmitFailed {
                    auto,
                    message: e.to_string(),
                });
            }
        }
    }
}
