// src/runner/timing.rs

use std::collections::VecDeque;

use super::{ActivePhase, Notice, QuizRunner, RunnerState};
use crate::error::QuizError;
use crate::models::attempt::QuizAttempt;
use crate::models::submission::SubmissionType;

impl QuizRunner {
    /// Advances the attempt clock by one second.
    ///
    /// Ticks arriving while the confirmation dialog is up, while a
    /// submit is in flight, or after the budget ran out are ignored:
    /// ticking is suspended in those states, never rewound.
    ///
    /// Evaluated in order: the one-minute warning (once per attempt),
    /// then the total-budget check, which arms auto-submission, fills
    /// the unanswered slots with the sentinel, and issues the submit.
    /// The per-question sub-timer runs last; it only nudges the cursor
    /// forward, a single question's expiry never submits the quiz.
    pub fn tick(&mut self) {
        let mut auto_submit = false;
        let mut telemetry: Option<(String, usize)> = None;

        match &mut self.state {
            RunnerState::Active {
                attempt,
                phase: ActivePhase::Ticking,
            } => {
                attempt.elapsed_secs += 1;
                attempt.seconds_on_question += 1;

                if !attempt.warning_fired
                    && attempt.elapsed_secs + self.config.warning_threshold_secs
                        >= attempt.total_limit_secs
                {
                    attempt.warning_fired = true;
                    tracing::info!("one minute remaining on quiz {}", attempt.quiz_id);
                    self.notices.push_back(Notice::OneMinuteWarning);
                }

                if !attempt.auto_submit_triggered
                    && attempt.elapsed_secs >= attempt.total_limit_secs
                {
                    // one-way: the attempt now moves toward submission
                    attempt.auto_submit_triggered = true;
                    attempt.fill_unanswered_with_sentinel();
                    tracing::info!("time budget exhausted on quiz {}, auto-submitting", attempt.quiz_id);
                    auto_submit = true;
                } else if let Some(countdown) = attempt.pending_advance_in {
                    if countdown <= 1 {
                        attempt.pending_advance_in = None;
                        if attempt.current_index + 1 < attempt.total_questions() {
                            attempt.current_index += 1;
                            attempt.seconds_on_question = 0;
                            telemetry = Some((attempt.quiz_id.clone(), attempt.current_index));
                        }
                    } else {
                        attempt.pending_advance_in = Some(countdown - 1);
                    }
                } else if attempt.seconds_on_question >= attempt.per_question_limit_secs {
                    question_budget_exhausted(
                        attempt,
                        self.config.auto_advance_delay_secs,
                        &mut self.notices,
                    );
                }
            }
            _ => {} // ticking suspended
        }

        if auto_submit {
            self.begin_submit(SubmissionType::Auto);
        }
        if let Some((quiz_id, index)) = telemetry {
            self.dispatch_question_telemetry(quiz_id, index);
        }
    }

    /// Handles expiry of the per-question pacing timer for the current
    /// question. Exposed for hosts driving their own question timer;
    /// `tick` calls the same logic when the internal sub-timer runs
    /// out.
    pub fn question_time_up(&mut self) {
        if let RunnerState::Active {
            attempt,
            phase: ActivePhase::Ticking,
        } = &mut self.state
        {
            question_budget_exhausted(
                attempt,
                self.config.auto_advance_delay_secs,
                &mut self.notices,
            );
        }
    }

    /// Grants the single-use time extension for the current question.
    /// The grant enlarges the aggregate budget, not the per-question
    /// sub-timer; a second request for the same index is a no-op.
    pub fn extend_question_time(&mut self, extra_secs: u64) -> Result<(), QuizError> {
        match &mut self.state {
            RunnerState::Active { attempt, .. } => {
                if attempt.extension_granted.contains(&attempt.current_index) {
                    return Ok(()); // single use per question
                }
                attempt.extension_granted.insert(attempt.current_index);
                attempt.total_limit_secs += extra_secs;
                tracing::info!(
                    "granted {}s extension on quiz {} q{}",
                    extra_secs,
                    attempt.quiz_id,
                    attempt.current_index
                );
                Ok(())
            }
            _ => Err(QuizError::InvalidTransition(
                "time extension requires an active attempt",
            )),
        }
    }
}

/// The per-question budget ran out: an unanswered slot is filled with
/// the first option (a timed-out question counts as a guess, not a
/// blank) and the cursor is scheduled to advance after a short fixed
/// delay unless this is the last question.
fn question_budget_exhausted(
    attempt: &mut QuizAttempt,
    advance_delay_secs: u64,
    notices: &mut VecDeque<Notice>,
) {
    if attempt.answers[attempt.current_index].is_none() {
        attempt.answers[attempt.current_index] = Some(0);
        notices.push_back(Notice::QuestionAutoFilled {
            index: attempt.current_index,
        });
    }
    attempt.seconds_on_question = 0;
    if attempt.current_index + 1 < attempt.total_questions() {
        attempt.pending_advance_in = Some(advance_delay_secs);
    }
}
