// src/runner/navigate.rs

use super::{ActivePhase, Direction, QuizRunner, RunnerState};
use crate::error::QuizError;

impl QuizRunner {
    /// Records the user's pick for the current question. Reselecting
    /// the same or a different option overwrites the slot; the cursor
    /// never moves. Rejected while the confirmation dialog is showing
    /// or a submit is in flight.
    pub fn select_answer(&mut self, option_index: usize) -> Result<(), QuizError> {
        match &mut self.state {
            RunnerState::Active { attempt, phase }
                if !matches!(phase, ActivePhase::Confirming { .. }) =>
            {
                let options = attempt.questions[attempt.current_index].options.len();
                if option_index >= options {
                    return Err(QuizError::BadRequest(format!(
                        "option index {} out of range for {} options",
                        option_index, options
                    )));
                }
                attempt.answers[attempt.current_index] = Some(option_index as i32);
                Ok(())
            }
            _ => Err(QuizError::InvalidTransition(
                "answer selection requires an active attempt with no dialog showing",
            )),
        }
    }

    /// Moves the cursor one question forward or back, clamped to the
    /// question range: out-of-range requests are no-ops, not errors.
    /// A cursor change resets the per-question sub-timer and fires the
    /// time-tracking telemetry.
    pub fn navigate(&mut self, direction: Direction) -> Result<(), QuizError> {
        let moved = match &mut self.state {
            RunnerState::Active { attempt, phase }
                if !matches!(phase, ActivePhase::Confirming { .. }) =>
            {
                let next = match direction {
                    Direction::Next if attempt.current_index + 1 < attempt.total_questions() => {
                        Some(attempt.current_index + 1)
                    }
                    Direction::Prev if attempt.current_index > 0 => {
                        Some(attempt.current_index - 1)
                    }
                    _ => None, // clamped
                };

                match next {
                    Some(next) => {
                        attempt.current_index = next;
                        attempt.seconds_on_question = 0;
                        attempt.pending_advance_in = None;
                        Some((attempt.quiz_id.clone(), next))
                    }
                    None => None,
                }
            }
            _ => {
                return Err(QuizError::InvalidTransition(
                    "navigation requires an active attempt with no dialog showing",
                ));
            }
        };

        if let Some((quiz_id, index)) = moved {
            self.dispatch_question_telemetry(quiz_id, index);
        }
        Ok(())
    }
}
