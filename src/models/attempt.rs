// src/models/attempt.rs

use std::collections::HashSet;

use crate::models::question::{GeneratedQuiz, Question};

/// One answer slot: `None` until the user picks an option, `Some(i)`
/// an index into the question's options. The auto-submit path replaces
/// `None` with `Some(NO_ANSWER)` so scoring downstream sees a uniform
/// integer array.
pub type AnswerSlot = Option<i32>;

/// Sentinel for "no answer", outside the valid option-index range.
pub const NO_ANSWER: i32 = -1;

/// Mutable state of one in-flight quiz attempt. Created when
/// generation succeeds, discarded on retry or navigation away.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    pub quiz_id: String,
    pub questions: Vec<Question>,

    /// One slot per question. Invariant: `answers.len() == questions.len()`.
    pub answers: Vec<AnswerSlot>,

    /// The cursor the presentation is showing.
    pub current_index: usize,

    /// Monotonically non-decreasing, reset to 0 at attempt start.
    pub elapsed_secs: u64,

    /// Budget for a single question; nudges the user, never submits.
    pub per_question_limit_secs: u64,

    /// Whole-quiz budget. Only ever increased, by extension grants.
    pub total_limit_secs: u64,

    /// Question indices that already consumed their one-time extension.
    pub extension_granted: HashSet<usize>,

    /// One-way: the one-minute warning fired.
    pub warning_fired: bool,

    /// One-way: the total budget ran out and auto-submission started.
    pub auto_submit_triggered: bool,

    /// Seconds spent on the current question; reset on cursor change.
    pub seconds_on_question: u64,

    /// Ticks remaining before the cursor auto-advances off a timed-out
    /// question.
    pub pending_advance_in: Option<u64>,
}

impl QuizAttempt {
    /// Builds a fresh attempt from the generate response, honoring
    /// backend time-limit overrides over the configured default.
    pub fn new(generated: GeneratedQuiz, default_per_question_secs: u64) -> Self {
        let total_questions = generated.questions.len();
        let per_question_limit_secs = generated
            .time_limit_per_question
            .unwrap_or(default_per_question_secs);
        let total_limit_secs = generated
            .total_time_limit
            .unwrap_or(total_questions as u64 * per_question_limit_secs);

        Self {
            quiz_id: generated.quiz_id,
            answers: vec![None; total_questions],
            questions: generated.questions,
            current_index: 0,
            elapsed_secs: 0,
            per_question_limit_secs,
            total_limit_secs,
            extension_granted: HashSet::new(),
            warning_fired: false,
            auto_submit_triggered: false,
            seconds_on_question: 0,
            pending_advance_in: None,
        }
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Slots that carry no real user pick: unanswered or sentinel.
    pub fn unanswered_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|slot| matches!(slot, None | Some(NO_ANSWER)))
            .count()
    }

    /// Fills every still-unanswered slot with the sentinel. Used only
    /// on the auto-submit path; manual submission sends the answers
    /// array exactly as stored.
    pub fn fill_unanswered_with_sentinel(&mut self) {
        for slot in &mut self.answers {
            if slot.is_none() {
                *slot = Some(NO_ANSWER);
            }
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.total_limit_secs.saturating_sub(self.elapsed_secs)
    }
}
