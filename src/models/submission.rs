// src/models/submission.rs

use serde::{Deserialize, Serialize};

use crate::models::attempt::AnswerSlot;

/// How the attempt reached the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    Manual,
    Auto,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// One slot per question. On the manual path this is the user's
    /// answers array unmodified (unanswered slots stay null); on the
    /// auto path unanswered slots carry the sentinel.
    pub answers: Vec<AnswerSlot>,
    pub time_spent_secs: u64,
    pub is_auto_submit: bool,
}

/// Per-question outcome inside a `SubmissionResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    pub user_answer: AnswerSlot,
    pub correct_answer: i32,
    pub is_correct: bool,
    pub explanation: Option<String>,
    pub time_spent_secs: u64,
}

/// Scoring produced by the backend on submit. Immutable; held
/// read-only for the results view and discarded on retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub score: u32,
    pub total_questions: usize,
    pub percentage: f64,
    pub breakdown: Vec<QuestionResult>,
    pub submission_type: SubmissionType,
}
