// src/models/question.rs

use serde::{Deserialize, Serialize};

/// A single multiple-choice question as served by the backend.
/// Fixed and immutable once the quiz is generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// The text content of the question.
    pub prompt: String,

    /// Ordered list of options (e.g., ["Option A", "Option B"]).
    pub options: Vec<String>,
}

/// DTO returned by `QuizBackend::generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuiz {
    /// Opaque identifier assigned by the backend.
    pub quiz_id: String,

    pub questions: Vec<Question>,
    pub total_questions: usize,

    /// Optional backend override for the per-question budget.
    #[serde(default)]
    pub time_limit_per_question: Option<u64>,

    /// Optional backend override for the whole-quiz budget.
    #[serde(default)]
    pub total_time_limit: Option<u64>,
}
