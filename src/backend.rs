// src/backend.rs

use std::fmt;

use async_trait::async_trait;

use crate::models::explanation::ExplanationPayload;
use crate::models::question::GeneratedQuiz;
use crate::models::submission::{SubmissionResult, SubmitRequest};

/// Failure reported by the REST collaborator. Transport concerns
/// (timeouts, retries, status codes) live behind the trait; the core
/// only sees a message.
#[derive(Debug, Clone)]
pub struct BackendError(pub String);

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BackendError {}

/// The REST backend as seen by the quiz core. The wire format is owned
/// by the external API; these are opaque contracts.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Generates a new quiz for the session.
    async fn generate(
        &self,
        session_id: &str,
        question_count: usize,
    ) -> Result<GeneratedQuiz, BackendError>;

    /// Submits an attempt for scoring.
    async fn submit(
        &self,
        quiz_id: &str,
        request: SubmitRequest,
    ) -> Result<SubmissionResult, BackendError>;

    /// Fire-and-forget telemetry: the user moved onto a question.
    /// Failures are logged by the caller, never surfaced or retried.
    async fn track_question_time(
        &self,
        quiz_id: &str,
        question_index: usize,
    ) -> Result<(), BackendError>;

    /// Fetches an AI-generated concept explanation for a question.
    /// Consumed by the explanation cache-miss path only.
    async fn fetch_explanation(
        &self,
        question_text: &str,
    ) -> Result<ExplanationPayload, BackendError>;

    /// Asks a follow-up question against an explanation context.
    async fn followup_chat(&self, context: &str, question: &str) -> Result<String, BackendError>;
}
