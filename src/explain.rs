// src/explain.rs

use std::sync::Arc;

use crate::backend::QuizBackend;
use crate::cache::ExplanationCache;
use crate::error::QuizError;
use crate::models::explanation::{ChatTurn, ExplanationPayload};

/// Explanation retrieval with the local cache layered over the
/// authoritative backend fetch. Cache failures never block the fetch
/// path; they only cost the caching benefit.
pub struct ExplanationService {
    backend: Arc<dyn QuizBackend>,
    cache: ExplanationCache,
}

impl ExplanationService {
    pub fn new(backend: Arc<dyn QuizBackend>, cache: ExplanationCache) -> Self {
        Self { backend, cache }
    }

    /// Returns the explanation for a question, from cache when
    /// possible, otherwise fetched and cached best-effort.
    pub async fn explain(&self, question_text: &str) -> Result<ExplanationPayload, QuizError> {
        let key = ExplanationCache::key_for(question_text);

        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let payload = self.backend.fetch_explanation(question_text).await?;

        if let Err(e) = self.cache.put(&key, &payload) {
            tracing::warn!("failed to cache explanation: {}", e);
        }

        Ok(payload)
    }

    /// Asks a follow-up question against the explanation and appends
    /// the exchange to the persisted chat thread.
    pub async fn follow_up(
        &self,
        question_text: &str,
        question: &str,
    ) -> Result<String, QuizError> {
        let key = ExplanationCache::key_for(question_text);
        let context = self.explain(question_text).await?.explanation;

        let answer = self.backend.followup_chat(&context, question).await?;

        let mut thread = self.cache.get_chat(&key).unwrap_or_default();
        thread.turns.push(ChatTurn {
            question: question.to_string(),
            answer: answer.clone(),
        });
        if let Err(e) = self.cache.put_chat(&key, &thread) {
            tracing::warn!("failed to persist chat thread: {}", e);
        }

        Ok(answer)
    }

    /// Drops the follow-up conversation, keeping the explanation.
    pub fn reset_chat(&self, question_text: &str) -> Result<(), QuizError> {
        self.cache
            .clear_chat_only(&ExplanationCache::key_for(question_text))
    }

    /// User-initiated clear of the whole cached record.
    pub fn clear(&self, question_text: &str) -> Result<(), QuizError> {
        self.cache
            .clear_entry(&ExplanationCache::key_for(question_text))
    }

    pub fn cache(&self) -> &ExplanationCache {
        &self.cache
    }
}
