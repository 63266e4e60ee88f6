// src/models/explanation.rs

use serde::{Deserialize, Serialize};

/// AI-generated concept explanation as returned by the backend.
/// Opaque to the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationPayload {
    pub title: String,
    pub explanation: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// One follow-up exchange in an explanation's chat thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

/// Persisted follow-up conversation for an explanation. Stored under
/// the same id prefix as the explanation entry, cleared together with
/// it, or alone via the chat-only reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatThread {
    pub turns: Vec<ChatTurn>,
}
