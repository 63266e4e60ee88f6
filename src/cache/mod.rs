// src/cache/mod.rs

pub mod store;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::QuizError;
use crate::models::explanation::{ChatThread, ExplanationPayload};
use crate::utils::key::explanation_key;
use store::{KeyValueStore, StoreError};

const ENTRY_PREFIX: &str = "explanation:";
const MARKER_SUFFIX: &str = ":ts";
const CHAT_SUFFIX: &str = ":chat";

/// Persisted shape of one cache entry.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    data: ExplanationPayload,
    stored_at: i64,
    expires_at: i64,
}

/// Expiring local cache for AI-generated explanations and their
/// follow-up chat threads, keyed by a hash of the question text.
///
/// Caching is best-effort: reads degrade to a miss when the store is
/// unavailable, and writes report failure without throwing. The
/// authoritative copy always lives behind the backend fetch.
///
/// Layout per id `K`: `explanation:K` holds the entry JSON,
/// `explanation:K:ts` a lightweight timestamp marker, and
/// `explanation:K:chat` the chat thread. The three records are always
/// removed together on clear and on the expiry check.
pub struct ExplanationCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
}

impl ExplanationCache {
    /// Seven-day TTL in epoch milliseconds.
    pub const DEFAULT_TTL_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(store, clock, Self::DEFAULT_TTL_MILLIS)
    }

    pub fn with_ttl(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl_millis: i64) -> Self {
        Self {
            store,
            clock,
            ttl_millis,
        }
    }

    /// Deterministic cache id for a question text.
    pub fn key_for(question_text: &str) -> String {
        explanation_key(question_text)
    }

    /// Returns the cached payload if present and unexpired. An expired
    /// entry is deleted (chat record included) as a side effect; the
    /// caller cannot tell an expired entry from a missing one. Storage
    /// failures are logged and degrade to a miss.
    pub fn get(&self, key: &str) -> Option<ExplanationPayload> {
        let raw = match self.store.get(&entry_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("explanation cache read failed: {}", e);
                return None;
            }
        };

        let entry: StoredEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("dropping undecodable cache entry {}: {}", key, e);
                self.remove_records(key);
                return None;
            }
        };

        if self.clock.now_millis() > entry.expires_at {
            self.remove_records(key);
            return None;
        }

        Some(entry.data)
    }

    /// Stores the payload with a fresh TTL, overwriting any prior
    /// entry for the key unconditionally.
    pub fn put(&self, key: &str, payload: &ExplanationPayload) -> Result<(), QuizError> {
        let now = self.clock.now_millis();
        let entry = StoredEntry {
            data: payload.clone(),
            stored_at: now,
            expires_at: now + self.ttl_millis,
        };

        self.store
            .put(&entry_key(key), &serde_json::to_string(&entry)?)?;
        self.store.put(&marker_key(key), &now.to_string())?;
        Ok(())
    }

    /// Reads the follow-up chat thread. Best-effort, same as `get`.
    pub fn get_chat(&self, key: &str) -> Option<ChatThread> {
        let raw = match self.store.get(&chat_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("chat thread read failed: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(thread) => Some(thread),
            Err(e) => {
                tracing::warn!("dropping undecodable chat thread {}: {}", key, e);
                let _ = self.store.delete(&chat_key(key));
                None
            }
        }
    }

    pub fn put_chat(&self, key: &str, thread: &ChatThread) -> Result<(), QuizError> {
        self.store
            .put(&chat_key(key), &serde_json::to_string(thread)?)?;
        Ok(())
    }

    /// Removes the entry, its timestamp marker, and its chat record.
    /// Idempotent: clearing a missing key is a no-op.
    pub fn clear_entry(&self, key: &str) -> Result<(), QuizError> {
        self.try_remove_records(key)?;
        Ok(())
    }

    /// Removes only the chat record, preserving the explanation.
    pub fn clear_chat_only(&self, key: &str) -> Result<(), QuizError> {
        self.store.delete(&chat_key(key))?;
        Ok(())
    }

    /// Sweeps every expired entry triple out of the store. Returns the
    /// number of entries removed.
    pub fn purge_expired(&self) -> Result<usize, QuizError> {
        let now = self.clock.now_millis();
        let mut removed = 0;

        for stored_key in self.store.keys_with_prefix(ENTRY_PREFIX)? {
            let id = &stored_key[ENTRY_PREFIX.len()..];
            if id.contains(':') {
                continue; // marker or chat record, handled with its entry
            }

            let Some(raw) = self.store.get(&stored_key)? else {
                continue;
            };

            let expired = match serde_json::from_str::<StoredEntry>(&raw) {
                Ok(entry) => now > entry.expires_at,
                // undecodable entries are dead weight, sweep them too
                Err(_) => true,
            };

            if expired {
                let id = id.to_string();
                self.try_remove_records(&id)?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    fn try_remove_records(&self, key: &str) -> Result<(), StoreError> {
        self.store.delete(&entry_key(key))?;
        self.store.delete(&marker_key(key))?;
        self.store.delete(&chat_key(key))?;
        Ok(())
    }

    fn remove_records(&self, key: &str) {
        if let Err(e) = self.try_remove_records(key) {
            tracing::warn!("failed to evict cache records for {}: {}", key, e);
        }
    }
}

fn entry_key(key: &str) -> String {
    format!("{ENTRY_PREFIX}{key}")
}

fn marker_key(key: &str) -> String {
    format!("{ENTRY_PREFIX}{key}{MARKER_SUFFIX}")
}

fn chat_key(key: &str) -> String {
    format!("{ENTRY_PREFIX}{key}{CHAT_SUFFIX}")
}
