// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Default per-question time budget, shared by all questions.
pub const DEFAULT_PER_QUESTION_LIMIT_SECS: u64 = 180;

/// Absolute "one minute remaining" warning threshold.
pub const DEFAULT_WARNING_THRESHOLD_SECS: u64 = 60;

/// Short pause before the cursor auto-advances off a timed-out question.
pub const DEFAULT_AUTO_ADVANCE_DELAY_SECS: u64 = 2;

/// Explanation cache entries live for a week.
pub const DEFAULT_CACHE_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub per_question_limit_secs: u64,
    pub warning_threshold_secs: u64,
    pub auto_advance_delay_secs: u64,
    pub cache_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            per_question_limit_secs: env_or("QUIZ_PER_QUESTION_LIMIT_SECS", DEFAULT_PER_QUESTION_LIMIT_SECS),
            warning_threshold_secs: env_or("QUIZ_WARNING_THRESHOLD_SECS", DEFAULT_WARNING_THRESHOLD_SECS),
            auto_advance_delay_secs: env_or("QUIZ_AUTO_ADVANCE_DELAY_SECS", DEFAULT_AUTO_ADVANCE_DELAY_SECS),
            cache_ttl_days: env_or("QUIZ_CACHE_TTL_DAYS", DEFAULT_CACHE_TTL_DAYS),
        }
    }

    /// Cache TTL in epoch milliseconds.
    pub fn cache_ttl_millis(&self) -> i64 {
        self.cache_ttl_days * 24 * 60 * 60 * 1000
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            per_question_limit_secs: DEFAULT_PER_QUESTION_LIMIT_SECS,
            warning_threshold_secs: DEFAULT_WARNING_THRESHOLD_SECS,
            auto_advance_delay_secs: DEFAULT_AUTO_ADVANCE_DELAY_SECS,
            cache_ttl_days: DEFAULT_CACHE_TTL_DAYS,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
