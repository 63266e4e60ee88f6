// src/utils/key.rs

/// Derives the cache id for a question: whitespace-normalized,
/// lowercased text hashed to a blake3 hex digest. The same question
/// text always yields the same id; collisions are treated as
/// practically impossible for this non-adversarial use.
pub fn explanation_key(question_text: &str) -> String {
    let normalized = question_text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    blake3::hash(normalized.as_bytes()).to_hex().to_string()
}
