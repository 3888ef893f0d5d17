//! API key material: generation, hashing, shape recognition.
//!
//! Keys are five dictionary words joined by hyphens
//! (`ember-willow-basket-chrome-tiger`). Only the SHA-256 hash of a key is
//! ever stored; the plaintext exists in the issuing response and in the
//! user's message, nowhere else.

use std::sync::OnceLock;

use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Words per generated key.
pub const KEY_WORD_COUNT: usize = 5;

/// Bundled dictionary, one word per line, 2048 entries. The power-of-two
/// size keeps the `u32` modulo draw in [`KeyGenerator::generate`] exactly
/// uniform.
const WORDLIST_RAW: &str = include_str!("wordlist.txt");

static BUNDLED_WORDS: OnceLock<Vec<&'static str>> = OnceLock::new();

/// The compiled-in key dictionary.
pub fn bundled_words() -> &'static [&'static str] {
    BUNDLED_WORDS.get_or_init(|| {
        WORDLIST_RAW
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .collect()
    })
}

/// Errors from key generation.
#[derive(Debug, thiserror::Error)]
pub enum KeyGenError {
    /// The operating system's secure random source failed. Never papered
    /// over with a weaker source.
    #[error("secure random source unavailable: {0}")]
    RandomSource(String),
}

/// Draws random keys from an injected dictionary.
///
/// The dictionary is injected rather than read from a global so tests can
/// substitute a tiny fixed list. Dictionary length must be a power of two.
#[derive(Debug, Clone, Copy)]
pub struct KeyGenerator {
    words: &'static [&'static str],
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(bundled_words())
    }
}

impl KeyGenerator {
    pub fn new(words: &'static [&'static str]) -> Self {
        debug_assert!(
            words.len().is_power_of_two(),
            "key dictionary length must be a power of two"
        );
        Self { words }
    }

    /// Generate one key: five independent uniform draws, hyphen-joined.
    ///
    /// # Errors
    ///
    /// Returns [`KeyGenError::RandomSource`] if the OS random source is
    /// unavailable; there is no fallback.
    pub fn generate(&self) -> Result<String, KeyGenError> {
        let mut picks = Vec::with_capacity(KEY_WORD_COUNT);
        for _ in 0..KEY_WORD_COUNT {
            let raw = OsRng
                .try_next_u32()
                .map_err(|e| KeyGenError::RandomSource(e.to_string()))?;
            picks.push(self.words[raw as usize % self.words.len()]);
        }
        Ok(picks.join("-"))
    }
}

/// One-way digest of key material as stored and looked up:
/// `"sha256:" + 64 lowercase hex chars`. Deterministic.
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Whether a bare message has the shape of an API key: exactly five
/// non-empty, all-lowercase-alphabetic tokens joined by hyphens.
///
/// The wire layer uses this to decide whether to treat a plain message as an
/// authentication attempt instead of chatter.
pub fn looks_like_api_key(text: &str) -> bool {
    let trimmed = text.trim();
    let mut count = 0;
    for token in trimmed.split('-') {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_lowercase()) {
            return false;
        }
        count += 1;
    }
    count == KEY_WORD_COUNT
}
