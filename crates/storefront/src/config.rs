//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LUXE_STORE_URL` - Base URL of the hosted row store
//! - `LUXE_STORE_KEY` - Store API key. Refused outright when it looks like a
//!   placeholder or has too little entropy to be a real key.

use std::collections::HashMap;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Real store keys are random; anything below this many bits per character
/// was typed by hand.
const MIN_KEY_ENTROPY: f64 = 3.3;

/// Substrings that mark a value as copied from documentation rather than
/// issued by the store (matched case-insensitively).
const PLACEHOLDER_MARKERS: &[&str] = &[
    "your-",
    "changeme",
    "placeholder",
    "example",
    "sample",
    "secret",
    "password",
    "xxx",
    "todo",
    "insert",
    "demo-key",
    "test-key",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0} is invalid: {1}")]
    Invalid(&'static str, String),
    #[error("{0} is not a usable store key: {1}")]
    RejectedKey(&'static str, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the store key.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Base URL of the hosted row store
    pub store_url: Url,
    /// Store API key, sent with every request
    pub store_key: SecretString,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("store_url", &self.store_url.as_str())
            .field("store_key", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from the environment, reading a `.env` file first
    /// when one is present.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is missing or unparseable, or when
    /// the store key fails vetting.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let store_url = parse_base_url("LUXE_STORE_URL", &require("LUXE_STORE_URL")?)?;

        let raw_key = require("LUXE_STORE_KEY")?;
        vet_store_key("LUXE_STORE_KEY", &raw_key)?;

        Ok(Self {
            store_url,
            store_key: SecretString::from(raw_key),
        })
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parse_base_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid(key, e.to_string()))
}

/// Refuse keys that are documentation placeholders or too uniform to be
/// store-issued.
fn vet_store_key(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let lowered = value.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lowered.contains(**m)) {
        return Err(ConfigError::RejectedKey(
            key,
            format!("contains placeholder text '{marker}'"),
        ));
    }

    let entropy = bits_per_char(value);
    if entropy < MIN_KEY_ENTROPY {
        return Err(ConfigError::RejectedKey(
            key,
            format!("entropy {entropy:.2} bits/char is below {MIN_KEY_ENTROPY}; real keys are random"),
        ));
    }

    Ok(())
}

/// Shannon entropy of `s` in bits per character.
fn bits_per_char(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // Key lengths sit far below f64 precision
    let total = s.chars().count() as f64;
    counts
        .values()
        .map(|&n| {
            #[allow(clippy::cast_precision_loss)] // Bounded by the total above
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}
