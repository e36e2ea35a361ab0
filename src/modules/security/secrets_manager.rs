//! Secrets validation and sanitized logging
//!
//! Ensures API keys configured for scrapers are never logged in plaintext.

use std::fmt;

/// Wrapper for secret strings that redacts on Debug/Display
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Get the actual secret value (use sparingly!)
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Check if the secret is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl<'de> serde::Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Validates optional API keys and sanitizes secrets before they reach a
/// log line.
pub struct SecretValidator;

impl SecretValidator {
    /// Read an optional API key env var, warning (not failing) if absent —
    /// scrapers that need a key are expected to degrade to `failed` rather
    /// than abort the whole run.
    pub fn validate_optional_api_key(var_name: &str) -> Option<SecretString> {
        match std::env::var(var_name) {
            Ok(value) if !value.is_empty() => Some(SecretString::new(value)),
            _ => {
                tracing::warn!("{} not set; scrapers requiring it will report failed", var_name);
                None
            }
        }
    }

    /// Sanitize a string for safe logging (truncate and redact middle).
    /// Operates on chars rather than bytes so a secret containing
    /// multi-byte UTF-8 never splits a character mid-sequence.
    pub fn sanitize_for_logging(secret: &str, prefix_len: usize, suffix_len: usize) -> String {
        let chars: Vec<char> = secret.chars().collect();
        if chars.len() <= prefix_len + suffix_len {
            return "[REDACTED]".to_string();
        }

        let prefix: String = chars[..prefix_len].iter().collect();
        let suffix: String = chars[chars.len() - suffix_len..].iter().collect();
        let redacted_len = chars.len() - prefix_len - suffix_len;

        format!("{}***({} chars)***{}", prefix, redacted_len, suffix)
    }
}
