//! Validated digest strings.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Why a digest string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// The hex portion was not exactly 64 characters long.
    #[error("invalid SHA256 digest: expected 64 hex characters, got {len} in '{input}'")]
    BadLength {
        /// The offending input.
        input: String,
        /// Its hex length.
        len: usize,
    },

    /// The hex portion contained a non-hex character.
    #[error("invalid SHA256 digest: non-hex characters in '{input}'")]
    BadCharacters {
        /// The offending input.
        input: String,
    },
}

/// A validated SHA-256 digest (64 hex characters).
///
/// The newtype ensures every digest in the system is validated at
/// construction and at deserialization time, preventing invalid hex strings
/// from propagating into integrity checks. The stored form is lowercase;
/// an optional `sha256:` prefix is accepted and stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new `Sha256Digest`, validating the input.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the hex portion is not exactly 64 ASCII hex
    /// characters.
    pub fn new(s: impl Into<String>) -> Result<Self, HashError> {
        let s = s.into();
        let hex = s.strip_prefix("sha256:").unwrap_or(&s);

        if hex.len() != 64 {
            return Err(HashError::BadLength {
                len: hex.len(),
                input: s,
            });
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HashError::BadCharacters { input: s });
        }

        Ok(Self(hex.to_lowercase()))
    }

    /// Get the digest as a lowercase hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this digest equals a freshly computed hex string.
    ///
    /// Comparison is case-insensitive on the other side so callers can pass
    /// hex output from any encoder without normalizing first.
    pub fn matches(&self, computed_hex: &str) -> bool {
        self.0.eq_ignore_ascii_case(computed_hex)
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "d1103a4332f8f6e332237682f019e91ec254d0a56a1ca8b72a697378b63e29ac";

    #[test]
    fn accepts_64_hex_chars() {
        let digest = Sha256Digest::new(SAMPLE).unwrap();
        assert_eq!(digest.as_str(), SAMPLE);
    }

    #[test]
    fn strips_sha256_prefix() {
        let digest = Sha256Digest::new(format!("sha256:{SAMPLE}")).unwrap();
        assert_eq!(digest.as_str(), SAMPLE);
    }

    #[test]
    fn lowercases_input() {
        let digest = Sha256Digest::new(SAMPLE.to_uppercase()).unwrap();
        assert_eq!(digest.as_str(), SAMPLE);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = Sha256Digest::new("abc123").unwrap_err();
        assert!(matches!(err, HashError::BadLength { len: 6, .. }));
    }

    #[test]
    fn rejects_non_hex() {
        let bad = format!("{}zz", &SAMPLE[..62]);
        let err = Sha256Digest::new(bad).unwrap_err();
        assert!(matches!(err, HashError::BadCharacters { .. }));
    }

    #[test]
    fn matches_is_case_insensitive() {
        let digest = Sha256Digest::new(SAMPLE).unwrap();
        assert!(digest.matches(&SAMPLE.to_uppercase()));
        assert!(!digest.matches(&"0".repeat(64)));
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<Sha256Digest, _> = serde_json::from_str(&format!("\"{SAMPLE}\""));
        assert_eq!(ok.unwrap().as_str(), SAMPLE);

        let bad: Result<Sha256Digest, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn serialize_is_transparent() {
        let digest = Sha256Digest::new(SAMPLE).unwrap();
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));
    }
}
