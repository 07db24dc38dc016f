//! Downloadable release artifacts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hash::Sha256Digest;
use crate::platform::ArtifactKey;

/// Errors that can occur when validating an [`ArtifactRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactError {
    /// A required field (url, binary, or version) is empty.
    #[error("Empty field: {0}")]
    EmptyField(&'static str),

    /// The download URL is malformed or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// One downloadable release archive and everything needed to install it.
///
/// Records are expanded from the release manifest at catalog construction
/// and are immutable afterwards: resolution hands out references, never
/// copies that could drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// The platform this artifact was built for.
    pub key: ArtifactKey,

    /// Download URL for the archive.
    pub url: String,

    /// SHA-256 digest of the archive bytes as published with the release.
    pub sha256: Sha256Digest,

    /// Name of the executable inside the archive.
    pub binary: String,

    /// Version string of the release this artifact belongs to.
    pub version: String,
}

impl ArtifactRecord {
    /// Validates the record's required fields.
    ///
    /// The digest needs no check here: [`Sha256Digest`] cannot be
    /// constructed invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::EmptyField`] if `url`, `binary`, or
    /// `version` is empty, or [`ArtifactError::InvalidUrl`] if the URL does
    /// not start with `http`.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.url.is_empty() {
            return Err(ArtifactError::EmptyField("url"));
        }
        if self.binary.is_empty() {
            return Err(ArtifactError::EmptyField("binary"));
        }
        if self.version.is_empty() {
            return Err(ArtifactError::EmptyField("version"));
        }
        if !self.url.starts_with("http") {
            return Err(ArtifactError::InvalidUrl(
                "Must start with http(s)".to_string(),
            ));
        }

        Ok(())
    }

    /// The archive's file name, i.e. the last path segment of the URL.
    pub fn filename(&self) -> &str {
        self.url.split('/').next_back().unwrap_or(&self.url)
    }
}
