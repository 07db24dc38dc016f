//! The release catalog: the static table of all published artifacts.
//!
//! The catalog is expanded from a small TOML source of truth
//! (`release.toml`) that the release pipeline rewrites for every tagged
//! version: release metadata plus one digest per supported platform.
//! Everything derivable (URLs, archive names, the executable name) is
//! derived here so the generated file stays minimal.

use std::collections::HashSet;

use serde::Deserialize;
use substup_schema::{
    Arch, ArtifactError, ArtifactKey, ArtifactRecord, HostSpec, Os, ResolveError, Sha256Digest,
};
use thiserror::Error;

/// Embedded source of truth for the current release.
const RELEASE_TOML: &str = include_str!("../release.toml");

/// Top-level structure of `release.toml`.
#[derive(Debug, Deserialize)]
pub struct ReleaseManifest {
    /// The `[release]` table.
    pub release: ReleaseInfo,
}

/// Release metadata and the per-platform digest list.
#[derive(Debug, Deserialize)]
pub struct ReleaseInfo {
    /// Name of the tool, which is also the executable name inside every
    /// archive and the first segment of every archive file name.
    pub name: String,
    /// Version string without the leading `v`.
    pub version: String,
    /// Repository base URL the release archives are published under.
    pub repository: String,
    /// Project homepage.
    pub homepage: Option<String>,
    /// SPDX license identifier of the packaged tool.
    pub license: String,
    /// One-line description of the packaged tool.
    #[serde(default)]
    pub description: String,
    /// One entry per supported platform.
    pub artifacts: Vec<ReleaseArtifact>,
}

/// One platform's entry in the release manifest: just the key and digest.
#[derive(Debug, Deserialize)]
pub struct ReleaseArtifact {
    /// Operating system the archive was built for.
    pub os: Os,
    /// CPU architecture the archive was built for.
    pub arch: Arch,
    /// Published SHA-256 digest of the archive.
    pub sha256: Sha256Digest,
}

/// Errors raised while building a [`Catalog`] from a manifest.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The manifest is not valid TOML or fails field validation.
    #[error("failed to parse release manifest: {0}")]
    Parse(#[from] toml::de::Error),

    /// Two manifest entries name the same `(os, arch)` pair.
    #[error("duplicate catalog entry for {key}")]
    DuplicateKey {
        /// The repeated key.
        key: ArtifactKey,
    },

    /// An expanded record failed validation.
    #[error("invalid artifact record for {key}: {source}")]
    InvalidRecord {
        /// The key of the offending record.
        key: ArtifactKey,
        /// What was wrong with it.
        #[source]
        source: ArtifactError,
    },
}

/// The read-only table mapping platforms to release artifacts.
///
/// Construction enforces the catalog invariants: at most one record per
/// key, and every record valid. After that the catalog only hands out
/// references, so resolution can never mutate or cross-contaminate entries.
#[derive(Debug)]
pub struct Catalog {
    name: String,
    version: String,
    repository: String,
    homepage: Option<String>,
    license: String,
    description: String,
    records: Vec<ArtifactRecord>,
}

impl Catalog {
    /// The catalog for the release this binary was built against.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `release.toml` is invalid, which is a build
    /// defect, not a runtime condition.
    pub fn builtin() -> Self {
        Self::from_manifest_str(RELEASE_TOML)
            .expect("embedded release.toml must be a valid release manifest")
    }

    /// Parse a manifest document and expand it into a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the TOML is malformed, a key repeats, or
    /// an expanded record fails validation.
    pub fn from_manifest_str(input: &str) -> Result<Self, CatalogError> {
        let manifest: ReleaseManifest = toml::from_str(input)?;
        Self::from_manifest(manifest)
    }

    /// Expand a parsed manifest into a catalog.
    ///
    /// Each entry becomes a full [`ArtifactRecord`] with the release URL
    /// shape `<repository>/releases/download/v<version>/` followed by
    /// `<name>_<version>_<os>_<arch>.tar.gz`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateKey`] if two entries share a key,
    /// or [`CatalogError::InvalidRecord`] if expansion produces an invalid
    /// record.
    pub fn from_manifest(manifest: ReleaseManifest) -> Result<Self, CatalogError> {
        let release = manifest.release;
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(release.artifacts.len());

        for artifact in &release.artifacts {
            let key = ArtifactKey::new(artifact.os, artifact.arch);
            if !seen.insert(key) {
                return Err(CatalogError::DuplicateKey { key });
            }

            let record = ArtifactRecord {
                key,
                url: format!(
                    "{repo}/releases/download/v{version}/{name}_{version}_{os}_{arch}.tar.gz",
                    repo = release.repository.trim_end_matches('/'),
                    version = release.version,
                    name = release.name,
                    os = artifact.os,
                    arch = artifact.arch,
                ),
                sha256: artifact.sha256.clone(),
                binary: release.name.clone(),
                version: release.version.clone(),
            };
            record
                .validate()
                .map_err(|source| CatalogError::InvalidRecord { key, source })?;
            records.push(record);
        }

        Ok(Self {
            name: release.name,
            version: release.version,
            repository: release.repository,
            homepage: release.homepage,
            license: release.license,
            description: release.description,
            records,
        })
    }

    /// Resolve the artifact for a host: key derivation then lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnsupportedHost`] when the host maps to no
    /// key, or [`ResolveError::MissingArtifact`] when the derived key has no
    /// catalog entry. Both are permanent for the host in question.
    pub fn resolve(&self, host: &HostSpec) -> Result<&ArtifactRecord, ResolveError> {
        let key = ArtifactKey::for_host(host)?;
        self.get(key).ok_or(ResolveError::MissingArtifact { key })
    }

    /// Look up the record for an exact key.
    pub fn get(&self, key: ArtifactKey) -> Option<&ArtifactRecord> {
        self.records.iter().find(|record| record.key == key)
    }

    /// All records, in manifest order.
    pub fn records(&self) -> &[ArtifactRecord] {
        &self.records
    }

    /// Name of the packaged tool (and of its executable).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version of the release this catalog was generated for.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Repository base URL of the packaged tool.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Project homepage, if the manifest carries one.
    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    /// SPDX license identifier of the packaged tool.
    pub fn license(&self) -> &str {
        &self.license
    }

    /// One-line description of the packaged tool.
    pub fn description(&self) -> &str {
        &self.description
    }
}
