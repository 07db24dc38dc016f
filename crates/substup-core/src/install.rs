//! Installation pipeline: resolve, fetch, verify, extract, place.
//!
//! The pipeline fails closed at every step: nothing is extracted before the
//! digest check passes, and the installed binary is replaced atomically via
//! a staged copy so a crash mid-install never leaves a half-written
//! executable on the path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use substup_schema::{HostSpec, ResolveError, Sha256Digest};
use thiserror::Error;

use crate::Reporter;
use crate::catalog::Catalog;
use crate::io::download::{self, DownloadError};
use crate::io::extract::{self, ExtractError};
use crate::paths;

/// Domain-specific errors for the installation pipeline.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("no compatible artifact: {0}")]
    Resolve(#[from] ResolveError),

    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("archive did not contain the '{binary}' executable")]
    BinaryMissing { binary: String },

    #[error("receipt error: {0}")]
    Receipt(String),
}

/// What an install run actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The binary was downloaded, verified, and placed.
    Installed,
    /// The receipt already matches the catalog and the binary is present.
    UpToDate,
}

/// Record of what is currently installed, written next to the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Name of the installed executable.
    pub name: String,
    /// Version that was installed.
    pub version: String,
    /// Digest of the archive it came from.
    pub sha256: Sha256Digest,
}

impl Receipt {
    /// Load a receipt, returning `None` if none has been written yet.
    pub fn load(path: &Path) -> Result<Option<Self>, InstallError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let receipt =
            toml::from_str(&content).map_err(|e| InstallError::Receipt(e.to_string()))?;
        Ok(Some(receipt))
    }

    /// Write the receipt, creating parent directories as needed.
    pub fn store(&self, path: &Path) -> Result<(), InstallError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| InstallError::Receipt(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Install the catalog's artifact for `host` under `home`.
///
/// Unless `force` is set, a receipt matching the catalog version with the
/// binary still on disk short-circuits to [`InstallOutcome::UpToDate`].
///
/// # Errors
///
/// Returns [`InstallError`] if the host is unsupported, the download fails
/// or fails verification, the archive lacks the expected executable, or any
/// filesystem step fails.
pub async fn install<R: Reporter>(
    catalog: &Catalog,
    host: &HostSpec,
    home: &Path,
    force: bool,
    reporter: &R,
) -> Result<InstallOutcome, InstallError> {
    let record = catalog.resolve(host)?;

    let bin_dir = paths::bin_path_in(home);
    let target = bin_dir.join(&record.binary);
    let receipt_path = paths::receipt_path_in(home);

    if !force
        && let Some(receipt) = Receipt::load(&receipt_path)?
        && receipt.version == record.version
        && target.exists()
    {
        reporter.info(&format!(
            "{} v{} is already installed",
            record.binary, record.version
        ));
        return Ok(InstallOutcome::UpToDate);
    }

    tracing::debug!(url = %record.url, key = %record.key, "resolved artifact");

    let client = download::client()?;
    let archive_path = paths::cache_path_in(home).join(record.filename());
    download::download_and_verify(&client, &record.url, &archive_path, &record.sha256, reporter)
        .await?;

    reporter.extracting(record.filename());
    let scratch_root = paths::tmp_path_in(home);
    fs::create_dir_all(&scratch_root)?;
    let scratch = tempfile::tempdir_in(&scratch_root)?;

    let files = {
        let archive = archive_path.clone();
        let dest = scratch.path().to_path_buf();
        tokio::task::spawn_blocking(move || extract::extract_tar_gz(&archive, &dest))
            .await
            .map_err(io::Error::other)??
    };

    let found = extract::find_binary(&files, &record.binary).ok_or_else(|| {
        InstallError::BinaryMissing {
            binary: record.binary.clone(),
        }
    })?;

    reporter.installing(&record.binary, &record.version);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&found.absolute_path, fs::Permissions::from_mode(0o755))?;
    }

    // Stage on the same volume as the target, then replace atomically.
    fs::create_dir_all(&bin_dir)?;
    let staged = target.with_extension("new");
    fs::copy(&found.absolute_path, &staged)?;
    fs::rename(&staged, &target)?;

    Receipt {
        name: record.binary.clone(),
        version: record.version.clone(),
        sha256: record.sha256.clone(),
    }
    .store(&receipt_path)?;

    check_path(&bin_dir, &target, &record.binary, reporter);

    reporter.done(&format!("installed {} v{}", record.binary, record.version));
    Ok(InstallOutcome::Installed)
}

/// Remove the installed binary and its receipt.
///
/// Returns `true` if a binary was actually removed.
///
/// # Errors
///
/// Returns [`InstallError::Io`] if removal fails for a reason other than
/// the files already being absent.
pub fn uninstall<R: Reporter>(
    catalog: &Catalog,
    home: &Path,
    reporter: &R,
) -> Result<bool, InstallError> {
    let target = paths::bin_path_in(home).join(catalog.name());
    let receipt_path = paths::receipt_path_in(home);

    let mut removed = false;
    if target.exists() {
        reporter.removing(catalog.name());
        fs::remove_file(&target)?;
        removed = true;
    }
    if receipt_path.exists() {
        fs::remove_file(&receipt_path)?;
    }

    if removed {
        reporter.done(&format!("removed {}", catalog.name()));
    } else {
        reporter.info(&format!("{} is not installed", catalog.name()));
    }
    Ok(removed)
}

/// Returns the path that currently wins a `$PATH` lookup for `name`, if it
/// is not the binary we installed.
pub fn shadowing_binary(target: &Path, name: &str) -> Option<PathBuf> {
    let found = which::which(name).ok()?;
    (found != target).then_some(found)
}

/// Warn when the installed binary will not be the one a shell finds.
fn check_path<R: Reporter>(bin_dir: &Path, target: &Path, name: &str, reporter: &R) {
    match which::which(name) {
        Ok(found) if found == *target => {}
        Ok(found) => {
            tracing::warn!(winner = %found.display(), "installed binary is shadowed");
            reporter.warning(&format!(
                "'{name}' currently resolves to {} which shadows {}",
                found.display(),
                target.display()
            ));
        }
        Err(_) => {
            reporter.warning(&format!(
                "{} is not on your PATH; add it to run '{name}'",
                bin_dir.display()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullReporter;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use sha2::{Digest, Sha256};
    use substup_schema::{CpuFamily, HostOs, PointerWidth};

    fn linux_amd64() -> HostSpec {
        HostSpec::new(HostOs::Linux, CpuFamily::Intel, PointerWidth::Bits64)
    }

    /// A tar.gz holding a single executable named `subst`.
    fn archive_bytes(contents: &[u8]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, "subst", contents).unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn hex_digest(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    /// Catalog with one linux/amd64 artifact served by the given base URL.
    fn test_catalog(base_url: &str, sha256: &str) -> Catalog {
        let manifest = format!(
            r#"
            [release]
            name = "subst"
            version = "0.0.1"
            repository = "{base_url}"
            license = "Apache-2.0"

            [[release.artifacts]]
            os = "linux"
            arch = "amd64"
            sha256 = "{sha256}"
            "#
        );
        Catalog::from_manifest_str(&manifest).unwrap()
    }

    #[tokio::test]
    async fn installs_end_to_end_from_a_served_archive() {
        let mut server = mockito::Server::new_async().await;
        let payload = b"#!/bin/sh\necho subst\n";
        let archive = archive_bytes(payload);
        let digest = hex_digest(&archive);

        let catalog = test_catalog(&server.url(), &digest);
        let path = "/releases/download/v0.0.1/subst_0.0.1_linux_amd64.tar.gz";
        let mock = server
            .mock("GET", path)
            .with_status(200)
            .with_body(archive)
            .create_async()
            .await;

        let home = tempfile::tempdir().unwrap();
        let outcome = install(
            &catalog,
            &linux_amd64(),
            home.path(),
            false,
            &NullReporter,
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(outcome, InstallOutcome::Installed);

        let installed = home.path().join("bin").join("subst");
        assert_eq!(fs::read(&installed).unwrap(), payload);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&installed).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        let receipt = Receipt::load(&home.path().join("receipt.toml"))
            .unwrap()
            .unwrap();
        assert_eq!(receipt.name, "subst");
        assert_eq!(receipt.version, "0.0.1");
        assert_eq!(receipt.sha256.as_str(), digest);

        // A second run is a no-op thanks to the receipt.
        let again = install(
            &catalog,
            &linux_amd64(),
            home.path(),
            false,
            &NullReporter,
        )
        .await
        .unwrap();
        assert_eq!(again, InstallOutcome::UpToDate);
    }

    #[tokio::test]
    async fn tampered_archive_never_reaches_the_bin_dir() {
        let mut server = mockito::Server::new_async().await;
        let archive = archive_bytes(b"legit");
        let digest = hex_digest(&archive);

        let catalog = test_catalog(&server.url(), &digest);
        let path = "/releases/download/v0.0.1/subst_0.0.1_linux_amd64.tar.gz";
        let _mock = server
            .mock("GET", path)
            .with_status(200)
            .with_body(archive_bytes(b"evil replacement"))
            .create_async()
            .await;

        let home = tempfile::tempdir().unwrap();
        let err = install(
            &catalog,
            &linux_amd64(),
            home.path(),
            false,
            &NullReporter,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            InstallError::Download(DownloadError::DigestMismatch { .. })
        ));
        assert!(!home.path().join("bin").join("subst").exists());
        assert!(!home.path().join("receipt.toml").exists());
    }

    #[tokio::test]
    async fn archive_without_the_binary_fails() {
        let mut server = mockito::Server::new_async().await;

        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(4);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, "README", &b"docs"[..]).unwrap();
        let archive = builder.into_inner().unwrap().finish().unwrap();
        let digest = hex_digest(&archive);

        let catalog = test_catalog(&server.url(), &digest);
        let path = "/releases/download/v0.0.1/subst_0.0.1_linux_amd64.tar.gz";
        let _mock = server
            .mock("GET", path)
            .with_status(200)
            .with_body(archive)
            .create_async()
            .await;

        let home = tempfile::tempdir().unwrap();
        let err = install(
            &catalog,
            &linux_amd64(),
            home.path(),
            false,
            &NullReporter,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, InstallError::BinaryMissing { binary } if binary == "subst"));
    }

    #[tokio::test]
    async fn unsupported_host_fails_before_any_io() {
        let catalog = test_catalog("https://example.com", &"0".repeat(64));
        let home = tempfile::tempdir().unwrap();
        let host = HostSpec::new(HostOs::Windows, CpuFamily::Intel, PointerWidth::Bits64);

        let err = install(&catalog, &host, home.path(), false, &NullReporter)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InstallError::Resolve(ResolveError::UnsupportedHost { .. })
        ));
        // No directories were created for a refused host.
        assert!(!home.path().join("cache").exists());
    }

    #[test]
    fn receipt_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.toml");
        let receipt = Receipt {
            name: "subst".into(),
            version: "0.0.1-alpha8".into(),
            sha256: Sha256Digest::new("a".repeat(64)).unwrap(),
        };

        receipt.store(&path).unwrap();
        let loaded = Receipt::load(&path).unwrap().unwrap();
        assert_eq!(loaded, receipt);
    }

    #[test]
    fn missing_receipt_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Receipt::load(&dir.path().join("receipt.toml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn corrupt_receipt_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.toml");
        fs::write(&path, "not = [toml").unwrap();
        assert!(matches!(
            Receipt::load(&path).unwrap_err(),
            InstallError::Receipt(_)
        ));
    }

    #[test]
    fn uninstall_removes_binary_and_receipt() {
        let catalog = test_catalog("https://example.com", &"0".repeat(64));
        let home = tempfile::tempdir().unwrap();
        let bin_dir = home.path().join("bin");
        fs::create_dir_all(&bin_dir).unwrap();
        fs::write(bin_dir.join("subst"), b"elf").unwrap();
        Receipt {
            name: "subst".into(),
            version: "0.0.1".into(),
            sha256: Sha256Digest::new("a".repeat(64)).unwrap(),
        }
        .store(&home.path().join("receipt.toml"))
        .unwrap();

        let removed = uninstall(&catalog, home.path(), &NullReporter).unwrap();
        assert!(removed);
        assert!(!bin_dir.join("subst").exists());
        assert!(!home.path().join("receipt.toml").exists());

        let removed_again = uninstall(&catalog, home.path(), &NullReporter).unwrap();
        assert!(!removed_again);
    }
}
