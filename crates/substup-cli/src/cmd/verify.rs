//! Verify command: check a local archive against its published digest.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use sha2::{Digest, Sha256};
use substup_core::Catalog;
use substup_schema::HostSpec;

/// Compare a downloaded archive's SHA-256 to the catalog's digest.
///
/// The record to compare against is picked by file name when the archive
/// follows the release naming convention; otherwise the host's own record
/// is used.
pub fn verify(file: &Path) -> Result<()> {
    let catalog = Catalog::builtin();

    let file_name = file
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let record = match catalog
        .records()
        .iter()
        .find(|r| r.filename() == file_name)
    {
        Some(record) => record,
        None => catalog
            .resolve(&HostSpec::detect())
            .context("file name matches no catalog artifact and this host does not resolve")?,
    };

    let computed = sha256_file(file)?;
    if record.sha256.matches(&computed) {
        println!("OK: {} matches {}", file.display(), record.key);
        Ok(())
    } else {
        bail!(
            "digest mismatch for {}\n  expected: {}\n  got:      {computed}",
            file.display(),
            record.sha256
        );
    }
}

/// Compute the SHA-256 of a file without loading it into memory.
fn sha256_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let count = file
            .read(&mut buffer)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buffer[..count]);
    }

    Ok(hex::encode(hasher.finalize()))
}
