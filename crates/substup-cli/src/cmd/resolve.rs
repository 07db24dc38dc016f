//! Resolve command: print which artifact a host maps to.
//!
//! With no flags this introspects the actual host. The overrides exist so
//! the full decision table can be exercised from any machine, which is also
//! how release tooling sanity-checks a new catalog.

use anyhow::{Result, bail};
use substup_core::Catalog;
use substup_schema::{CpuFamily, HostOs, HostSpec, PointerWidth};

/// Resolve the (possibly overridden) host and print the matching record.
pub fn resolve(os: Option<&str>, cpu: Option<&str>, bits: Option<u8>, json: bool) -> Result<()> {
    let detected = HostSpec::detect();

    let width = match bits {
        None => detected.width,
        Some(32) => PointerWidth::Bits32,
        Some(64) => PointerWidth::Bits64,
        Some(other) => bail!("--bits must be 32 or 64, got {other}"),
    };
    let host = HostSpec::new(
        os.map_or(detected.os, HostOs::from_name),
        cpu.map_or(detected.cpu, CpuFamily::from_name),
        width,
    );

    let catalog = Catalog::builtin();
    let record = catalog.resolve(&host)?;

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!("{} v{} -> {}", record.binary, record.version, record.key);
        println!("  url:    {}", record.url);
        println!("  sha256: {}", record.sha256);
    }
    Ok(())
}
