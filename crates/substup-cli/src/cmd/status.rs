//! Status command: compare the receipt against the catalog.

use anyhow::Result;
use substup_core::install::{Receipt, shadowing_binary};
use substup_core::{Catalog, paths};

/// Report the installed version, binary health, and available updates.
pub fn status() -> Result<()> {
    let catalog = Catalog::builtin();
    let home = paths::substup_home();
    let target = paths::bin_path_in(&home).join(catalog.name());

    let Some(receipt) = Receipt::load(&paths::receipt_path_in(&home))? else {
        println!(
            "{} is not installed (run `substup install`)",
            catalog.name()
        );
        return Ok(());
    };

    println!("installed: {} v{}", receipt.name, receipt.version);
    println!("catalog:   {} v{}", catalog.name(), catalog.version());

    if !target.exists() {
        println!(
            "warning: receipt present but {} is missing",
            target.display()
        );
    } else if let Some(winner) = shadowing_binary(&target, catalog.name()) {
        println!(
            "warning: '{}' currently resolves to {}",
            catalog.name(),
            winner.display()
        );
    }

    if is_newer(&receipt.version, catalog.version()) {
        println!(
            "update available: v{} -> v{}",
            receipt.version,
            catalog.version()
        );
    } else {
        println!("up to date");
    }
    Ok(())
}

/// Whether `candidate` is strictly newer than `current`.
///
/// Versions that fail semver parsing fall back to inequality, so a renamed
/// scheme still registers as "something changed".
fn is_newer(current: &str, candidate: &str) -> bool {
    match (
        semver::Version::parse(current),
        semver::Version::parse(candidate),
    ) {
        (Ok(cur), Ok(cand)) => cand > cur,
        _ => current != candidate,
    }
}
