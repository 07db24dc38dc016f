//! Platforms command: dump the release catalog.

use anyhow::Result;
use substup_core::Catalog;

/// List every artifact in the catalog.
pub fn platforms(json: bool) -> Result<()> {
    let catalog = Catalog::builtin();

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.records())?);
        return Ok(());
    }

    println!(
        "{} v{} ({})",
        catalog.name(),
        catalog.version(),
        catalog.repository()
    );
    for record in catalog.records() {
        println!(
            "  {:<14} {}  {}",
            record.key.to_string(),
            record.sha256,
            record.filename()
        );
    }
    Ok(())
}
