//! Install command

use anyhow::Result;
use substup_core::{Catalog, install as core_install, paths};
use substup_schema::HostSpec;

use crate::ui::ConsoleReporter;

/// Resolve the host against the catalog and run the install pipeline.
pub async fn install(force: bool, dry_run: bool, quiet: bool) -> Result<()> {
    let catalog = Catalog::builtin();
    let host = HostSpec::detect();

    if dry_run {
        let record = catalog.resolve(&host)?;
        println!(
            "would install {} v{} ({})",
            record.binary, record.version, record.key
        );
        println!("  url:    {}", record.url);
        println!("  sha256: {}", record.sha256);
        return Ok(());
    }

    let reporter = ConsoleReporter::new(quiet);
    let home = paths::substup_home();
    core_install::install(&catalog, &host, &home, force, &reporter).await?;
    Ok(())
}
