//! Uninstall command

use std::io::Write;

use anyhow::Result;
use substup_core::{Catalog, install as core_install, paths};

use crate::ui::ConsoleReporter;

/// Remove the installed binary and its receipt.
pub fn uninstall(yes: bool, dry_run: bool, quiet: bool) -> Result<()> {
    let catalog = Catalog::builtin();
    let home = paths::substup_home();
    let target = paths::bin_path_in(&home).join(catalog.name());

    if dry_run {
        if target.exists() {
            println!("would remove {}", target.display());
        } else {
            println!("{} is not installed", catalog.name());
        }
        return Ok(());
    }

    if target.exists() && !yes {
        print!("Remove {}? [y/N] ", target.display());
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("aborted");
            return Ok(());
        }
    }

    let reporter = ConsoleReporter::new(quiet);
    core_install::uninstall(&catalog, &home, &reporter)?;
    Ok(())
}
