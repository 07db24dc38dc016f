//! substup - installer for the subst CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use substup_cli::cmd;
use substup_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let dry_run = cli.dry_run;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Install { force } => cmd::install::install(force, dry_run, quiet).await,
        Commands::Resolve { os, cpu, bits, json } => {
            cmd::resolve::resolve(os.as_deref(), cpu.as_deref(), bits, json)
        }
        Commands::Platforms { json } => cmd::platforms::platforms(json),
        Commands::Status => cmd::status::status(),
        Commands::Verify { file } => cmd::verify::verify(&file),
        Commands::Uninstall { yes } => cmd::uninstall::uninstall(yes, dry_run, quiet),
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}
