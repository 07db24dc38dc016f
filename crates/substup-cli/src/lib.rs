//! substup - installer for the subst CLI
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Fetches, verifies, and installs pre-built `subst` release binaries.
//!
//! # Overview
//!
//! substup knows one tool and one release: the catalog baked into the
//! binary maps every supported `(os, arch)` pair to a download URL and its
//! published SHA-256 digest. Installation resolves the host against that
//! table, streams the archive while hashing it, refuses anything that does
//! not hash to the published digest, and places the extracted executable on
//! the path.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.substup/
//! ├── bin/          # The installed subst executable
//! ├── cache/        # Verified downloaded archives
//! ├── tmp/          # Extraction scratch space (same volume as bin)
//! └── receipt.toml  # What is currently installed
//! ```

pub mod cmd;
pub mod ui;

// Re-exports from other crates for convenience
pub use substup_core::Catalog;
pub use substup_core::io::download as downloader;
pub use substup_core::io::extract as extractor;
pub use substup_core::paths::*;
pub use substup_schema::{ArtifactKey, ArtifactRecord, HostSpec};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "substup")]
#[command(author, version, about = "substup - installer for the subst CLI")]
pub struct Cli {
    /// Show what would happen without making changes
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download, verify, and install the subst binary
    Install {
        /// Reinstall even if the catalog version is already present
        #[arg(short, long)]
        force: bool,
    },
    /// Show which release artifact this host resolves to
    Resolve {
        /// Override the detected operating system (e.g. macos, linux, windows)
        #[arg(long)]
        os: Option<String>,
        /// Override the detected CPU family (e.g. arm, intel)
        #[arg(long)]
        cpu: Option<String>,
        /// Override the detected pointer width (32 or 64)
        #[arg(long)]
        bits: Option<u8>,
        /// Print the resolved record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every artifact in the release catalog
    Platforms {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report the installed version against the catalog
    Status,
    /// Check a local archive against its published digest
    Verify {
        /// Archive to check
        file: PathBuf,
    },
    /// Remove the installed binary
    Uninstall {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
