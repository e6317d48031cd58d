//! The `pmshim` own-name CLI surface: `install`, `pack`, `use`, `enable`.
//! Invocation under one of the managed tool names (`npm`, `pnpm`, `yarn`,
//! ...) never reaches this parser — see `main::invocation` for that branch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pmshim", about = "Package-manager shim and resolver")]
pub struct Cli {
    /// Enable verbose (hierarchical) tracing output.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pre-install one or more tool versions into the cache.
    Install {
        /// `name[@versionOrRange]` specs. With none, installs the current
        /// project's pinned tool.
        specs: Vec<String>,
        /// Also record each installed version as the new last-known-good
        /// pin for its tool.
        #[arg(short = 'g', long = "global")]
        global: bool,
    },
    /// Bundle one or more tools and this shim binary into a single archive.
    Pack {
        /// `name[@versionOrRange]` specs to bundle.
        specs: Vec<String>,
        /// Output archive path.
        #[arg(short = 'o', long = "output", default_value = "pmshim-pack.tgz")]
        output: PathBuf,
    },
    /// Resolve `spec` and write `name@exact-version` into the project
    /// manifest's `packageManager` field.
    Use {
        /// `name[@versionOrRange]` spec to resolve and pin.
        spec: String,
    },
    /// Create per-tool entrypoint shims in a target directory.
    Enable {
        /// Destination directory for the generated shim scripts.
        #[arg(long = "install-directory")]
        install_directory: Option<PathBuf>,
        /// Tool names to enable; defaults to all four known tools.
        tools: Vec<String>,
    },
}
