//! sgit: keep a language-organized project tree in sync with a GitHub account.
//!
//! # Usage
//!
//! ```text
//! sgit ls     [-l langs] [-s states] [-f true|false] [-n names] [--json]
//! sgit sync   [-l langs] [-s states] [-f true|false] [-n names]
//! sgit clone  [<repo>...] [filter flags]
//! sgit create <name> [--private] [--language <lang>]
//! sgit delete --target local|remote|both [filter flags] [--yes]
//! ```
//!
//! Requires `GITHUB_TOKEN`, `GITHUB_USERNAME` and `CODE_HOME_DIR`, either in
//! the environment or in `~/.sgit/config.yaml`.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    clone::CloneArgs, create::CreateArgs, delete::DeleteArgs, ls::LsArgs, sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sgit",
    version,
    about = "Sync a language-organized project tree with a GitHub account",
    long_about = None,
)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify every repository, remote and local.
    Ls(LsArgs),

    /// Classify and clone repositories missing locally.
    Sync(SyncArgs),

    /// Clone named repositories, or every missing one matching the filter.
    Clone(CloneArgs),

    /// Create a hosted repository and clone it.
    Create(CreateArgs),

    /// Delete selected repositories locally, remotely, or both.
    Delete(DeleteArgs),
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log to stderr, filtered by `SGIT_LOG`, then `RUST_LOG`, then `warn`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("SGIT_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Ls(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Clone(args) => args.run(),
        Commands::Create(args) => args.run(),
        Commands::Delete(args) => args.run(),
    }
}
