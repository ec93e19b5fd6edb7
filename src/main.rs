use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Replay a planned, backdated git history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay every event of a plan against a git repository
    Replay {
        /// Plan file (TOML)
        plan: PathBuf,

        /// Repository to replay into (defaults to the current directory)
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Print the git invocations instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a plan file without touching any repository
    Check {
        /// Plan file (TOML)
        plan: PathBuf,
    },

    /// Show the timestamp an event offset resolves to
    When {
        /// Plan file (TOML)
        plan: PathBuf,

        /// Days after the anchor
        #[arg(long)]
        day: u32,

        /// Hour of day (9 adds no offset)
        #[arg(long, default_value_t = 9)]
        hour: u8,

        /// Minute of the hour
        #[arg(long, default_value_t = 0)]
        minute: u8,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            plan,
            repo,
            dry_run,
        } => {
            commands::replay::execute(&plan, repo, dry_run)?;
        }
        Commands::Check { plan } => {
            commands::check::execute(&plan)?;
        }
        Commands::When {
            plan,
            day,
            hour,
            minute,
        } => {
            commands::when::execute(&plan, day, hour, minute)?;
        }
    }

    Ok(())
}
