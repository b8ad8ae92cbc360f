mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "proctor-cli")]
#[command(about = "Proctor CLI - Judge submissions locally and manage the problem catalogue", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a source file against a single problem file
    Run {
        /// Problem definition (JSON)
        #[arg(short, long)]
        problem: PathBuf,

        /// Candidate source file
        #[arg(short, long)]
        code: PathBuf,

        /// Submission language
        #[arg(short, long, default_value = "javascript")]
        language: String,
    },

    /// Validate problems and load them into Redis
    Seed {
        /// Problem list (JSON array)
        #[arg(short, long, default_value = "seed/problems.json")]
        file: PathBuf,

        /// Redis connection URL
        #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
        redis_url: String,
    },

    /// Validate a problem list without loading it
    Check {
        /// Problem list (JSON array)
        #[arg(short, long, default_value = "seed/problems.json")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            problem,
            code,
            language,
        } => {
            commands::run_local(&problem, &code, &language).await?;
        }
        Commands::Seed { file, redis_url } => {
            commands::seed_problems(&file, &redis_url).await?;
        }
        Commands::Check { file } => {
            commands::check_problems(&file)?;
        }
    }

    Ok(())
}
