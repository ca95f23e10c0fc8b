use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use stockwatch::{
    cmd::{self, CheckArgs},
    config::DEFAULT_CONFIG_DIR,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding app.yaml and targets.yaml.
    #[arg(long, global = true, env = "STOCKWATCH_CONFIG_DIR", default_value = DEFAULT_CONFIG_DIR)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Performs one monitoring run and exits.
    Run,
    /// Fetches targets and prints their current state without notifying.
    Check(CheckArgs),
    /// Sends a test email with the configured credentials.
    TestEmail,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Local runs keep credentials in a .env file; CI injects them directly.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => cmd::run::execute(&cli.config_dir, |key| std::env::var(key).ok()).await,
        Commands::Check(args) => cmd::check::execute(&cli.config_dir, args).await,
        Commands::TestEmail => {
            cmd::test_email::execute(&cli.config_dir).await.map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "stockwatch failed.");
            ExitCode::FAILURE
        }
    }
}
