//! The `run` command: one complete monitoring run.

use std::{path::Path, process::ExitCode, sync::Arc};

use super::CmdError;
use crate::{
    config::{AppConfig, Credentials, NotifierKind},
    fetcher::HttpFetcher,
    models::target::load_targets,
    notification::create_notifier,
    persistence::create_store,
    runner::MonitorRunner,
};

/// Loads configuration, performs one run and returns the process exit code.
///
/// `env` resolves credential variables (see [`Credentials::from_lookup`]).
/// Configuration and credential problems are reported before any page is
/// fetched.
pub async fn execute<F>(config_dir: &Path, env: F) -> Result<ExitCode, CmdError>
where
    F: Fn(&str) -> Option<String>,
{
    tracing::debug!(config_dir = %config_dir.display(), "Loading application configuration...");
    let config = AppConfig::new(Some(config_dir))?;
    tracing::debug!(
        state_backend = ?config.state_backend,
        notifier = ?config.notifier,
        fetch_concurrency = config.fetch_concurrency,
        "Configuration loaded."
    );

    let targets = load_targets(&config.targets_config_path)?;
    tracing::info!(count = targets.len(), "Loaded targets.");

    let credentials = match config.notifier {
        NotifierKind::Email => Some(Credentials::from_lookup(env)?),
        NotifierKind::Stdout => None,
    };
    let notifier = create_notifier(&config, credentials.as_ref())?;
    let store = create_store(&config).await?;
    let fetcher = HttpFetcher::new(&config.http)?;

    let runner = MonitorRunner::builder()
        .targets(targets)
        .fetcher(Arc::new(fetcher))
        .notifier(Arc::from(notifier))
        .store(Arc::from(store))
        .fetch_concurrency(config.fetch_concurrency)
        .build()?;

    tracing::info!("Starting monitoring run...");
    let report = runner.execute().await?;
    report.log_summary();

    Ok(report.exit_code())
}
