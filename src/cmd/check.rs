//! The `check` command: fetch targets and print what was observed.
//!
//! Nothing is read from or written to the state store and no notification is
//! sent, which makes this the tool for debugging selectors and keywords.

use std::{path::Path, process::ExitCode};

use clap::Parser;
use futures::{StreamExt, stream};

use super::CmdError;
use crate::{
    config::AppConfig,
    fetcher::{FetchError, Fetcher, HttpFetcher},
    models::{MonitoredTarget, ObservedState, target::load_targets},
};

/// Arguments of the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Only check the target with this id.
    #[arg(short, long)]
    target: Option<String>,
}

/// Fetches the selected targets and prints one line per target.
///
/// Exits with `2` when any target fails to fetch.
pub async fn execute(config_dir: &Path, args: CheckArgs) -> Result<ExitCode, CmdError> {
    let config = AppConfig::new(Some(config_dir))?;
    let targets = select_targets(load_targets(&config.targets_config_path)?, args.target)?;
    let fetcher = HttpFetcher::new(&config.http)?;

    let results = check_targets(&fetcher, &targets, config.fetch_concurrency).await;

    let mut failures = 0;
    for (target, result) in targets.iter().zip(&results) {
        if result.is_err() {
            failures += 1;
        }
        println!("{}", describe(target, result));
    }

    Ok(if failures > 0 { ExitCode::from(2) } else { ExitCode::SUCCESS })
}

fn select_targets(
    targets: Vec<MonitoredTarget>,
    id: Option<String>,
) -> Result<Vec<MonitoredTarget>, CmdError> {
    let Some(id) = id else {
        return Ok(targets);
    };
    let selected: Vec<_> = targets.into_iter().filter(|t| t.id() == id).collect();
    if selected.is_empty() {
        return Err(CmdError::UnknownTarget(id));
    }
    Ok(selected)
}

async fn check_targets(
    fetcher: &dyn Fetcher,
    targets: &[MonitoredTarget],
    concurrency: usize,
) -> Vec<Result<ObservedState, FetchError>> {
    stream::iter(targets)
        .map(|target| fetcher.fetch(target))
        .buffered(concurrency.max(1))
        .collect()
        .await
}

fn describe(target: &MonitoredTarget, result: &Result<ObservedState, FetchError>) -> String {
    match result {
        Ok(state) => {
            let price = state.price.map(|p| p.to_string()).unwrap_or_else(|| "n/a".to_string());
            format!(
                "{}: available={} price={} status=\"{}\"",
                target.id(),
                state.available,
                price,
                state.status
            )
        }
        Err(e) => format!("{}: error: {} (retryable: {})", target.id(), e, e.is_retryable()),
    }
}
