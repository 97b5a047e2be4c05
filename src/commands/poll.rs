use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use tokio::sync::watch;
use tracing::{error, info};

use crate::checkers::http_client;
use crate::config::Config;
use crate::detector::UpdateDetector;
use crate::notify::DiscordNotifier;
use crate::updater::Updater;

fn build_updater(config: &Config, storage_path: PathBuf) -> crate::Result<Updater> {
    let client = http_client(&config.timeouts)?;
    let notifier = Arc::new(DiscordNotifier::new(client, config));
    Ok(Updater::new(
        UpdateDetector::new(config)?,
        notifier,
        storage_path,
        config.template.clone(),
        config.poll_interval(),
    ))
}

/// Runs a single pass and prints what it did.
pub async fn check(config: &Config, storage_path: PathBuf) -> crate::Result<()> {
    let updater = build_updater(config, storage_path)?;
    let (_shutdown_tx, shutdown) = watch::channel(false);
    let report = updater.run_pass(&shutdown).await?;
    println!(
        "Checked {} mod(s): {} updated, {} notified, {} failed, {} missing channel(s)",
        report.checked.to_string().bold(),
        report.updated.to_string().green().bold(),
        report.notified,
        report.failed.to_string().red(),
        report.skipped_channels
    );
    Ok(())
}

/// Polls until Ctrl-C.
pub async fn watch(config: &Config, storage_path: PathBuf) -> crate::Result<()> {
    let updater = build_updater(config, storage_path)?;
    let (shutdown_tx, shutdown) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, stopping after the current mod");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!("Unable to listen for Ctrl-C: {}", e),
        }
    });
    info!(
        "Checking for updates every {}s",
        config.poll_interval().as_secs()
    );
    updater.watch(shutdown).await?;
    Ok(())
}
