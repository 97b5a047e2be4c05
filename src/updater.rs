//! The polling loop: check every tracked mod, announce new releases, persist.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::detector::{Outcome, UpdateDetector};
use crate::error::NotifyError;
use crate::model::{CandidateRelease, Storage};
use crate::notify::{format_message, Notifier};
use crate::storage;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub checked: usize,
    pub updated: usize,
    pub notified: usize,
    pub failed: usize,
    pub skipped_channels: usize,
}

pub struct Updater {
    detector: UpdateDetector,
    notifier: Arc<dyn Notifier>,
    storage_path: PathBuf,
    template: String,
    interval: Duration,
}

impl Updater {
    pub fn new(
        detector: UpdateDetector,
        notifier: Arc<dyn Notifier>,
        storage_path: PathBuf,
        template: String,
        interval: Duration,
    ) -> Self {
        Self {
            detector,
            notifier,
            storage_path,
            template,
            interval,
        }
    }

    /// Runs passes until `shutdown` flips to true. Only a rejected bot token
    /// ends the loop with an error.
    pub async fn watch(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), NotifyError> {
        loop {
            self.run_pass(&shutdown).await?;
            if *shutdown.borrow() {
                break;
            }

            debug!("Sleeping {}s until next pass", self.interval.as_secs());
            let sleep = tokio::time::sleep(self.interval);
            tokio::pin!(sleep);
            tokio::select! {
                _ = &mut sleep => {}
                changed = shutdown.changed() => {
                    if changed.is_ok() && *shutdown.borrow() {
                        break;
                    }
                    // Sender gone, nothing can interrupt the sleep any more.
                    (&mut sleep).await;
                }
            }
        }
        info!("Update loop stopped");
        Ok(())
    }

    /// One pass over every guild's mods, in stored order and one at a time.
    /// The results are saved once at the end, also when the pass stops early,
    /// merged into the file as it is then so concurrent `add`/`remove` edits survive.
    pub async fn run_pass(&self, shutdown: &watch::Receiver<bool>) -> Result<PassReport, NotifyError> {
        info!("Running update check pass");
        let mut data = storage::load(&self.storage_path).await;
        let before = data.clone();
        let mut report = PassReport::default();

        let result = self.check_all(&mut data, &mut report, shutdown).await;

        match storage::save_progress(&self.storage_path, &before, &data).await {
            Ok(()) => debug!("Storage updated"),
            Err(e) => error!("Failed to save {}: {}", self.storage_path.display(), e),
        }
        info!(
            checked = report.checked,
            updated = report.updated,
            notified = report.notified,
            failed = report.failed,
            skipped_channels = report.skipped_channels,
            "Pass complete"
        );
        result.map(|()| report)
    }

    async fn check_all(
        &self,
        data: &mut Storage,
        report: &mut PassReport,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<(), NotifyError> {
        for (guild_id, guild) in data.iter_mut() {
            for tracked in guild.mods.iter_mut() {
                if *shutdown.borrow() {
                    info!("Shutdown requested, ending pass early");
                    return Ok(());
                }
                report.checked += 1;
                match self.detector.detect(tracked).await {
                    Outcome::Updated(release) => {
                        report.updated += 1;
                        self.announce(tracked.notify_channel, &release, report).await?;
                    }
                    Outcome::Unchanged => debug!(guild = %guild_id, url = %tracked.url, "No update"),
                    Outcome::Unsupported => {
                        info!(guild = %guild_id, url = %tracked.url, "Unknown platform, skipping")
                    }
                    Outcome::Failed(e) => {
                        report.failed += 1;
                        warn!(guild = %guild_id, url = %tracked.url, kind = e.kind(), "Check failed: {}", e);
                    }
                    Outcome::TimedOut(limit) => {
                        report.failed += 1;
                        warn!(guild = %guild_id, url = %tracked.url, "Check timed out after {}s", limit.as_secs());
                    }
                }
            }
        }
        Ok(())
    }

    async fn announce(
        &self,
        channel_id: u64,
        release: &CandidateRelease,
        report: &mut PassReport,
    ) -> Result<(), NotifyError> {
        let channel = match self.notifier.resolve_channel(channel_id).await {
            Ok(Some(channel)) => channel,
            Ok(None) => {
                warn!("Channel ID {} not found", channel_id);
                report.skipped_channels += 1;
                return Ok(());
            }
            Err(NotifyError::Unauthorized) => return Err(NotifyError::Unauthorized),
            Err(e) => {
                warn!("Could not resolve channel {}: {}", channel_id, e);
                report.skipped_channels += 1;
                return Ok(());
            }
        };

        let message = format_message(&self.template, release, channel.role_mention.as_deref());
        debug!(channel_id, guild = ?channel.guild_id, "Sending message: {}", message);
        match self.notifier.send(&channel, &message).await {
            Ok(()) => report.notified += 1,
            Err(NotifyError::Unauthorized) => return Err(NotifyError::Unauthorized),
            Err(e) => warn!("Failed to notify channel {}: {}", channel_id, e),
        }
        Ok(())
    }
}
