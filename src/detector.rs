//! Decides whether one tracked mod has a new release.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::checkers::browser::{ChromiumRenderer, PageRenderer};
use crate::checkers::curseforge::{CurseForgeApi, CurseForgeListing};
use crate::checkers::modrinth::Modrinth;
use crate::checkers::mrcrayfish::MrCrayfish;
use crate::checkers::{classify, http_client, normalize_url};
use crate::config::Config;
use crate::error::ExtractError;
use crate::model::{CandidateRelease, Platform, TrackedMod};

/// Result of checking one tracked mod.
#[derive(Debug)]
pub enum Outcome {
    Updated(CandidateRelease),
    Unchanged,
    /// No extractor exists for the URL's host.
    Unsupported,
    Failed(ExtractError),
    TimedOut(Duration),
}

pub struct UpdateDetector {
    curseforge_api: Option<CurseForgeApi>,
    curseforge_listing: CurseForgeListing,
    modrinth: Modrinth,
    mrcrayfish: MrCrayfish,
    mod_timeout: Duration,
}

impl UpdateDetector {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let renderer = Arc::new(ChromiumRenderer::new(config.timeouts.clone()));
        Ok(Self::with_renderer(config, http_client(&config.timeouts)?, renderer))
    }

    pub fn with_renderer(config: &Config, client: Client, renderer: Arc<dyn PageRenderer>) -> Self {
        let curseforge_api = config
            .curseforge_api_key()
            .map(|key| CurseForgeApi::new(client.clone(), &config.curseforge.api_base, key));
        Self {
            curseforge_api,
            curseforge_listing: CurseForgeListing::new(renderer),
            modrinth: Modrinth::new(client.clone(), &config.modrinth.api_base),
            mrcrayfish: MrCrayfish::new(client),
            mod_timeout: config.timeouts.per_mod(),
        }
    }

    async fn check_curseforge(
        &self,
        tracked: &TrackedMod,
    ) -> Result<Option<CandidateRelease>, ExtractError> {
        let last = tracked.last_version.as_deref();
        // A filtered "nothing new" from the API is final; the listing cannot filter.
        if let Some(api) = &self.curseforge_api {
            match api
                .check(&tracked.url, &tracked.mc_versions, &tracked.loaders, last)
                .await
            {
                Ok(found) => return Ok(found),
                Err(e) => warn!(url = %tracked.url, "CurseForge API failed, rendering listing: {}", e),
            }
        }
        self.curseforge_listing.check(&tracked.url, last).await
    }

    async fn extract(
        &self,
        platform: Platform,
        tracked: &TrackedMod,
    ) -> Option<Result<Option<CandidateRelease>, ExtractError>> {
        let last = tracked.last_version.as_deref();
        let result = match platform {
            Platform::CurseForge => self.check_curseforge(tracked).await,
            Platform::Modrinth => {
                self.modrinth
                    .check(&tracked.url, &tracked.mc_versions, &tracked.loaders, last)
                    .await
            }
            Platform::MrCrayfish => self.mrcrayfish.check(&tracked.url, last).await,
            Platform::Unknown => return None,
        };
        Some(result)
    }

    /// Normalizes the record's URL in place, runs the matching extractor and
    /// records a found release as the new `last_version`.
    pub async fn detect(&self, tracked: &mut TrackedMod) -> Outcome {
        tracked.url = normalize_url(&tracked.url);
        let platform = classify(&tracked.url);
        debug!(url = %tracked.url, %platform, "Checking mod");

        let result = match tokio::time::timeout(self.mod_timeout, self.extract(platform, tracked)).await {
            Err(_) => return Outcome::TimedOut(self.mod_timeout),
            Ok(None) => return Outcome::Unsupported,
            Ok(Some(result)) => result,
        };

        match result {
            Ok(Some(found)) => {
                info!(url = %tracked.url, version = %found.version, tags = ?found.compatible_tags, "New version found");
                tracked.last_version = Some(found.version.clone());
                Outcome::Updated(found)
            }
            Ok(None) => Outcome::Unchanged,
            Err(e) => Outcome::Failed(e),
        }
    }
}
