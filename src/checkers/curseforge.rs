//! CurseForge: the catalog API when a key is available, otherwise the
//! rendered listing page.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::browser::PageRenderer;
use super::{extract_version, get_json, is_new, matches, path_segment};
use crate::error::{ExtractError, ParseError};
use crate::model::{CandidateRelease, Platform};

/// Minecraft's game id in the CurseForge catalog.
const MINECRAFT_GAME_ID: u32 = 432;

/// Version rows on the listing page, most recent first.
pub const FILE_ROW_SELECTOR: &str = "a.file-row-details span.name";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Project {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModFile {
    display_name: String,
    #[serde(default)]
    game_versions: Vec<String>,
    #[serde(default)]
    file_date: Option<DateTime<Utc>>,
}

fn slug(url: &str) -> Result<String, ParseError> {
    // /minecraft/mc-mods/<slug>/files/all
    path_segment(url, 2)
}

pub struct CurseForgeApi {
    client: Client,
    api_base: String,
    api_key: String,
}

impl CurseForgeApi {
    pub fn new(client: Client, api_base: &str, api_key: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub async fn check(
        &self,
        url: &str,
        mc_versions: &[String],
        loaders: &[String],
        last_version: Option<&str>,
    ) -> Result<Option<CandidateRelease>, ExtractError> {
        let slug = slug(url)?;
        let headers = [("x-api-key", self.api_key.as_str())];

        let search_url = format!(
            "{}/v1/mods/search?gameId={}&searchFilter={}",
            self.api_base, MINECRAFT_GAME_ID, slug
        );
        let search: Envelope<Project> = get_json(&self.client, &search_url, &headers).await?;
        let project = search
            .data
            .into_iter()
            .next()
            .ok_or(ParseError::MissingField {
                url: search_url,
                field: "data[0]",
            })?;
        debug!(
            "Found CurseForge project {} (ID: {})",
            project.name, project.id
        );

        let files_url = format!("{}/v1/mods/{}/files", self.api_base, project.id);
        let mut files: Envelope<ModFile> = get_json(&self.client, &files_url, &headers).await?;
        files.data.sort_by(|a, b| b.file_date.cmp(&a.file_date));

        let latest = files.data.into_iter().find_map(|file| {
            debug!("{} -> {:?}", file.display_name, file.game_versions);
            if !matches(&file.game_versions, mc_versions, loaders) {
                return None;
            }
            extract_version(&file.display_name).map(|v| (v, file.game_versions))
        });

        Ok(latest
            .filter(|(version, _)| is_new(version, last_version))
            .map(|(version, tags)| CandidateRelease {
                display_name: project.name,
                platform: Platform::CurseForge,
                version,
                compatible_tags: tags,
                canonical_link: format!("https://www.curseforge.com/minecraft/mc-mods/{}/files", slug),
            }))
    }
}

pub struct CurseForgeListing {
    renderer: Arc<dyn PageRenderer>,
}

impl CurseForgeListing {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }

    /// Only the newest row on the page is inspected.
    pub async fn check(
        &self,
        url: &str,
        last_version: Option<&str>,
    ) -> Result<Option<CandidateRelease>, ExtractError> {
        let row = self.renderer.first_match(url, FILE_ROW_SELECTOR).await?;
        let version =
            extract_version(&row.text).ok_or_else(|| ParseError::NoVersion(row.text.clone()))?;
        if !is_new(&version, last_version) {
            debug!("No new version on {}, latest is {}", url, version);
            return Ok(None);
        }

        let display_name = row
            .title
            .as_deref()
            .and_then(|t| t.split(" - ").next())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| slug(url).ok())
            .unwrap_or_else(|| "CurseForge Mod".to_string());

        Ok(Some(CandidateRelease {
            display_name,
            platform: Platform::CurseForge,
            version,
            compatible_tags: Vec::new(),
            canonical_link: url.to_string(),
        }))
    }
}
