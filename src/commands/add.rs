use std::path::Path;

use itertools::Itertools;
use tracing::info;

use crate::checkers::normalize_url;
use crate::error::ValidationError;
use crate::model::{Storage, TrackedMod, ALL};
use crate::storage;

pub const VALID_LOADERS: &[&str] = &["forge", "fabric", "neoforge", "quilt", ALL];

pub const VALID_MC_VERSIONS: &[&str] = &[
    "1.21.8", "1.21.7", "1.21.6", "1.21.5", "1.21.4", "1.21.3", "1.21.2", "1.21.1", "1.21",
    "1.20.6", "1.20.5", "1.20.4", "1.20.2", "1.20.1", "1.20", "1.19.4", "1.19.3", "1.19.2",
    "1.19.1", "1.19", "1.18.2", "1.18.1", "1.18", "1.17.1", "1.17", "1.16.5", "1.16.4", "1.16.3",
    "1.16.2", "1.16.1", "1.16", "1.15.2", "1.15.1", "1.15", "1.14.4", "1.14.3", "1.14.2",
    "1.14.1", "1.14", "1.13.2", "1.13.1", "1.13", "1.12.2", "1.12.1", "1.12", "1.11.2", "1.11.1",
    "1.11", "1.10.2", "1.10.1", "1.10", "1.9.4", "1.9.2", "1.9", "1.8.9", "1.8.8", "1.8.7",
    "1.8.1", "1.8", "1.7.10", "1.7.2", ALL,
];

/// Lowercased, trimmed and deduplicated filter values. Nothing given means "all".
pub fn parse_filter(values: Option<Vec<String>>) -> Vec<String> {
    let values: Vec<String> = values
        .unwrap_or_default()
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .unique()
        .collect();
    if values.is_empty() {
        vec![ALL.to_string()]
    } else {
        values
    }
}

fn invalid(values: &[String], allowed: &[&str]) -> Vec<String> {
    values
        .iter()
        .filter(|v| !allowed.contains(&v.as_str()))
        .unique()
        .cloned()
        .collect()
}

fn allowed(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Validates and inserts a new tracked mod for `guild_id`.
pub fn add_mod(
    data: &mut Storage,
    guild_id: &str,
    channel: u64,
    url: &str,
    mc_versions: Vec<String>,
    loaders: Vec<String>,
) -> Result<TrackedMod, ValidationError> {
    let url = normalize_url(url);
    if let Err(e) = url::Url::parse(&url) {
        return Err(ValidationError::InvalidUrl {
            url,
            reason: e.to_string(),
        });
    }

    let invalid_loaders = invalid(&loaders, VALID_LOADERS);
    if !invalid_loaders.is_empty() {
        return Err(ValidationError::InvalidLoaders {
            invalid: invalid_loaders,
            allowed: allowed(VALID_LOADERS),
        });
    }
    let invalid_versions = invalid(&mc_versions, VALID_MC_VERSIONS);
    if !invalid_versions.is_empty() {
        return Err(ValidationError::InvalidMcVersions {
            invalid: invalid_versions,
            allowed: allowed(VALID_MC_VERSIONS),
        });
    }

    let guild = data.entry(guild_id.to_string()).or_default();
    if guild
        .mods
        .iter()
        .any(|m| m.same_filters(&url, &mc_versions, &loaders))
    {
        return Err(ValidationError::AlreadyTracked);
    }

    let tracked = TrackedMod::new(url, mc_versions, loaders, channel);
    guild.mods.push(tracked.clone());
    Ok(tracked)
}

pub async fn add(
    storage_path: &Path,
    guild_id: u64,
    channel: u64,
    url: String,
    mc_versions: Option<Vec<String>>,
    loaders: Option<Vec<String>>,
) -> crate::Result<()> {
    let mut data = storage::load(storage_path).await;
    let tracked = match add_mod(
        &mut data,
        &guild_id.to_string(),
        channel,
        &url,
        parse_filter(mc_versions),
        parse_filter(loaders),
    ) {
        Ok(tracked) => tracked,
        Err(e) => {
            eprintln!("{}", e);
            return Err(e.into());
        }
    };
    storage::save(storage_path, &data).await?;
    info!("Tracking {} for guild {}", tracked.url, guild_id);
    println!(
        "Added: {} (MC: {}, Loaders: {})",
        tracked.url,
        tracked.mc_versions.join(", "),
        tracked.loaders.join(", ")
    );
    Ok(())
}
