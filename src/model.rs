use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// Sentinel accepted on either filter axis meaning "any".
pub const ALL: &str = "all";

fn all_filter() -> Vec<String> {
    vec![ALL.to_string()]
}

/// One mod a guild has asked to be notified about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedMod {
    pub url: String,
    #[serde(default = "all_filter")]
    pub mc_versions: Vec<String>,
    #[serde(default = "all_filter")]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub last_version: Option<String>,
    #[serde(rename = "channel_id", alias = "notify_channel")]
    pub notify_channel: u64,
}

impl TrackedMod {
    pub fn new(url: String, mc_versions: Vec<String>, loaders: Vec<String>, channel: u64) -> Self {
        Self {
            url,
            mc_versions,
            loaders,
            last_version: None,
            notify_channel: channel,
        }
    }

    /// Whether `self` and `other` describe the same (url, mc_versions, loaders) triple.
    /// Filters compare as sets.
    pub fn same_filters(&self, url: &str, mc_versions: &[String], loaders: &[String]) -> bool {
        fn as_set(v: &[String]) -> HashSet<&str> {
            v.iter().map(String::as_str).collect()
        }
        self.url == url
            && as_set(&self.mc_versions) == as_set(mc_versions)
            && as_set(&self.loaders) == as_set(loaders)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMods {
    #[serde(default)]
    pub mods: Vec<TrackedMod>,
}

/// Guild id to tracked mods, the whole persisted document.
pub type Storage = BTreeMap<String, GuildMods>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    CurseForge,
    Modrinth,
    MrCrayfish,
    Unknown,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Platform::CurseForge => write!(f, "CurseForge"),
            Platform::Modrinth => write!(f, "Modrinth"),
            Platform::MrCrayfish => write!(f, "MrCrayfish"),
            Platform::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A release found by one extractor. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRelease {
    pub display_name: String,
    pub platform: Platform,
    pub version: String,
    pub compatible_tags: Vec<String>,
    pub canonical_link: String,
}
