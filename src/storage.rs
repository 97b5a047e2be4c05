use std::path::Path;

use tracing::{debug, warn};

use crate::checkers::normalize_url;
use crate::error::ConfigError;
use crate::model::Storage;

/// Strict load, used where the caller wants to know why a file is unusable.
pub async fn try_load(path: &Path) -> Result<Storage, ConfigError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Loads the tracked mod collection. A missing or corrupt file is an empty
/// collection.
pub async fn load(path: &Path) -> Storage {
    match try_load(path).await {
        Ok(data) => data,
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!("No storage at {}, starting empty", path.display());
            Storage::new()
        }
        Err(e) => {
            warn!("Ignoring unusable storage: {}", e);
            Storage::new()
        }
    }
}

/// Writes the whole collection, pretty-printed. The file is replaced in one
/// rename so a crash never leaves half a document behind.
pub async fn save(path: &Path, data: &Storage) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    debug!("Saved storage to {}", path.display());
    Ok(())
}

/// Copies the normalized url and `last_version` of every entry a pass changed
/// (`before` to `after`) into `current`. Entries are matched by url and
/// filters, so anything added or removed in `current` meanwhile is kept as is.
pub fn merge_progress(current: &mut Storage, before: &Storage, after: &Storage) {
    for (guild_id, done) in after {
        let (Some(seen), Some(guild)) = (before.get(guild_id), current.get_mut(guild_id)) else {
            continue;
        };
        for (old, new) in seen.mods.iter().zip(&done.mods) {
            if old == new {
                continue;
            }
            for tracked in guild.mods.iter_mut() {
                let same = tracked.same_filters(&old.url, &old.mc_versions, &old.loaders)
                    || tracked.same_filters(&new.url, &new.mc_versions, &new.loaders)
                    || (normalize_url(&tracked.url) == new.url
                        && tracked.same_filters(&tracked.url, &new.mc_versions, &new.loaders));
                if same {
                    tracked.url = new.url.clone();
                    tracked.last_version = new.last_version.clone();
                }
            }
        }
    }
}

/// Saves a pass result on top of the file as it is now rather than the
/// snapshot the pass started from.
pub async fn save_progress(path: &Path, before: &Storage, after: &Storage) -> std::io::Result<()> {
    let mut current = match try_load(path).await {
        Ok(current) => current,
        Err(e) => {
            debug!("Could not reload storage ({}), writing pass result", e);
            after.clone()
        }
    };
    merge_progress(&mut current, before, after);
    save(path, &current).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GuildMods, TrackedMod};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = load(&dir.path().join("storage.json")).await;
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        tokio::fs::write(&path, "{ \"123\": { \"mods\": [ ").await.unwrap();
        assert!(load(&path).await.is_empty());
        assert!(matches!(
            try_load(&path).await,
            Err(ConfigError::Json { .. })
        ));

        tokio::fs::write(&path, "[1, 2, 3]").await.unwrap();
        assert!(load(&path).await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut data = Storage::new();
        data.insert(
            "987".to_string(),
            GuildMods {
                mods: vec![TrackedMod::new(
                    "https://modrinth.com/mod/sodium/versions".into(),
                    vec!["1.21.1".into()],
                    vec!["fabric".into()],
                    555,
                )],
            },
        );
        save(&path, &data).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(raw.contains("\n  \"987\": {"));
        assert!(raw.contains("\"channel_id\": 555"));
        assert_eq!(load(&path).await, data);
    }

    fn tracked(url: &str, loaders: &[&str], last: Option<&str>) -> TrackedMod {
        let mut m = TrackedMod::new(
            url.into(),
            vec!["all".into()],
            loaders.iter().map(|s| s.to_string()).collect(),
            1,
        );
        m.last_version = last.map(str::to_string);
        m
    }

    fn guild(mods: Vec<TrackedMod>) -> Storage {
        let mut data = Storage::new();
        data.insert("1".into(), GuildMods { mods });
        data
    }

    #[test]
    fn merge_keeps_entries_edited_during_pass() {
        let raw = "https://www.curseforge.com/minecraft/mc-mods/create/files/123";
        let listing = "https://www.curseforge.com/minecraft/mc-mods/create/files/all";
        let before = guild(vec![
            tracked(raw, &["forge"], None),
            tracked(listing, &["fabric"], Some("1.0")),
            tracked("https://modrinth.com/mod/gone/versions", &["all"], None),
        ]);
        let after = guild(vec![
            tracked(listing, &["forge"], Some("2.0")),
            tracked(listing, &["fabric"], Some("1.0")),
            tracked("https://modrinth.com/mod/gone/versions", &["all"], Some("3.0")),
        ]);
        // Meanwhile: "gone" was removed and a new mod was added.
        let mut current = guild(vec![
            tracked(raw, &["forge"], None),
            tracked(listing, &["fabric"], Some("1.0")),
            tracked("https://modrinth.com/mod/sodium/versions", &["all"], None),
        ]);

        merge_progress(&mut current, &before, &after);
        assert_eq!(
            current["1"].mods,
            vec![
                tracked(listing, &["forge"], Some("2.0")),
                tracked(listing, &["fabric"], Some("1.0")),
                tracked("https://modrinth.com/mod/sodium/versions", &["all"], None),
            ]
        );
    }

    #[tokio::test]
    async fn save_progress_without_file_writes_pass_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let after = guild(vec![tracked("https://modrinth.com/mod/a/versions", &["all"], Some("1.0"))]);

        save_progress(&path, &Storage::new(), &after).await.unwrap();
        assert_eq!(load(&path).await, after);
    }
}
