use std::path::Path;

use tracing::info;

use crate::checkers::normalize_url;
use crate::model::Storage;
use crate::storage;

/// Drops every entry of `guild_id` whose normalized URL equals the
/// normalized `url`, whatever its filters. Returns how many were removed.
pub fn remove_mods(data: &mut Storage, guild_id: &str, url: &str) -> usize {
    let url = normalize_url(url);
    let Some(guild) = data.get_mut(guild_id) else {
        return 0;
    };
    let before = guild.mods.len();
    guild.mods.retain(|m| normalize_url(&m.url) != url);
    before - guild.mods.len()
}

pub async fn remove(storage_path: &Path, guild_id: u64, url: String) -> crate::Result<()> {
    let mut data = storage::load(storage_path).await;
    let removed = remove_mods(&mut data, &guild_id.to_string(), &url);
    if removed > 0 {
        storage::save(storage_path, &data).await?;
        info!("Removed {} entries for {} in guild {}", removed, url, guild_id);
    }
    println!("Removed {} mod(s) with that URL.", removed);
    Ok(())
}
