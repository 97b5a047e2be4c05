use std::path::Path;

use colored::Colorize;

use crate::model::TrackedMod;
use crate::storage;

pub fn describe(tracked: &TrackedMod) -> String {
    format!(
        "{} (MC: {}, Loaders: {})",
        tracked.url,
        tracked.mc_versions.join(", "),
        tracked.loaders.join(", ")
    )
}

pub async fn list(storage_path: &Path, guild_id: u64, details: bool) -> crate::Result<()> {
    let data = storage::load(storage_path).await;
    let mods = data
        .get(&guild_id.to_string())
        .map(|g| g.mods.as_slice())
        .unwrap_or_default();

    if mods.is_empty() {
        println!("No mods are being tracked.");
        return Ok(());
    }

    if !details {
        println!("Currently tracked mods:");
        for tracked in mods {
            println!("- {}", describe(tracked));
        }
        return Ok(());
    }

    let title_corner = boxy::Char::upper_left(boxy::Weight::Thick);
    let title_side_h = boxy::Char::horizontal(boxy::Weight::Thick).to_string();
    let title_side_v = boxy::Char::vertical(boxy::Weight::Thick);
    let left_branch_more = boxy::Char::right_tee(boxy::Weight::Normal);
    let left_branch_done = boxy::Char::lower_left(boxy::Weight::Normal);
    let left_node = boxy::Char::left_half(boxy::Weight::Normal);

    for tracked in mods {
        let title = &tracked.url;
        println!(
            "{}{}{}",
            title_corner,
            title_side_h.repeat(title.len() + 2),
            title_corner.rotate_cw(1)
        );
        println!("{} {} {}", title_side_v, title.bold(), title_side_v);
        println!(
            "{}{}{}",
            boxy::Char::right_tee(boxy::Weight::Thick).down(boxy::Weight::Normal),
            title_side_h.repeat(title.len() + 2),
            title_corner.rotate_cw(2)
        );
        println!(
            "{}{}{} {}",
            left_branch_more,
            left_node,
            "Minecraft:".bold(),
            tracked.mc_versions.join(", ")
        );
        println!(
            "{}{}{} {}",
            left_branch_more,
            left_node,
            "Loaders:".bold(),
            tracked.loaders.join(", ")
        );
        println!(
            "{}{}{} {}",
            left_branch_more,
            left_node,
            "Channel:".bold(),
            tracked.notify_channel
        );
        println!(
            "{}{}{} {}",
            left_branch_done,
            left_node,
            "Last version:".bold(),
            match &tracked.last_version {
                Some(v) => v.green(),
                None => "not checked yet".yellow(),
            }
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_shows_filters() {
        let tracked = TrackedMod::new(
            "https://modrinth.com/mod/sodium/versions".into(),
            vec!["1.21.1".into(), "1.20.1".into()],
            vec!["fabric".into()],
            1,
        );
        assert_eq!(
            describe(&tracked),
            "https://modrinth.com/mod/sodium/versions (MC: 1.21.1, 1.20.1, Loaders: fabric)"
        );
    }

    #[tokio::test]
    async fn list_empty_guild() {
        let dir = tempfile::tempdir().unwrap();
        list(&dir.path().join("storage.json"), 1, true).await.unwrap();
    }
}
