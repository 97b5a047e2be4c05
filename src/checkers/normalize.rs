use crate::model::Platform;

/// Decides which platform a URL belongs to. Checked in a fixed priority order.
pub fn classify(url: &str) -> Platform {
    if url.contains("curseforge.com") {
        Platform::CurseForge
    } else if url.contains("modrinth.com") {
        Platform::Modrinth
    } else if url.contains("mrcrayfish.com") {
        Platform::MrCrayfish
    } else {
        Platform::Unknown
    }
}

/// Canonicalizes a mod URL into the listing page that is polled and used as
/// the dedup key. Idempotent.
pub fn normalize_url(raw: &str) -> String {
    let url = raw.trim();
    let platform = classify(url);
    if platform == Platform::Unknown {
        return url.to_string();
    }
    let url = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };
    let base = url.split(['?', '#']).next().unwrap_or(&url);
    // scheme, empty, host, path...
    let parts: Vec<&str> = base.split('/').collect();

    match platform {
        Platform::CurseForge => {
            let end = parts
                .iter()
                .skip(3)
                .position(|s| *s == "files")
                .map_or(parts.len(), |i| i + 3);
            format!("{}/files/all", parts[..end].join("/").trim_end_matches('/'))
        }
        Platform::Modrinth => {
            // project type, slug
            if parts.len() < 5 || parts[3].is_empty() || parts[4].is_empty() {
                return url;
            }
            format!("{}/{}/versions", parts[..4].join("/"), parts[4])
        }
        Platform::MrCrayfish | Platform::Unknown => url,
    }
}
