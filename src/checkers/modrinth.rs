use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{get_json, is_new, matches, path_segment};
use crate::error::ExtractError;
use crate::model::{CandidateRelease, Platform};

#[derive(Debug, Deserialize)]
struct Project {
    title: String,
}

#[derive(Debug, Deserialize)]
struct Version {
    id: String,
    #[serde(default)]
    name: String,
    version_number: String,
    #[serde(default)]
    game_versions: Vec<String>,
    #[serde(default)]
    loaders: Vec<String>,
    #[serde(default)]
    date_published: Option<DateTime<Utc>>,
}

pub struct Modrinth {
    client: Client,
    api_base: String,
}

impl Modrinth {
    pub fn new(client: Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn check(
        &self,
        url: &str,
        mc_versions: &[String],
        loaders: &[String],
        last_version: Option<&str>,
    ) -> Result<Option<CandidateRelease>, ExtractError> {
        // /<project type>/<slug>/versions
        let project_type = path_segment(url, 0)?;
        let slug = path_segment(url, 1)?;

        let project: Project = get_json(
            &self.client,
            &format!("{}/project/{}", self.api_base, slug),
            &[],
        )
        .await?;
        let mut versions: Vec<Version> = get_json(
            &self.client,
            &format!("{}/project/{}/version", self.api_base, slug),
            &[],
        )
        .await?;

        // Newest first, undated entries last. Equal dates keep the served order.
        versions.sort_by(|a, b| b.date_published.cmp(&a.date_published));

        let latest = versions.into_iter().find_map(|v| {
            let mut tags = v.game_versions;
            tags.extend(v.loaders);
            debug!("{} ({}) -> {:?}", v.name, v.version_number, tags);
            matches(&tags, mc_versions, loaders).then(|| (v.id, v.version_number, tags))
        });

        Ok(latest
            .filter(|(_, version, _)| is_new(version, last_version))
            .map(|(id, version, tags)| CandidateRelease {
                display_name: project.title,
                platform: Platform::Modrinth,
                version,
                compatible_tags: tags,
                canonical_link: format!(
                    "https://modrinth.com/{}/{}/version/{}",
                    project_type, slug, id
                ),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LISTING: &str = "https://modrinth.com/mod/sodium/versions";

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    async fn mock_project(versions: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/project/sodium"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "Sodium"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/project/sodium/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(versions))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn newest_matching_version_is_returned() {
        let server = mock_project(serde_json::json!([
            {
                "id": "old", "name": "Sodium 0.5.11", "version_number": "0.5.11",
                "game_versions": ["1.21.1"], "loaders": ["fabric"],
                "date_published": "2024-06-01T00:00:00Z"
            },
            {
                "id": "new", "name": "Sodium 0.6.0", "version_number": "0.6.0",
                "game_versions": ["1.21.1"], "loaders": ["fabric", "neoforge"],
                "date_published": "2024-10-01T00:00:00Z"
            }
        ]))
        .await;
        let modrinth = Modrinth::new(Client::new(), &server.uri());

        let found = modrinth
            .check(LISTING, &strings(&["1.21.1"]), &strings(&["fabric"]), Some("0.5.11"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.version, "0.6.0");
        assert_eq!(found.display_name, "Sodium");
        assert_eq!(found.canonical_link, "https://modrinth.com/mod/sodium/version/new");
        assert_eq!(found.compatible_tags, strings(&["1.21.1", "fabric", "neoforge"]));
    }

    #[tokio::test]
    async fn known_newest_version_is_no_change() {
        let server = mock_project(serde_json::json!([
            {
                "id": "b", "version_number": "2.0.0",
                "game_versions": ["1.21.1"], "loaders": ["forge"],
                "date_published": "2025-01-02T00:00:00Z"
            },
            {
                "id": "a", "version_number": "1.9.0",
                "game_versions": ["1.21.1"], "loaders": ["forge"],
                "date_published": "2024-12-01T00:00:00Z"
            }
        ]))
        .await;
        let modrinth = Modrinth::new(Client::new(), &server.uri());

        let found = modrinth
            .check(LISTING, &strings(&["all"]), &strings(&["all"]), Some("2.0.0"))
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn filters_skip_incompatible_versions() {
        let server = mock_project(serde_json::json!([
            {
                "id": "b", "version_number": "2.0.0+neoforge",
                "game_versions": ["1.21.1"], "loaders": ["neoforge"],
                "date_published": "2025-01-02T00:00:00Z"
            },
            {
                "id": "a", "version_number": "2.0.0+forge",
                "game_versions": ["1.20.1"], "loaders": ["forge"],
                "date_published": "2025-01-01T00:00:00Z"
            }
        ]))
        .await;
        let modrinth = Modrinth::new(Client::new(), &server.uri());

        let found = modrinth
            .check(LISTING, &strings(&["1.20.1"]), &strings(&["forge"]), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.version, "2.0.0+forge");

        let none = modrinth
            .check(LISTING, &strings(&["1.19.2"]), &strings(&["all"]), None)
            .await
            .unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn undated_versions_sort_after_dated_ones() {
        let server = mock_project(serde_json::json!([
            {
                "id": "u", "version_number": "9.9.9",
                "game_versions": ["1.21.1"], "loaders": ["fabric"]
            },
            {
                "id": "d", "version_number": "1.0.0",
                "game_versions": ["1.21.1"], "loaders": ["fabric"],
                "date_published": "2024-01-01T00:00:00Z"
            }
        ]))
        .await;
        let modrinth = Modrinth::new(Client::new(), &server.uri());

        let found = modrinth
            .check(LISTING, &strings(&["all"]), &strings(&["all"]), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.version, "1.0.0");
    }

    #[tokio::test]
    async fn missing_project_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let modrinth = Modrinth::new(Client::new(), &server.uri());

        let err = modrinth
            .check(LISTING, &strings(&["all"]), &strings(&["all"]), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "fetch");
    }

    #[tokio::test]
    async fn malformed_version_list_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/project/sodium"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"title": "Sodium"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/project/sodium/version"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        let modrinth = Modrinth::new(Client::new(), &server.uri());

        let err = modrinth
            .check(LISTING, &strings(&["all"]), &strings(&["all"]), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "parse");
    }
}
