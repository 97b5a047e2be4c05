use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use tracing_unwrap::ResultExt;

use super::{get_text, is_new};
use crate::error::{ExtractError, ParseError};
use crate::model::{CandidateRelease, Platform};

static PAGE_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"v?(\d+(?:\.\d+)+)").expect_or_log("Invalid version pattern"));
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect_or_log("Invalid title selector"));
static BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect_or_log("Invalid body selector"));

const DEFAULT_NAME: &str = "MrCrayfish Mod";

/// Pulls the mod name and the first version-looking string out of a page.
/// Visible body text is searched before the raw markup.
pub fn parse_page(html: &str) -> (String, Option<String>) {
    let document = Html::parse_document(html);
    let name = document
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_NAME.to_string());

    let body_text = document
        .select(&BODY)
        .next()
        .map(|b| b.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    let version = [body_text.as_str(), html].into_iter().find_map(|text| {
        PAGE_VERSION_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    });
    (name, version)
}

pub struct MrCrayfish {
    client: Client,
}

impl MrCrayfish {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The site exposes no compatibility tags, so no filter is applied.
    pub async fn check(
        &self,
        url: &str,
        last_version: Option<&str>,
    ) -> Result<Option<CandidateRelease>, ExtractError> {
        let html = get_text(&self.client, url).await?;
        let (display_name, version) = parse_page(&html);
        let version = version.ok_or_else(|| ParseError::NoVersion(display_name.clone()))?;
        debug!("MrCrayfish {} is at {}", display_name, version);
        if !is_new(&version, last_version) {
            return Ok(None);
        }
        Ok(Some(CandidateRelease {
            display_name,
            platform: Platform::MrCrayfish,
            version,
            compatible_tags: Vec::new(),
            canonical_link: url.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title> MrCrayfish's Furniture Mod </title>
  <script src="/static/app-2.14.0.js"></script>
</head>
<body>
  <h1>Furniture Mod</h1>
  <p>Latest release: v7.0.0-pre36 for Minecraft 1.20.1</p>
</body>
</html>"#;

    #[test]
    fn parses_title_and_body_version() {
        let (name, version) = parse_page(PAGE);
        assert_eq!(name, "MrCrayfish's Furniture Mod");
        assert_eq!(version.as_deref(), Some("7.0.0"));
    }

    #[test]
    fn defaults_without_title_or_version() {
        let (name, version) = parse_page("<html><body><p>Coming soon</p></body></html>");
        assert_eq!(name, DEFAULT_NAME);
        assert_eq!(version, None);
    }

    #[tokio::test]
    async fn check_against_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mods/furniture"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;
        let url = format!("{}/mods/furniture", server.uri());
        let checker = MrCrayfish::new(Client::new());

        let found = checker.check(&url, Some("6.9.0")).await.unwrap().unwrap();
        assert_eq!(found.version, "7.0.0");
        assert_eq!(found.platform, Platform::MrCrayfish);
        assert_eq!(found.canonical_link, url);

        assert_eq!(checker.check(&url, Some("7.0.0")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn server_error_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let checker = MrCrayfish::new(Client::new());
        let err = checker
            .check(&format!("{}/mods/furniture", server.uri()), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "fetch");
    }
}
