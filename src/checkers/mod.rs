//! Per-platform release extraction and the helpers they share.

pub mod browser;
pub mod curseforge;
pub mod filter;
pub mod modrinth;
pub mod mrcrayfish;
pub mod normalize;

pub use filter::matches;
pub use normalize::{classify, normalize_url};

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use tracing_unwrap::ResultExt;

use crate::config::Timeouts;
use crate::error::{ExtractError, FetchError, ParseError};

/// Dot-separated numeric groups, as found in file display names
/// like "Create 6.0.6 for mc1.21.1".
static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+\.\d+(?:\.\d+)*)\b").expect_or_log("Invalid version pattern"));

pub fn extract_version(text: &str) -> Option<String> {
    VERSION_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether a freshly found version should be announced.
pub fn is_new(found: &str, last_version: Option<&str>) -> bool {
    last_version != Some(found)
}

pub fn http_client(timeouts: &Timeouts) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!("modwatch/", env!("CARGO_PKG_VERSION")))
        .timeout(timeouts.request())
        .build()
}

/// Returns the `n`th path segment of `url`.
pub(crate) fn path_segment(url: &str, n: usize) -> Result<String, ParseError> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut s| s.nth(n))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .ok_or_else(|| ParseError::BadUrl(url.to_string()))
}

fn request_error(url: &str, source: reqwest::Error) -> FetchError {
    FetchError::Request {
        url: url.to_string(),
        source,
    }
}

async fn send(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<reqwest::Response, FetchError> {
    debug!("GET {}", url);
    let mut request = client.get(url);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = request.send().await.map_err(|e| request_error(url, e))?;
    let status = response.status();
    if !status.is_success() {
        if status == reqwest::StatusCode::FORBIDDEN {
            warn!("Access to {} is forbidden", url);
        }
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<T, ExtractError> {
    let response = send(client, url, headers).await?;
    response.json::<T>().await.map_err(|source| {
        if source.is_decode() {
            ParseError::Json {
                url: url.to_string(),
                source,
            }
            .into()
        } else {
            request_error(url, source).into()
        }
    })
}

pub(crate) async fn get_text(client: &Client, url: &str) -> Result<String, ExtractError> {
    let response = send(client, url, &[]).await?;
    Ok(response
        .text()
        .await
        .map_err(|e| request_error(url, e))?)
}
