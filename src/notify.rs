//! Outbound update notifications.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::NotifyError;
use crate::model::CandidateRelease;

/// Placeholder in the template replaced by the role mention.
pub const ROLE_PLACEHOLDER: &str = "<@&ROLE_ID>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    pub id: u64,
    pub guild_id: Option<u64>,
    /// Mention for the configured role, if the guild has one.
    pub role_mention: Option<String>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// `Ok(None)` when the channel does not exist or is not visible to the bot.
    async fn resolve_channel(&self, channel_id: u64) -> Result<Option<ResolvedChannel>, NotifyError>;

    async fn send(&self, channel: &ResolvedChannel, content: &str) -> Result<(), NotifyError>;
}

pub fn format_message(template: &str, release: &CandidateRelease, role_mention: Option<&str>) -> String {
    template
        .replace("{mod_name}", &release.display_name)
        .replace("{platform}", &release.platform.to_string())
        .replace("{version}", &release.version)
        .replace("{url}", &release.canonical_link)
        .replace(ROLE_PLACEHOLDER, role_mention.unwrap_or(""))
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default)]
    guild_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Role {
    id: String,
    name: String,
}

/// Talks to the Discord REST API with a bot token.
pub struct DiscordNotifier {
    client: Client,
    api_base: String,
    token: String,
    role_name: String,
}

impl DiscordNotifier {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_base: config.discord.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            role_name: config.role_name.clone(),
        }
    }

    fn check_status(endpoint: &str, status: StatusCode) -> Result<(), NotifyError> {
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(NotifyError::Unauthorized),
            s => Err(NotifyError::Status {
                endpoint: endpoint.to_string(),
                status: s.as_u16(),
            }),
        }
    }

    async fn get(&self, endpoint: &str) -> Result<reqwest::Response, NotifyError> {
        Ok(self
            .client
            .get(format!("{}{}", self.api_base, endpoint))
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await?)
    }

    async fn role_mention(&self, guild_id: u64) -> Result<Option<String>, NotifyError> {
        let endpoint = format!("/guilds/{}/roles", guild_id);
        let response = self.get(&endpoint).await?;
        Self::check_status(&endpoint, response.status())?;
        let roles: Vec<Role> = response.json().await?;
        Ok(roles
            .into_iter()
            .find(|r| r.name == self.role_name)
            .map(|r| format!("<@&{}>", r.id)))
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn resolve_channel(&self, channel_id: u64) -> Result<Option<ResolvedChannel>, NotifyError> {
        let endpoint = format!("/channels/{}", channel_id);
        let response = self.get(&endpoint).await?;
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::FORBIDDEN) {
            return Ok(None);
        }
        Self::check_status(&endpoint, response.status())?;
        let channel: Channel = response.json().await?;
        let guild_id = channel.guild_id.and_then(|g| g.parse().ok());

        let role_mention = match guild_id {
            Some(guild_id) => self.role_mention(guild_id).await?,
            None => None,
        };
        debug!(channel_id, ?guild_id, ?role_mention, "Resolved channel");
        Ok(Some(ResolvedChannel {
            id: channel_id,
            guild_id,
            role_mention,
        }))
    }

    async fn send(&self, channel: &ResolvedChannel, content: &str) -> Result<(), NotifyError> {
        let endpoint = format!("/channels/{}/messages", channel.id);
        let response = self
            .client
            .post(format!("{}{}", self.api_base, endpoint))
            .header("Authorization", format!("Bot {}", self.token))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        Self::check_status(&endpoint, response.status())
    }
}
