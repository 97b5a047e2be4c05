//! Error taxonomy shared by the checkers, storage and commands.

use thiserror::Error;

/// Transport level failures while talking to a hosting site.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("browser failed on {url}: {message}")]
    Browser { url: String, message: String },

    #[error("timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },
}

/// The response arrived but did not have the expected shape.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("missing {field} in response from {url}")]
    MissingField { url: String, field: &'static str },

    #[error("no version string found in {0:?}")]
    NoVersion(String),

    #[error("cannot extract project slug from {0}")]
    BadUrl(String),
}

/// Anything an extractor can fail with.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ExtractError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Fetch(_) => "fetch",
            ExtractError::Parse(_) => "parse",
        }
    }
}

/// Malformed configuration or persistence documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// User input rejected by the add command. The message is shown verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid loader(s): {}\nAllowed: {}", .invalid.join(", "), .allowed.join(", "))]
    InvalidLoaders {
        invalid: Vec<String>,
        allowed: Vec<String>,
    },

    #[error("Invalid Minecraft version(s): {}\nAllowed: {}", .invalid.join(", "), .allowed.join(", "))]
    InvalidMcVersions {
        invalid: Vec<String>,
        allowed: Vec<String>,
    },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("This mod with those filters is already being tracked.")]
    AlreadyTracked,
}

/// Chat platform failures.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("chat platform returned HTTP {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("chat platform rejected the bot token")]
    Unauthorized,
}
