//! External enrichment sources.
//!
//! Both sources are best-effort: the profile layer turns every error here into an
//! absent field. Nothing in the engine depends on them.

pub mod geo;
pub mod steam;

use chrono::{DateTime, Utc};
use thiserror::Error;

use agdb_core::SteamId;

pub use geo::IpApiLocator;
pub use steam::SteamWebApi;

#[derive(Debug, Error)]
pub enum ExternalError {
    /// The source is not configured or had nothing for the key.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ExternalError {
    /// The request URL is dropped: it carries the Steam API key as a query
    /// parameter and these errors end up in logs.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_decode() {
            ExternalError::Decode(err.to_string())
        } else {
            ExternalError::Transport(err.to_string())
        }
    }
}

/// Public profile data for one Steam account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileMetadata {
    pub display_name: Option<String>,
    pub profile_url: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

#[async_trait::async_trait]
pub trait ProfileSource: Send + Sync {
    async fn resolve_profile(&self, steam_id: SteamId) -> Result<ProfileMetadata, ExternalError>;
}

#[async_trait::async_trait]
pub trait GeoLocator: Send + Sync {
    /// ISO country code for `ip`, `None` when the source does not know.
    async fn country_code(&self, ip: &str) -> Result<Option<String>, ExternalError>;
}

/// Profile source used when no Steam API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProfileSource;

#[async_trait::async_trait]
impl ProfileSource for DisabledProfileSource {
    async fn resolve_profile(&self, _steam_id: SteamId) -> Result<ProfileMetadata, ExternalError> {
        Err(ExternalError::Unavailable(
            "steam profile lookups are disabled".to_string(),
        ))
    }
}
