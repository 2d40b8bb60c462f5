//! Steam Web API profile source (`ISteamUser/GetPlayerSummaries/v0002`).

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use agdb_core::SteamId;

use super::{ExternalError, ProfileMetadata, ProfileSource};

pub const DEFAULT_STEAM_API_BASE_URL: &str = "https://api.steampowered.com";

#[derive(Debug, Clone)]
pub struct SteamWebApi {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl SteamWebApi {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ExternalError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("agdb/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExternalError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http_client,
        })
    }
}

#[async_trait::async_trait]
impl ProfileSource for SteamWebApi {
    #[instrument(skip(self), fields(steam_id = %steam_id))]
    async fn resolve_profile(&self, steam_id: SteamId) -> Result<ProfileMetadata, ExternalError> {
        let url = format!("{}/ISteamUser/GetPlayerSummaries/v0002/", self.base_url);
        let steam64 = steam_id.steam64().to_string();

        let resp = self
            .http_client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("steamids", steam64.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let envelope: SummariesEnvelope = resp.json().await?;
        debug!(players = envelope.response.players.len(), "steam summaries received");
        profile_from_envelope(envelope)
    }
}

#[derive(Debug, Deserialize)]
struct SummariesEnvelope {
    response: SummariesResponse,
}

#[derive(Debug, Deserialize)]
struct SummariesResponse {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

#[derive(Debug, Deserialize)]
struct PlayerSummary {
    personaname: Option<String>,
    profileurl: Option<String>,
    avatarfull: Option<String>,
    timecreated: Option<i64>,
    lastlogoff: Option<i64>,
}

fn profile_from_envelope(envelope: SummariesEnvelope) -> Result<ProfileMetadata, ExternalError> {
    let summary = envelope
        .response
        .players
        .into_iter()
        .next()
        .ok_or_else(|| ExternalError::Unavailable("no summary for account".to_string()))?;

    Ok(ProfileMetadata {
        display_name: summary.personaname,
        profile_url: summary.profileurl,
        avatar_url: summary.avatarfull,
        created_at: summary.timecreated.and_then(from_unix),
        last_activity_at: summary.lastlogoff.and_then(from_unix),
    })
}

fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_maps_to_profile() {
        let body = r#"{
            "response": {
                "players": [{
                    "steamid": "76561197960287930",
                    "personaname": "Alice",
                    "profileurl": "https://steamcommunity.com/id/alice/",
                    "avatarfull": "https://avatars.steamstatic.com/a_full.jpg",
                    "timecreated": 1063407589,
                    "lastlogoff": 1700000000
                }]
            }
        }"#;
        let envelope: SummariesEnvelope = serde_json::from_str(body).unwrap();
        let profile = profile_from_envelope(envelope).unwrap();

        assert_eq!(profile.display_name.as_deref(), Some("Alice"));
        assert_eq!(profile.created_at.unwrap().timestamp(), 1_063_407_589);
        assert_eq!(profile.last_activity_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn private_profile_fields_stay_empty() {
        let body = r#"{"response":{"players":[{"personaname":"Bob"}]}}"#;
        let envelope: SummariesEnvelope = serde_json::from_str(body).unwrap();
        let profile = profile_from_envelope(envelope).unwrap();

        assert_eq!(profile.display_name.as_deref(), Some("Bob"));
        assert_eq!(profile.avatar_url, None);
        assert_eq!(profile.created_at, None);
    }

    #[test]
    fn empty_player_list_is_unavailable() {
        let envelope: SummariesEnvelope =
            serde_json::from_str(r#"{"response":{"players":[]}}"#).unwrap();
        assert!(matches!(
            profile_from_envelope(envelope),
            Err(ExternalError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_api_key() {
        // Nothing listens on port 1, so the request fails before any response.
        let api = SteamWebApi::new("http://127.0.0.1:1", "SECRETKEY123", Duration::from_secs(2))
            .unwrap();
        let steam_id: SteamId = "STEAM_0:0:1".parse().unwrap();

        let err = api.resolve_profile(steam_id).await.unwrap_err();
        assert!(matches!(err, ExternalError::Transport(_)));
        let text = err.to_string();
        assert!(!text.contains("SECRETKEY123"), "key leaked: {text}");
        assert!(!text.contains("key="), "query leaked: {text}");
    }
}
