//! Request/response DTOs.
//!
//! Field names follow what the game-server plugin and the moderation bot
//! already send and parse (`steamID`, `isBanned`, ...).

use serde::{Deserialize, Serialize};

use agdb_infra::{BanSummary, PlayerProfile};
use agdb_players::Player;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterPlayerRequest {
    #[serde(rename = "steamID")]
    pub steam_id: String,
    pub nickname: String,
    pub ip: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BanRequest {
    pub reason: Option<String>,
}

impl BanRequest {
    /// An empty or whitespace-only body means "no reason"; anything else must
    /// be a well-formed request.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: String,
    #[serde(rename = "steamID")]
    pub steam_id: String,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
}

impl From<&Player> for PlayerResponse {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id().to_string(),
            steam_id: player.steam_id().to_string(),
            is_banned: player.is_banned(),
            ban_reason: player.ban_reason().map(str::to_string),
        }
    }
}

/// `creationTime` and `latestActivity` are Unix seconds.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub steam_name: Option<String>,
    #[serde(rename = "steamID")]
    pub steam_id: String,
    pub steam_url: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "relatedSteamIDs")]
    pub related_steam_ids: Vec<String>,
    pub avatar: Option<String>,
    pub creation_time: Option<i64>,
    pub latest_activity: Option<i64>,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub nicknames: Vec<String>,
}

impl From<PlayerProfile> for ProfileResponse {
    fn from(profile: PlayerProfile) -> Self {
        Self {
            steam_name: profile.steam_name,
            steam_id: profile.steam_id.to_string(),
            steam_url: profile.steam_url,
            country: profile.country,
            related_steam_ids: profile
                .related_steam_ids
                .iter()
                .map(ToString::to_string)
                .collect(),
            avatar: profile.avatar,
            creation_time: profile.created_at.map(|t| t.timestamp()),
            latest_activity: profile.last_activity_at.map(|t| t.timestamp()),
            is_banned: profile.ban.is_banned(),
            ban_reason: profile.ban.reason().map(str::to_string),
            nicknames: profile.nicknames,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanSummaryResponse {
    #[serde(rename = "steamID")]
    pub steam_id: String,
    pub message: String,
    pub related_updated: usize,
}

impl From<BanSummary> for BanSummaryResponse {
    fn from(summary: BanSummary) -> Self {
        Self {
            steam_id: summary.steam_id.to_string(),
            message: summary.message.to_string(),
            related_updated: summary.related_updated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientIpResponse {
    pub ip: String,
}
