//! Enriched player profile: a correlation plus best-effort external metadata.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use agdb_core::SteamId;
use agdb_players::{BanState, Correlation};

use crate::external::{GeoLocator, ProfileMetadata, ProfileSource};

/// Everything known about one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub steam_id: SteamId,
    pub ban: BanState,
    pub related_steam_ids: Vec<SteamId>,
    pub nicknames: Vec<String>,
    pub steam_name: Option<String>,
    pub steam_url: Option<String>,
    pub avatar: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub country: Option<String>,
}

/// Combines a correlation with profile and geolocation lookups.
///
/// Lookups run concurrently; a failing source leaves its fields empty.
#[derive(Clone)]
pub struct ProfileEnricher {
    profiles: Arc<dyn ProfileSource>,
    geo: Arc<dyn GeoLocator>,
}

impl ProfileEnricher {
    pub fn new(profiles: Arc<dyn ProfileSource>, geo: Arc<dyn GeoLocator>) -> Self {
        Self { profiles, geo }
    }

    pub async fn enrich(&self, correlation: &Correlation) -> PlayerProfile {
        let subject = correlation.subject();
        let steam_id = subject.steam_id();

        let profile_lookup = async {
            match self.profiles.resolve_profile(steam_id).await {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!(steam_id = %steam_id, error = %err, "profile lookup failed");
                    ProfileMetadata::default()
                }
            }
        };
        let country_lookup = async {
            let ip = correlation.first_address()?;
            match self.geo.country_code(ip).await {
                Ok(code) => code,
                Err(err) => {
                    warn!(steam_id = %steam_id, error = %err, "geolocation failed");
                    None
                }
            }
        };
        let (metadata, country) = tokio::join!(profile_lookup, country_lookup);

        PlayerProfile {
            steam_id,
            ban: subject.ban().clone(),
            related_steam_ids: correlation.related_ids().collect(),
            nicknames: correlation.nicknames().iter().cloned().collect(),
            steam_name: metadata.display_name,
            steam_url: metadata.profile_url,
            avatar: metadata.avatar_url,
            created_at: metadata.created_at,
            last_activity_at: metadata.last_activity_at,
            country,
        }
    }
}

impl std::fmt::Debug for ProfileEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileEnricher").finish_non_exhaustive()
    }
}
