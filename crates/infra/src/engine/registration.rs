use tracing::{debug, instrument, warn};

use agdb_core::{PlayerId, SteamId};
use agdb_players::{NewObservation, Player};

use super::{EngineResult, IdentityEngine};
use crate::store::{HistoryStore, PlayerStore};

impl<P, H> IdentityEngine<P, H>
where
    P: PlayerStore,
    H: HistoryStore,
{
    /// Record a login reported by a game server.
    ///
    /// Accepts any Steam ID encoding. See [`Self::register_player`].
    pub async fn register(&self, raw: &str, nickname: &str, ip: &str) -> EngineResult<Player> {
        let steam_id = SteamId::canonicalize(raw)?;
        self.register_player(steam_id, nickname, ip).await
    }

    /// Record that `steam_id` was seen as `nickname` from `ip`.
    ///
    /// A player seen for the first time starts banned (empty reason) when any
    /// player already observed at `ip` is banned. Repeating a call is a no-op
    /// that returns the same player.
    #[instrument(skip(self, nickname), fields(steam_id = %steam_id), err)]
    pub async fn register_player(
        &self,
        steam_id: SteamId,
        nickname: &str,
        ip: &str,
    ) -> EngineResult<Player> {
        let player = match self.players.find_by_steam_id(steam_id).await? {
            Some(existing) => existing,
            None => {
                let inherits_ban = self.address_has_banned_player(ip).await?;
                if inherits_ban {
                    warn!(
                        steam_id = %steam_id,
                        ip,
                        "new player inherits ban from an account at the same address"
                    );
                }
                self.players
                    .insert_or_get(Player::first_seen(steam_id, inherits_ban))
                    .await?
            }
        };

        let recorded = self
            .history
            .record(NewObservation {
                player_id: player.id(),
                nickname: nickname.to_string(),
                ip: ip.to_string(),
            })
            .await?;
        debug!(player_id = %player.id(), recorded, "registration processed");

        Ok(player)
    }

    async fn address_has_banned_player(&self, ip: &str) -> EngineResult<bool> {
        let mut owners: Vec<PlayerId> = self
            .history
            .at_address(ip)
            .await?
            .into_iter()
            .map(|sighting| sighting.player_id)
            .collect();
        if owners.is_empty() {
            return Ok(false);
        }
        owners.sort();
        owners.dedup();

        let players = self.players.get_many(&owners).await?;
        Ok(players.iter().any(Player::is_banned))
    }
}
