use tracing::{info, instrument};

use agdb_players::BanDecision;

use super::{BanSummary, EngineResult, IdentityEngine};
use crate::store::{HistoryStore, PlayerStore};

impl<P, H> IdentityEngine<P, H>
where
    P: PlayerStore,
    H: HistoryStore,
{
    /// Apply `decision` to `raw`'s player and to every player related to it.
    ///
    /// The related set is computed fresh, so players registered afterwards are
    /// not touched. Every write in one call carries the same state.
    #[instrument(skip(self, decision), fields(ban = decision.is_ban()), err)]
    pub async fn set_ban_state(&self, raw: &str, decision: BanDecision) -> EngineResult<BanSummary> {
        let subject = self.require_player(raw).await?;
        let correlation = self.correlate_player(subject).await?;
        let state = decision.target_state();

        self.players
            .set_ban(correlation.subject().id(), &state)
            .await?;
        for related in correlation.related_player_ids() {
            self.players.set_ban(related, &state).await?;
        }

        let steam_id = correlation.subject().steam_id();
        let related_updated = correlation.related_count();
        info!(
            steam_id = %steam_id,
            banned = state.is_banned(),
            related_updated,
            "ban state propagated"
        );

        Ok(BanSummary {
            steam_id,
            banned: state.is_banned(),
            related_updated,
            message: decision.summary_message(),
        })
    }
}
