use std::collections::{HashMap, HashSet};

use tracing::instrument;

use agdb_core::PlayerId;
use agdb_players::{Correlation, CorrelationBuilder, Player};

use super::{EngineError, EngineResult, IdentityEngine};
use crate::store::{HistoryStore, PlayerStore, StoreError};

impl<P, H> IdentityEngine<P, H>
where
    P: PlayerStore,
    H: HistoryStore,
{
    /// Players that shared an address with `raw`'s player, plus every nickname
    /// seen for it or at its addresses. Read-only.
    #[instrument(skip(self), err)]
    pub async fn correlate(&self, raw: &str) -> EngineResult<Correlation> {
        let subject = self.require_player(raw).await?;
        self.correlate_player(subject).await
    }

    /// One hop out from `subject`: relatives' other addresses are not followed.
    pub async fn correlate_player(&self, subject: Player) -> EngineResult<Correlation> {
        let own_history = self.history.for_player(subject.id()).await?;
        let mut builder = CorrelationBuilder::new(subject, &own_history);

        let mut sightings = Vec::new();
        for ip in builder.addresses().to_vec() {
            sightings.extend(self.history.at_address(&ip).await?);
        }

        let owner_ids: Vec<PlayerId> = sightings
            .iter()
            .map(|s| s.player_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let owners: HashMap<PlayerId, Player> = self
            .players
            .get_many(&owner_ids)
            .await?
            .into_iter()
            .map(|p| (p.id(), p))
            .collect();

        for sighting in &sightings {
            let owner = owners.get(&sighting.player_id).ok_or_else(|| {
                EngineError::Store(StoreError::Missing(format!(
                    "player {} referenced by history",
                    sighting.player_id
                )))
            })?;
            builder.observe(sighting, owner);
        }

        Ok(builder.build())
    }
}
