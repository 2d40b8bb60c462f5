use std::sync::Arc;

use thiserror::Error;

use agdb_auth::ServerCredential;
use agdb_core::{PlayerId, SteamId};
use agdb_players::{BanState, NewObservation, Observation, Player};

/// Storage operation error.
///
/// These are **infrastructure errors** as opposed to domain errors: callers cannot
/// fix them by changing their input, so the HTTP layer reports them as 500s.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record the operation depends on does not exist.
    #[error("record missing: {0}")]
    Missing(String),

    /// A schema constraint rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Connection, lock or decoding failure.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Player identity records, one per canonical Steam ID.
#[async_trait::async_trait]
pub trait PlayerStore: Send + Sync {
    /// Every player, in creation order.
    async fn list(&self) -> StoreResult<Vec<Player>>;

    async fn find_by_steam_id(&self, steam_id: SteamId) -> StoreResult<Option<Player>>;

    /// Players for the given keys. Unknown keys are skipped; order is unspecified.
    async fn get_many(&self, ids: &[PlayerId]) -> StoreResult<Vec<Player>>;

    /// Insert `player` unless its Steam ID is already taken, then return the
    /// stored record. Concurrent callers for one Steam ID all get the same record.
    async fn insert_or_get(&self, player: Player) -> StoreResult<Player>;

    async fn set_ban(&self, id: PlayerId, ban: &BanState) -> StoreResult<()>;
}

/// Append-only login history.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Store the sighting if its `(player, ip, nickname)` triple is new.
    /// Returns whether a row was written.
    async fn record(&self, observation: NewObservation) -> StoreResult<bool>;

    /// The player's sightings, oldest first.
    async fn for_player(&self, player_id: PlayerId) -> StoreResult<Vec<Observation>>;

    /// Every sighting at `ip`, oldest first.
    async fn at_address(&self, ip: &str) -> StoreResult<Vec<Observation>>;
}

/// Registered game servers allowed to report sightings.
#[async_trait::async_trait]
pub trait ServerCredentialStore: Send + Sync {
    /// Idempotent.
    async fn register(&self, credential: ServerCredential) -> StoreResult<()>;

    async fn contains(&self, credential: &ServerCredential) -> StoreResult<bool>;
}

#[async_trait::async_trait]
impl<S> PlayerStore for Arc<S>
where
    S: PlayerStore + ?Sized,
{
    async fn list(&self) -> StoreResult<Vec<Player>> {
        (**self).list().await
    }

    async fn find_by_steam_id(&self, steam_id: SteamId) -> StoreResult<Option<Player>> {
        (**self).find_by_steam_id(steam_id).await
    }

    async fn get_many(&self, ids: &[PlayerId]) -> StoreResult<Vec<Player>> {
        (**self).get_many(ids).await
    }

    async fn insert_or_get(&self, player: Player) -> StoreResult<Player> {
        (**self).insert_or_get(player).await
    }

    async fn set_ban(&self, id: PlayerId, ban: &BanState) -> StoreResult<()> {
        (**self).set_ban(id, ban).await
    }
}

#[async_trait::async_trait]
impl<S> HistoryStore for Arc<S>
where
    S: HistoryStore + ?Sized,
{
    async fn record(&self, observation: NewObservation) -> StoreResult<bool> {
        (**self).record(observation).await
    }

    async fn for_player(&self, player_id: PlayerId) -> StoreResult<Vec<Observation>> {
        (**self).for_player(player_id).await
    }

    async fn at_address(&self, ip: &str) -> StoreResult<Vec<Observation>> {
        (**self).at_address(ip).await
    }
}

#[async_trait::async_trait]
impl<S> ServerCredentialStore for Arc<S>
where
    S: ServerCredentialStore + ?Sized,
{
    async fn register(&self, credential: ServerCredential) -> StoreResult<()> {
        (**self).register(credential).await
    }

    async fn contains(&self, credential: &ServerCredential) -> StoreResult<bool> {
        (**self).contains(credential).await
    }
}
