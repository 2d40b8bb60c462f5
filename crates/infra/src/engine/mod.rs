//! Identity engine: registration, correlation and ban propagation over the stores.
//!
//! The engine owns no state besides its store handles. Each operation
//! canonicalizes its identifier before touching storage, and the related set is
//! recomputed on every call (nothing is materialized).

mod ban_propagation;
mod correlation;
mod registration;

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use agdb_core::{DomainError, SteamId};
use agdb_players::Player;

use crate::store::{HistoryStore, PlayerStore, StoreError, StoreResult};

/// Engine operation error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Carries the raw input exactly as the caller sent it.
    #[error("invalid Steam ID: {0}")]
    InvalidIdentifier(String),

    #[error("player {0} not found")]
    NotFound(SteamId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidIdentifier(raw) => EngineError::InvalidIdentifier(raw),
            // Engine lookups report NotFound with a SteamId themselves.
            DomainError::NotFound(what) => EngineError::Store(StoreError::Missing(what)),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Outcome of one ban or unban.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BanSummary {
    pub steam_id: SteamId,
    pub banned: bool,
    /// Related players written alongside the subject.
    pub related_updated: usize,
    pub message: &'static str,
}

/// Registration, correlation and ban propagation over a player store and a
/// history store.
#[derive(Debug, Clone)]
pub struct IdentityEngine<P, H> {
    players: P,
    history: H,
}

impl<P, H> IdentityEngine<P, H>
where
    P: PlayerStore,
    H: HistoryStore,
{
    pub fn new(players: P, history: H) -> Self {
        Self { players, history }
    }

    pub fn players(&self) -> &P {
        &self.players
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Every player, in creation order. Takes no identifier, so only the
    /// store can fail.
    #[instrument(skip(self), err)]
    pub async fn list_players(&self) -> StoreResult<Vec<Player>> {
        self.players.list().await
    }

    /// Canonicalize and look up, failing with `NotFound` when absent.
    async fn require_player(&self, raw: &str) -> EngineResult<Player> {
        let steam_id = SteamId::canonicalize(raw)?;
        self.players
            .find_by_steam_id(steam_id)
            .await?
            .ok_or(EngineError::NotFound(steam_id))
    }
}
