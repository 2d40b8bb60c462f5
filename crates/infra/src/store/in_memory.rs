use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;

use agdb_auth::ServerCredential;
use agdb_core::{PlayerId, SteamId};
use agdb_players::{BanState, NewObservation, Observation, Player};

use super::r#trait::{
    HistoryStore, PlayerStore, ServerCredentialStore, StoreError, StoreResult,
};

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[derive(Debug, Default)]
struct PlayerTable {
    /// Insertion (creation) order.
    rows: Vec<Player>,
    by_id: HashMap<PlayerId, usize>,
    by_steam_id: HashMap<SteamId, usize>,
}

/// In-memory player store.
///
/// Intended for tests/dev. One write lock covers the lookup and the insert in
/// `insert_or_get`, which is what makes first registration race-free here.
#[derive(Debug, Default)]
pub struct InMemoryPlayerStore {
    table: RwLock<PlayerTable>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PlayerStore for InMemoryPlayerStore {
    async fn list(&self) -> StoreResult<Vec<Player>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.rows.clone())
    }

    async fn find_by_steam_id(&self, steam_id: SteamId) -> StoreResult<Option<Player>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table
            .by_steam_id
            .get(&steam_id)
            .map(|&idx| table.rows[idx].clone()))
    }

    async fn get_many(&self, ids: &[PlayerId]) -> StoreResult<Vec<Player>> {
        let table = self.table.read().map_err(poisoned)?;
        let unique: HashSet<&PlayerId> = ids.iter().collect();
        Ok(unique
            .into_iter()
            .filter_map(|id| table.by_id.get(id).map(|&idx| table.rows[idx].clone()))
            .collect())
    }

    async fn insert_or_get(&self, player: Player) -> StoreResult<Player> {
        let mut table = self.table.write().map_err(poisoned)?;

        if let Some(&idx) = table.by_steam_id.get(&player.steam_id()) {
            return Ok(table.rows[idx].clone());
        }
        if table.by_id.contains_key(&player.id()) {
            return Err(StoreError::Constraint(format!(
                "duplicate player id {}",
                player.id()
            )));
        }

        let idx = table.rows.len();
        table.by_id.insert(player.id(), idx);
        table.by_steam_id.insert(player.steam_id(), idx);
        table.rows.push(player.clone());
        Ok(player)
    }

    async fn set_ban(&self, id: PlayerId, ban: &BanState) -> StoreResult<()> {
        let mut table = self.table.write().map_err(poisoned)?;
        let idx = *table
            .by_id
            .get(&id)
            .ok_or_else(|| StoreError::Missing(format!("player {id}")))?;
        table.rows[idx].set_ban(ban.clone());
        Ok(())
    }
}

/// In-memory append-only history store.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    rows: RwLock<Vec<Observation>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn record(&self, observation: NewObservation) -> StoreResult<bool> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        if rows.iter().any(|existing| existing.matches(&observation)) {
            return Ok(false);
        }
        rows.push(Observation::record(observation, Utc::now()));
        Ok(true)
    }

    async fn for_player(&self, player_id: PlayerId) -> StoreResult<Vec<Observation>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows
            .iter()
            .filter(|o| o.player_id == player_id)
            .cloned()
            .collect())
    }

    async fn at_address(&self, ip: &str) -> StoreResult<Vec<Observation>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.iter().filter(|o| o.ip == ip).cloned().collect())
    }
}

/// In-memory server credential registry.
#[derive(Debug, Default)]
pub struct InMemoryServerCredentialStore {
    credentials: RwLock<HashSet<ServerCredential>>,
}

impl InMemoryServerCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ServerCredentialStore for InMemoryServerCredentialStore {
    async fn register(&self, credential: ServerCredential) -> StoreResult<()> {
        let mut credentials = self.credentials.write().map_err(poisoned)?;
        credentials.insert(credential);
        Ok(())
    }

    async fn contains(&self, credential: &ServerCredential) -> StoreResult<bool> {
        let credentials = self.credentials.read().map_err(poisoned)?;
        Ok(credentials.contains(credential))
    }
}
