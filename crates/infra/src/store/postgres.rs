//! Postgres-backed stores.
//!
//! One [`PostgresStore`] implements all three store traits over a shared pool.
//! Uniqueness (one player per Steam ID, one observation per triple) is enforced by
//! the schema in `migrations/0001_init.sql`; writes use `ON CONFLICT` so that
//! concurrent requests converge instead of failing.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (foreign key violation) | `23503` | `Missing` |
//! | Database (check constraint violation) | `23514` | `Constraint` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / other | N/A | `Backend` |

use std::sync::Arc;

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use agdb_auth::ServerCredential;
use agdb_core::{ObservationId, PlayerId, SteamId};
use agdb_players::{BanState, NewObservation, Observation, Player};

use super::r#trait::{
    HistoryStore, PlayerStore, ServerCredentialStore, StoreError, StoreResult,
};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Player, history and server-credential tables behind one connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the schema. Every statement is idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlayerStore for PostgresStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Player>> {
        let rows = sqlx::query(
            r#"
            SELECT id, steam_id, is_banned, ban_reason
            FROM player
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_players", e))?;

        decode_players(&rows)
    }

    #[instrument(skip(self), fields(steam_id = %steam_id), err)]
    async fn find_by_steam_id(&self, steam_id: SteamId) -> StoreResult<Option<Player>> {
        let row = sqlx::query(
            r#"
            SELECT id, steam_id, is_banned, ban_reason
            FROM player
            WHERE steam_id = $1
            "#,
        )
        .bind(steam_id.steam2())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_player", e))?;

        row.as_ref().map(decode_player).transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_many(&self, ids: &[PlayerId]) -> StoreResult<Vec<Player>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let keys: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, steam_id, is_banned, ban_reason
            FROM player
            WHERE id = ANY($1)
            "#,
        )
        .bind(keys)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_players", e))?;

        decode_players(&rows)
    }

    #[instrument(skip(self, player), fields(steam_id = %player.steam_id()), err)]
    async fn insert_or_get(&self, player: Player) -> StoreResult<Player> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO player (id, steam_id, is_banned, ban_reason)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (steam_id) DO NOTHING
            "#,
        )
        .bind(player.id().as_uuid())
        .bind(player.steam_id().steam2())
        .bind(player.is_banned())
        .bind(player.ban_reason())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_player", e))?;

        if inserted.rows_affected() == 1 {
            return Ok(player);
        }

        // Lost the race (or already registered): the winner's row is authoritative.
        self.find_by_steam_id(player.steam_id())
            .await?
            .ok_or_else(|| StoreError::Missing(format!("player {}", player.steam_id())))
    }

    #[instrument(skip(self, ban), fields(player_id = %id, banned = ban.is_banned()), err)]
    async fn set_ban(&self, id: PlayerId, ban: &BanState) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE player
            SET is_banned = $2, ban_reason = $3
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(ban.is_banned())
        .bind(ban.reason())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_ban", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(format!("player {id}")));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl HistoryStore for PostgresStore {
    #[instrument(skip(self, observation), fields(player_id = %observation.player_id), err)]
    async fn record(&self, observation: NewObservation) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO history (id, player_id, nickname, ip)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ON CONSTRAINT history_observation_unique DO NOTHING
            "#,
        )
        .bind(ObservationId::new().as_uuid())
        .bind(observation.player_id.as_uuid())
        .bind(&observation.nickname)
        .bind(&observation.ip)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_observation", e))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(player_id = %player_id), err)]
    async fn for_player(&self, player_id: PlayerId) -> StoreResult<Vec<Observation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, player_id, nickname, ip, observed_at
            FROM history
            WHERE player_id = $1
            ORDER BY observed_at ASC, id ASC
            "#,
        )
        .bind(player_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("history_for_player", e))?;

        decode_observations(&rows)
    }

    #[instrument(skip(self), err)]
    async fn at_address(&self, ip: &str) -> StoreResult<Vec<Observation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, player_id, nickname, ip, observed_at
            FROM history
            WHERE ip = $1
            ORDER BY observed_at ASC, id ASC
            "#,
        )
        .bind(ip)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("history_at_address", e))?;

        decode_observations(&rows)
    }
}

#[async_trait::async_trait]
impl ServerCredentialStore for PostgresStore {
    #[instrument(skip(self, credential), fields(server_addr = %credential.server_addr), err)]
    async fn register(&self, credential: ServerCredential) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO server_credential (server_addr, api_key)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&credential.server_addr)
        .bind(&credential.api_key)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("register_server", e))?;
        Ok(())
    }

    async fn contains(&self, credential: &ServerCredential) -> StoreResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM server_credential
                WHERE server_addr = $1 AND api_key = $2
            ) AS present
            "#,
        )
        .bind(&credential.server_addr)
        .bind(&credential.api_key)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_server", e))?;

        row.try_get("present")
            .map_err(|e| StoreError::Backend(format!("failed to read credential check: {e}")))
    }
}

/// Map SQLx errors to StoreError by SQLSTATE.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23514") => StoreError::Constraint(msg),
                Some("23503") => StoreError::Missing(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

#[derive(Debug)]
struct PlayerRow {
    id: Uuid,
    steam_id: String,
    is_banned: bool,
    ban_reason: Option<String>,
}

impl<'r> FromRow<'r, PgRow> for PlayerRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(PlayerRow {
            id: row.try_get("id")?,
            steam_id: row.try_get("steam_id")?,
            is_banned: row.try_get("is_banned")?,
            ban_reason: row.try_get("ban_reason")?,
        })
    }
}

impl TryFrom<PlayerRow> for Player {
    type Error = StoreError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        let steam_id = SteamId::canonicalize(&row.steam_id)
            .map_err(|e| StoreError::Backend(format!("stored steam_id is corrupt: {e}")))?;
        Ok(Player::restore(
            PlayerId::from_uuid(row.id),
            steam_id,
            BanState::from_columns(row.is_banned, row.ban_reason),
        ))
    }
}

fn decode_player(row: &PgRow) -> StoreResult<Player> {
    PlayerRow::from_row(row)
        .map_err(|e| StoreError::Backend(format!("failed to deserialize player row: {e}")))?
        .try_into()
}

fn decode_players(rows: &[PgRow]) -> StoreResult<Vec<Player>> {
    rows.iter().map(decode_player).collect()
}

#[derive(Debug)]
struct ObservationRow {
    id: Uuid,
    player_id: Uuid,
    nickname: String,
    ip: String,
    observed_at: chrono::DateTime<chrono::Utc>,
}

impl<'r> FromRow<'r, PgRow> for ObservationRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ObservationRow {
            id: row.try_get("id")?,
            player_id: row.try_get("player_id")?,
            nickname: row.try_get("nickname")?,
            ip: row.try_get("ip")?,
            observed_at: row.try_get("observed_at")?,
        })
    }
}

impl From<ObservationRow> for Observation {
    fn from(row: ObservationRow) -> Self {
        Observation {
            id: ObservationId::from_uuid(row.id),
            player_id: PlayerId::from_uuid(row.player_id),
            nickname: row.nickname,
            ip: row.ip,
            observed_at: row.observed_at,
        }
    }
}

fn decode_observations(rows: &[PgRow]) -> StoreResult<Vec<Observation>> {
    rows.iter()
        .map(|row| {
            ObservationRow::from_row(row)
                .map(Observation::from)
                .map_err(|e| StoreError::Backend(format!("failed to deserialize history row: {e}")))
        })
        .collect()
}
