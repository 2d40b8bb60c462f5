//! Process configuration, read from environment variables.
//!
//! Loading goes through a lookup function so tests can supply values without
//! touching the real process environment.

use std::time::Duration;

use anyhow::{Context, Result, bail};

use agdb_auth::{MasterKey, ServerCredential};
use agdb_infra::external::geo::DEFAULT_GEO_API_BASE_URL;
use agdb_infra::external::steam::DEFAULT_STEAM_API_BASE_URL;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ENRICHMENT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Postgres when set, in-memory stores otherwise.
    pub database_url: Option<String>,
    pub master_key: Option<MasterKey>,
    /// Game servers registered at startup (`AGDB_SERVERS`).
    pub servers: Vec<ServerCredential>,
    pub steam_api_key: Option<String>,
    pub steam_api_base_url: String,
    pub geo_api_base_url: String,
    pub enrichment_timeout: Duration,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match get("API_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("API_PORT must be a port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        let enrichment_timeout_secs = match get("ENRICHMENT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().with_context(|| {
                format!("ENRICHMENT_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'")
            })?,
            None => DEFAULT_ENRICHMENT_TIMEOUT_SECS,
        };
        if enrichment_timeout_secs == 0 {
            bail!("ENRICHMENT_TIMEOUT_SECS must be greater than zero");
        }

        let servers = match get("AGDB_SERVERS") {
            Some(raw) => ServerCredential::parse_list(&raw)
                .map_err(|e| anyhow::anyhow!("AGDB_SERVERS is malformed: {e}"))?,
            None => Vec::new(),
        };

        Ok(Self {
            host: get("API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: get("DATABASE_URL"),
            master_key: get("AGDB_MASTER_KEY").and_then(MasterKey::new),
            servers,
            steam_api_key: get("STEAM_API_KEY"),
            steam_api_base_url: get("STEAM_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_STEAM_API_BASE_URL.to_string()),
            geo_api_base_url: get("GEO_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEO_API_BASE_URL.to_string()),
            enrichment_timeout: Duration::from_secs(enrichment_timeout_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
