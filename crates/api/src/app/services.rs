//! Service wiring: stores, identity engine, enrichment sources, credentials.

use std::sync::Arc;

use anyhow::Context;

use agdb_auth::{AccessError, MasterKey, ServerCredential, verify_optional};
use agdb_infra::external::{
    DisabledProfileSource, GeoLocator, IpApiLocator, ProfileSource, SteamWebApi,
};
use agdb_infra::store::{
    HistoryStore, InMemoryHistoryStore, InMemoryPlayerStore, InMemoryServerCredentialStore,
    PlayerStore, PostgresStore, ServerCredentialStore, StoreError,
};
use agdb_infra::{IdentityEngine, ProfileEnricher};

use crate::config::ApiConfig;

const POSTGRES_MAX_CONNECTIONS: u32 = 10;

pub type Engine = IdentityEngine<Arc<dyn PlayerStore>, Arc<dyn HistoryStore>>;

/// Everything the handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub engine: Engine,
    pub enricher: ProfileEnricher,
    pub credentials: Arc<dyn ServerCredentialStore>,
    pub master_key: Option<MasterKey>,
}

impl AppServices {
    pub fn new(
        players: Arc<dyn PlayerStore>,
        history: Arc<dyn HistoryStore>,
        credentials: Arc<dyn ServerCredentialStore>,
        enricher: ProfileEnricher,
        master_key: Option<MasterKey>,
    ) -> Self {
        Self {
            engine: IdentityEngine::new(players, history),
            enricher,
            credentials,
            master_key,
        }
    }

    /// Fresh in-memory stores (dev and tests).
    pub fn in_memory(enricher: ProfileEnricher, master_key: Option<MasterKey>) -> Self {
        Self::new(
            Arc::new(InMemoryPlayerStore::new()),
            Arc::new(InMemoryHistoryStore::new()),
            Arc::new(InMemoryServerCredentialStore::new()),
            enricher,
            master_key,
        )
    }

    pub fn verify_master_key(&self, presented: Option<&str>) -> Result<(), AccessError> {
        verify_optional(self.master_key.as_ref(), presented)
    }

    /// Resolve the credential a game server presented.
    ///
    /// The outer error is a storage failure; the inner one is the refusal.
    pub async fn verify_server(
        &self,
        server_addr: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Result<(), AccessError>, StoreError> {
        let credential = match ServerCredential::from_presented(server_addr, api_key) {
            Ok(credential) => credential,
            Err(refused) => return Ok(Err(refused)),
        };
        if self.credentials.contains(&credential).await? {
            Ok(Ok(()))
        } else {
            Ok(Err(AccessError::UnknownServerCredential))
        }
    }
}

/// Build services from configuration.
///
/// Uses Postgres when `DATABASE_URL` is set, in-memory stores otherwise.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let enricher = build_enricher(config)?;

    if config.master_key.is_none() {
        tracing::warn!("AGDB_MASTER_KEY not set; ban and unban requests will be refused");
    }

    let services = match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url, POSTGRES_MAX_CONNECTIONS)
                .await
                .context("failed to connect to Postgres")?;
            store.migrate().await.context("failed to apply schema")?;
            tracing::info!("using Postgres stores");

            let store = Arc::new(store);
            AppServices::new(
                store.clone(),
                store.clone(),
                store,
                enricher,
                config.master_key.clone(),
            )
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory stores");
            AppServices::in_memory(enricher, config.master_key.clone())
        }
    };

    for server in &config.servers {
        services
            .credentials
            .register(server.clone())
            .await
            .with_context(|| format!("failed to register server {}", server.server_addr))?;
    }
    if !config.servers.is_empty() {
        tracing::info!(count = config.servers.len(), "server credentials seeded");
    }

    Ok(services)
}

fn build_enricher(config: &ApiConfig) -> anyhow::Result<ProfileEnricher> {
    let profiles: Arc<dyn ProfileSource> = match &config.steam_api_key {
        Some(key) => Arc::new(
            SteamWebApi::new(&config.steam_api_base_url, key, config.enrichment_timeout)
                .context("failed to build Steam Web API client")?,
        ),
        None => {
            tracing::warn!("STEAM_API_KEY not set; steam profile enrichment disabled");
            Arc::new(DisabledProfileSource)
        }
    };
    let geo: Arc<dyn GeoLocator> = Arc::new(
        IpApiLocator::new(&config.geo_api_base_url, config.enrichment_timeout)
            .context("failed to build geolocation client")?,
    );
    Ok(ProfileEnricher::new(profiles, geo))
}
