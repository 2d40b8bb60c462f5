//! Integration tests for the identity pipeline over in-memory stores.
//!
//! Tests: Registration → History/Player stores → Correlation → Ban propagation
//!
//! Verifies:
//! - Registration is idempotent and inherits pre-bans by address
//! - Correlation is exactly one hop and never includes the subject
//! - Ban/unban reaches the subject and every relative, nobody else
//! - Enrichment failures degrade to empty fields

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use agdb_core::SteamId;
    use agdb_players::{BanDecision, BanState};

    use crate::engine::{EngineError, IdentityEngine};
    use crate::external::{
        DisabledProfileSource, ExternalError, GeoLocator, ProfileMetadata, ProfileSource,
    };
    use crate::profile::ProfileEnricher;
    use crate::store::{HistoryStore, InMemoryHistoryStore, InMemoryPlayerStore, PlayerStore};

    type Engine = IdentityEngine<Arc<InMemoryPlayerStore>, Arc<InMemoryHistoryStore>>;

    fn engine() -> Engine {
        IdentityEngine::new(
            Arc::new(InMemoryPlayerStore::new()),
            Arc::new(InMemoryHistoryStore::new()),
        )
    }

    fn steam(raw: &str) -> SteamId {
        raw.parse().unwrap()
    }

    async fn ban_state(engine: &Engine, raw: &str) -> BanState {
        engine
            .players()
            .find_by_steam_id(steam(raw))
            .await
            .unwrap()
            .unwrap()
            .ban()
            .clone()
    }

    /// P1/Alice and P2/Bob share 1.1.1.1; P3/Carl is alone on 2.2.2.2.
    async fn seed_three_players(engine: &Engine) {
        engine.register("STEAM_0:0:1", "Alice", "1.1.1.1").await.unwrap();
        engine.register("STEAM_0:0:2", "Bob", "1.1.1.1").await.unwrap();
        engine.register("STEAM_0:0:3", "Carl", "2.2.2.2").await.unwrap();
    }

    #[tokio::test]
    async fn shared_address_relates_players_and_ban_reaches_both() {
        let engine = engine();
        seed_three_players(&engine).await;

        let corr = engine.correlate("STEAM_0:0:1").await.unwrap();
        assert_eq!(corr.related_ids().collect::<Vec<_>>(), vec![steam("STEAM_0:0:2")]);
        assert!(corr.nicknames().contains("Alice"));
        assert!(corr.nicknames().contains("Bob"));
        assert!(!corr.nicknames().contains("Carl"));

        let summary = engine
            .set_ban_state("STEAM_0:0:1", BanDecision::from_flag(true, Some("x".into())))
            .await
            .unwrap();
        assert_eq!(summary.steam_id, steam("STEAM_0:0:1"));
        assert_eq!(summary.related_updated, 1);
        assert!(summary.banned);
        assert_eq!(
            summary.message,
            "The player and all their related accounts have been banned."
        );

        assert_eq!(ban_state(&engine, "STEAM_0:0:1").await.reason(), Some("x"));
        assert_eq!(ban_state(&engine, "STEAM_0:0:2").await.reason(), Some("x"));
        assert_eq!(ban_state(&engine, "STEAM_0:0:3").await, BanState::Clear);
    }

    #[tokio::test]
    async fn unban_clears_subject_and_relatives() {
        let engine = engine();
        seed_three_players(&engine).await;
        engine
            .set_ban_state("STEAM_0:0:2", BanDecision::from_flag(true, Some("cheating".into())))
            .await
            .unwrap();

        let summary = engine
            .set_ban_state("[U:1:2]", BanDecision::Unban)
            .await
            .unwrap();
        assert!(!summary.banned);
        assert!(summary.message.ends_with("unbanned."));

        for raw in ["STEAM_0:0:1", "STEAM_0:0:2"] {
            let state = ban_state(&engine, raw).await;
            assert!(!state.is_banned());
            assert_eq!(state.reason(), None);
        }
    }

    #[tokio::test]
    async fn ban_without_reason_stores_empty_reason() {
        let engine = engine();
        seed_three_players(&engine).await;

        engine
            .set_ban_state("STEAM_0:0:3", BanDecision::Ban { reason: None })
            .await
            .unwrap();
        assert_eq!(ban_state(&engine, "STEAM_0:0:3").await.reason(), Some(""));
    }

    #[tokio::test]
    async fn registering_the_same_triple_twice_is_a_no_op() {
        let engine = engine();
        let first = engine.register("STEAM_0:1:7", "Dan", "3.3.3.3").await.unwrap();
        let second = engine
            .register("76561197960265743", "Dan", "3.3.3.3")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.history().for_player(first.id()).await.unwrap().len(), 1);
        assert_eq!(engine.list_players().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn new_player_at_banned_address_inherits_ban() {
        let engine = engine();
        engine.register("STEAM_0:0:10", "Cheater", "6.6.6.6").await.unwrap();
        engine
            .set_ban_state("STEAM_0:0:10", BanDecision::from_flag(true, Some("aimbot".into())))
            .await
            .unwrap();

        let alt = engine.register("STEAM_0:0:11", "Alt", "6.6.6.6").await.unwrap();
        assert!(alt.is_banned());
        assert_eq!(alt.ban_reason(), Some(""));

        let clean = engine.register("STEAM_0:0:12", "Clean", "7.7.7.7").await.unwrap();
        assert!(!clean.is_banned());
    }

    #[tokio::test]
    async fn existing_player_does_not_inherit_on_later_sightings() {
        let engine = engine();
        engine.register("STEAM_0:0:10", "Cheater", "6.6.6.6").await.unwrap();
        engine.register("STEAM_0:0:20", "Regular", "8.8.8.8").await.unwrap();
        engine
            .set_ban_state("STEAM_0:0:10", BanDecision::Ban { reason: None })
            .await
            .unwrap();

        let regular = engine.register("STEAM_0:0:20", "Regular", "6.6.6.6").await.unwrap();
        assert!(!regular.is_banned());
    }

    #[tokio::test]
    async fn correlation_is_one_hop() {
        let engine = engine();
        // A and B share 1.1.1.1; B and C share 2.2.2.2; A never used 2.2.2.2.
        engine.register("STEAM_0:0:1", "A", "1.1.1.1").await.unwrap();
        engine.register("STEAM_0:0:2", "B", "1.1.1.1").await.unwrap();
        engine.register("STEAM_0:0:2", "B2", "2.2.2.2").await.unwrap();
        engine.register("STEAM_0:0:3", "C", "2.2.2.2").await.unwrap();

        let corr = engine.correlate("STEAM_0:0:1").await.unwrap();
        assert_eq!(corr.related_ids().collect::<Vec<_>>(), vec![steam("STEAM_0:0:2")]);
        assert!(!corr.nicknames().contains("B2"));
        assert!(!corr.nicknames().contains("C"));

        engine
            .set_ban_state("STEAM_0:0:1", BanDecision::Ban { reason: None })
            .await
            .unwrap();
        assert!(!ban_state(&engine, "STEAM_0:0:3").await.is_banned());
    }

    #[tokio::test]
    async fn isolated_player_has_no_relatives() {
        let engine = engine();
        seed_three_players(&engine).await;

        let corr = engine.correlate("STEAM_0:0:3").await.unwrap();
        assert_eq!(corr.related_count(), 0);
        assert_eq!(corr.nicknames().iter().collect::<Vec<_>>(), vec!["Carl"]);
        assert_eq!(corr.first_address(), Some("2.2.2.2"));
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_fail_before_any_write() {
        let engine = engine();
        seed_three_players(&engine).await;

        let err = engine.correlate("STEAM_0:1:999").await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(id) if id == steam("STEAM_0:1:999")));

        let err = engine
            .set_ban_state("not-a-steam-id", BanDecision::Unban)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidIdentifier(raw) if raw == "not-a-steam-id"));

        let err = engine.register("STEAM_9:0:1", "X", "1.1.1.1").await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidIdentifier(_)));
        assert_eq!(engine.list_players().await.unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_registration_creates_one_player() {
        let engine = Arc::new(engine());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    engine
                        .register("STEAM_0:1:4242", &format!("nick{i}"), "9.9.9.9")
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().id());
        }
        ids.dedup();

        assert_eq!(ids.len(), 1);
        assert_eq!(engine.list_players().await.unwrap().len(), 1);
        assert_eq!(engine.history().at_address("9.9.9.9").await.unwrap().len(), 16);
    }

    struct FixedProfile;

    #[async_trait::async_trait]
    impl ProfileSource for FixedProfile {
        async fn resolve_profile(
            &self,
            _steam_id: SteamId,
        ) -> Result<ProfileMetadata, ExternalError> {
            Ok(ProfileMetadata {
                display_name: Some("Alice".into()),
                profile_url: Some("https://steamcommunity.com/id/alice/".into()),
                avatar_url: None,
                created_at: Utc.timestamp_opt(1_063_407_589, 0).single(),
                last_activity_at: None,
            })
        }
    }

    struct FixedGeo(Result<Option<String>, ()>);

    #[async_trait::async_trait]
    impl GeoLocator for FixedGeo {
        async fn country_code(&self, _ip: &str) -> Result<Option<String>, ExternalError> {
            self.0
                .clone()
                .map_err(|_| ExternalError::Transport("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn enrichment_merges_sources_with_correlation() {
        let engine = engine();
        seed_three_players(&engine).await;
        let corr = engine.correlate("STEAM_0:0:1").await.unwrap();

        let enricher = ProfileEnricher::new(
            Arc::new(FixedProfile),
            Arc::new(FixedGeo(Ok(Some("SE".into())))),
        );
        let profile = enricher.enrich(&corr).await;

        assert_eq!(profile.steam_id, steam("STEAM_0:0:1"));
        assert_eq!(profile.steam_name.as_deref(), Some("Alice"));
        assert_eq!(profile.country.as_deref(), Some("SE"));
        assert_eq!(profile.related_steam_ids, vec![steam("STEAM_0:0:2")]);
        assert_eq!(profile.nicknames, vec!["Alice".to_string(), "Bob".to_string()]);
        assert_eq!(profile.ban, BanState::Clear);
    }

    #[tokio::test]
    async fn enrichment_failures_leave_fields_empty() {
        let engine = engine();
        seed_three_players(&engine).await;
        let corr = engine.correlate("STEAM_0:0:3").await.unwrap();

        let enricher =
            ProfileEnricher::new(Arc::new(DisabledProfileSource), Arc::new(FixedGeo(Err(()))));
        let profile = enricher.enrich(&corr).await;

        assert_eq!(profile.steam_name, None);
        assert_eq!(profile.avatar, None);
        assert_eq!(profile.country, None);
        assert_eq!(profile.nicknames, vec!["Carl".to_string()]);
    }
}
