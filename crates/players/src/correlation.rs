//! One-hop correlation between players that shared a network address.
//!
//! Two players are related when some observation of each has the same `ip`.
//! The relation is computed from a single subject outward and is **not**
//! transitively closed: a relative's other addresses are never followed.

use std::collections::{BTreeMap, BTreeSet};

use agdb_core::{PlayerId, SteamId};

use crate::history::Observation;
use crate::player::Player;

/// Result of correlating one subject player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    subject: Player,
    related: BTreeMap<SteamId, PlayerId>,
    nicknames: BTreeSet<String>,
    addresses: Vec<String>,
}

impl Correlation {
    pub fn subject(&self) -> &Player {
        &self.subject
    }

    /// Canonical ids of related players, sorted. Never contains the subject.
    pub fn related_ids(&self) -> impl Iterator<Item = SteamId> + '_ {
        self.related.keys().copied()
    }

    /// Surrogate keys of related players (ban propagation targets).
    pub fn related_player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.related.values().copied()
    }

    pub fn related_count(&self) -> usize {
        self.related.len()
    }

    /// Every nickname seen for the subject or at one of its addresses, sorted.
    pub fn nicknames(&self) -> &BTreeSet<String> {
        &self.nicknames
    }

    /// Subject's distinct addresses in first-observed order.
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn first_address(&self) -> Option<&str> {
        self.addresses.first().map(String::as_str)
    }
}

/// Incremental construction of a [`Correlation`].
///
/// Seed it with the subject's own history, then feed every sighting found at
/// each of [`CorrelationBuilder::addresses`] together with the player owning it.
#[derive(Debug)]
pub struct CorrelationBuilder {
    subject: Player,
    related: BTreeMap<SteamId, PlayerId>,
    nicknames: BTreeSet<String>,
    addresses: Vec<String>,
}

impl CorrelationBuilder {
    /// `history` is expected in chronological order.
    pub fn new(subject: Player, history: &[Observation]) -> Self {
        let mut nicknames = BTreeSet::new();
        let mut addresses: Vec<String> = Vec::new();

        for observation in history.iter().filter(|o| o.player_id == subject.id()) {
            nicknames.insert(observation.nickname.clone());
            if !addresses.contains(&observation.ip) {
                addresses.push(observation.ip.clone());
            }
        }

        Self {
            subject,
            related: BTreeMap::new(),
            nicknames,
            addresses,
        }
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// Record a sighting at one of the subject's addresses.
    ///
    /// Sightings at any other address are ignored, which keeps the result one hop.
    pub fn observe(&mut self, sighting: &Observation, owner: &Player) {
        if sighting.player_id != owner.id() || !self.addresses.contains(&sighting.ip) {
            return;
        }

        self.nicknames.insert(sighting.nickname.clone());
        if owner.id() != self.subject.id() {
            self.related.insert(owner.steam_id(), owner.id());
        }
    }

    pub fn build(self) -> Correlation {
        Correlation {
            subject: self.subject,
            related: self.related,
            nicknames: self.nicknames,
            addresses: self.addresses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::NewObservation;
    use chrono::{Duration, Utc};

    fn player(raw: &str) -> Player {
        Player::first_seen(raw.parse().unwrap(), false)
    }

    fn seen(p: &Player, nickname: &str, ip: &str, minutes: i64) -> Observation {
        Observation::record(
            NewObservation {
                player_id: p.id(),
                nickname: nickname.into(),
                ip: ip.into(),
            },
            Utc::now() + Duration::minutes(minutes),
        )
    }

    #[test]
    fn related_set_excludes_subject_and_collects_nicknames() {
        let alice = player("STEAM_0:0:1");
        let bob = player("STEAM_0:0:2");

        let alice_history = vec![seen(&alice, "Alice", "1.1.1.1", 0)];
        let mut builder = CorrelationBuilder::new(alice.clone(), &alice_history);
        builder.observe(&alice_history[0], &alice);
        builder.observe(&seen(&bob, "Bob", "1.1.1.1", 1), &bob);
        let corr = builder.build();

        assert_eq!(corr.related_ids().collect::<Vec<_>>(), vec![bob.steam_id()]);
        assert_eq!(corr.related_player_ids().collect::<Vec<_>>(), vec![bob.id()]);
        assert!(corr.nicknames().contains("Alice"));
        assert!(corr.nicknames().contains("Bob"));
        assert_eq!(corr.subject().id(), alice.id());
    }

    #[test]
    fn sightings_elsewhere_do_not_extend_the_relation() {
        let alice = player("STEAM_0:0:1");
        let carl = player("STEAM_0:0:3");

        let history = vec![seen(&alice, "Alice", "1.1.1.1", 0)];
        let mut builder = CorrelationBuilder::new(alice, &history);
        builder.observe(&seen(&carl, "Carl", "2.2.2.2", 1), &carl);
        let corr = builder.build();

        assert_eq!(corr.related_count(), 0);
        assert!(!corr.nicknames().contains("Carl"));
    }

    #[test]
    fn addresses_keep_first_observed_order_without_duplicates() {
        let alice = player("STEAM_0:0:1");
        let history = vec![
            seen(&alice, "Alice", "9.9.9.9", 0),
            seen(&alice, "Al", "1.1.1.1", 1),
            seen(&alice, "Alice", "1.1.1.1", 2),
            seen(&alice, "A", "9.9.9.9", 3),
        ];
        let corr = CorrelationBuilder::new(alice, &history).build();

        assert_eq!(corr.addresses(), ["9.9.9.9", "1.1.1.1"]);
        assert_eq!(corr.first_address(), Some("9.9.9.9"));
        assert_eq!(corr.nicknames().len(), 3);
    }

    #[test]
    fn mismatched_owner_is_ignored() {
        let alice = player("STEAM_0:0:1");
        let bob = player("STEAM_0:0:2");
        let mallory = player("STEAM_0:0:4");

        let history = vec![seen(&alice, "Alice", "1.1.1.1", 0)];
        let mut builder = CorrelationBuilder::new(alice, &history);
        builder.observe(&seen(&bob, "Bob", "1.1.1.1", 1), &mallory);

        assert_eq!(builder.build().related_count(), 0);
    }
}
