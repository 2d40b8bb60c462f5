//! Login history: immutable sightings of a player.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agdb_core::{ObservationId, PlayerId};

/// Data for a sighting that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewObservation {
    pub player_id: PlayerId,
    pub nickname: String,
    pub ip: String,
}

/// One stored sighting of a player using `nickname` from `ip`.
///
/// At most one observation exists per `(player_id, ip, nickname)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub id: ObservationId,
    pub player_id: PlayerId,
    pub nickname: String,
    pub ip: String,
    pub observed_at: DateTime<Utc>,
}

impl Observation {
    pub fn record(new: NewObservation, observed_at: DateTime<Utc>) -> Self {
        Self {
            id: ObservationId::new(),
            player_id: new.player_id,
            nickname: new.nickname,
            ip: new.ip,
            observed_at,
        }
    }

    /// Whether `new` would duplicate this observation.
    pub fn matches(&self, new: &NewObservation) -> bool {
        self.player_id == new.player_id && self.ip == new.ip && self.nickname == new.nickname
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_detection_uses_the_whole_triple() {
        let player_id = PlayerId::new();
        let new = NewObservation {
            player_id,
            nickname: "Alice".into(),
            ip: "1.1.1.1".into(),
        };
        let stored = Observation::record(new.clone(), Utc::now());

        assert!(stored.matches(&new));
        assert!(!stored.matches(&NewObservation {
            nickname: "Alice2".into(),
            ..new.clone()
        }));
        assert!(!stored.matches(&NewObservation {
            ip: "2.2.2.2".into(),
            ..new.clone()
        }));
        assert!(!stored.matches(&NewObservation {
            player_id: PlayerId::new(),
            ..new
        }));
    }
}
