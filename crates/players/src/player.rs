use serde::{Deserialize, Serialize};

use agdb_core::{PlayerId, SteamId};

/// Current ban state of a player.
///
/// The reason only exists inside `Banned`, so "reason present iff banned" holds
/// by construction. A ban without a stated reason (including an inherited
/// pre-ban) carries an empty reason.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BanState {
    #[default]
    Clear,
    Banned { reason: String },
}

impl BanState {
    pub fn banned(reason: Option<String>) -> Self {
        Self::Banned {
            reason: reason.unwrap_or_default(),
        }
    }

    /// Pre-ban inherited from another account at the same address.
    pub fn inherited() -> Self {
        Self::Banned {
            reason: String::new(),
        }
    }

    /// Rebuild from flat storage columns.
    ///
    /// Rows written before the reason coupling was enforced may hold a null reason
    /// on a banned player (normalized to empty) or a stale reason on an unbanned
    /// one (dropped).
    pub fn from_columns(is_banned: bool, reason: Option<String>) -> Self {
        if is_banned {
            Self::banned(reason)
        } else {
            Self::Clear
        }
    }

    pub fn is_banned(&self) -> bool {
        matches!(self, Self::Banned { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Clear => None,
            Self::Banned { reason } => Some(reason),
        }
    }
}

/// A moderator decision applied to a player and everyone related to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BanDecision {
    Ban { reason: Option<String> },
    Unban,
}

impl BanDecision {
    pub fn from_flag(banned: bool, reason: Option<String>) -> Self {
        if banned {
            Self::Ban { reason }
        } else {
            Self::Unban
        }
    }

    pub fn is_ban(&self) -> bool {
        matches!(self, Self::Ban { .. })
    }

    /// State every affected record ends up in. Unban always clears the reason.
    pub fn target_state(&self) -> BanState {
        match self {
            Self::Ban { reason } => BanState::banned(reason.clone()),
            Self::Unban => BanState::Clear,
        }
    }

    pub fn summary_message(&self) -> &'static str {
        match self {
            Self::Ban { .. } => "The player and all their related accounts have been banned.",
            Self::Unban => "The player and all their related accounts have been unbanned.",
        }
    }
}

/// Player identity record: one per canonical Steam ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    steam_id: SteamId,
    ban: BanState,
}

impl Player {
    /// A player seen for the first time.
    pub fn first_seen(steam_id: SteamId, inherits_ban: bool) -> Self {
        let ban = if inherits_ban {
            BanState::inherited()
        } else {
            BanState::Clear
        };
        Self {
            id: PlayerId::new(),
            steam_id,
            ban,
        }
    }

    /// Rehydrate a stored record.
    pub fn restore(id: PlayerId, steam_id: SteamId, ban: BanState) -> Self {
        Self { id, steam_id, ban }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn steam_id(&self) -> SteamId {
        self.steam_id
    }

    pub fn ban(&self) -> &BanState {
        &self.ban
    }

    pub fn is_banned(&self) -> bool {
        self.ban.is_banned()
    }

    pub fn ban_reason(&self) -> Option<&str> {
        self.ban.reason()
    }

    pub fn set_ban(&mut self, ban: BanState) {
        self.ban = ban;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steam(raw: &str) -> SteamId {
        raw.parse().unwrap()
    }

    #[test]
    fn first_seen_player_is_clear_unless_inheriting() {
        let clean = Player::first_seen(steam("STEAM_0:0:1"), false);
        assert!(!clean.is_banned());
        assert_eq!(clean.ban_reason(), None);

        let inherited = Player::first_seen(steam("STEAM_0:0:2"), true);
        assert!(inherited.is_banned());
        assert_eq!(inherited.ban_reason(), Some(""));
    }

    #[test]
    fn ban_without_reason_stores_empty_reason() {
        let state = BanDecision::Ban { reason: None }.target_state();
        assert_eq!(state, BanState::Banned { reason: String::new() });
    }

    #[test]
    fn unban_always_clears_reason() {
        let mut player = Player::first_seen(steam("STEAM_0:1:5"), false);
        player.set_ban(BanDecision::from_flag(true, Some("cheating".into())).target_state());
        assert_eq!(player.ban_reason(), Some("cheating"));

        player.set_ban(BanDecision::from_flag(false, Some("ignored".into())).target_state());
        assert!(!player.is_banned());
        assert_eq!(player.ban_reason(), None);
    }

    #[test]
    fn columns_are_normalized_to_the_coupling() {
        assert_eq!(BanState::from_columns(true, None), BanState::inherited());
        assert_eq!(BanState::from_columns(false, Some("stale".into())), BanState::Clear);
        assert_eq!(
            BanState::from_columns(true, Some("x".into())).reason(),
            Some("x")
        );
    }

    #[test]
    fn summary_message_names_the_decision() {
        assert!(BanDecision::Unban.summary_message().ends_with("unbanned."));
        assert!(BanDecision::Ban { reason: None }.summary_message().ends_with(" banned."));
    }
}
