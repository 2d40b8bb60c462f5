use serde::{Deserialize, Serialize};

use crate::AccessError;

/// Credential a game server presents when reporting player logins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerCredential {
    /// `host:port` of the game server.
    pub server_addr: String,
    pub api_key: String,
}

impl ServerCredential {
    pub fn new(server_addr: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            server_addr: server_addr.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from the values a caller presented; both must be non-empty.
    ///
    /// Whether the pair is actually registered is for the credential store to say.
    pub fn from_presented(
        server_addr: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Self, AccessError> {
        match (server_addr.map(str::trim), api_key.map(str::trim)) {
            (Some(addr), Some(key)) if !addr.is_empty() && !key.is_empty() => {
                Ok(Self::new(addr, key))
            }
            _ => Err(AccessError::MissingServerCredential),
        }
    }

    /// Parse a seed list `addr=key,addr=key`. Blank entries are skipped.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, String> {
        list.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (addr, key) = entry
                    .split_once('=')
                    .ok_or_else(|| format!("expected addr=key, got '{entry}'"))?;
                Self::from_presented(Some(addr), Some(key))
                    .map_err(|_| format!("empty address or key in '{entry}'"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presented_credential_requires_both_parts() {
        assert_eq!(
            ServerCredential::from_presented(Some("1.2.3.4:27015"), None),
            Err(AccessError::MissingServerCredential)
        );
        assert_eq!(
            ServerCredential::from_presented(Some(" "), Some("tok")),
            Err(AccessError::MissingServerCredential)
        );
        assert_eq!(
            ServerCredential::from_presented(Some("1.2.3.4:27015"), Some("tok")),
            Ok(ServerCredential::new("1.2.3.4:27015", "tok"))
        );
    }

    #[test]
    fn seed_list_parses_pairs() {
        let list = ServerCredential::parse_list("1.2.3.4:27015=abc, 5.6.7.8:27016=def,").unwrap();
        assert_eq!(
            list,
            vec![
                ServerCredential::new("1.2.3.4:27015", "abc"),
                ServerCredential::new("5.6.7.8:27016", "def"),
            ]
        );
        assert!(ServerCredential::parse_list("1.2.3.4:27015").is_err());
        assert!(ServerCredential::parse_list("=abc").is_err());
        assert!(ServerCredential::parse_list("").unwrap().is_empty());
    }
}
