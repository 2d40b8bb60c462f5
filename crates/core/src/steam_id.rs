//! Steam ID canonicalization.
//!
//! Players arrive with identifiers in any of three textual encodings of the same
//! 32-bit account number `W`:
//!
//! | Encoding  | Shape          | Relation to `W`                 |
//! |-----------|----------------|---------------------------------|
//! | SteamID2  | `STEAM_X:Y:Z`  | `W = 2 * Z + Y`, `X ∈ {0, 1}`    |
//! | SteamID3  | `[U:1:W]`      | `W` verbatim                    |
//! | SteamID64 | `7656119…`     | `W + 76561197960265728`         |
//!
//! [`SteamId`] stores only `W`, so every encoding of one account compares equal.
//! The canonical text form (used as the lookup key everywhere) is SteamID2 with
//! universe digit `0`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// SteamID64 of account number zero in the public universe (individual accounts).
const STEAM64_BASE: u64 = 76_561_197_960_265_728;

/// Canonical player identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SteamId {
    account_id: u32,
}

impl SteamId {
    /// Parse any supported encoding into the canonical identifier.
    pub fn canonicalize(raw: &str) -> DomainResult<Self> {
        let input = raw.trim();

        let account_id = if let Some(rest) = input.strip_prefix("STEAM_") {
            parse_steam2(rest)
        } else if input.starts_with('[') {
            parse_steam3(input)
        } else {
            parse_steam64(input)
        };

        account_id
            .filter(|id| *id != 0)
            .map(|account_id| Self { account_id })
            .ok_or_else(|| DomainError::invalid_identifier(raw))
    }

    /// Build from a raw account number (`W`). Zero is not a valid account.
    pub fn from_account_id(account_id: u32) -> DomainResult<Self> {
        if account_id == 0 {
            return Err(DomainError::invalid_identifier("account id 0"));
        }
        Ok(Self { account_id })
    }

    pub fn account_id(&self) -> u32 {
        self.account_id
    }

    /// `STEAM_0:Y:Z` (canonical form).
    pub fn steam2(&self) -> String {
        self.to_string()
    }

    /// `[U:1:W]`.
    pub fn steam3(&self) -> String {
        format!("[U:1:{}]", self.account_id)
    }

    /// 64-bit community id (what the Steam Web API expects).
    pub fn steam64(&self) -> u64 {
        STEAM64_BASE + u64::from(self.account_id)
    }
}

fn parse_steam2(rest: &str) -> Option<u32> {
    let mut parts = rest.split(':');
    let universe = parse_decimal::<u8>(parts.next()?)?;
    let low_bit = parse_decimal::<u32>(parts.next()?)?;
    let high_bits = parse_decimal::<u32>(parts.next()?)?;
    if parts.next().is_some() || universe > 1 || low_bit > 1 {
        return None;
    }
    high_bits.checked_mul(2)?.checked_add(low_bit)
}

fn parse_steam3(input: &str) -> Option<u32> {
    let inner = input.strip_prefix('[')?.strip_suffix(']')?;
    let rest = inner.strip_prefix("U:1:")?;
    parse_decimal::<u32>(rest)
}

fn parse_steam64(input: &str) -> Option<u32> {
    let value = parse_decimal::<u64>(input)?;
    let offset = value.checked_sub(STEAM64_BASE)?;
    u32::try_from(offset).ok()
}

/// Plain ASCII digits only: `str::parse` alone would also accept a leading `+`.
fn parse_decimal<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "STEAM_0:{}:{}", self.account_id & 1, self.account_id >> 1)
    }
}

impl FromStr for SteamId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::canonicalize(s)
    }
}

impl TryFrom<String> for SteamId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::canonicalize(&value)
    }
}

impl From<SteamId> for String {
    fn from(value: SteamId) -> Self {
        value.steam2()
    }
}
