use crate::AccessError;

/// Shared secret held by moderation tooling (ban/unban).
#[derive(Clone)]
pub struct MasterKey(String);

impl MasterKey {
    /// Returns `None` for an empty key so a blank setting never authorizes anyone.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    /// Check the key presented by a caller.
    pub fn verify(&self, presented: Option<&str>) -> Result<(), AccessError> {
        let presented = presented
            .filter(|p| !p.is_empty())
            .ok_or(AccessError::MissingMasterKey)?;

        if constant_time_eq(self.0.as_bytes(), presented.as_bytes()) {
            Ok(())
        } else {
            Err(AccessError::InvalidMasterKey)
        }
    }
}

/// Guard for deployments without a configured key: presence is still reported
/// first, then everything is refused.
pub fn verify_optional(key: Option<&MasterKey>, presented: Option<&str>) -> Result<(), AccessError> {
    match key {
        Some(key) => key.verify(presented),
        None if presented.is_none_or(str::is_empty) => Err(AccessError::MissingMasterKey),
        None => Err(AccessError::InvalidMasterKey),
    }
}

impl core::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("MasterKey(***)")
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
