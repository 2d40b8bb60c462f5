use thiserror::Error;

/// Why a caller was refused. Every variant maps to 401 at the HTTP boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Missing master key in headers")]
    MissingMasterKey,

    #[error("Invalid master key")]
    InvalidMasterKey,

    #[error("Missing IP or token in headers")]
    MissingServerCredential,

    #[error("Invalid IP or token")]
    UnknownServerCredential,
}
