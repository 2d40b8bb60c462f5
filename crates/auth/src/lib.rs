//! `agdb-auth`: pure access-control policy for the API layer.
//!
//! Two kinds of caller exist: moderation tooling holding the master key, and
//! game servers registered with an `(address, api key)` pair. This crate only
//! decides; it is decoupled from HTTP and storage.

pub mod authorize;
pub mod master_key;
pub mod server;

pub use authorize::AccessError;
pub use master_key::{MasterKey, verify_optional};
pub use server::ServerCredential;
