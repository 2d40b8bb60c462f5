//! Identity, history and server-credential storage boundary.
//!
//! Traits here make no storage assumptions: the in-memory implementations back
//! tests/dev and the Postgres implementation backs production.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemoryHistoryStore, InMemoryPlayerStore, InMemoryServerCredentialStore};
pub use postgres::PostgresStore;
pub use r#trait::{HistoryStore, PlayerStore, ServerCredentialStore, StoreError, StoreResult};
