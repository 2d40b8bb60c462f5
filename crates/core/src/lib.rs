//! `agdb-core`: identity foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed surrogate keys, the domain error model, and the Steam ID
//! canonicalizer every other layer keys its lookups by.

pub mod error;
pub mod id;
pub mod steam_id;

pub use error::{DomainError, DomainResult};
pub use id::{ObservationId, PlayerId};
pub use steam_id::SteamId;
