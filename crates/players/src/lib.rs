//! Players domain module (identities, login history, correlation).
//!
//! This crate contains the business rules for player identities, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod correlation;
pub mod history;
pub mod player;

pub use correlation::{Correlation, CorrelationBuilder};
pub use history::{NewObservation, Observation};
pub use player::{BanDecision, BanState, Player};
