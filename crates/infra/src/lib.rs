//! Infrastructure layer: stores, identity engine, external enrichment sources.

pub mod engine;
pub mod external;
pub mod profile;
pub mod store;

mod integration_tests;

pub use engine::{BanSummary, EngineError, EngineResult, IdentityEngine};
pub use profile::{PlayerProfile, ProfileEnricher};
