//! yr-core: stable foundation for yarrow.
//!
//! Contains:
//! - ids (stable compact IDs for graph components)
//! - error (shared error taxonomy)
//! - privacy (privacy-usage records and the `privacy_usage` helper)
//! - config (privacy definition: distance + neighboring tags)

pub mod config;
pub mod error;
pub mod ids;
pub mod privacy;

// Re-exports: nice ergonomics for downstream crates
pub use config::{Distance, Neighboring, PrivacyDefinition};
pub use error::{YrError, YrResult};
pub use ids::*;
pub use privacy::{Budget, PrivacyUsage, privacy_usage, privacy_usage_strict};
