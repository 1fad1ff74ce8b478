//! Engine boundary for yarrow analyses.
//!
//! The engine that validates, accounts for and executes an analysis lives
//! outside this workspace. This crate defines the [`Engine`] seam, a
//! [`JsonEngine`] adapter for byte-level transports, and the [`service`]
//! functions that run an [`yr_graph::Analysis`] through an engine.

pub mod engine;
pub mod error;
pub mod service;
pub mod transport;

// Re-export key types for convenience
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use service::{privacy_usage, release, report, validate};
pub use transport::{JsonEngine, Method, Transport};
