//! Infrastructure layer for external integrations.
//!
//! This layer implements the capabilities the services depend on.
//!
//! # Modules
//!
//! - [`clock`] - Time source
//! - [`kv`] - Key-value store (Redis and no-op implementations)
//! - [`optimizer`] - Image optimizer (remote service and passthrough fallback)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod clock;
pub mod kv;
pub mod optimizer;
pub mod persistence;
