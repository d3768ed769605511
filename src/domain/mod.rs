//! Domain layer containing business entities and contracts.
//!
//! - [`entities`] - Core data structures (zones, files, optimization requests)
//! - [`query`] - Field registries, selection and ordering helpers
//! - [`repositories`] - Relational-store trait definitions
//!
//! The domain layer has no dependencies on infrastructure. Repository traits
//! are implemented by `crate::infrastructure::persistence` and handed to
//! services through [`crate::deps::Deps`].

pub mod entities;
pub mod query;
pub mod repositories;
