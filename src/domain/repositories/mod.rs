//! Repository trait definitions for the domain layer.
//!
//! Traits define the relational-store contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests, and integration tests substitute in-memory
//! implementations through [`crate::deps::Deps`].

pub mod file_repository;
pub mod zone_repository;

pub use file_repository::{FileQuery, FileRepository};
pub use zone_repository::ZoneRepository;

#[cfg(test)]
pub use file_repository::MockFileRepository;
#[cfg(test)]
pub use zone_repository::MockZoneRepository;
