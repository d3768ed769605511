//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries with bound parameters.
//!
//! # Repositories
//!
//! - [`PgZoneRepository`] - Zone storage
//! - [`PgFileRepository`] - File storage and projected listings

pub mod pg_file_repository;
pub mod pg_zone_repository;

pub use pg_file_repository::PgFileRepository;
pub use pg_zone_repository::PgZoneRepository;
