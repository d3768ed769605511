//! Repository trait for zone data access.

use crate::domain::entities::{NewZone, Zone, ZonePatch};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for managing file zones.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgZoneRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    /// Creates a new zone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name is already taken.
    async fn create(&self, new_zone: NewZone) -> Result<Zone, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Zone>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Zone>, AppError>;

    /// Lists all zones ordered by id.
    async fn list(&self) -> Result<Vec<Zone>, AppError>;

    /// Applies a partial update and stamps `updated_at`.
    ///
    /// Returns `Ok(None)` if the zone does not exist.
    async fn update(
        &self,
        id: i64,
        patch: ZonePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Zone>, AppError>;

    /// Deletes a zone. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
