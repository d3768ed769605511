//! Repository trait for file data access.

use crate::domain::entities::{File, FilePatch, NewFile};
use crate::domain::query::{Ordering, Selection};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Criteria for listing files.
///
/// `selection` and `ordering` come from [`crate::domain::query::format_select`]
/// and [`crate::domain::query::format_order`], so they only ever name
/// registered columns.
#[derive(Debug, Clone)]
pub struct FileQuery {
    pub zone: Option<i64>,
    pub offset: i64,
    pub limit: i64,
    pub selection: Selection,
    pub ordering: Ordering,
}

/// Repository interface for stored image files.
///
/// Projected reads ([`FileRepository::select`], [`FileRepository::list`])
/// return JSON objects holding only the selected fields, so large columns such
/// as `data` are only fetched when asked for.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgFileRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Inserts a file row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name is already taken.
    async fn create(&self, new_file: NewFile) -> Result<File, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<File>, AppError>;

    /// Finds a file by its unique name. Used when serving images.
    async fn find_by_name(&self, name: &str) -> Result<Option<File>, AppError>;

    /// Reads the selected fields of one file.
    async fn select(
        &self,
        id: i64,
        selection: Selection,
    ) -> Result<Option<Map<String, Value>>, AppError>;

    /// Lists files page by page.
    async fn list(&self, query: FileQuery) -> Result<Vec<Map<String, Value>>, AppError>;

    /// Counts files, optionally within one zone.
    async fn count(&self, zone: Option<i64>) -> Result<i64, AppError>;

    /// Applies a partial update and stamps `updated_at`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    async fn update(
        &self,
        id: i64,
        patch: FilePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<File>, AppError>;

    /// Deletes a file. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
