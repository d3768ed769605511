//! PostgreSQL implementation of file repository.
//!
//! Projected reads build their column list from a [`Selection`] and decode
//! each column by its registered [`FieldKind`], so a listing that does not
//! ask for `data` never transfers image bytes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::sync::Arc;

use crate::domain::entities::{File, FilePatch, NewFile};
use crate::domain::query::{FieldKind, Selection, bytes_value, timestamp_value};
use crate::domain::repositories::{FileQuery, FileRepository};
use crate::error::AppError;

const FILE_COLUMNS: &str = "id, created_at, updated_at, name, max_age, zone, file_type, size, \
                            width, height, description, creator, thumbnail, data";

/// PostgreSQL repository for stored files.
pub struct PgFileRepository {
    pool: Arc<PgPool>,
}

impl PgFileRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Decodes the selected columns of a row into a JSON object.
fn row_to_map(row: &PgRow, selection: &Selection) -> Result<Map<String, Value>, sqlx::Error> {
    let mut map = Map::with_capacity(selection.fields().len());

    for field in selection.fields() {
        let column = field.column;
        let value = match field.kind {
            FieldKind::BigInt => json!(row.try_get::<i64, _>(column)?),
            FieldKind::Int => json!(row.try_get::<i32, _>(column)?),
            FieldKind::Text => json!(row.try_get::<String, _>(column)?),
            FieldKind::OptText => json!(row.try_get::<Option<String>, _>(column)?),
            FieldKind::Timestamp => timestamp_value(row.try_get::<DateTime<Utc>, _>(column)?),
            FieldKind::OptBytes => row
                .try_get::<Option<Vec<u8>>, _>(column)?
                .as_deref()
                .map(bytes_value)
                .unwrap_or(Value::Null),
            FieldKind::Bytes => bytes_value(&row.try_get::<Vec<u8>, _>(column)?),
        };
        map.insert(field.name.to_string(), value);
    }

    Ok(map)
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn create(&self, new_file: NewFile) -> Result<File, AppError> {
        let sql = format!(
            r#"
            INSERT INTO files
                (created_at, updated_at, name, max_age, zone, file_type, size,
                 width, height, description, creator, thumbnail, data)
            VALUES ($1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            FILE_COLUMNS
        );

        let size = i32::try_from(new_file.data.len())
            .map_err(|_| AppError::bad_request("File is too large", json!({})))?;

        let file = sqlx::query_as::<_, File>(&sql)
            .bind(new_file.created_at)
            .bind(new_file.name)
            .bind(new_file.max_age)
            .bind(new_file.zone)
            .bind(new_file.file_type.as_str())
            .bind(size)
            .bind(new_file.width)
            .bind(new_file.height)
            .bind(new_file.description)
            .bind(new_file.creator)
            .bind(new_file.thumbnail)
            .bind(new_file.data)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(file)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<File>, AppError> {
        let sql = format!("SELECT {} FROM files WHERE id = $1", FILE_COLUMNS);

        let file = sqlx::query_as::<_, File>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(file)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<File>, AppError> {
        let sql = format!("SELECT {} FROM files WHERE name = $1", FILE_COLUMNS);

        let file = sqlx::query_as::<_, File>(&sql)
            .bind(name)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(file)
    }

    async fn select(
        &self,
        id: i64,
        selection: Selection,
    ) -> Result<Option<Map<String, Value>>, AppError> {
        let sql = format!(
            "SELECT {} FROM files WHERE id = $1",
            selection.columns_sql()
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_map(&row, &selection)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, query: FileQuery) -> Result<Vec<Map<String, Value>>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        builder.push(query.selection.columns_sql());
        builder.push(" FROM files");

        if let Some(zone) = query.zone {
            builder.push(" WHERE zone = ");
            builder.push_bind(zone);
        }

        builder.push(" ORDER BY ");
        builder.push(query.ordering.to_sql());
        builder.push(" LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);

        let rows = builder.build().fetch_all(self.pool.as_ref()).await?;

        rows.iter()
            .map(|row| row_to_map(row, &query.selection).map_err(AppError::from))
            .collect()
    }

    async fn count(&self, zone: Option<i64>) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE ($1::bigint IS NULL OR zone = $1)")
                .bind(zone)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn update(
        &self,
        id: i64,
        patch: FilePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<File>, AppError> {
        let sql = format!(
            r#"
            UPDATE files
            SET description = COALESCE($2, description),
                max_age     = COALESCE($3, max_age),
                zone        = COALESCE($4, zone),
                updated_at  = $5
            WHERE id = $1
            RETURNING {}
            "#,
            FILE_COLUMNS
        );

        let file = sqlx::query_as::<_, File>(&sql)
            .bind(id)
            .bind(patch.description)
            .bind(patch.max_age)
            .bind(patch.zone)
            .bind(updated_at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(file)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
