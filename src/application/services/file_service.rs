//! File upload, listing and metadata service.

use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::entities::optim::{MAX_DIMENSION, is_valid_file_name};
use crate::domain::entities::{File, FilePatch, ImageType, NewFile, file, parse_max_age};
use crate::domain::query::{FILE_FIELDS, format_order, format_select, project};
use crate::domain::repositories::{FileQuery, FileRepository, ZoneRepository};
use crate::application::services::image_service::invalidate_variants;
use crate::error::AppError;
use crate::infrastructure::clock::Clock;
use crate::infrastructure::kv::KvStore;
use crate::infrastructure::optimizer::{ImageOptimizer, OptimRequest};
use crate::utils::image_info::sniff;

/// Largest accepted upload, in bytes.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Fields returned after create and update: everything except the image bytes.
pub const SUMMARY_FIELDS: &str =
    "id,createdAt,updatedAt,name,maxAge,zone,type,size,width,height,description,creator";

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

const THUMBNAIL_WIDTH: u32 = 60;
const UPLOAD_LOCK_TTL: Duration = Duration::from_secs(30);

/// Upload input, after transport decoding.
#[derive(Debug, Clone)]
pub struct NewFileInput {
    pub name: String,
    pub zone: i64,
    pub max_age: Option<String>,
    pub description: Option<String>,
    pub creator: String,
    pub data: Vec<u8>,
}

/// Listing criteria as received from clients.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub zone: Option<i64>,
    pub offset: i64,
    pub limit: i64,
    pub sort: String,
    pub fields: String,
}

/// One page of files.
///
/// `count` is the total number of matching files on the first page
/// (`offset == 0`) and `-1` on later pages, where clients already know it.
#[derive(Debug, Clone, Serialize)]
pub struct FileList {
    pub files: Vec<Map<String, Value>>,
    pub count: i64,
}

/// Service for storing image files and reading them back.
pub struct FileService {
    files: Arc<dyn FileRepository>,
    zones: Arc<dyn ZoneRepository>,
    kv: Arc<dyn KvStore>,
    optimizer: Arc<dyn ImageOptimizer>,
    clock: Arc<dyn Clock>,
}

fn validate_max_age(max_age: &str) -> Result<(), AppError> {
    if parse_max_age(max_age).is_none() {
        return Err(AppError::bad_request(
            "Invalid max age",
            json!({ "maxAge": max_age, "expected": "e.g. 90s, 30m, 1h, 7d" }),
        ));
    }
    Ok(())
}

/// Header dimensions are untrusted; stored images stay within what the
/// optimizer accepts.
fn dimensions(width: u32, height: u32) -> Result<(i32, i32), AppError> {
    let too_large = || {
        AppError::bad_request(
            "Image dimensions too large",
            json!({ "width": width, "height": height, "max": MAX_DIMENSION }),
        )
    };
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(too_large());
    }
    let width = i32::try_from(width).map_err(|_| too_large())?;
    let height = i32::try_from(height).map_err(|_| too_large())?;
    Ok((width, height))
}

fn summary(file: &File) -> Result<Map<String, Value>, AppError> {
    let selection = format_select(SUMMARY_FIELDS, &FILE_FIELDS)?;
    Ok(project(file, &selection))
}

impl FileService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        zones: Arc<dyn ZoneRepository>,
        kv: Arc<dyn KvStore>,
        optimizer: Arc<dyn ImageOptimizer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            files,
            zones,
            kv,
            optimizer,
            clock,
        }
    }

    /// Stores a new image.
    ///
    /// Type and dimensions are read from the image header. A webp thumbnail
    /// is requested from the optimizer; failing to get one only logs.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for invalid names, max ages, empty or
    /// oversized data, unknown zones and unsupported formats.
    /// Returns [`AppError::Conflict`] if the name is taken or being uploaded.
    pub async fn create(&self, input: NewFileInput) -> Result<Map<String, Value>, AppError> {
        if !is_valid_file_name(&input.name) {
            return Err(AppError::bad_request(
                "Invalid file name",
                json!({ "name": input.name, "expected": "1-64 of [A-Za-z0-9_]" }),
            ));
        }

        let max_age = input
            .max_age
            .unwrap_or_else(|| file::DEFAULT_MAX_AGE.to_string());
        validate_max_age(&max_age)?;

        if input.creator.trim().is_empty() {
            return Err(AppError::bad_request("Creator is required", json!({})));
        }

        if input.data.is_empty() || input.data.len() > MAX_FILE_SIZE {
            return Err(AppError::bad_request(
                "Invalid file size",
                json!({ "size": input.data.len(), "max": MAX_FILE_SIZE }),
            ));
        }

        if self.zones.find_by_id(input.zone).await?.is_none() {
            return Err(AppError::bad_request(
                "Zone does not exist",
                json!({ "zone": input.zone }),
            ));
        }

        let info = sniff(&input.data).ok_or_else(|| {
            AppError::bad_request(
                "Unsupported image format",
                json!({ "supported": ["png", "jpeg", "webp"] }),
            )
        })?;

        let (width, height) = dimensions(info.width, info.height)?;

        if self.files.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::conflict(
                "File name already exists",
                json!({ "name": input.name }),
            ));
        }

        let lock_key = format!("upload-lock:{}", input.name);
        if !self.kv.lock(&lock_key, UPLOAD_LOCK_TTL).await.unwrap_or(true) {
            return Err(AppError::conflict(
                "File is already being uploaded",
                json!({ "name": input.name }),
            ));
        }

        let thumbnail = self.thumbnail(&input.data, info.image_type).await;

        let result = self
            .files
            .create(NewFile {
                name: input.name,
                max_age,
                zone: input.zone,
                file_type: info.image_type,
                width,
                height,
                description: input.description,
                creator: input.creator,
                thumbnail,
                data: input.data,
                created_at: self.clock.now(),
            })
            .await;

        if let Err(e) = self.kv.del(&lock_key).await {
            warn!(error = %e, lock_key, "Failed to release upload lock");
        }

        let file = result?;
        info!(file_id = file.id, name = %file.name, size = file.size, "File created");
        summary(&file)
    }

    async fn thumbnail(&self, data: &[u8], source: ImageType) -> Option<Vec<u8>> {
        if !self.optimizer.is_configured() {
            return None;
        }

        let request = OptimRequest {
            data: data.to_vec(),
            source,
            output: ImageType::Webp,
            quality: 0,
            width: THUMBNAIL_WIDTH,
            height: 0,
        };

        match self.optimizer.optimize(request).await {
            Ok(output) => Some(output.data),
            Err(e) => {
                warn!(error = %e, "Thumbnail generation failed");
                None
            }
        }
    }

    /// Lists one page of files with client-chosen fields and order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a limit outside `1..=100`, a
    /// negative offset, or unknown fields.
    pub async fn list(&self, query: ListQuery) -> Result<FileList, AppError> {
        if !(1..=MAX_LIMIT).contains(&query.limit) {
            return Err(AppError::bad_request(
                "Limit must be between 1 and 100",
                json!({ "limit": query.limit }),
            ));
        }
        if query.offset < 0 {
            return Err(AppError::bad_request(
                "Offset must not be negative",
                json!({ "offset": query.offset }),
            ));
        }

        let file_query = FileQuery {
            zone: query.zone,
            offset: query.offset,
            limit: query.limit,
            selection: format_select(&query.fields, &FILE_FIELDS)?,
            ordering: format_order(&query.sort, &FILE_FIELDS)?,
        };

        let (files, count) = if query.offset == 0 {
            tokio::try_join!(self.files.list(file_query), self.files.count(query.zone))?
        } else {
            (self.files.list(file_query).await?, -1)
        };

        Ok(FileList { files, count })
    }

    /// Reads the selected fields of one file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the file does not exist.
    pub async fn get(&self, id: i64, fields: &str) -> Result<Map<String, Value>, AppError> {
        let selection = format_select(fields, &FILE_FIELDS)?;

        self.files
            .select(id, selection)
            .await?
            .ok_or_else(|| AppError::not_found("File not found", json!({ "id": id })))
    }

    /// Updates description, max age or zone. Cached variants are retired so
    /// the new max age applies at once.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty patch, an invalid max age
    /// or an unknown zone, and [`AppError::NotFound`] if the file does not exist.
    pub async fn update(&self, id: i64, patch: FilePatch) -> Result<Map<String, Value>, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request("Nothing to update", json!({})));
        }
        if let Some(max_age) = &patch.max_age {
            validate_max_age(max_age)?;
        }
        if let Some(zone) = patch.zone
            && self.zones.find_by_id(zone).await?.is_none()
        {
            return Err(AppError::bad_request(
                "Zone does not exist",
                json!({ "zone": zone }),
            ));
        }

        let file = self
            .files
            .update(id, patch, self.clock.now())
            .await?
            .ok_or_else(|| AppError::not_found("File not found", json!({ "id": id })))?;

        invalidate_variants(self.kv.as_ref(), &file.name, self.clock.now().timestamp_millis())
            .await;

        summary(&file)
    }

    /// Deletes a file and retires its cached variants.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the file does not exist.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let not_found = || AppError::not_found("File not found", json!({ "id": id }));

        let file = self.files.find_by_id(id).await?.ok_or_else(not_found)?;
        if !self.files.delete(id).await? {
            return Err(not_found());
        }

        invalidate_variants(self.kv.as_ref(), &file.name, self.clock.now().timestamp_millis())
            .await;

        info!(file_id = id, name = %file.name, "File deleted");
        Ok(())
    }
}
