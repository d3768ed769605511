//! Zone management service.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{NewZone, Zone, ZonePatch};
use crate::domain::repositories::{FileRepository, ZoneRepository};
use crate::error::AppError;
use crate::infrastructure::clock::Clock;

const MAX_NAME_LEN: usize = 64;

/// Service for managing the zones files are grouped into.
///
/// Keeps zone names unique and refuses to delete a zone that still holds
/// files.
pub struct ZoneService {
    zones: Arc<dyn ZoneRepository>,
    files: Arc<dyn FileRepository>,
    clock: Arc<dyn Clock>,
}

fn validate_label(label: &str, value: &str) -> Result<(), AppError> {
    let len = value.chars().count();
    if len == 0 || len > MAX_NAME_LEN || value.trim() != value {
        return Err(AppError::bad_request(
            format!("Invalid zone {}", label),
            json!({ label: value, "max_length": MAX_NAME_LEN }),
        ));
    }
    Ok(())
}

impl ZoneService {
    pub fn new(
        zones: Arc<dyn ZoneRepository>,
        files: Arc<dyn FileRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            zones,
            files,
            clock,
        }
    }

    /// Creates a zone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for empty, padded or overlong names and owners.
    /// Returns [`AppError::Conflict`] if the name is already taken.
    pub async fn create(
        &self,
        name: String,
        owner: String,
        description: Option<String>,
    ) -> Result<Zone, AppError> {
        validate_label("name", &name)?;
        validate_label("owner", &owner)?;

        if self.zones.find_by_name(&name).await?.is_some() {
            return Err(AppError::conflict(
                "Zone already exists",
                json!({ "name": name }),
            ));
        }

        let zone = self
            .zones
            .create(NewZone {
                name,
                owner,
                description,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(zone_id = zone.id, name = %zone.name, "Zone created");
        Ok(zone)
    }

    pub async fn list(&self) -> Result<Vec<Zone>, AppError> {
        self.zones.list().await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no zone has this id.
    pub async fn get(&self, id: i64) -> Result<Zone, AppError> {
        self.zones
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Zone not found", json!({ "id": id })))
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty patch or invalid values,
    /// [`AppError::Conflict`] when renaming onto another zone's name, and
    /// [`AppError::NotFound`] if the zone does not exist.
    pub async fn update(&self, id: i64, patch: ZonePatch) -> Result<Zone, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request("Nothing to update", json!({})));
        }
        if let Some(name) = &patch.name {
            validate_label("name", name)?;
            if let Some(existing) = self.zones.find_by_name(name).await?
                && existing.id != id
            {
                return Err(AppError::conflict(
                    "Zone already exists",
                    json!({ "name": name }),
                ));
            }
        }
        if let Some(owner) = &patch.owner {
            validate_label("owner", owner)?;
        }

        self.zones
            .update(id, patch, self.clock.now())
            .await?
            .ok_or_else(|| AppError::not_found("Zone not found", json!({ "id": id })))
    }

    /// Deletes an empty zone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] while the zone still has files and
    /// [`AppError::NotFound`] if it does not exist.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let files = self.files.count(Some(id)).await?;
        if files > 0 {
            return Err(AppError::conflict(
                "Zone still has files",
                json!({ "id": id, "files": files }),
            ));
        }

        if !self.zones.delete(id).await? {
            return Err(AppError::not_found("Zone not found", json!({ "id": id })));
        }

        tracing::info!(zone_id = id, "Zone deleted");
        Ok(())
    }
}
