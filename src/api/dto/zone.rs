//! DTOs for zone endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{Zone, ZonePatch};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateZoneRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,

    #[validate(length(min = 1, max = 64))]
    pub owner: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Partial zone update. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateZoneRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub owner: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl From<UpdateZoneRequest> for ZonePatch {
    fn from(req: UpdateZoneRequest) -> Self {
        ZonePatch {
            name: req.name,
            owner: req.owner,
            description: req.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ZoneListResponse {
    pub zones: Vec<Zone>,
}
