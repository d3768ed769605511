//! Zone entity grouping uploaded files.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A named group of files, owned by one person or team.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: i64,
    pub name: String,
    pub owner: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a zone.
///
/// Timestamps are stamped by the service from the injected clock.
#[derive(Debug, Clone)]
pub struct NewZone {
    pub name: String,
    pub owner: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Partial update for a zone. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ZonePatch {
    pub name: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
}

impl ZonePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.owner.is_none() && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_serializes_camel_case() {
        let now = Utc::now();
        let zone = Zone {
            id: 3,
            name: "banners".to_string(),
            owner: "tree".to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&zone).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["name"], "banners");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_empty_patch() {
        assert!(ZonePatch::default().is_empty());
        let patch = ZonePatch {
            owner: Some("someone".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
