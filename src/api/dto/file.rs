//! DTOs for file endpoints.

use base64::{Engine, engine::general_purpose::STANDARD};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};
use std::sync::LazyLock;
use validator::Validate;

use crate::application::services::file_service::DEFAULT_LIMIT;
use crate::application::services::{ListQuery, NewFileInput};
use crate::domain::entities::FilePatch;
use crate::error::AppError;

/// File names double as image spec prefixes, so `-` and `.` are excluded.
static FILE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{1,64}$").unwrap());

/// Query parameters of `GET /files`.
///
/// Uses `serde_with` to parse numbers from query strings.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct FileListParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub zone: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub offset: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde(default)]
    pub sort: Option<String>,

    #[serde(default)]
    pub fields: Option<String>,
}

impl From<FileListParams> for ListQuery {
    fn from(params: FileListParams) -> Self {
        ListQuery {
            zone: params.zone,
            offset: params.offset.unwrap_or(0),
            limit: params.limit.unwrap_or(DEFAULT_LIMIT),
            sort: params.sort.unwrap_or_default(),
            fields: params.fields.unwrap_or_default(),
        }
    }
}

/// Query parameters of `GET /files/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct FileFieldsParams {
    #[serde(default)]
    pub fields: Option<String>,
}

/// Upload body. `data` is the base64-encoded image.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    #[validate(regex(path = "*FILE_NAME_REGEX"))]
    pub name: String,

    pub zone: i64,

    pub max_age: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub creator: String,

    #[validate(length(min = 1))]
    pub data: String,
}

impl CreateFileRequest {
    /// Decodes the image data.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `data` is not valid base64.
    pub fn into_input(self) -> Result<NewFileInput, AppError> {
        let data = STANDARD.decode(self.data.trim()).map_err(|e| {
            AppError::bad_request(
                "Invalid file data",
                json!({ "data": "must be base64", "reason": e.to_string() }),
            )
        })?;

        Ok(NewFileInput {
            name: self.name,
            zone: self.zone,
            max_age: self.max_age,
            description: self.description,
            creator: self.creator,
            data,
        })
    }
}

/// Partial file update. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    #[validate(length(max = 500))]
    pub description: Option<String>,

    pub max_age: Option<String>,

    pub zone: Option<i64>,
}

impl From<UpdateFileRequest> for FilePatch {
    fn from(req: UpdateFileRequest) -> Self {
        FilePatch {
            description: req.description,
            max_age: req.max_age,
            zone: req.zone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults() {
        let query = ListQuery::from(FileListParams::default());
        assert_eq!(query.offset, 0);
        assert_eq!(query.limit, 10);
        assert_eq!(query.zone, None);
        assert!(query.sort.is_empty());
    }

    #[test]
    fn test_list_params_parse_numbers_from_strings() {
        let params: FileListParams = serde_json::from_value(json!({
            "zone": "3",
            "offset": "20",
            "limit": "5",
            "fields": "name,size"
        }))
        .unwrap();

        assert_eq!(params.zone, Some(3));
        assert_eq!(params.offset, Some(20));
        assert_eq!(params.limit, Some(5));
    }

    #[test]
    fn test_create_request_decodes_base64() {
        let req: CreateFileRequest = serde_json::from_value(json!({
            "name": "logo",
            "zone": 1,
            "maxAge": "2h",
            "creator": "tree",
            "data": "AQID"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let input = req.into_input().unwrap();
        assert_eq!(input.data, vec![1, 2, 3]);
        assert_eq!(input.max_age.as_deref(), Some("2h"));
    }

    #[test]
    fn test_create_request_rejects_bad_base64() {
        let req: CreateFileRequest = serde_json::from_value(json!({
            "name": "logo",
            "zone": 1,
            "creator": "tree",
            "data": "not base64!"
        }))
        .unwrap();

        assert!(matches!(
            req.into_input().unwrap_err(),
            AppError::Validation { .. }
        ));
    }

    #[test]
    fn test_create_request_name_pattern() {
        for (name, ok) in [("logo_2", true), ("my-logo", false), ("a.b", false), ("", false)] {
            let req: CreateFileRequest = serde_json::from_value(json!({
                "name": name,
                "zone": 1,
                "creator": "tree",
                "data": "AQID"
            }))
            .unwrap();
            assert_eq!(req.validate().is_ok(), ok, "{name}");
        }
    }
}
