//! File entity: a stored image and its metadata.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Image encodings the site stores and serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Png,
    Jpeg,
    Webp,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpeg => "jpeg",
            ImageType::Webp => "webp",
        }
    }

    /// MIME type used for `Content-Type` headers.
    pub fn mime(&self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpeg => "image/jpeg",
            ImageType::Webp => "image/webp",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageType::Png),
            "jpeg" | "jpg" => Ok(ImageType::Jpeg),
            "webp" => Ok(ImageType::Webp),
            other => Err(format!("unsupported image type '{}'", other)),
        }
    }
}

/// A stored image file.
///
/// `file_type` holds the [`ImageType`] name; it is kept as text because the
/// row is decoded straight from Postgres.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct File {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub max_age: String,
    pub zone: i64,
    pub file_type: String,
    pub size: i32,
    pub width: i32,
    pub height: i32,
    pub description: Option<String>,
    pub creator: String,
    pub thumbnail: Option<Vec<u8>>,
    pub data: Vec<u8>,
}

impl File {
    pub fn image_type(&self) -> Option<ImageType> {
        self.file_type.parse().ok()
    }
}

pub const DEFAULT_MAX_AGE: &str = "1h";
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 3600;

/// Parses a cache duration such as `90s`, `30m`, `1h`, `7d` or a bare number
/// of seconds.
pub fn parse_max_age(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (digits, multiplier) = match value.as_bytes()[value.len() - 1] {
        b's' => (&value[..value.len() - 1], 1),
        b'm' => (&value[..value.len() - 1], 60),
        b'h' => (&value[..value.len() - 1], 3600),
        b'd' => (&value[..value.len() - 1], 86_400),
        b'0'..=b'9' => (value, 1),
        _ => return None,
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse::<u64>().ok()?.checked_mul(multiplier)
}

/// Input data for inserting a file row.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub max_age: String,
    pub zone: i64,
    pub file_type: ImageType,
    pub width: i32,
    pub height: i32,
    pub description: Option<String>,
    pub creator: String,
    pub thumbnail: Option<Vec<u8>>,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Partial update for a file. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct FilePatch {
    pub description: Option<String>,
    pub max_age: Option<String>,
    pub zone: Option<i64>,
}

impl FilePatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.max_age.is_none() && self.zone.is_none()
    }
}
