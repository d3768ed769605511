//! Optimized-image request parsed from a file spec.
//!
//! A file spec is either `<name>.<type>` (the original dimensions, re-encoded
//! to `type`) or `<name>-<quality>-<width>-<height>.<type>`. A zero means
//! "keep": quality 0 uses the optimizer default and a zero width or height is
//! derived from the other dimension.

use super::file::ImageType;
use std::fmt;
use std::str::FromStr;

pub const MAX_QUALITY: u32 = 100;
pub const MAX_DIMENSION: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimParams {
    pub name: String,
    pub quality: u32,
    pub width: u32,
    pub height: u32,
    pub output: ImageType,
}

impl OptimParams {
    /// Returns true when no resize or quality change was requested.
    pub fn keeps_pixels(&self) -> bool {
        self.quality == 0 && self.width == 0 && self.height == 0
    }

    /// Canonical spec string, used as the cache key.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for OptimParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}.{}",
            self.name, self.quality, self.width, self.height, self.output
        )
    }
}

/// Returns true if `name` is a valid stored file name.
pub fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl FromStr for OptimParams {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (stem, ext) = spec
            .rsplit_once('.')
            .ok_or_else(|| "file spec must end with an image type".to_string())?;

        let output: ImageType = ext.parse()?;

        let parts: Vec<&str> = stem.split('-').collect();
        let (name, quality, width, height) = match parts.as_slice() {
            [name] => (*name, 0, 0, 0),
            [name, quality, width, height] => (
                *name,
                parse_number("quality", quality, MAX_QUALITY)?,
                parse_number("width", width, MAX_DIMENSION)?,
                parse_number("height", height, MAX_DIMENSION)?,
            ),
            _ => {
                return Err(
                    "file spec must be <name>.<type> or <name>-<quality>-<width>-<height>.<type>"
                        .to_string(),
                );
            }
        };

        if !is_valid_file_name(name) {
            return Err(format!("invalid file name '{}'", name));
        }

        Ok(Self {
            name: name.to_string(),
            quality,
            width,
            height,
            output,
        })
    }
}

fn parse_number(label: &str, value: &str, max: u32) -> Result<u32, String> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{} must be a non-negative integer", label));
    }

    let parsed: u32 = value
        .parse()
        .map_err(|_| format!("{} is out of range", label))?;

    if parsed > max {
        return Err(format!("{} must not exceed {}", label, max));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_spec() {
        let params: OptimParams = "logo.webp".parse().unwrap();
        assert_eq!(params.name, "logo");
        assert_eq!(params.output, ImageType::Webp);
        assert!(params.keeps_pixels());
    }

    #[test]
    fn test_parse_full_spec() {
        let params: OptimParams = "banner_2-80-200-0.jpg".parse().unwrap();
        assert_eq!(params.name, "banner_2");
        assert_eq!(params.quality, 80);
        assert_eq!(params.width, 200);
        assert_eq!(params.height, 0);
        assert_eq!(params.output, ImageType::Jpeg);
        assert!(!params.keeps_pixels());
    }

    #[test]
    fn test_canonical_normalizes_type() {
        let params: OptimParams = "logo-0-0-0.JPG".parse().unwrap();
        assert_eq!(params.canonical(), "logo-0-0-0.jpeg");
    }

    #[test]
    fn test_rejects_malformed_specs() {
        assert!("logo".parse::<OptimParams>().is_err());
        assert!("logo.gif".parse::<OptimParams>().is_err());
        assert!("logo-80-200.png".parse::<OptimParams>().is_err());
        assert!("logo-80-200-0-1.png".parse::<OptimParams>().is_err());
        assert!("logo--1-0-0.png".parse::<OptimParams>().is_err());
        assert!("-80-0-0.png".parse::<OptimParams>().is_err());
        assert!("lo.go-0-0-0.png".parse::<OptimParams>().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_numbers() {
        assert!("logo-101-0-0.png".parse::<OptimParams>().is_err());
        assert!("logo-0-10001-0.png".parse::<OptimParams>().is_err());
        assert!("logo-0-0-99999999999.png".parse::<OptimParams>().is_err());
        assert!("logo-100-10000-10000.png".parse::<OptimParams>().is_ok());
    }

    #[test]
    fn test_file_name_rules() {
        assert!(is_valid_file_name("logo_2020"));
        assert!(!is_valid_file_name(""));
        assert!(!is_valid_file_name("with-dash"));
        assert!(!is_valid_file_name("with.dot"));
        assert!(!is_valid_file_name(&"a".repeat(65)));
    }
}
