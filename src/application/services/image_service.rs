//! Optimized image delivery.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::domain::entities::file::DEFAULT_MAX_AGE_SECONDS;
use crate::domain::entities::{File, ImageType, OptimParams, parse_max_age};
use crate::domain::repositories::FileRepository;
use crate::error::AppError;
use crate::infrastructure::kv::{KvStore, get_json, set_json};
use crate::infrastructure::optimizer::{ImageOptimizer, OptimError, OptimOutput, OptimRequest};

/// Quality used for jpeg sources re-encoded to webp without an explicit quality.
pub const JPEG_TO_WEBP_QUALITY: u32 = 80;

/// Public settings of the image endpoints.
#[derive(Debug, Clone)]
pub struct ImageSettings {
    /// Base URL clients use to reach this service, without trailing slash.
    pub public_base_url: String,
    /// How long optimized variants stay in the key-value store.
    pub cache_ttl: Duration,
}

/// Client configuration for building image URLs.
#[derive(Debug, Clone, Serialize)]
pub struct ImageConfig {
    pub url: String,
}

/// An optimized variant, ready to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimImage {
    pub name: String,
    #[serde(rename = "type")]
    pub image_type: String,
    pub size: usize,
    pub width: u32,
    pub height: u32,
    pub max_age: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl OptimImage {
    /// Cache lifetime for HTTP responses, falling back to one hour when the
    /// source's max age no longer parses.
    pub fn max_age_seconds(&self) -> u64 {
        parse_max_age(&self.max_age).unwrap_or(DEFAULT_MAX_AGE_SECONDS)
    }
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}

/// Lifetime of a file's variant generation marker. Must exceed every image
/// cache TTL, otherwise an expired marker would expose older variants again.
pub const GENERATION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const INITIAL_GENERATION: i64 = 0;

fn generation_key(name: &str) -> String {
    format!("optim-gen:{}", name)
}

fn cache_key(generation: i64, params: &OptimParams) -> String {
    format!("optim:{}:{}", generation, params.canonical())
}

async fn read_generation(kv: &dyn KvStore, name: &str) -> i64 {
    match kv.get(&generation_key(name)).await {
        Ok(Some(bytes)) => std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(INITIAL_GENERATION),
        Ok(None) => INITIAL_GENERATION,
        Err(e) => {
            warn!(error = %e, name, "Variant generation read failed");
            INITIAL_GENERATION
        }
    }
}

/// Makes every cached variant of `name` unreachable.
///
/// Variants are keyed by a per-file generation; this moves the generation
/// past both its current value and `now_millis`. Failures only log, leaving
/// old variants to expire with their TTL.
pub async fn invalidate_variants(kv: &dyn KvStore, name: &str, now_millis: i64) {
    let next = now_millis.max(read_generation(kv, name).await + 1);
    let key = generation_key(name);

    match kv
        .set(&key, next.to_string().as_bytes(), Some(GENERATION_TTL))
        .await
    {
        Ok(()) => debug!(key, generation = next, "Cached variants invalidated"),
        Err(e) => warn!(error = %e, key, "Failed to invalidate cached variants"),
    }
}

fn optim_error(e: OptimError, spec: &str) -> AppError {
    match e {
        OptimError::Unavailable => AppError::unavailable(
            "Image optimization is not available",
            json!({ "file": spec }),
        ),
        other => {
            error!(error = %other, file = spec, "Image optimization failed");
            AppError::internal("Image optimization failed", json!({ "file": spec }))
        }
    }
}

/// Service that produces (and caches) optimized variants of stored files.
pub struct ImageService {
    files: Arc<dyn FileRepository>,
    kv: Arc<dyn KvStore>,
    optimizer: Arc<dyn ImageOptimizer>,
    settings: ImageSettings,
}

impl ImageService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        kv: Arc<dyn KvStore>,
        optimizer: Arc<dyn ImageOptimizer>,
        settings: ImageSettings,
    ) -> Self {
        Self {
            files,
            kv,
            optimizer,
            settings,
        }
    }

    pub fn config(&self) -> ImageConfig {
        ImageConfig {
            url: format!(
                "{}/images/v1/:file",
                self.settings.public_base_url.trim_end_matches('/')
            ),
        }
    }

    /// Returns the variant described by `spec`.
    ///
    /// Variants are cached under the file's current generation, see
    /// [`invalidate_variants`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed spec,
    /// [`AppError::NotFound`] when no file has that name and
    /// [`AppError::Unavailable`] when a transformation is needed but no
    /// optimizer is configured.
    pub async fn optimize(&self, spec: &str) -> Result<OptimImage, AppError> {
        let params: OptimParams = spec.parse().map_err(|reason: String| {
            AppError::bad_request("Invalid file spec", json!({ "file": spec, "reason": reason }))
        })?;

        let generation = read_generation(self.kv.as_ref(), &params.name).await;
        let key = cache_key(generation, &params);
        match get_json::<OptimImage>(self.kv.as_ref(), &key).await {
            Ok(Some(image)) => {
                metrics::counter!("image_cache_hits_total").increment(1);
                debug!(key, "Image cache hit");
                return Ok(image);
            }
            Ok(None) => metrics::counter!("image_cache_misses_total").increment(1),
            Err(e) => warn!(error = %e, key, "Image cache read failed"),
        }

        let file = self
            .files
            .find_by_name(&params.name)
            .await?
            .ok_or_else(|| AppError::not_found("File not found", json!({ "name": params.name })))?;

        let image = self.transform(&file, &params, spec).await?;

        if let Err(e) = set_json(self.kv.as_ref(), &key, &image, Some(self.settings.cache_ttl)).await
        {
            warn!(error = %e, key, "Image cache write failed");
        }

        Ok(image)
    }

    async fn transform(
        &self,
        file: &File,
        params: &OptimParams,
        spec: &str,
    ) -> Result<OptimImage, AppError> {
        let source = file.image_type().ok_or_else(|| {
            error!(file_id = file.id, file_type = %file.file_type, "Stored file has unknown type");
            AppError::internal("Stored file has unknown type", json!({ "name": file.name }))
        })?;

        let quality = if source == ImageType::Jpeg
            && params.output == ImageType::Webp
            && params.quality == 0
        {
            JPEG_TO_WEBP_QUALITY
        } else {
            params.quality
        };

        let request = OptimRequest {
            data: file.data.clone(),
            source,
            output: params.output,
            quality,
            width: params.width,
            height: params.height,
        };

        let output = if request.is_identity() {
            OptimOutput {
                data: request.data,
                image_type: source,
                width: u32::try_from(file.width).unwrap_or(0),
                height: u32::try_from(file.height).unwrap_or(0),
            }
        } else {
            metrics::counter!("optimizer_requests_total").increment(1);
            self.optimizer
                .optimize(request)
                .await
                .map_err(|e| optim_error(e, spec))?
        };

        Ok(OptimImage {
            name: file.name.clone(),
            image_type: output.image_type.to_string(),
            size: output.data.len(),
            width: output.width,
            height: output.height,
            max_age: file.max_age.clone(),
            data: output.data,
        })
    }
}
