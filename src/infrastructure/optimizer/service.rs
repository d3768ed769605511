//! Image optimizer trait, request/response types and errors.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::ImageType;

#[derive(Debug, Error)]
pub enum OptimError {
    #[error("No image optimizer is configured")]
    Unavailable,
    #[error("Optimizer request failed: {0}")]
    Transport(String),
    #[error("Optimizer rejected the image: {0}")]
    Rejected(String),
    #[error("Optimizer returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// One re-encode / resize job.
///
/// Zero quality means the optimizer default; a zero width or height is
/// derived from the other dimension keeping the aspect ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimRequest {
    pub data: Vec<u8>,
    pub source: ImageType,
    pub output: ImageType,
    pub quality: u32,
    pub width: u32,
    pub height: u32,
}

impl OptimRequest {
    /// True when the output would be the unchanged source.
    pub fn is_identity(&self) -> bool {
        self.source == self.output && self.quality == 0 && self.width == 0 && self.height == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutput {
    pub data: Vec<u8>,
    pub image_type: ImageType,
    pub width: u32,
    pub height: u32,
}

/// Capability that turns a stored image into an optimized variant.
///
/// # Implementations
///
/// - [`crate::infrastructure::optimizer::RemoteOptimizer`] - HTTP optimizer service
/// - [`crate::infrastructure::optimizer::PassthroughOptimizer`] - identity-only fallback
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageOptimizer: Send + Sync {
    async fn optimize(&self, request: OptimRequest) -> Result<OptimOutput, OptimError>;

    /// Whether real transformations are available.
    fn is_configured(&self) -> bool;
}
