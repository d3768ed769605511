//! Optimizer used when no optimizer service is configured.

use async_trait::async_trait;

use super::service::{ImageOptimizer, OptimError, OptimOutput, OptimRequest};
use crate::utils::image_info::sniff;

/// Serves identity requests and refuses everything else.
pub struct PassthroughOptimizer;

#[async_trait]
impl ImageOptimizer for PassthroughOptimizer {
    async fn optimize(&self, request: OptimRequest) -> Result<OptimOutput, OptimError> {
        if !request.is_identity() {
            return Err(OptimError::Unavailable);
        }

        let info = sniff(&request.data)
            .ok_or_else(|| OptimError::Rejected("unrecognized image data".to_string()))?;

        Ok(OptimOutput {
            data: request.data,
            image_type: info.image_type,
            width: info.width,
            height: info.height,
        })
    }

    fn is_configured(&self) -> bool {
        false
    }
}
