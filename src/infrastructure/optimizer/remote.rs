//! HTTP client for a remote image optimizer service.
//!
//! # Protocol
//!
//! `POST {base_url}/optim` with
//!
//! ```json
//! { "data": "<base64>", "sourceType": "jpeg", "outputType": "webp",
//!   "quality": 80, "width": 200, "height": 0 }
//! ```
//!
//! answered by `{ "data": "<base64>", "type": "webp", "width": 200, "height": 150 }`.
//! Non-2xx responses carry a plain-text or JSON reason.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::service::{ImageOptimizer, OptimError, OptimOutput, OptimRequest};
use crate::domain::entities::ImageType;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OptimBody<'a> {
    data: String,
    source_type: &'a str,
    output_type: &'a str,
    quality: u32,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct OptimReply {
    data: String,
    #[serde(rename = "type")]
    image_type: String,
    width: u32,
    height: u32,
}

pub struct RemoteOptimizer {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteOptimizer {
    /// Builds a client for the optimizer at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`OptimError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, OptimError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OptimError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint_for(base_url),
        })
    }
}

fn endpoint_for(base_url: &str) -> String {
    format!("{}/optim", base_url.trim_end_matches('/'))
}

fn decode_reply(reply: OptimReply) -> Result<OptimOutput, OptimError> {
    let image_type: ImageType = reply
        .image_type
        .parse()
        .map_err(OptimError::InvalidResponse)?;

    let data = STANDARD
        .decode(reply.data.as_bytes())
        .map_err(|e| OptimError::InvalidResponse(format!("bad base64 data: {}", e)))?;

    if data.is_empty() {
        return Err(OptimError::InvalidResponse("empty image".to_string()));
    }

    Ok(OptimOutput {
        data,
        image_type,
        width: reply.width,
        height: reply.height,
    })
}

#[async_trait]
impl ImageOptimizer for RemoteOptimizer {
    async fn optimize(&self, request: OptimRequest) -> Result<OptimOutput, OptimError> {
        let body = OptimBody {
            data: STANDARD.encode(&request.data),
            source_type: request.source.as_str(),
            output_type: request.output.as_str(),
            quality: request.quality,
            width: request.width,
            height: request.height,
        };

        debug!(
            output = %request.output,
            quality = request.quality,
            width = request.width,
            height = request.height,
            "Calling optimizer"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| OptimError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            warn!(%status, reason, "Optimizer rejected request");
            return Err(OptimError::Rejected(format!("{}: {}", status, reason)));
        }

        let reply: OptimReply = response
            .json()
            .await
            .map_err(|e| OptimError::InvalidResponse(e.to_string()))?;

        decode_reply(reply)
    }

    fn is_configured(&self) -> bool {
        true
    }
}
