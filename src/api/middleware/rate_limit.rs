//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

/// Requests a single client may send back to back before being limited.
pub const IMAGE_BURST: u32 = 200;

/// Creates a rate limiter for image delivery.
///
/// # Limits
///
/// - **Rate**: 50 requests per second
/// - **Burst**: 200 requests
///
/// Pages embed many images at once, so the bucket is large. Requests
/// exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// Rate limits are applied per client IP address extracted from the
/// socket peer address, so the server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>`.
///
/// # Example
///
/// ```rust,ignore
/// let images = Router::new()
///     .route("/images/v1/{spec}", get(image_handler))
///     .layer(rate_limit::image_layer());
/// ```
pub fn image_layer()
-> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(20)
            .burst_size(IMAGE_BURST)
            .finish()
            .expect("rate limit configuration is non-zero"),
    );

    GovernorLayer::new(governor_conf)
}
