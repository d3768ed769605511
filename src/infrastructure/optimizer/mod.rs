//! Image optimization capability.
//!
//! - [`RemoteOptimizer`] - Delegates to an optimizer service over HTTP
//! - [`PassthroughOptimizer`] - Fallback that only serves unchanged originals

mod passthrough;
mod remote;
mod service;

pub use passthrough::PassthroughOptimizer;
pub use remote::RemoteOptimizer;
pub use service::{ImageOptimizer, OptimError, OptimOutput, OptimRequest};

#[cfg(test)]
pub use service::MockImageOptimizer;
