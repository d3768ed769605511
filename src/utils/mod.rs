//! Utility functions shared across layers.
//!
//! - [`image_info`] - Image format and dimension sniffing from raw bytes
//! - [`etag`] - Strong entity tags for served image bytes

pub mod etag;
pub mod image_info;
