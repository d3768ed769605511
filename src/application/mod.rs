//! Application layer services implementing business logic.
//!
//! Services validate input, apply the rules of the site and coordinate the
//! capabilities they were built with (repositories, key-value store,
//! optimizer, clock). Handlers call services and never touch a capability
//! directly.
//!
//! # Available Services
//!
//! - [`services::zone_service::ZoneService`] - Zone management
//! - [`services::file_service::FileService`] - File upload, listing and metadata
//! - [`services::image_service::ImageService`] - Optimized image delivery

pub mod services;
