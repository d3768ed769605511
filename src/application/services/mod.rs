//! Business logic services for the application layer.

pub mod file_service;
pub mod image_service;
pub mod zone_service;

pub use file_service::{FileList, FileService, ListQuery, NewFileInput};
pub use image_service::{ImageConfig, ImageService, ImageSettings, OptimImage};
pub use zone_service::ZoneService;
