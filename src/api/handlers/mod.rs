//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod files;
pub mod health;
pub mod images;
pub mod zones;

pub use files::{
    create_file_handler, delete_file_handler, file_handler, file_list_handler,
    update_file_handler,
};
pub use health::health_handler;
pub use images::{image_config_handler, image_handler, optim_image_handler};
pub use zones::{
    create_zone_handler, delete_zone_handler, update_zone_handler, zone_handler,
    zone_list_handler,
};
