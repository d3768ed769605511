//! Core domain entities.
//!
//! - [`Zone`] - A named group of files
//! - [`File`] - A stored image with metadata
//! - [`OptimParams`] - A parsed optimized-image request (`name-q-w-h.type`)
//!
//! Creation inputs (`NewZone`, `NewFile`) and partial updates (`ZonePatch`,
//! `FilePatch`) are separate structs.

pub mod file;
pub mod optim;
pub mod zone;

pub use file::{File, FilePatch, ImageType, NewFile, parse_max_age};
pub use optim::OptimParams;
pub use zone::{NewZone, Zone, ZonePatch};
