//! Shared configuration for Palimpsest
//!
//! This crate holds the per-scene settings that describe which texture maps a
//! scene paints into and how they are exported:
//! - [`maps`] - Map slots, colour depths and keyword-based map file assignment
//! - [`scene`] - Scene settings, output resolution and the JSON settings file

pub mod maps;
pub mod scene;

use std::path::PathBuf;

pub use maps::*;
pub use scene::*;

/// Number of user-named basic map slots
pub const BASIC_MAP_COUNT: usize = 20;

/// Default output resolution in pixels
pub const DEFAULT_RESOLUTION: u32 = 1024;

/// Default file name when saving scene settings
pub const DEFAULT_SETTINGS_FILE_NAME: &str = "SceneSetting.json";

/// Image file extensions accepted as map textures
pub const SUPPORTED_IMAGE_EXTS: &[&str] = &[
    "bmp", "sgi", "rgb", "bw", "png", "jpg", "jpeg", "jp2", "j2c", "tga", "cin", "dpx", "exr",
    "hdr", "tif", "tiff",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The settings file must be in JSON format: {0}")]
    NotJson(PathBuf),
    #[error("Unsupported resolution: {0}")]
    InvalidResolution(String),
    #[error("Unsupported color depth: {0}")]
    InvalidColorDepth(String),
    #[error("Settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
