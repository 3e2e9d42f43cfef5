//! Texture map slots.
//!
//! A scene paints into a fixed set of map slots: [`BASIC_MAP_COUNT`] basic
//! maps the user can name and give a colour depth, plus special maps with a
//! fixed role. Only the first `basic_map_count` basic maps are in use.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BASIC_MAP_COUNT, ConfigError, SUPPORTED_IMAGE_EXTS};

/// Special map holding layer transparency
pub const OPACITY_MAP: &str = "Opacity";

/// Special maps, present in every scene after the basic maps
pub const SPECIAL_MAPS: &[&str] = &[OPACITY_MAP];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    Basic,
    Special,
}

/// Bits per channel of an exported map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorDepth {
    #[default]
    Eight,
    Sixteen,
}

impl ColorDepth {
    pub const ALL: [ColorDepth; 2] = [ColorDepth::Eight, ColorDepth::Sixteen];

    pub fn bits(self) -> u32 {
        match self {
            ColorDepth::Eight => 8,
            ColorDepth::Sixteen => 16,
        }
    }
}

impl fmt::Display for ColorDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl FromStr for ColorDepth {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "8" => Ok(ColorDepth::Eight),
            "16" => Ok(ColorDepth::Sixteen),
            other => Err(ConfigError::InvalidColorDepth(other.to_string())),
        }
    }
}

impl TryFrom<String> for ColorDepth {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorDepth> for String {
    fn from(depth: ColorDepth) -> Self {
        depth.to_string()
    }
}

/// One texture map slot of a scene
#[derive(Debug, Clone, PartialEq)]
pub struct MapSlot {
    pub kind: MapKind,
    /// Stable key used for layer textures and the settings file
    pub internal_name: String,
    pub default_name: String,
    /// User-given name; empty means the default name is shown
    pub display_name: String,
    pub color_depth: ColorDepth,
    /// Comma separated substrings used to pick map files from a folder
    pub file_name_keywords: String,
    pub file_path: Option<PathBuf>,
}

impl MapSlot {
    /// Basic map slot `index`, counted from zero
    pub fn basic(index: usize) -> Self {
        Self {
            kind: MapKind::Basic,
            internal_name: format!("BasicMap{index}"),
            default_name: format!("Map{}", index + 1),
            display_name: String::new(),
            color_depth: ColorDepth::default(),
            file_name_keywords: String::new(),
            file_path: None,
        }
    }

    pub fn special(name: &str) -> Self {
        Self {
            kind: MapKind::Special,
            internal_name: name.to_string(),
            default_name: name.to_string(),
            display_name: String::new(),
            color_depth: ColorDepth::default(),
            file_name_keywords: String::new(),
            file_path: None,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.default_name
        } else {
            &self.display_name
        }
    }

    /// Non-empty keywords, whitespace trimmed
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.file_name_keywords
            .split(',')
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
    }

    /// Whether any keyword occurs in `file_name`
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        self.keywords().any(|keyword| file_name.contains(keyword))
    }
}

/// All basic slots followed by the special slots
pub fn default_map_slots() -> Vec<MapSlot> {
    (0..BASIC_MAP_COUNT)
        .map(MapSlot::basic)
        .chain(SPECIAL_MAPS.iter().map(|name| MapSlot::special(name)))
        .collect()
}

/// Whether a file has one of the supported image extensions
pub fn is_image_file_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_IMAGE_EXTS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
}

/// Give each slot the file whose name contains one of the slot's keywords.
///
/// Unsupported files are skipped. When several files match a slot the last
/// one wins. Returns the number of slots that got a file.
pub fn assign_map_files<'a>(
    slots: &mut [MapSlot],
    files: impl IntoIterator<Item = &'a Path>,
) -> usize {
    let candidates: Vec<(&Path, &str)> = files
        .into_iter()
        .filter(|path| is_image_file_supported(path))
        .filter_map(|path| Some((path, path.file_name()?.to_str()?)))
        .collect();

    let mut assigned = 0;
    for slot in slots.iter_mut() {
        let found = candidates
            .iter()
            .rev()
            .find(|(_, file_name)| slot.matches_file_name(file_name));
        if let Some((path, _)) = found {
            debug!("assign_map_files: {} <- {}", slot.internal_name, path.display());
            slot.file_path = Some(path.to_path_buf());
            assigned += 1;
        }
    }
    assigned
}
