//! Scene settings and the JSON settings file.
//!
//! [`SceneSettings`] is the live state. A [`SceneSettingGroup`] is the subset
//! written to disk so one scene's map setup can be loaded into another.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::maps::{ColorDepth, MapKind, MapSlot, assign_map_files, default_map_slots};
use crate::{BASIC_MAP_COUNT, ConfigError, DEFAULT_RESOLUTION};

/// Indent of the settings file
const SETTINGS_FILE_INDENT: &[u8] = b"    ";

/// Square output resolution of exported maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution(u32);

impl Resolution {
    pub const SUPPORTED: [u32; 7] = [128, 256, 512, 1024, 2048, 4096, 8192];

    pub fn new(pixels: u32) -> Result<Self, ConfigError> {
        if Self::SUPPORTED.contains(&pixels) {
            Ok(Self(pixels))
        } else {
            Err(ConfigError::InvalidResolution(pixels.to_string()))
        }
    }

    pub fn pixels(self) -> u32 {
        self.0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(DEFAULT_RESOLUTION)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Resolution {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pixels = s
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidResolution(s.to_string()))?;
        Self::new(pixels)
    }
}

impl TryFrom<String> for Resolution {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(resolution: Resolution) -> Self {
        resolution.to_string()
    }
}

/// Map settings as stored in the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettingGroup {
    pub internal_name: String,
    #[serde(default)]
    pub display_name: String,
    /// Written as `""` for special maps
    #[serde(
        default,
        serialize_with = "serialize_color_depth",
        deserialize_with = "deserialize_color_depth"
    )]
    pub color_depth: Option<ColorDepth>,
    #[serde(default)]
    pub file_name_keywords: String,
}

/// Scene settings as stored in the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSettingGroup {
    pub map_file_name: String,
    pub resolution: Resolution,
    pub basic_map_count: usize,
    pub map_setting_groups: Vec<MapSettingGroup>,
}

/// Per-scene map and export settings
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    /// Base name of exported map files
    pub map_file_name: String,
    pub resolution: Resolution,
    basic_map_count: usize,
    maps: Vec<MapSlot>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            map_file_name: String::new(),
            resolution: Resolution::default(),
            basic_map_count: 1,
            maps: default_map_slots(),
        }
    }
}

impl SceneSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn basic_map_count(&self) -> usize {
        self.basic_map_count
    }

    /// Set how many basic maps are in use, clamped to `1..=BASIC_MAP_COUNT`
    pub fn set_basic_map_count(&mut self, count: usize) -> usize {
        self.basic_map_count = count.clamp(1, BASIC_MAP_COUNT);
        self.basic_map_count
    }

    pub fn maps(&self) -> &[MapSlot] {
        &self.maps
    }

    pub fn map(&self, internal_name: &str) -> Option<&MapSlot> {
        self.maps.iter().find(|m| m.internal_name == internal_name)
    }

    pub fn map_mut(&mut self, internal_name: &str) -> Option<&mut MapSlot> {
        self.maps.iter_mut().find(|m| m.internal_name == internal_name)
    }

    /// Basic maps in use
    pub fn current_basic_maps(&self) -> impl Iterator<Item = &MapSlot> {
        self.maps
            .iter()
            .filter(|m| m.kind == MapKind::Basic)
            .take(self.basic_map_count)
    }

    /// Basic maps in use followed by all special maps
    pub fn current_maps(&self) -> impl Iterator<Item = &MapSlot> {
        self.current_basic_maps()
            .chain(self.maps.iter().filter(|m| m.kind == MapKind::Special))
    }

    /// `(internal name, texture)` for every map in use
    pub fn map_file_paths(&self) -> Vec<(String, Option<PathBuf>)> {
        self.current_maps()
            .map(|m| (m.internal_name.clone(), m.file_path.clone()))
            .collect()
    }

    /// Assign textures to the maps in use from `files` by keyword
    pub fn assign_map_files<'a>(&mut self, files: impl IntoIterator<Item = &'a Path>) -> usize {
        let in_use: Vec<String> = self
            .current_maps()
            .map(|m| m.internal_name.clone())
            .collect();
        let mut slots: Vec<MapSlot> = in_use
            .iter()
            .filter_map(|name| self.map(name).cloned())
            .collect();

        let assigned = assign_map_files(&mut slots, files);
        for slot in slots {
            if let Some(target) = self.map_mut(&slot.internal_name) {
                target.file_path = slot.file_path;
            }
        }
        info!("Assigned {} map files by keyword", assigned);
        assigned
    }

    /// Snapshot of the settings that go into the settings file
    pub fn to_setting_group(&self) -> SceneSettingGroup {
        let map_setting_groups = self
            .maps
            .iter()
            .map(|m| match m.kind {
                MapKind::Basic => MapSettingGroup {
                    internal_name: m.internal_name.clone(),
                    display_name: m.display_name.clone(),
                    color_depth: Some(m.color_depth),
                    file_name_keywords: m.file_name_keywords.clone(),
                },
                MapKind::Special => MapSettingGroup {
                    internal_name: m.internal_name.clone(),
                    display_name: String::new(),
                    color_depth: None,
                    file_name_keywords: m.file_name_keywords.clone(),
                },
            })
            .collect();

        SceneSettingGroup {
            map_file_name: self.map_file_name.clone(),
            resolution: self.resolution,
            basic_map_count: self.basic_map_count,
            map_setting_groups,
        }
    }

    /// Apply a loaded settings group.
    ///
    /// Map entries are matched by internal name; unknown entries are skipped.
    /// Display name and colour depth are only taken for basic maps.
    pub fn apply_setting_group(&mut self, group: &SceneSettingGroup) {
        self.map_file_name = group.map_file_name.clone();
        self.resolution = group.resolution;
        self.set_basic_map_count(group.basic_map_count);

        for entry in &group.map_setting_groups {
            let Some(slot) = self.map_mut(&entry.internal_name) else {
                warn!("Skipping unknown map {:?} in settings", entry.internal_name);
                continue;
            };
            slot.file_name_keywords = entry.file_name_keywords.clone();
            if slot.kind == MapKind::Basic {
                slot.display_name = entry.display_name.clone();
                if let Some(depth) = entry.color_depth {
                    slot.color_depth = depth;
                }
            }
        }
    }

    /// Write the settings file as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        check_json_path(path)?;
        let mut json = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(SETTINGS_FILE_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
        self.to_setting_group().serialize(&mut serializer)?;
        fs::write(path, json)?;
        info!("Saved scene settings to {}", path.display());
        Ok(())
    }

    /// Read a settings file and apply it
    pub fn load(&mut self, path: &Path) -> Result<(), ConfigError> {
        check_json_path(path)?;
        let json = fs::read_to_string(path)?;
        let group: SceneSettingGroup = serde_json::from_str(&json)?;
        debug!(
            "Loaded {} map entries from {}",
            group.map_setting_groups.len(),
            path.display()
        );
        self.apply_setting_group(&group);
        Ok(())
    }
}

fn serialize_color_depth<S>(depth: &Option<ColorDepth>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match depth {
        Some(depth) => serializer.serialize_str(&depth.to_string()),
        None => serializer.serialize_str(""),
    }
}

fn deserialize_color_depth<'de, D>(deserializer: D) -> Result<Option<ColorDepth>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(depth) => depth.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn check_json_path(path: &Path) -> Result<(), ConfigError> {
    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(())
    } else {
        Err(ConfigError::NotJson(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::OPACITY_MAP;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("palimpsest-config-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_defaults() {
        let settings = SceneSettings::new();
        assert_eq!(settings.resolution.pixels(), 1024);
        assert_eq!(settings.basic_map_count(), 1);
        let current: Vec<&str> = settings
            .current_maps()
            .map(|m| m.internal_name.as_str())
            .collect();
        assert_eq!(current, vec!["BasicMap0", OPACITY_MAP]);
    }

    #[test]
    fn test_basic_map_count_clamped() {
        let mut settings = SceneSettings::new();
        assert_eq!(settings.set_basic_map_count(0), 1);
        assert_eq!(settings.set_basic_map_count(50), BASIC_MAP_COUNT);
        assert_eq!(settings.current_basic_maps().count(), BASIC_MAP_COUNT);
        assert_eq!(settings.set_basic_map_count(3), 3);
        assert_eq!(settings.map_file_paths().len(), 4);
    }

    #[test]
    fn test_resolution_values() {
        assert_eq!("2048".parse::<Resolution>().unwrap().pixels(), 2048);
        assert!(matches!(Resolution::new(1000), Err(ConfigError::InvalidResolution(_))));
        assert!(matches!(
            "big".parse::<Resolution>(),
            Err(ConfigError::InvalidResolution(_))
        ));
    }

    #[test]
    fn test_setting_group_json_format() {
        let mut settings = SceneSettings::new();
        settings.map_file_name = "Crate".to_string();
        let json = serde_json::to_value(settings.to_setting_group()).unwrap();

        assert_eq!(json["map_file_name"], "Crate");
        assert_eq!(json["resolution"], "1024");
        assert_eq!(json["basic_map_count"], 1);
        let groups = json["map_setting_groups"].as_array().unwrap();
        assert_eq!(groups.len(), BASIC_MAP_COUNT + 1);
        assert_eq!(groups[0]["color_depth"], "8");
        assert_eq!(groups[BASIC_MAP_COUNT]["color_depth"], "");
    }

    #[test]
    fn test_apply_setting_group() {
        let group = SceneSettingGroup {
            map_file_name: "Wall".to_string(),
            resolution: Resolution::new(4096).unwrap(),
            basic_map_count: 2,
            map_setting_groups: vec![
                MapSettingGroup {
                    internal_name: "BasicMap1".to_string(),
                    display_name: "Normal".to_string(),
                    color_depth: Some(ColorDepth::Sixteen),
                    file_name_keywords: "nrm".to_string(),
                },
                MapSettingGroup {
                    internal_name: OPACITY_MAP.to_string(),
                    display_name: "Ignored".to_string(),
                    color_depth: Some(ColorDepth::Sixteen),
                    file_name_keywords: "mask".to_string(),
                },
                MapSettingGroup {
                    internal_name: "Unknown".to_string(),
                    display_name: String::new(),
                    color_depth: None,
                    file_name_keywords: String::new(),
                },
            ],
        };

        let mut settings = SceneSettings::new();
        settings.apply_setting_group(&group);

        assert_eq!(settings.map_file_name, "Wall");
        assert_eq!(settings.basic_map_count(), 2);
        let normal = settings.map("BasicMap1").unwrap();
        assert_eq!(normal.display_name(), "Normal");
        assert_eq!(normal.color_depth, ColorDepth::Sixteen);

        let opacity = settings.map(OPACITY_MAP).unwrap();
        assert_eq!(opacity.display_name(), OPACITY_MAP);
        assert_eq!(opacity.color_depth, ColorDepth::Eight);
        assert_eq!(opacity.file_name_keywords, "mask");
    }

    #[test]
    fn test_assign_only_maps_in_use() {
        let mut settings = SceneSettings::new();
        settings.map_mut("BasicMap0").unwrap().file_name_keywords = "color".to_string();
        settings.map_mut("BasicMap1").unwrap().file_name_keywords = "rough".to_string();

        let files = [Path::new("t_color.png"), Path::new("t_rough.png")];
        assert_eq!(settings.assign_map_files(files), 1);
        assert!(settings.map("BasicMap0").unwrap().file_path.is_some());
        assert!(settings.map("BasicMap1").unwrap().file_path.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("scene.json");
        let mut saved = SceneSettings::new();
        saved.map_file_name = "Crate".to_string();
        saved.resolution = Resolution::new(512).unwrap();
        saved.set_basic_map_count(4);
        saved.map_mut("BasicMap3").unwrap().display_name = "Height".to_string();
        saved.save(&path).unwrap();

        let mut loaded = SceneSettings::new();
        loaded.load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.resolution.pixels(), 512);
        assert_eq!(loaded.basic_map_count(), 4);
        assert_eq!(loaded.map("BasicMap3").unwrap().display_name(), "Height");
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_saved_file_uses_four_space_indent() {
        let path = temp_path("indent.json");
        SceneSettings::new().save(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert!(text.starts_with("{\n    \"map_file_name\": \"\",\n"));
        assert!(text.contains("\n            \"internal_name\": \"BasicMap0\""));
        assert!(text.contains("\"color_depth\": \"\""));
    }

    #[test]
    fn test_load_file_with_empty_color_depth() {
        let path = temp_path("empty-depth.json");
        let json = r#"{
    "map_file_name": "Crate",
    "resolution": "2048",
    "basic_map_count": 2,
    "map_setting_groups": [
        {
            "internal_name": "BasicMap0",
            "display_name": "Albedo",
            "color_depth": "16",
            "file_name_keywords": "color"
        },
        {
            "internal_name": "Opacity",
            "display_name": "",
            "color_depth": "",
            "file_name_keywords": "mask"
        }
    ]
}"#;
        fs::write(&path, json).unwrap();
        let mut settings = SceneSettings::new();
        let result = settings.load(&path);
        let _ = fs::remove_file(&path);

        result.unwrap();
        assert_eq!(settings.resolution.pixels(), 2048);
        assert_eq!(settings.basic_map_count(), 2);
        let albedo = settings.map("BasicMap0").unwrap();
        assert_eq!(albedo.display_name(), "Albedo");
        assert_eq!(albedo.color_depth, ColorDepth::Sixteen);
        assert_eq!(settings.map(OPACITY_MAP).unwrap().file_name_keywords, "mask");
    }

    #[test]
    fn test_load_rejects_unknown_color_depth() {
        let group: Result<MapSettingGroup, _> = serde_json::from_str(
            r#"{"internal_name": "BasicMap0", "display_name": "", "color_depth": "32", "file_name_keywords": ""}"#,
        );
        assert!(group.is_err());
    }

    #[test]
    fn test_rejects_non_json_path() {
        let settings = SceneSettings::new();
        let path = temp_path("scene.txt");
        assert!(matches!(settings.save(&path), Err(ConfigError::NotJson(_))));
        assert!(!path.exists());

        let mut settings = SceneSettings::new();
        assert!(matches!(settings.load(&path), Err(ConfigError::NotJson(_))));
    }

    #[test]
    fn test_load_malformed_file() {
        let path = temp_path("broken.json");
        fs::write(&path, "{ \"map_file_name\": 3 }").unwrap();
        let mut settings = SceneSettings::new();
        let result = settings.load(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::Json(_))));
        assert_eq!(settings, SceneSettings::new());
    }
}
