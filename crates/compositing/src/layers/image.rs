//! Per-map textures and mapping settings of an image layer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Map whose texture drives layer transparency rather than a colour channel
pub const OPACITY_MAP_NAME: &str = "Opacity";

/// User-facing image layer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Layer opacity, 0.0 to 1.0
    pub opacity: f64,
    /// Use the displayed texture's luminance as opacity
    pub use_grayscale_as_opacity: bool,
    pub mapping_location: DVec3,
    /// Mapping rotation in degrees
    pub mapping_rotation: DVec3,
    pub mapping_scale: DVec3,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            use_grayscale_as_opacity: false,
            mapping_location: DVec3::ZERO,
            mapping_rotation: DVec3::ZERO,
            mapping_scale: DVec3::ONE,
        }
    }
}

impl ImageSettings {
    /// Mapping rotation in radians
    pub fn mapping_rotation_radians(&self) -> DVec3 {
        DVec3::new(
            self.mapping_rotation.x.to_radians(),
            self.mapping_rotation.y.to_radians(),
            self.mapping_rotation.z.to_radians(),
        )
    }
}

/// Textures of an image layer, one per map, plus the map currently shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageLayer {
    maps: BTreeMap<String, PathBuf>,
    display_map: Option<String>,
    settings: ImageSettings,
}

impl ImageLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer showing `display_map` with the given textures
    pub fn with_maps<N, P>(maps: impl IntoIterator<Item = (N, P)>, display_map: &str) -> Self
    where
        N: Into<String>,
        P: Into<PathBuf>,
    {
        let mut layer = Self::new();
        layer.update_maps(maps.into_iter().map(|(name, path)| (name, Some(path))));
        layer.display_map = Some(display_map.to_string());
        layer
    }

    /// Set or clear the texture of each listed map.
    ///
    /// `None` or an empty path clears the map. Returns how many maps changed.
    pub fn update_maps<N, P>(&mut self, maps: impl IntoIterator<Item = (N, Option<P>)>) -> usize
    where
        N: Into<String>,
        P: Into<PathBuf>,
    {
        let mut changed = 0;
        for (name, path) in maps {
            let name = name.into();
            let path = path
                .map(Into::into)
                .filter(|p: &PathBuf| !p.as_os_str().is_empty());
            let updated = match path {
                Some(path) => self.maps.insert(name, path.clone()) != Some(path),
                None => self.maps.remove(&name).is_some(),
            };
            if updated {
                changed += 1;
            }
        }
        debug!("update_maps: {} maps changed", changed);
        changed
    }

    /// Texture of a map, if it has one
    pub fn map(&self, name: &str) -> Option<&Path> {
        self.maps.get(name).map(PathBuf::as_path)
    }

    /// Maps with a texture, sorted by map name
    pub fn maps(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.maps.iter().map(|(name, path)| (name.as_str(), path.as_path()))
    }

    /// Switch the displayed map; a map without a texture shows nothing
    pub fn set_display_map(&mut self, name: &str) {
        self.display_map = Some(name.to_string());
    }

    pub fn display_map(&self) -> Option<&str> {
        self.display_map.as_deref()
    }

    /// Texture of the displayed map, if it has one
    pub fn displayed_texture(&self) -> Option<&Path> {
        self.display_map.as_deref().and_then(|name| self.map(name))
    }

    /// Texture of the special opacity map
    pub fn opacity_texture(&self) -> Option<&Path> {
        self.map(OPACITY_MAP_NAME)
    }

    /// Current mapping and opacity settings
    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }

    /// Replace the layer settings. Opacity is clamped to 0.0..=1.0.
    pub fn apply_image_settings(&mut self, settings: &ImageSettings) {
        self.settings = ImageSettings {
            opacity: settings.opacity.clamp(0.0, 1.0),
            ..*settings
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_maps_counts_changes() {
        let mut layer = ImageLayer::new();
        let changed = layer.update_maps([
            ("Color", Some("paint.1001.png")),
            ("Roughness", Some("")),
            ("Metallic", None),
        ]);
        assert_eq!(changed, 1);
        assert_eq!(layer.map("Color"), Some(Path::new("paint.1001.png")));
        assert_eq!(layer.map("Roughness"), None);

        // Same path again is not a change
        assert_eq!(layer.update_maps([("Color", Some("paint.1001.png"))]), 0);
        assert_eq!(layer.update_maps([("Color", None::<&str>)]), 1);
        assert_eq!(layer.maps().count(), 0);
    }

    #[test]
    fn test_display_map_switch() {
        let mut layer = ImageLayer::with_maps(
            [("Color", "c.png"), (OPACITY_MAP_NAME, "o.png")],
            "Color",
        );
        assert_eq!(layer.displayed_texture(), Some(Path::new("c.png")));
        assert_eq!(layer.opacity_texture(), Some(Path::new("o.png")));

        layer.set_display_map("Normal");
        assert_eq!(layer.display_map(), Some("Normal"));
        assert_eq!(layer.displayed_texture(), None);
    }

    #[test]
    fn test_apply_image_settings() {
        let mut layer = ImageLayer::new();
        assert_eq!(layer.settings().opacity, 1.0);

        layer.apply_image_settings(&ImageSettings {
            opacity: 1.5,
            use_grayscale_as_opacity: true,
            mapping_rotation: DVec3::new(0.0, 0.0, 90.0),
            ..Default::default()
        });
        assert_eq!(layer.settings().opacity, 1.0);
        assert!(layer.settings().use_grayscale_as_opacity);
        let radians = layer.settings().mapping_rotation_radians();
        assert!((radians.z - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
