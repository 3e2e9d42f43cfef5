//! Layer registry.
//!
//! [`LayerStack`] owns the layers of a scene and keeps their depths in line
//! with the stacking order on every change.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::image::{ImageLayer, ImageSettings};
use super::{
    LayerError, LayerKind, LayerObject, MoveTarget, apply_order, current_order, move_layer,
};
use crate::constants::OVERLAY_DEPTH;
use crate::uv_tile::{UvTileNumber, location_to_tile_coord};

/// Offset from a tile centre to the corner overlays are anchored at
const OVERLAY_ANCHOR_OFFSET: DVec3 = DVec3::new(-0.5, -0.5, 0.0);

/// Stable layer identifier, never reused within a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum LayerContent {
    Basic,
    Image(ImageLayer),
    Overlay {
        tile: UvTileNumber,
        visible: bool,
        opacity: f64,
    },
}

/// Display settings shared by every overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub show: bool,
    pub opacity: f64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            show: true,
            opacity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// Position in UV space; z is the layer depth
    pub location: DVec3,
    pub content: LayerContent,
}

impl Layer {
    pub fn image(&self) -> Option<&ImageLayer> {
        match &self.content {
            LayerContent::Image(image) => Some(image),
            _ => None,
        }
    }
}

impl LayerObject for Layer {
    fn layer_kind(&self) -> LayerKind {
        match self.content {
            LayerContent::Basic => LayerKind::Basic,
            LayerContent::Image(_) => LayerKind::Image,
            LayerContent::Overlay { .. } => LayerKind::Overlay,
        }
    }

    fn depth(&self) -> f64 {
        self.location.z
    }

    fn set_depth(&mut self, depth: f64) {
        self.location.z = depth;
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
    next_id: u32,
    overlay_settings: OverlaySettings,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of layers, overlays included
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Look up a layer by id
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// All layers in creation order, not stacking order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Regular layer ids, bottom to top
    pub fn sorted_ids(&self) -> Vec<LayerId> {
        current_order(&self.layers)
            .into_iter()
            .map(|i| self.layers[i].id)
            .collect()
    }

    /// Overlay layer ids, in creation order
    pub fn overlay_ids(&self) -> Vec<LayerId> {
        self.layers
            .iter()
            .filter(|layer| layer.layer_kind() == LayerKind::Overlay)
            .map(|layer| layer.id)
            .collect()
    }

    /// Add a basic layer on top, centred on the tile under `view_location`
    pub fn add_basic_layer(&mut self, name: impl Into<String>, view_location: DVec3) -> LayerId {
        self.push_on_top(name.into(), view_location, LayerContent::Basic)
    }

    /// Add an image layer on top, centred on the tile under `view_location`
    pub fn add_image_layer(
        &mut self,
        name: impl Into<String>,
        view_location: DVec3,
        image: ImageLayer,
    ) -> LayerId {
        self.push_on_top(name.into(), view_location, LayerContent::Image(image))
    }

    /// Add the layout overlay of one UV tile, anchored at the tile's lower
    /// left corner and pinned at the overlay depth
    pub fn add_overlay(&mut self, tile: UvTileNumber) -> LayerId {
        let id = self.allocate_id();
        let mut location = tile.coord().center() + OVERLAY_ANCHOR_OFFSET;
        location.z = OVERLAY_DEPTH;
        self.layers.push(Layer {
            id,
            name: format!("Overlay_{tile}"),
            location,
            content: LayerContent::Overlay {
                tile,
                visible: self.overlay_settings.show,
                opacity: self.overlay_settings.opacity,
            },
        });
        debug!("add_overlay: tile {} as {:?}", tile, id);
        id
    }

    /// Copy a regular layer and place the copy on top of the stack
    pub fn duplicate_layer(&mut self, id: LayerId) -> Result<LayerId, LayerError> {
        let source = self.get(id).ok_or(LayerError::UnknownLayer(id))?;
        if source.layer_kind() == LayerKind::Overlay {
            return Err(LayerError::OverlayFixed);
        }
        let mut copy = source.clone();
        copy.name = self.unique_name(&source.name);
        copy.id = self.allocate_id();
        let new_id = copy.id;
        self.append_on_top(copy);
        debug!("duplicate_layer: {:?} -> {:?}", id, new_id);
        Ok(new_id)
    }

    /// Remove a layer; the remaining regular layers close the gap
    pub fn remove_layer(&mut self, id: LayerId) -> Result<Layer, LayerError> {
        let index = self.index_of(id)?;
        let removed = self.layers.remove(index);
        self.resort();
        debug!("remove_layer: {:?} ({} left)", id, self.layers.len());
        Ok(removed)
    }

    pub fn move_layer(&mut self, id: LayerId, to: MoveTarget) -> Result<bool, LayerError> {
        let index = self.index_of(id)?;
        move_layer(&mut self.layers, index, to)
    }

    pub fn apply_image_settings(
        &mut self,
        id: LayerId,
        settings: &ImageSettings,
    ) -> Result<(), LayerError> {
        let index = self.index_of(id)?;
        match &mut self.layers[index].content {
            LayerContent::Image(image) => {
                image.apply_image_settings(settings);
                Ok(())
            }
            _ => Err(LayerError::NotImage(id)),
        }
    }

    /// Show the given map on every image layer
    pub fn set_display_map(&mut self, map_name: &str) {
        for layer in &mut self.layers {
            if let LayerContent::Image(image) = &mut layer.content {
                image.set_display_map(map_name);
            }
        }
        info!("Displaying map {}", map_name);
    }

    pub fn overlay_settings(&self) -> OverlaySettings {
        self.overlay_settings
    }

    /// Apply overlay visibility and opacity to every overlay, current and future
    pub fn apply_overlay_settings(&mut self, settings: OverlaySettings) {
        self.overlay_settings = OverlaySettings {
            show: settings.show,
            opacity: settings.opacity.clamp(0.0, 1.0),
        };
        for layer in &mut self.layers {
            if let LayerContent::Overlay {
                visible, opacity, ..
            } = &mut layer.content
            {
                *visible = self.overlay_settings.show;
                *opacity = self.overlay_settings.opacity;
            }
        }
    }

    fn push_on_top(&mut self, name: String, view_location: DVec3, content: LayerContent) -> LayerId {
        let id = self.allocate_id();
        let location = location_to_tile_coord(view_location).center();
        self.append_on_top(Layer {
            id,
            name,
            location,
            content,
        });
        debug!("Added {:?} at {:?}", id, location);
        id
    }

    fn append_on_top(&mut self, layer: Layer) {
        let mut order = current_order(&self.layers);
        order.push(self.layers.len());
        self.layers.push(layer);
        apply_order(&mut self.layers, &order);
    }

    fn resort(&mut self) {
        let order = current_order(&self.layers);
        apply_order(&mut self.layers, &order);
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn index_of(&self, id: LayerId) -> Result<usize, LayerError> {
        self.layers
            .iter()
            .position(|layer| layer.id == id)
            .ok_or(LayerError::UnknownLayer(id))
    }

    /// `name.001`, `name.002`, ... with the first suffix not yet taken
    fn unique_name(&self, name: &str) -> String {
        let base = match name.rsplit_once('.') {
            Some((base, suffix)) if suffix.len() == 3 && suffix.bytes().all(|b| b.is_ascii_digit()) => {
                base
            }
            _ => name,
        };
        (1..)
            .map(|n| format!("{base}.{n:03}"))
            .find(|candidate| self.layers.iter().all(|layer| &layer.name != candidate))
            .unwrap_or_else(|| base.to_string())
    }
}
