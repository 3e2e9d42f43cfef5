//! Layer depth ordering.
//!
//! Layers are flat objects stacked along z. Paint order follows depth, so the
//! stacking order a user picks is stored as depth: regular layers (Basic and
//! Image) get `0.01 * rank`, overlays sit at a fixed 490.0 above the band
//! regular layers can reach.

mod image;
mod stack;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{LAYER_DEPTH_STEP, OVERLAY_DEPTH};

pub use image::{ImageLayer, ImageSettings, OPACITY_MAP_NAME};
pub use stack::{Layer, LayerContent, LayerId, LayerStack, OverlaySettings};

/// Kind tag of a layer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    /// Flat colour layer
    Basic,
    /// Layer carrying per-map textures
    Image,
    /// Non-interactive UV layout overlay, pinned above all other layers
    Overlay,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::Basic => "Basic",
            LayerKind::Image => "Image",
            LayerKind::Overlay => "Overlay",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKind {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Basic" => Ok(LayerKind::Basic),
            "Image" => Ok(LayerKind::Image),
            "Overlay" => Ok(LayerKind::Overlay),
            other => Err(LayerError::InvalidKind(other.to_string())),
        }
    }
}

/// Where to move a layer in the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveTarget {
    /// One step toward the top
    Up,
    /// One step toward the bottom
    Down,
    /// Above every other regular layer
    Top,
    /// Below every other regular layer
    Bottom,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayerError {
    #[error("Unknown layer kind: {0:?}")]
    InvalidKind(String),
    #[error("Unknown layer {0:?}")]
    UnknownLayer(LayerId),
    #[error("Layer index {index} out of range for {len} layers")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Overlay layers have a fixed depth")]
    OverlayFixed,
    #[error("Layer {0:?} is not an image layer")]
    NotImage(LayerId),
}

/// An object taking part in layer ordering.
///
/// The ordering only ever reads the kind and reads/writes the depth.
pub trait LayerObject {
    fn layer_kind(&self) -> LayerKind;
    fn depth(&self) -> f64;
    fn set_depth(&mut self, depth: f64);
}

impl<T: LayerObject + ?Sized> LayerObject for &mut T {
    fn layer_kind(&self) -> LayerKind {
        (**self).layer_kind()
    }

    fn depth(&self) -> f64 {
        (**self).depth()
    }

    fn set_depth(&mut self, depth: f64) {
        (**self).set_depth(depth)
    }
}

/// Depth of the regular layer at `rank`
#[inline]
pub fn rank_depth(rank: usize) -> f64 {
    LAYER_DEPTH_STEP * rank as f64
}

/// Assign depths so that paint order matches slice order.
///
/// Regular layers get `0.01 * rank`, counting regular layers only; overlays
/// get the fixed overlay depth. Running it twice is a no-op.
pub fn sort_layers<L: LayerObject>(ordered: &mut [L]) {
    let mut rank = 0;
    for layer in ordered.iter_mut() {
        if layer.layer_kind() == LayerKind::Overlay {
            layer.set_depth(OVERLAY_DEPTH);
        } else {
            layer.set_depth(rank_depth(rank));
            rank += 1;
        }
    }
}

/// Indices of the regular layers, bottom to top by current depth.
///
/// Overlays are left out; ties keep slice order.
pub fn current_order<L: LayerObject>(layers: &[L]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..layers.len())
        .filter(|&i| layers[i].layer_kind() != LayerKind::Overlay)
        .collect();
    order.sort_by(|&a, &b| layers[a].depth().total_cmp(&layers[b].depth()));
    order
}

/// Like [`sort_layers`], for an order given as indices into `layers`.
///
/// Overlays anywhere in `layers` are pinned to the overlay depth.
pub fn apply_order<L: LayerObject>(layers: &mut [L], order: &[usize]) {
    for (rank, &i) in order.iter().enumerate() {
        layers[i].set_depth(rank_depth(rank));
    }
    for layer in layers.iter_mut() {
        if layer.layer_kind() == LayerKind::Overlay {
            layer.set_depth(OVERLAY_DEPTH);
        }
    }
}

/// Move the layer at index `target` within the stack and recompute depths.
///
/// `Up`/`Down` swap the layer with its neighbour, `Top`/`Bottom` take it out
/// and put it above/below every other regular layer, keeping the relative
/// order of the rest. `Top`/`Bottom` are not a swap with the end layer: on
/// `[A, B, C]`, `Top` for A gives `[B, C, A]`, not `[C, B, A]`. Returns
/// `Ok(false)` without touching any depth when the layer is already at the
/// requested end.
pub fn move_layer<L: LayerObject>(
    layers: &mut [L],
    target: usize,
    to: MoveTarget,
) -> Result<bool, LayerError> {
    let Some(layer) = layers.get(target) else {
        return Err(LayerError::IndexOutOfRange {
            index: target,
            len: layers.len(),
        });
    };
    if layer.layer_kind() == LayerKind::Overlay {
        return Err(LayerError::OverlayFixed);
    }

    let mut order = current_order(layers);
    let Some(rank) = order.iter().position(|&i| i == target) else {
        return Err(LayerError::IndexOutOfRange {
            index: target,
            len: layers.len(),
        });
    };
    let last = order.len() - 1;

    match to {
        MoveTarget::Up if rank < last => order.swap(rank, rank + 1),
        MoveTarget::Down if rank > 0 => order.swap(rank, rank - 1),
        // Reinsert, not swap: the layers in between keep their order
        MoveTarget::Top if rank < last => {
            let moved = order.remove(rank);
            order.push(moved);
        }
        MoveTarget::Bottom if rank > 0 => {
            let moved = order.remove(rank);
            order.insert(0, moved);
        }
        _ => {
            debug!("move_layer: {:?} from rank {} is a no-op", to, rank);
            return Ok(false);
        }
    }

    apply_order(layers, &order);
    debug!("move_layer: {:?} from rank {} of {}", to, rank, order.len());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct TestLayer {
        name: &'static str,
        kind: LayerKind,
        depth: f64,
    }

    impl LayerObject for TestLayer {
        fn layer_kind(&self) -> LayerKind {
            self.kind
        }

        fn depth(&self) -> f64 {
            self.depth
        }

        fn set_depth(&mut self, depth: f64) {
            self.depth = depth;
        }
    }

    fn layer(name: &'static str, kind: LayerKind) -> TestLayer {
        TestLayer {
            name,
            kind,
            depth: -1.0,
        }
    }

    fn abc() -> Vec<TestLayer> {
        let mut layers = vec![
            layer("A", LayerKind::Image),
            layer("B", LayerKind::Basic),
            layer("C", LayerKind::Image),
        ];
        sort_layers(&mut layers);
        layers
    }

    fn names_in_order(layers: &[TestLayer]) -> Vec<&'static str> {
        current_order(layers).iter().map(|&i| layers[i].name).collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_sort_layers_assigns_rank_depths() {
        let layers = abc();
        assert!(approx(layers[0].depth, 0.0));
        assert!(approx(layers[1].depth, 0.01));
        assert!(approx(layers[2].depth, 0.02));
    }

    #[test]
    fn test_sort_layers_is_idempotent() {
        let mut layers = abc();
        let before: Vec<f64> = layers.iter().map(|l| l.depth).collect();
        sort_layers(&mut layers);
        let after: Vec<f64> = layers.iter().map(|l| l.depth).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_overlay_pinned_and_not_ranked() {
        let mut layers = vec![
            layer("A", LayerKind::Basic),
            layer("O", LayerKind::Overlay),
            layer("B", LayerKind::Image),
        ];
        sort_layers(&mut layers);
        assert_eq!(layers[1].depth, 490.0);
        assert!(approx(layers[2].depth, 0.01));

        move_layer(&mut layers, 0, MoveTarget::Top).unwrap();
        assert_eq!(layers[1].depth, 490.0);
        assert_eq!(names_in_order(&layers), vec!["B", "A"]);
    }

    #[test]
    fn test_sort_layers_through_references() {
        let mut a = layer("A", LayerKind::Basic);
        let mut b = layer("B", LayerKind::Basic);
        let mut refs = vec![&mut b, &mut a];
        sort_layers(&mut refs);
        assert!(approx(b.depth, 0.0));
        assert!(approx(a.depth, 0.01));
    }

    #[test]
    fn test_current_order_sorts_by_depth() {
        let mut layers = abc();
        layers[0].depth = 0.05;
        assert_eq!(names_in_order(&layers), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_move_up() {
        let mut layers = abc();
        assert_eq!(move_layer(&mut layers, 1, MoveTarget::Up), Ok(true));
        assert_eq!(names_in_order(&layers), vec!["A", "C", "B"]);
        assert!(approx(layers[0].depth, 0.0));
        assert!(approx(layers[2].depth, 0.01));
        assert!(approx(layers[1].depth, 0.02));
    }

    #[test]
    fn test_move_down() {
        let mut layers = abc();
        assert_eq!(move_layer(&mut layers, 1, MoveTarget::Down), Ok(true));
        assert_eq!(names_in_order(&layers), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_move_top_and_bottom() {
        let mut layers = abc();
        move_layer(&mut layers, 0, MoveTarget::Top).unwrap();
        assert_eq!(names_in_order(&layers), vec!["B", "C", "A"]);

        move_layer(&mut layers, 0, MoveTarget::Bottom).unwrap();
        assert_eq!(names_in_order(&layers), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_move_top_keeps_order_of_others() {
        let mut layers = abc();
        layers.push(layer("D", LayerKind::Basic));
        sort_layers(&mut layers);

        move_layer(&mut layers, 0, MoveTarget::Top).unwrap();
        assert_eq!(names_in_order(&layers), vec!["B", "C", "D", "A"]);

        move_layer(&mut layers, 3, MoveTarget::Bottom).unwrap();
        assert_eq!(names_in_order(&layers), vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn test_move_past_end_is_noop() {
        let mut layers = abc();
        assert_eq!(move_layer(&mut layers, 2, MoveTarget::Up), Ok(false));
        assert_eq!(move_layer(&mut layers, 2, MoveTarget::Top), Ok(false));
        assert_eq!(move_layer(&mut layers, 0, MoveTarget::Down), Ok(false));
        assert_eq!(move_layer(&mut layers, 0, MoveTarget::Bottom), Ok(false));
        assert_eq!(names_in_order(&layers), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_move_rejects_overlay_and_bad_index() {
        let mut layers = abc();
        layers.push(layer("O", LayerKind::Overlay));
        assert_eq!(
            move_layer(&mut layers, 3, MoveTarget::Down),
            Err(LayerError::OverlayFixed)
        );
        assert_eq!(
            move_layer(&mut layers, 9, MoveTarget::Up),
            Err(LayerError::IndexOutOfRange { index: 9, len: 4 })
        );
    }

    #[test]
    fn test_layer_kind_parsing() {
        assert_eq!("Image".parse::<LayerKind>(), Ok(LayerKind::Image));
        assert_eq!(LayerKind::Overlay.to_string(), "Overlay");
        assert_eq!(
            "Invalid".parse::<LayerKind>(),
            Err(LayerError::InvalidKind("Invalid".to_string()))
        );
    }
}
