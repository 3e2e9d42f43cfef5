//! Palimpsest compositing core - UV tile geometry, snapping and layer stacking
//!
//! This crate provides the geometry engine behind UV-space compositing:
//! - [`uv_tile`] - UV tile numbering, tile centres and tile file names
//! - [`geometry`] - Point-in-polygon, segment intersection and closest point
//! - [`mesh`] - Mesh provider trait, editable mesh and the reference UV layout
//! - [`snapping`] - Snap selected vertices onto UV layout vertices and edges
//! - [`vertex_chain`] - Straighten an open vertex path with even spacing
//! - [`layers`] - Depth ordering for image, basic and overlay layers

pub mod constants;
pub mod geometry;
pub mod layers;
pub mod mesh;
pub mod snapping;
pub mod uv_tile;
pub mod vertex_chain;

pub use constants::*;
pub use geometry::*;
pub use layers::*;
pub use mesh::*;
pub use snapping::*;
pub use uv_tile::*;
pub use vertex_chain::*;
