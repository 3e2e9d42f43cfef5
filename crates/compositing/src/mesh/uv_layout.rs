//! Reference UV layout geometry.
//!
//! The layout holds the unwrapped UV faces of the source mesh laid flat on the
//! z = 0 plane, plus a square border loop for each UV tile in use. Faces are
//! used for containment tests, edges (face boundaries and loose edges alike)
//! for edge snapping.

use std::collections::HashSet;

use glam::{DVec2, DVec3};

use super::MeshError;
use crate::uv_tile::UvTileCoord;

/// Corner offsets from a tile centre, counter-clockwise from bottom left
const TILE_CORNERS: [DVec3; 4] = [
    DVec3::new(-0.5, -0.5, 0.0),
    DVec3::new(0.5, -0.5, 0.0),
    DVec3::new(0.5, 0.5, 0.0),
    DVec3::new(-0.5, 0.5, 0.0),
];

#[derive(Debug, Clone, Default)]
pub struct UvLayout {
    vertices: Vec<DVec3>,
    faces: Vec<Vec<usize>>,
    edges: Vec<[usize; 2]>,
    edge_set: HashSet<(usize, usize)>,
}

impl UvLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a layout from per-face UV loops
    pub fn from_uv_faces<I, F>(faces: I) -> Result<Self, MeshError>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[DVec2]>,
    {
        let mut layout = Self::new();
        for face in faces {
            layout.add_uv_face(face.as_ref())?;
        }
        Ok(layout)
    }

    /// Add a loose vertex and return its index
    pub fn add_vertex(&mut self, position: DVec3) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    /// Add an undirected edge between two layout vertices. Adding an
    /// existing edge again is a no-op.
    pub fn add_edge(&mut self, a: usize, b: usize) -> Result<(), MeshError> {
        self.check_vertex(a)?;
        self.check_vertex(b)?;
        if a == b {
            return Err(MeshError::LayoutSelfLoop(a));
        }
        let key = (a.min(b), a.max(b));
        if self.edge_set.insert(key) {
            self.edges.push([a, b]);
        }
        Ok(())
    }

    /// Add a face over existing vertices; its boundary joins the edge set
    pub fn add_face(&mut self, indices: &[usize]) -> Result<usize, MeshError> {
        if indices.len() < 3 {
            return Err(MeshError::DegenerateFace(indices.len()));
        }
        for (i, &index) in indices.iter().enumerate() {
            self.check_vertex(index)?;
            if index == indices[(i + 1) % indices.len()] {
                return Err(MeshError::LayoutSelfLoop(index));
            }
        }
        for (i, &a) in indices.iter().enumerate() {
            self.add_edge(a, indices[(i + 1) % indices.len()])?;
        }
        self.faces.push(indices.to_vec());
        Ok(self.faces.len() - 1)
    }

    /// Add a face from one UV loop, with its own vertices
    pub fn add_uv_face(&mut self, uvs: &[DVec2]) -> Result<usize, MeshError> {
        if uvs.len() < 3 {
            return Err(MeshError::DegenerateFace(uvs.len()));
        }
        let indices: Vec<usize> = uvs
            .iter()
            .map(|uv| self.add_vertex(uv.extend(0.0)))
            .collect();
        self.add_face(&indices)
    }

    /// Add the square outline of a UV tile as loose edges
    pub fn add_tile_border(&mut self, tile: UvTileCoord) -> Result<(), MeshError> {
        let center = tile.center();
        let corners: Vec<usize> = TILE_CORNERS
            .iter()
            .map(|&offset| self.add_vertex(center + offset))
            .collect();
        for (i, &a) in corners.iter().enumerate() {
            self.add_edge(a, corners[(i + 1) % corners.len()])?;
        }
        Ok(())
    }

    /// Every layout vertex, face corners and tile border corners alike
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Corner positions of every face, in loop order
    pub fn face_polygons(&self) -> impl Iterator<Item = Vec<DVec3>> + '_ {
        self.faces
            .iter()
            .map(|face| face.iter().map(|&i| self.vertices[i]).collect())
    }

    /// Endpoints of every edge
    pub fn edge_segments(&self) -> impl Iterator<Item = (DVec3, DVec3)> + '_ {
        self.edges
            .iter()
            .map(|&[a, b]| (self.vertices[a], self.vertices[b]))
    }

    fn check_vertex(&self, index: usize) -> Result<(), MeshError> {
        if index < self.vertices.len() {
            Ok(())
        } else {
            Err(MeshError::UnknownLayoutVertex(index))
        }
    }
}
