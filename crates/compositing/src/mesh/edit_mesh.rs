//! Simple editable mesh with an object-to-world transform.

use std::collections::HashSet;

use glam::{DAffine3, DVec3};

use super::{MeshError, MeshProvider, VertexId};

/// Determinant magnitude below which an object transform is rejected
const SINGULAR_EPSILON: f64 = 1e-12;

/// Vertex positions in object space plus an undirected edge graph.
#[derive(Debug, Clone)]
pub struct EditMesh {
    positions: Vec<DVec3>,
    adjacency: Vec<Vec<VertexId>>,
    edges: HashSet<(VertexId, VertexId)>,
    transform: DAffine3,
    inverse: DAffine3,
}

impl Default for EditMesh {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            adjacency: Vec::new(),
            edges: HashSet::new(),
            transform: DAffine3::IDENTITY,
            inverse: DAffine3::IDENTITY,
        }
    }
}

impl EditMesh {
    /// Create an empty mesh with an identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from object-space positions and vertex-index edges
    pub fn from_edges(
        positions: impl IntoIterator<Item = DVec3>,
        edges: impl IntoIterator<Item = (u32, u32)>,
    ) -> Result<Self, MeshError> {
        let mut mesh = Self::new();
        for position in positions {
            mesh.add_vertex(position);
        }
        for (a, b) in edges {
            mesh.add_edge(VertexId(a), VertexId(b))?;
        }
        Ok(mesh)
    }

    /// Set the object-to-world transform
    pub fn set_transform(&mut self, transform: DAffine3) -> Result<(), MeshError> {
        if transform.matrix3.determinant().abs() < SINGULAR_EPSILON {
            return Err(MeshError::SingularTransform);
        }
        self.transform = transform;
        self.inverse = transform.inverse();
        Ok(())
    }

    /// Object-to-world transform
    pub fn transform(&self) -> DAffine3 {
        self.transform
    }

    /// Add a vertex at an object-space position
    pub fn add_vertex(&mut self, position: DVec3) -> VertexId {
        let id = VertexId(self.positions.len() as u32);
        self.positions.push(position);
        self.adjacency.push(Vec::new());
        id
    }

    /// Connect two vertices. Adding an existing edge again is a no-op.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<(), MeshError> {
        self.check_vertex(a)?;
        self.check_vertex(b)?;
        if a == b {
            return Err(MeshError::SelfLoop(a));
        }

        let key = if a < b { (a, b) } else { (b, a) };
        if self.edges.insert(key) {
            self.adjacency[a.0 as usize].push(b);
            self.adjacency[b.0 as usize].push(a);
        }
        Ok(())
    }

    /// Connect a closed loop of vertices, as the boundary of a face
    pub fn add_face(&mut self, vertices: &[VertexId]) -> Result<(), MeshError> {
        if vertices.len() < 3 {
            return Err(MeshError::DegenerateFace(vertices.len()));
        }
        for (i, &a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            self.add_edge(a, b)?;
        }
        Ok(())
    }

    /// Object-space position of a vertex
    pub fn local_position(&self, vertex: VertexId) -> Option<DVec3> {
        self.positions.get(vertex.0 as usize).copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn check_vertex(&self, vertex: VertexId) -> Result<(), MeshError> {
        if (vertex.0 as usize) < self.positions.len() {
            Ok(())
        } else {
            Err(MeshError::UnknownVertex(vertex))
        }
    }
}

impl MeshProvider for EditMesh {
    fn world_position(&self, vertex: VertexId) -> Option<DVec3> {
        self.local_position(vertex)
            .map(|p| self.transform.transform_point3(p))
    }

    fn set_world_position(&mut self, vertex: VertexId, position: DVec3) -> Result<(), MeshError> {
        let local = self.inverse.transform_point3(position);
        let slot = self
            .positions
            .get_mut(vertex.0 as usize)
            .ok_or(MeshError::UnknownVertex(vertex))?;
        *slot = local;
        Ok(())
    }

    fn neighbors(&self, vertex: VertexId) -> Vec<VertexId> {
        self.adjacency
            .get(vertex.0 as usize)
            .cloned()
            .unwrap_or_default()
    }
}
