//! Mesh access for snapping and alignment.
//!
//! The core never owns the user's mesh. It reads and writes world-space
//! vertex positions through [`MeshProvider`] and reads connectivity to
//! rebuild vertex chains. [`EditMesh`] is a plain implementation used by
//! hosts without their own mesh type, and [`UvLayout`] is the flattened
//! reference geometry vertices are snapped onto.

mod edit_mesh;
mod uv_layout;

use glam::DVec3;

pub use edit_mesh::EditMesh;
pub use uv_layout::UvLayout;

/// Type-safe vertex identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub u32);

/// Errors raised when addressing mesh elements
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("Unknown vertex {0:?}")]
    UnknownVertex(VertexId),
    #[error("Edge connects vertex {0:?} to itself")]
    SelfLoop(VertexId),
    #[error("Face needs at least 3 vertices, got {0}")]
    DegenerateFace(usize),
    #[error("Layout vertex index {0} out of range")]
    UnknownLayoutVertex(usize),
    #[error("Layout edge connects vertex {0} to itself")]
    LayoutSelfLoop(usize),
    #[error("Object transform is not invertible")]
    SingularTransform,
}

/// Access to the vertex positions and edge graph of an editable mesh.
///
/// Positions are exchanged in world space so that snapping can compare them
/// against the UV layout directly.
pub trait MeshProvider {
    /// World-space position of a vertex, `None` if the vertex does not exist
    fn world_position(&self, vertex: VertexId) -> Option<DVec3>;

    /// Move a vertex to a world-space position
    fn set_world_position(&mut self, vertex: VertexId, position: DVec3) -> Result<(), MeshError>;

    /// Vertices sharing an edge with `vertex`
    fn neighbors(&self, vertex: VertexId) -> Vec<VertexId>;
}

/// Read the world positions of every vertex in `selection`.
///
/// Fails on the first unknown vertex so callers can reject a selection
/// before mutating anything.
pub fn selection_positions<M: MeshProvider + ?Sized>(
    mesh: &M,
    selection: &[VertexId],
) -> Result<Vec<DVec3>, MeshError> {
    selection
        .iter()
        .map(|&vertex| {
            mesh.world_position(vertex)
                .ok_or(MeshError::UnknownVertex(vertex))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_positions() {
        let mut mesh = EditMesh::new();
        let a = mesh.add_vertex(DVec3::new(1.0, 2.0, 3.0));
        let b = mesh.add_vertex(DVec3::new(4.0, 5.0, 6.0));

        let positions = selection_positions(&mesh, &[b, a]).unwrap();
        assert_eq!(positions, vec![DVec3::new(4.0, 5.0, 6.0), DVec3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_selection_positions_unknown_vertex() {
        let mesh = EditMesh::new();
        assert_eq!(
            selection_positions(&mesh, &[VertexId(7)]),
            Err(MeshError::UnknownVertex(VertexId(7)))
        );
    }
}
