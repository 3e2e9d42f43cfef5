//! Straighten an open path of selected vertices.
//!
//! The selection carries no order, so the path is rebuilt from the edges
//! between selected vertices: the two degree-1 vertices are the endpoints
//! and every other vertex must have exactly two selected neighbours. The
//! interior vertices are then placed at even fractions along the straight
//! line between the endpoints.

use std::collections::HashMap;
use std::fmt;

use glam::DVec3;
use tracing::{debug, warn};

use crate::mesh::{MeshError, MeshProvider, VertexId};

/// Why a selection is not a simple open path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainDefect {
    /// Fewer than two distinct vertices selected
    TooFewVertices(usize),
    /// A selected vertex has no selected neighbour
    Isolated(VertexId),
    /// A selected vertex has three or more selected neighbours
    Branching(VertexId),
    /// The path must have exactly two endpoints
    EndpointCount(usize),
    /// Walking from one endpoint did not reach every selected vertex
    Disconnected { reached: usize, selected: usize },
}

impl fmt::Display for ChainDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainDefect::TooFewVertices(n) => write!(f, "{n} vertices selected, need at least 2"),
            ChainDefect::Isolated(v) => write!(f, "vertex {v:?} has no selected neighbour"),
            ChainDefect::Branching(v) => write!(f, "vertex {v:?} branches"),
            ChainDefect::EndpointCount(n) => write!(f, "{n} endpoints, expected 2"),
            ChainDefect::Disconnected { reached, selected } => {
                write!(f, "only {reached} of {selected} vertices are connected")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlignError {
    #[error("Selection is not a simple vertex path: {0}")]
    SelectionInvalid(ChainDefect),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// A selected vertex and its selected neighbours, as indices into the node list
#[derive(Debug, Clone)]
struct VertexChainNode {
    vertex: VertexId,
    neighbors: Vec<usize>,
    visited: bool,
}

/// Order the selected vertices from one endpoint of the path to the other.
///
/// Edges to unselected vertices are ignored. Fails unless the selection forms
/// a single open path without branches.
pub fn order_vertex_chain<M: MeshProvider + ?Sized>(
    mesh: &M,
    selection: &[VertexId],
) -> Result<Vec<VertexId>, AlignError> {
    let mut index_of: HashMap<VertexId, usize> = HashMap::with_capacity(selection.len());
    let mut nodes: Vec<VertexChainNode> = Vec::with_capacity(selection.len());
    for &vertex in selection {
        if mesh.world_position(vertex).is_none() {
            return Err(MeshError::UnknownVertex(vertex).into());
        }
        if index_of.contains_key(&vertex) {
            continue;
        }
        index_of.insert(vertex, nodes.len());
        nodes.push(VertexChainNode {
            vertex,
            neighbors: Vec::new(),
            visited: false,
        });
    }

    if nodes.len() < 2 {
        return Err(AlignError::SelectionInvalid(ChainDefect::TooFewVertices(
            nodes.len(),
        )));
    }

    for node in &mut nodes {
        for neighbor in mesh.neighbors(node.vertex) {
            if let Some(&i) = index_of.get(&neighbor) {
                if !node.neighbors.contains(&i) {
                    node.neighbors.push(i);
                }
            }
        }
    }

    let mut endpoints = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        match node.neighbors.len() {
            0 => return Err(AlignError::SelectionInvalid(ChainDefect::Isolated(node.vertex))),
            1 => endpoints.push(i),
            2 => {}
            _ => return Err(AlignError::SelectionInvalid(ChainDefect::Branching(node.vertex))),
        }
    }
    if endpoints.len() != 2 {
        return Err(AlignError::SelectionInvalid(ChainDefect::EndpointCount(
            endpoints.len(),
        )));
    }

    let mut current = endpoints[0];
    nodes[current].visited = true;
    let mut ordered = vec![nodes[current].vertex];
    loop {
        let next = nodes[current]
            .neighbors
            .iter()
            .copied()
            .find(|&n| !nodes[n].visited);
        let Some(next) = next else {
            break;
        };
        nodes[next].visited = true;
        ordered.push(nodes[next].vertex);
        current = next;
    }

    if ordered.len() != nodes.len() {
        return Err(AlignError::SelectionInvalid(ChainDefect::Disconnected {
            reached: ordered.len(),
            selected: nodes.len(),
        }));
    }

    Ok(ordered)
}

/// Place the interior vertices of a selected path evenly on the straight
/// line between its endpoints.
///
/// Endpoints keep their positions. Returns the path in visiting order. On
/// error the mesh is left untouched.
pub fn align_vertex_chain<M: MeshProvider + ?Sized>(
    mesh: &mut M,
    selection: &[VertexId],
) -> Result<Vec<VertexId>, AlignError> {
    let ordered = match order_vertex_chain(mesh, selection) {
        Ok(ordered) => ordered,
        Err(err) => {
            warn!("align_vertex_chain: {}", err);
            return Err(err);
        }
    };

    let first = ordered[0];
    let last = ordered[ordered.len() - 1];
    let start = mesh
        .world_position(first)
        .ok_or(MeshError::UnknownVertex(first))?;
    let end = mesh
        .world_position(last)
        .ok_or(MeshError::UnknownVertex(last))?;

    let segments = (ordered.len() - 1) as f64;
    let targets: Vec<(VertexId, DVec3)> = ordered
        .iter()
        .enumerate()
        .skip(1)
        .take(ordered.len() - 2)
        .map(|(i, &vertex)| (vertex, start.lerp(end, i as f64 / segments)))
        .collect();

    for &(vertex, position) in &targets {
        mesh.set_world_position(vertex, position)?;
    }

    debug!(
        "align_vertex_chain: {} vertices between {:?} and {:?}",
        ordered.len(),
        first,
        last
    );
    Ok(ordered)
}
