//! Snap selected mesh vertices onto a reference UV layout.
//!
//! Three strategies are provided:
//! - [`snap_to_closest_uv_vertex`] - nearest corner of the containing UV face,
//!   optionally pushed along the corner's bisector
//! - [`snap_to_uv_edge`] - first layout edge hit by a ray along an axis
//! - [`snap_to_closest_uv_edge`] - nearest point on any layout edge
//!
//! Every strategy computes all targets before touching the mesh. A vertex
//! with no usable target is left where it is and counted in the report.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{DEFAULT_RAY_LENGTH, SNAP_NUDGE_OFFSET};
use crate::geometry::{closest_point_on_segment, loop_index, point_in_polygon, segment_intersection};
use crate::mesh::{selection_positions, MeshError, MeshProvider, UvLayout, VertexId};

/// Axis-aligned ray direction for [`snap_to_uv_edge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapDirection {
    XPlus,
    XMinus,
    YPlus,
    YMinus,
}

impl SnapDirection {
    /// Unit vector in the layout plane
    pub fn unit(self) -> DVec3 {
        match self {
            SnapDirection::XPlus => DVec3::X,
            SnapDirection::XMinus => DVec3::NEG_X,
            SnapDirection::YPlus => DVec3::Y,
            SnapDirection::YMinus => DVec3::NEG_Y,
        }
    }
}

/// Outcome of a snapping pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapReport {
    /// Vertices moved onto a target
    pub snapped: usize,
    /// Vertices left untouched because no target was found
    pub not_found: usize,
}

/// Where one vertex goes in a closest-vertex snap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSnapTarget {
    pub vertex: VertexId,
    /// Matched layout corner, at the vertex's own height
    pub location: DVec3,
    /// Unit bisector pointing into the containing face, zero when the
    /// vertex fell back to the globally nearest layout vertex
    pub offset_direction: DVec3,
}

impl VertexSnapTarget {
    /// Final position for a given offset amount
    pub fn position(&self, offset_amount: f64) -> DVec3 {
        self.location + self.offset_direction * offset_amount
    }
}

/// Precomputed closest-vertex snap.
///
/// Finding targets walks every layout face, so the plan is kept and
/// re-applied when only the offset amount changes.
#[derive(Debug, Clone, Default)]
pub struct ClosestVertexSnap {
    targets: Vec<VertexSnapTarget>,
    not_found: usize,
}

impl ClosestVertexSnap {
    /// Find the target corner for every selected vertex
    pub fn plan<M: MeshProvider + ?Sized>(
        mesh: &M,
        selection: &[VertexId],
        layout: &UvLayout,
    ) -> Result<Self, MeshError> {
        let positions = selection_positions(mesh, selection)?;
        let polygons: Vec<Vec<DVec3>> = layout.face_polygons().collect();

        let mut plan = Self::default();
        for (&vertex, &position) in selection.iter().zip(&positions) {
            let target = closest_corner_in_containing_face(&polygons, position)
                .or_else(|| closest_layout_vertex(layout, position));

            match target {
                Some((location, offset_direction)) => plan.targets.push(VertexSnapTarget {
                    vertex,
                    location,
                    offset_direction,
                }),
                None => plan.not_found += 1,
            }
        }
        Ok(plan)
    }

    pub fn targets(&self) -> &[VertexSnapTarget] {
        &self.targets
    }

    /// Move every planned vertex to its corner plus `offset_amount` along
    /// the corner bisector
    pub fn apply<M: MeshProvider + ?Sized>(
        &self,
        mesh: &mut M,
        offset_amount: f64,
    ) -> Result<SnapReport, MeshError> {
        for target in &self.targets {
            mesh.set_world_position(target.vertex, target.position(offset_amount))?;
        }
        Ok(SnapReport {
            snapped: self.targets.len(),
            not_found: self.not_found,
        })
    }
}

/// Snap each selected vertex to the nearest corner of the UV face containing
/// it, offset by `offset_amount` along the corner bisector.
///
/// Vertices outside every face snap to the nearest layout vertex without
/// offset.
pub fn snap_to_closest_uv_vertex<M: MeshProvider + ?Sized>(
    mesh: &mut M,
    selection: &[VertexId],
    layout: &UvLayout,
    offset_amount: f64,
) -> Result<SnapReport, MeshError> {
    let plan = ClosestVertexSnap::plan(mesh, selection, layout)?;
    let report = plan.apply(mesh, offset_amount)?;
    debug!(
        "snap_to_closest_uv_vertex: {} snapped, {} without target (offset {})",
        report.snapped, report.not_found, offset_amount
    );
    Ok(report)
}

/// Snap each selected vertex along `direction` to the first layout edge a ray
/// of `ray_length` hits. Vertices whose ray hits nothing stay put.
pub fn snap_to_uv_edge<M: MeshProvider + ?Sized>(
    mesh: &mut M,
    selection: &[VertexId],
    layout: &UvLayout,
    direction: SnapDirection,
    ray_length: f64,
) -> Result<SnapReport, MeshError> {
    let positions = selection_positions(mesh, selection)?;
    let unit = direction.unit();

    let targets: Vec<Option<DVec3>> = positions
        .iter()
        .map(|&position| {
            let ray_start = position + unit * SNAP_NUDGE_OFFSET;
            let ray_end = position + unit * ray_length;

            layout
                .edge_segments()
                .filter_map(|(b0, b1)| segment_intersection(ray_start, ray_end, b0, b1))
                .map(|hit| (hit.distance(ray_start), hit))
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, hit)| hit.with_z(position.z))
        })
        .collect();

    let report = write_targets(mesh, selection, &targets)?;
    debug!(
        "snap_to_uv_edge {:?}: {} snapped, {} without hit",
        direction, report.snapped, report.not_found
    );
    Ok(report)
}

/// [`snap_to_uv_edge`] with the default ray length
pub fn snap_to_uv_edge_default<M: MeshProvider + ?Sized>(
    mesh: &mut M,
    selection: &[VertexId],
    layout: &UvLayout,
    direction: SnapDirection,
) -> Result<SnapReport, MeshError> {
    snap_to_uv_edge(mesh, selection, layout, direction, DEFAULT_RAY_LENGTH)
}

/// Snap each selected vertex to the nearest point on any layout edge.
/// Zero-length edges are ignored.
pub fn snap_to_closest_uv_edge<M: MeshProvider + ?Sized>(
    mesh: &mut M,
    selection: &[VertexId],
    layout: &UvLayout,
) -> Result<SnapReport, MeshError> {
    let positions = selection_positions(mesh, selection)?;

    let targets: Vec<Option<DVec3>> = positions
        .iter()
        .map(|&position| {
            layout
                .edge_segments()
                .filter(|(p0, p1)| p0.truncate() != p1.truncate())
                .map(|(p0, p1)| {
                    closest_point_on_segment(p0.with_z(position.z), p1.with_z(position.z), position)
                })
                .map(|point| (point.distance(position), point))
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, point)| point)
        })
        .collect();

    let report = write_targets(mesh, selection, &targets)?;
    debug!(
        "snap_to_closest_uv_edge: {} snapped, {} without edge",
        report.snapped, report.not_found
    );
    Ok(report)
}

/// Nearest corner among faces containing `position`, with its bisector
fn closest_corner_in_containing_face(
    polygons: &[Vec<DVec3>],
    position: DVec3,
) -> Option<(DVec3, DVec3)> {
    let mut best: Option<(f64, DVec3, DVec3)> = None;

    for polygon in polygons {
        if !point_in_polygon(polygon, position) {
            continue;
        }

        for (i, corner) in polygon.iter().enumerate() {
            let corner = corner.with_z(position.z);
            let distance = corner.distance(position);
            if best.is_none_or(|(min, _, _)| distance < min) {
                best = Some((distance, corner, corner_bisector(polygon, i)));
            }
        }
    }

    best.map(|(_, corner, direction)| (corner, direction))
}

/// Unit vector splitting the angle at corner `i`, pointing into the polygon
fn corner_bisector(polygon: &[DVec3], i: usize) -> DVec3 {
    let corner = polygon[i].with_z(0.0);
    let prev = polygon[loop_index(i as isize - 1, polygon.len())].with_z(0.0);
    let next = polygon[loop_index(i as isize + 1, polygon.len())].with_z(0.0);

    let to_prev = (prev - corner).normalize_or_zero();
    let to_next = (next - corner).normalize_or_zero();
    let direction = (to_prev + to_next).normalize_or_zero();

    if point_in_polygon(polygon, corner + direction * SNAP_NUDGE_OFFSET) {
        direction
    } else {
        -direction
    }
}

/// Globally nearest layout vertex, used when no face contains the point
fn closest_layout_vertex(layout: &UvLayout, position: DVec3) -> Option<(DVec3, DVec3)> {
    layout
        .vertices()
        .iter()
        .map(|v| v.with_z(position.z))
        .map(|v| (v.distance(position), v))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, v)| (v, DVec3::ZERO))
}

fn write_targets<M: MeshProvider + ?Sized>(
    mesh: &mut M,
    selection: &[VertexId],
    targets: &[Option<DVec3>],
) -> Result<SnapReport, MeshError> {
    let mut report = SnapReport::default();
    for (&vertex, target) in selection.iter().zip(targets) {
        match target {
            Some(position) => {
                mesh.set_world_position(vertex, *position)?;
                report.snapped += 1;
            }
            None => report.not_found += 1,
        }
    }
    Ok(report)
}
