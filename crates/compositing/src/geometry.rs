//! Planar geometry predicates used for UV snapping.
//!
//! All functions work in the XY plane. The z component only carries the plane
//! height through a computation and is never compared.

use glam::DVec3;

/// Determinant magnitude below which two segments are treated as parallel
const PARALLEL_EPSILON: f64 = 1e-12;

/// Wrap an index (possibly negative) into `0..len`.
///
/// Returns `index` unchanged when `len` is zero.
pub fn loop_index(index: isize, len: usize) -> usize {
    if len == 0 {
        return index.max(0) as usize;
    }
    index.rem_euclid(len as isize) as usize
}

/// Signed area of the parallelogram spanned by `p0->p1` and `p0->p2`.
///
/// Positive when `p2` lies to the left of the directed line `p0->p1`.
#[inline]
pub fn orientation(p0: DVec3, p1: DVec3, p2: DVec3) -> f64 {
    (p1.x - p0.x) * (p2.y - p0.y) - (p1.y - p0.y) * (p2.x - p0.x)
}

/// Nonzero winding-number containment test.
///
/// Uses a half-open scanline: an upward edge counts when
/// `cur.y <= p.y < next.y`, a downward edge when `cur.y > p.y >= next.y`, and
/// only if `p.x` is strictly left of the edge's intercept. Horizontal edges
/// never count. Consequently points on a left or bottom boundary are inside
/// and points on a right or top boundary are outside.
pub fn point_in_polygon(polygon: &[DVec3], point: DVec3) -> bool {
    let mut winding = 0i32;

    for (i, &current) in polygon.iter().enumerate() {
        let next = polygon[loop_index(i as isize + 1, polygon.len())];

        if current.y <= point.y && next.y > point.y {
            if point.x < scanline_intercept(current, next, point.y) {
                winding += 1;
            }
        } else if current.y > point.y && next.y <= point.y {
            if point.x < scanline_intercept(current, next, point.y) {
                winding -= 1;
            }
        }
    }

    winding != 0
}

#[inline]
fn scanline_intercept(a: DVec3, b: DVec3, y: f64) -> f64 {
    let t = (y - a.y) / (b.y - a.y);
    a.x + t * (b.x - a.x)
}

/// Intersection point of segments `a0-a1` and `b0-b1`.
///
/// Returns `None` when the segments do not straddle each other or are
/// parallel (including collinear overlap). The returned point lies on
/// segment `a` and keeps `a0.z`.
pub fn segment_intersection(a0: DVec3, a1: DVec3, b0: DVec3, b1: DVec3) -> Option<DVec3> {
    let side_b0 = orientation(a0, a1, b0);
    let side_b1 = orientation(a0, a1, b1);
    let side_a0 = orientation(b0, b1, a0);
    let side_a1 = orientation(b0, b1, a1);
    if side_b0 * side_b1 > 0.0 || side_a0 * side_a1 > 0.0 {
        return None;
    }

    let det = (a0.x - a1.x) * (b1.y - b0.y) - (b1.x - b0.x) * (a0.y - a1.y);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    // Weight of a0; 1 at a0, 0 at a1
    let t = ((b1.y - b0.y) * (b1.x - a1.x) + (b0.x - b1.x) * (b1.y - a1.y)) / det;

    Some(DVec3::new(
        t * a0.x + (1.0 - t) * a1.x,
        t * a0.y + (1.0 - t) * a1.y,
        a0.z,
    ))
}

/// Closest point to `p` on segment `p0-p1`.
///
/// Points projecting before `p0` clamp to `p0`, past `p1` clamp to `p1`.
/// The segment must have non-zero length.
pub fn closest_point_on_segment(p0: DVec3, p1: DVec3, p: DVec3) -> DVec3 {
    let to_point = p - p0;
    let along = p1 - p0;

    if to_point.dot(along) < 0.0 {
        p0
    } else if (p0 - p1).dot(p - p1) < 0.0 {
        p1
    } else {
        p0 + along * (to_point.dot(along) / along.length_squared())
    }
}
