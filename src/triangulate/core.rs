//!
//! Shared Bowyer-Watson insertion core used by both the unconstrained and
//! constrained triangulators. Grounded on the conflict-map / adjacency-map
//! architecture of cavity-digging Delaunay implementations (directed edge
//! `(a, b) -> triangle id` adjacency, a vertex-position array, and a cavity
//! dug by recursively testing neighbor triangles' circumcircles) rather than
//! the walk-and-flip-stack phrasing; both are standard formulations of the
//! same Bowyer-Watson algorithm and produce the same Delaunay triangulation.
//!

use crate::math::{vec2, Vec2};
use std::collections::HashMap;

/// Corners of the super-triangle, chosen to enclose the `[0, 1]^2` normalised domain.
pub(crate) fn super_triangle() -> [Vec2; 3] {
    [vec2(-100.0, -100.0), vec2(0.0, 100.0), vec2(100.0, -100.0)]
}

/// Directed edge key into the adjacency map.
type EdgeKey = (usize, usize);

///
/// Incremental Delaunay triangulation core. Holds the (normalised) input
/// points plus the three super-triangle points appended after them, and the
/// current triangle set as CCW vertex triples keyed by an opaque triangle id.
///
#[derive(Debug)]
pub(crate) struct DelaunayCore {
    /// Input points, normalised into roughly `[0, 1]^2`. Does not include the super-triangle.
    pub points: Vec<Vec2>,
    /// `max(x-range, y-range)` of the input points before normalisation; 1.0 if degenerate.
    pub normalization_scale_factor: f64,
    /// Minimum corner of the input points' bounding box, used to undo normalisation.
    pub normalization_origin: Vec2,
    all_points: Vec<Vec2>,
    super_indices: [usize; 3],
    triangles: HashMap<usize, [usize; 3]>,
    adjacency: HashMap<EdgeKey, usize>,
    next_id: usize,
}

impl DelaunayCore {
    pub fn new(points: Vec<Vec2>) -> Self {
        let n = points.len();
        let (origin, scale) = normalization_params(&points);
        let normalized: Vec<Vec2> = points.iter().map(|p| (p - origin) / scale).collect();

        let mut all_points = normalized.clone();
        all_points.extend_from_slice(&super_triangle());
        let super_indices = [n, n + 1, n + 2];

        let mut core = DelaunayCore {
            points: normalized,
            normalization_scale_factor: scale,
            normalization_origin: origin,
            all_points,
            super_indices,
            triangles: HashMap::with_capacity(2 * n + 1),
            adjacency: HashMap::with_capacity(6 * n + 3),
            next_id: 0,
        };

        let [s0, s1, s2] = super_indices;
        if is_ccw(core.all_points[s0], core.all_points[s1], core.all_points[s2]) {
            core.add_triangle(s0, s1, s2);
        } else {
            core.add_triangle(s0, s2, s1);
        }
        core
    }

    pub fn point(&self, idx: usize) -> Vec2 {
        self.all_points[idx]
    }

    pub fn super_indices(&self) -> [usize; 3] {
        self.super_indices
    }

    pub fn triangle_ids(&self) -> Vec<usize> {
        self.triangles.keys().copied().collect()
    }

    pub fn triangle(&self, id: usize) -> [usize; 3] {
        self.triangles[&id]
    }

    pub fn adjacent_triangle(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency.get(&(a, b)).copied()
    }

    fn add_triangle(&mut self, a: usize, b: usize, c: usize) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.triangles.insert(id, [a, b, c]);
        self.adjacency.insert((a, b), id);
        self.adjacency.insert((b, c), id);
        self.adjacency.insert((c, a), id);
        id
    }

    fn remove_triangle(&mut self, id: usize) {
        if let Some([a, b, c]) = self.triangles.remove(&id) {
            self.adjacency.remove(&(a, b));
            self.adjacency.remove(&(b, c));
            self.adjacency.remove(&(c, a));
        }
    }

    fn in_circumcircle(&self, tri: [usize; 3], p: usize) -> bool {
        swap_test(
            self.all_points[tri[0]],
            self.all_points[tri[1]],
            self.all_points[tri[2]],
            self.all_points[p],
        )
    }

    ///
    /// Inserts point `p_idx` (an index into the combined point array) via
    /// cavity digging: locate one triangle whose circumcircle contains the
    /// point, remove it, then recursively test neighbours across the
    /// resulting cavity boundary, re-triangulating the cavity as a fan from
    /// the new point.
    ///
    pub fn insert_point(&mut self, p_idx: usize) {
        let start = self
            .triangles
            .iter()
            .find(|(_, &tri)| self.in_circumcircle(tri, p_idx))
            .map(|(&id, _)| id);

        let Some(start_id) = start else {
            return;
        };

        let [a, b, c] = self.triangles[&start_id];
        self.remove_triangle(start_id);

        let mut pending = vec![(a, b), (b, c), (c, a)];
        let mut guard = 0usize;
        let guard_limit = (self.triangles.len() + 16) * 64;

        while let Some((v_begin, v_end)) = pending.pop() {
            guard += 1;
            if guard > guard_limit {
                log::warn!("triangulation cavity digging exceeded iteration guard, aborting insertion of point {}", p_idx);
                break;
            }
            match self.adjacent_triangle(v_end, v_begin) {
                Some(outer_id) => {
                    let outer_tri = self.triangles[&outer_id];
                    if self.in_circumcircle(outer_tri, p_idx) {
                        self.remove_triangle(outer_id);
                        let third = other_vertex(outer_tri, v_end, v_begin);
                        pending.push((v_end, third));
                        pending.push((third, v_begin));
                    } else {
                        self.add_triangle(v_begin, v_end, p_idx);
                    }
                }
                None => {
                    self.add_triangle(v_begin, v_end, p_idx);
                }
            }
        }
    }

    /// Flips the diagonal of the quad formed by the two triangles sharing directed edge `(a, b)`.
    /// Returns the new diagonal `(c, d)` on success, or `None` if `(a, b)` has no twin.
    pub fn flip_edge(&mut self, a: usize, b: usize) -> Option<(usize, usize)> {
        let t1 = *self.adjacency.get(&(a, b))?;
        let t2 = *self.adjacency.get(&(b, a))?;
        let tri1 = self.triangles[&t1];
        let tri2 = self.triangles[&t2];
        let c = other_vertex(tri1, a, b);
        let d = other_vertex(tri2, b, a);

        self.remove_triangle(t1);
        self.remove_triangle(t2);
        self.add_triangle(a, c, d);
        self.add_triangle(c, b, d);
        Some((c, d))
    }

    /// Vertex of the triangle across edge `(a, b)` (the vertex not equal to `a` or `b`).
    pub fn third_vertex(&self, a: usize, b: usize) -> Option<usize> {
        let id = *self.adjacency.get(&(a, b))?;
        Some(other_vertex(self.triangles[&id], a, b))
    }

    /// Circumcircle (Delaunay) test exposed for the constrained triangulator's restoration pass.
    pub fn violates_delaunay(&self, a: usize, b: usize) -> bool {
        let (Some(t1), Some(t2)) = (
            self.adjacency.get(&(a, b)).copied(),
            self.adjacency.get(&(b, a)).copied(),
        ) else {
            return false;
        };
        let tri1 = self.triangles[&t1];
        let d = other_vertex(self.triangles[&t2], b, a);
        self.in_circumcircle(tri1, d)
    }

    /// All triangle ids that do not touch any of the three super-triangle vertices.
    pub fn solid_triangle_ids(&self) -> Vec<usize> {
        self.triangles
            .iter()
            .filter(|(_, tri)| !tri.iter().any(|v| self.super_indices.contains(v)))
            .map(|(&id, _)| id)
            .collect()
    }

    pub fn is_super_vertex(&self, v: usize) -> bool {
        self.super_indices.contains(&v)
    }
}

fn other_vertex(tri: [usize; 3], a: usize, b: usize) -> usize {
    tri.into_iter().find(|&v| v != a && v != b).unwrap()
}

fn is_ccw(a: Vec2, b: Vec2, c: Vec2) -> bool {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x) > 0.0
}

fn normalization_params(points: &[Vec2]) -> (Vec2, f64) {
    if points.is_empty() {
        return (vec2(0.0, 0.0), 1.0);
    }
    let mut min = vec2(f64::MAX, f64::MAX);
    let mut max = vec2(f64::MIN, f64::MIN);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let range_x = max.x - min.x;
    let range_y = max.y - min.y;
    let scale = range_x.max(range_y).max(1e-9);
    (min, scale)
}

///
/// Robust in-circumcircle test ("swap test"): true iff `p` lies strictly
/// inside the circumcircle of the CCW triangle `(a, b, c)`. Computed via the
/// standard determinant expansion in terms of `(a - p)`, `(b - p)`, `(c - p)`
/// dot/cross combinations, which is numerically steadier than the naive
/// circumcenter-and-radius formulation.
///
pub(crate) fn swap_test(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> bool {
    let ax = a.x - p.x;
    let ay = a.y - p.y;
    let bx = b.x - p.x;
    let by = b.y - p.y;
    let cx = c.x - p.x;
    let cy = c.y - p.y;

    let a2 = ax * ax + ay * ay;
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;

    let det = ax * (by * c2 - b2 * cy) - ay * (bx * c2 - b2 * cx) + a2 * (bx * cy - by * cx);
    det > 1e-12
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec2;

    #[test]
    fn test_swap_test_point_inside_unit_circle() {
        // Triangle inscribed roughly in the unit circle, CCW.
        let a = vec2(1.0, 0.0);
        let b = vec2(-0.5, 0.8660254);
        let c = vec2(-0.5, -0.8660254);
        assert!(swap_test(a, b, c, vec2(0.0, 0.0)));
        assert!(!swap_test(a, b, c, vec2(2.0, 2.0)));
    }

    #[test]
    fn test_insert_square_points_produces_two_triangles() {
        let mut core = DelaunayCore::new(vec![
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 1.0),
        ]);
        for i in 0..4 {
            core.insert_point(i);
        }
        let solid = core.solid_triangle_ids();
        assert_eq!(solid.len(), 2);
    }
}
