//!
//! Constrained Delaunay triangulation: runs the unconstrained Bowyer-Watson
//! pass, then enforces a set of required edges (crossing-edge walk + swap,
//! Delaunay restoration respecting the constraints), then discards triangles
//! outside the constrained region via directed-boundary-edge flood fill.
//! Used by the [slicer](crate::slicer) to fill non-convex cut faces,
//! including faces with holes.
//!

use super::core::DelaunayCore;
use super::Triangulator;
use crate::bin_sort::{bin_sort, get_bin_number};
use crate::fragment::EdgeConstraint;
use crate::math::{lines_intersect, Vec2};
use std::collections::{HashSet, VecDeque};

/// Safety bound on the number of iterations any inner constraint-enforcement
/// loop may take before giving up and leaving the constraint unresolved.
const ITERATION_LIMIT: usize = 10_000;

///
/// Triangulates `points` subject to `constraints`: every constraint edge is
/// guaranteed to appear in the output (unless enforcement exceeds its
/// iteration budget, in which case it is dropped and a warning is logged),
/// and triangles outside the boundary traced by the constraints are
/// discarded. Handles holes when the outer boundary is wound CCW and hole
/// boundaries CW, per the constraints' own winding.
///
pub struct ConstrainedTriangulator {
    core: DelaunayCore,
    constraints: Vec<EdgeConstraint>,
}

impl ConstrainedTriangulator {
    /// Creates a triangulator over `points` (caller's vertex numbering) with the given constraints.
    pub fn new(points: Vec<Vec2>, constraints: Vec<EdgeConstraint>) -> Self {
        ConstrainedTriangulator {
            core: DelaunayCore::new(points),
            constraints,
        }
    }

    fn insertion_order(&self) -> Vec<usize> {
        let n = self.core.points.len();
        let grid = (n as f64).sqrt().ceil().max(1.0) as usize;
        let bins: Vec<usize> = (0..n)
            .map(|i| {
                let p = self.core.point(i);
                let bx = ((p.x * grid as f64) as isize).clamp(0, grid as isize - 1) as usize;
                let by = ((p.y * grid as f64) as isize).clamp(0, grid as isize - 1) as usize;
                get_bin_number(by, bx, grid)
            })
            .collect();
        bin_sort(&bins, grid * grid, n)
    }

    /// Walks from a triangle incident to `v1` to one incident to `v2`, collecting the
    /// undirected edges that the segment `v1 -> v2` crosses. Returns an empty vec if the
    /// edge is already present (no crossing needed) or if no crossing could be located.
    fn find_crossing_edges(&self, v1: usize, v2: usize) -> Vec<(usize, usize)> {
        if self.core.adjacent_triangle(v1, v2).is_some()
            || self.core.adjacent_triangle(v2, v1).is_some()
        {
            return Vec::new();
        }
        let p1 = self.core.point(v1);
        let p2 = self.core.point(v2);

        let mut start_edge = None;
        for id in self.core.triangle_ids() {
            let tri = self.core.triangle(id);
            if let Some(pos) = tri.iter().position(|&v| v == v1) {
                let opp = (tri[(pos + 1) % 3], tri[(pos + 2) % 3]);
                if lines_intersect(p1, p2, self.core.point(opp.0), self.core.point(opp.1), false) {
                    start_edge = Some(opp);
                    break;
                }
            }
        }
        let Some(mut edge) = start_edge else {
            return Vec::new();
        };

        let mut crossed = Vec::new();
        let mut guard = 0;
        loop {
            crossed.push(edge);
            guard += 1;
            if guard > ITERATION_LIMIT {
                log::warn!(
                    "constrained triangulation: crossing-edge walk for ({}, {}) exceeded iteration limit",
                    v1,
                    v2
                );
                break;
            }
            let Some(third) = self.core.third_vertex(edge.1, edge.0) else {
                break;
            };
            if third == v2 {
                break;
            }
            let e1 = (edge.0, third);
            if lines_intersect(p1, p2, self.core.point(e1.0), self.core.point(e1.1), false) {
                edge = e1;
            } else {
                edge = (third, edge.1);
            }
        }
        crossed
    }

    /// Enforces a single constraint edge, following the spec's swap-away then
    /// Delaunay-restore sequence.
    fn enforce_constraint(&mut self, v1: usize, v2: usize) {
        let mut queue: VecDeque<(usize, usize)> = self.find_crossing_edges(v1, v2).into();
        if queue.is_empty() {
            return;
        }

        let mut new_edges = Vec::new();
        let mut stall_guard = 0usize;
        let mut since_last_progress = 0usize;

        while let Some((a, b)) = queue.pop_front() {
            stall_guard += 1;
            if stall_guard > ITERATION_LIMIT {
                log::warn!(
                    "constrained triangulation: swap-away for ({}, {}) exceeded iteration limit, constraint left unresolved",
                    v1,
                    v2
                );
                break;
            }
            let (Some(c), Some(d)) = (self.core.third_vertex(a, b), self.core.third_vertex(b, a))
            else {
                continue;
            };
            let quad_is_convex = lines_intersect(
                self.core.point(a),
                self.core.point(b),
                self.core.point(c),
                self.core.point(d),
                true,
            );
            if !quad_is_convex {
                queue.push_back((a, b));
                since_last_progress += 1;
                if since_last_progress > queue.len() + 1 {
                    log::warn!(
                        "constrained triangulation: no convex quad found to swap for ({}, {}), aborting",
                        v1,
                        v2
                    );
                    break;
                }
                continue;
            }
            since_last_progress = 0;
            if let Some((nc, nd)) = self.core.flip_edge(a, b) {
                let still_crosses = lines_intersect(
                    self.core.point(v1),
                    self.core.point(v2),
                    self.core.point(nc),
                    self.core.point(nd),
                    false,
                );
                if still_crosses {
                    queue.push_back((nc, nd));
                } else {
                    new_edges.push((nc, nd));
                }
            }
        }

        self.restore_delaunay(&new_edges, v1, v2);
    }

    /// Flips any non-constraint edge among `new_edges` that fails the circumcircle test,
    /// repeating until a full pass makes no swaps (or the iteration budget is exhausted).
    fn restore_delaunay(&mut self, new_edges: &[(usize, usize)], cv1: usize, cv2: usize) {
        let mut edges: Vec<(usize, usize)> = new_edges.to_vec();
        let mut iterations = 0usize;
        loop {
            iterations += 1;
            if iterations > ITERATION_LIMIT {
                log::warn!("constrained triangulation: Delaunay restoration did not converge");
                break;
            }
            let mut swapped_any = false;
            for i in 0..edges.len() {
                let (a, b) = edges[i];
                if (a == cv1 && b == cv2) || (a == cv2 && b == cv1) {
                    continue;
                }
                if self.core.violates_delaunay(a, b) {
                    if let Some(new_edge) = self.core.flip_edge(a, b) {
                        edges[i] = new_edge;
                        swapped_any = true;
                    }
                }
            }
            if !swapped_any {
                break;
            }
        }
    }

    /// Discards triangles outside the region bounded by the constraints via directed-edge flood fill.
    fn resolve_boundary(&self) -> Vec<usize> {
        if self.constraints.is_empty() {
            return self.core.solid_triangle_ids();
        }
        let forward: HashSet<(usize, usize)> =
            self.constraints.iter().map(|c| (c.v1, c.v2)).collect();

        let mut visited: HashSet<usize> = HashSet::new();
        let mut keep: HashSet<usize> = HashSet::new();
        let all_ids = self.core.triangle_ids();

        for &tid in &all_ids {
            if visited.contains(&tid) {
                continue;
            }
            let tri = self.core.triangle(tid);
            let edges = [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])];
            let is_forward = edges.iter().any(|e| forward.contains(e));
            let is_reverse = edges
                .iter()
                .any(|e| forward.contains(&(e.1, e.0)));
            if is_forward {
                self.flood_keep(tid, &forward, &mut visited, &mut keep);
            } else if is_reverse {
                visited.insert(tid);
            }
        }

        keep.into_iter()
            .filter(|&id| {
                let tri = self.core.triangle(id);
                !tri.iter().any(|&v| self.core.is_super_vertex(v))
            })
            .collect()
    }

    fn flood_keep(
        &self,
        start: usize,
        forward: &HashSet<(usize, usize)>,
        visited: &mut HashSet<usize>,
        keep: &mut HashSet<usize>,
    ) {
        let mut stack = vec![start];
        while let Some(tid) = stack.pop() {
            if !visited.insert(tid) {
                continue;
            }
            keep.insert(tid);
            let tri = self.core.triangle(tid);
            let edges = [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])];
            for &(x, y) in &edges {
                if forward.contains(&(x, y)) || forward.contains(&(y, x)) {
                    continue;
                }
                if let Some(neighbor) = self.core.adjacent_triangle(y, x) {
                    if !visited.contains(&neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
        }
    }
}

impl Triangulator for ConstrainedTriangulator {
    fn triangulate(&mut self) -> Vec<usize> {
        if self.core.points.len() < 3 {
            return Vec::new();
        }
        for idx in self.insertion_order() {
            self.core.insert_point(idx);
        }

        let constraints = self.constraints.clone();
        for c in &constraints {
            self.enforce_constraint(c.v1, c.v2);
        }

        let mut indices = Vec::new();
        for id in self.resolve_boundary() {
            indices.extend_from_slice(&self.core.triangle(id));
        }
        indices
    }

    fn points(&self) -> &[Vec2] {
        &self.core.points
    }

    fn normalization_scale_factor(&self) -> f64 {
        self.core.normalization_scale_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec2;
    use std::f64::consts::PI;

    fn octagon(radius: f64) -> Vec<Vec2> {
        (0..8)
            .map(|i| {
                let a = i as f64 / 8.0 * 2.0 * PI;
                vec2(radius * a.cos(), radius * a.sin())
            })
            .collect()
    }

    fn ring_constraints(offset: usize, n: usize, reverse: bool) -> Vec<EdgeConstraint> {
        (0..n)
            .map(|i| {
                let (a, b) = if reverse {
                    ((i + 1) % n, i)
                } else {
                    (i, (i + 1) % n)
                };
                EdgeConstraint::new(offset + a, offset + b)
            })
            .collect()
    }

    #[test]
    fn test_annular_region_excludes_inner_octagon() {
        let mut outer = octagon(2.0);
        let inner = octagon(1.0);
        outer.extend(inner);

        let mut constraints = ring_constraints(0, 8, false);
        constraints.extend(ring_constraints(8, 8, true));

        let mut tri = ConstrainedTriangulator::new(outer, constraints);
        let indices = tri.triangulate();
        assert!(!indices.is_empty());

        for chunk in indices.chunks(3) {
            let centroid = (tri.points()[chunk[0]] + tri.points()[chunk[1]] + tri.points()[chunk[2]])
                / 3.0;
            let r = (centroid.x * centroid.x + centroid.y * centroid.y).sqrt();
            assert!(r < 2.2, "triangle centroid {:?} outside outer radius", centroid);
            assert!(r > 0.9, "triangle centroid {:?} inside inner octagon hole", centroid);
        }
    }

    #[test]
    fn test_constraint_edge_present_in_output() {
        let points = vec![
            vec2(0.0, 0.0),
            vec2(2.0, 0.0),
            vec2(2.0, 2.0),
            vec2(0.0, 2.0),
            vec2(1.0, 0.2),
        ];
        let constraints = vec![EdgeConstraint::new(0, 2)];
        let mut tri = ConstrainedTriangulator::new(points, constraints);
        let indices = tri.triangulate();
        let mut found = false;
        for chunk in indices.chunks(3) {
            let set: HashSet<usize> = chunk.iter().copied().collect();
            if set.contains(&0) && set.contains(&2) {
                found = true;
            }
        }
        assert!(found, "constraint edge (0, 2) missing from output triangles");
    }
}
