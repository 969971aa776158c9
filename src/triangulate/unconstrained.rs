//!
//! Unconstrained Bowyer-Watson Delaunay triangulation, used by the
//! [slicer](crate::slicer) to fill convex cut faces.
//!

use super::core::DelaunayCore;
use super::Triangulator;
use crate::bin_sort::{bin_sort, get_bin_number};
use crate::math::Vec2;

///
/// Triangulates a set of (assumed convex-hull-covering) 2D points with no
/// constraints. Fewer than 3 points yields an empty triangulation.
///
pub struct UnconstrainedTriangulator {
    core: DelaunayCore,
}

impl UnconstrainedTriangulator {
    /// Creates a triangulator over `points`, given in the caller's vertex numbering.
    pub fn new(points: Vec<Vec2>) -> Self {
        UnconstrainedTriangulator {
            core: DelaunayCore::new(points),
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
}

impl Triangulator for UnconstrainedTriangulator {
    fn triangulate(&mut self) -> Vec<usize> {
        if self.core.points.len() < 3 {
            return Vec::new();
        }
        let order = self.insertion_order();
        for idx in order {
            self.core.insert_point(idx);
        }
        let mut indices = Vec::new();
        for id in self.core.solid_triangle_ids() {
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

    #[test]
    fn test_convex_square_triangulates_to_two_triangles() {
        let points = vec![
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 1.0),
        ];
        let mut tri = UnconstrainedTriangulator::new(points);
        let indices = tri.triangulate();
        assert_eq!(indices.len(), 6);
        // Exactly two triangles, each using three of the four distinct input vertices.
        let mut used = std::collections::HashSet::new();
        for &i in &indices {
            used.insert(i);
        }
        assert_eq!(used.len(), 4);
    }

    #[test]
    fn test_fewer_than_three_points_yields_empty_result() {
        let mut tri = UnconstrainedTriangulator::new(vec![vec2(0.0, 0.0), vec2(1.0, 0.0)]);
        assert!(tri.triangulate().is_empty());
    }

    #[test]
    fn test_delaunay_property_on_random_convex_points() {
        use crate::rng::Lcg32;
        let mut rng = Lcg32::new(99);
        let n = 30;
        let mut points = Vec::with_capacity(n);
        for _ in 0..n {
            let angle = rng.next_f64_range(0.0, std::f64::consts::TAU);
            let r = rng.next_f64_range(0.1, 1.0);
            points.push(vec2(r * angle.cos(), r * angle.sin()));
        }
        let mut tri = UnconstrainedTriangulator::new(points.clone());
        let indices = tri.triangulate();
        assert!(!indices.is_empty());

        for tri_idx in indices.chunks(3) {
            let (a, b, c) = (points[tri_idx[0]], points[tri_idx[1]], points[tri_idx[2]]);
            for (k, p) in points.iter().enumerate() {
                if k == tri_idx[0] || k == tri_idx[1] || k == tri_idx[2] {
                    continue;
                }
                assert!(
                    !super::super::core::swap_test(a, b, c, *p)
                        && !super::super::core::swap_test(a, c, b, *p),
                    "point {:?} violates Delaunay property of triangle {:?}",
                    p,
                    (a, b, c)
                );
            }
        }
    }
}
