//!
//! Computational geometry for cut-face re-triangulation: an unconstrained
//! Delaunay triangulator for convex cut faces and a constrained variant
//! (edge constraints + flood-fill boundary resolution) for non-convex cut
//! faces with holes. Both share the cavity-digging Bowyer-Watson core in
//! [core] and the [Triangulator] trait below.
//!

mod core;
pub mod constrained;
pub mod unconstrained;

pub use constrained::ConstrainedTriangulator;
pub use unconstrained::UnconstrainedTriangulator;

use crate::math::{vec2, Vec2, Vec3};

///
/// Common surface shared by [UnconstrainedTriangulator] and
/// [ConstrainedTriangulator]: triangulate, and inspect the projected points
/// and the scale factor used to normalise them (needed by callers that want
/// to reconstruct UV coordinates from the 2D triangulation plane).
///
pub trait Triangulator {
    /// Runs the triangulation and returns a flat triangle index list (caller's
    /// original point numbering, three indices per triangle).
    fn triangulate(&mut self) -> Vec<usize>;

    /// The (pre-normalisation) 2D points being triangulated, in caller order.
    fn points(&self) -> &[Vec2];

    /// `max(x-range, y-range)` of [Triangulator::points], used to undo the
    /// internal `[0, 1]^2` normalisation when deriving UVs from triangulation
    /// coordinates.
    fn normalization_scale_factor(&self) -> f64;
}

///
/// Projects 3D points assumed coplanar (with unit normal `normal`) onto that
/// plane, returning 2D coordinates plus the basis vectors used, so that
/// callers can go back and forth between the triangulation plane and 3D.
///
/// The basis is `e1` (from the first two distinct input points), `e2 =
/// normal`, `e3 = e1 x e2`; a point is projected to `(p . e1, p . e3)`.
///
pub fn project_to_plane(points: &[Vec3], normal: Vec3) -> Vec<Vec2> {
    use cgmath::InnerSpace;

    let e2 = normal.normalize();
    let mut e1 = Vec3::new(1.0, 0.0, 0.0);
    for i in 1..points.len() {
        let d = points[i] - points[0];
        if d.magnitude2() > 1e-12 {
            let candidate = d - e2 * e2.dot(d);
            if candidate.magnitude2() > 1e-12 {
                e1 = candidate.normalize();
                break;
            }
        }
    }
    let e3 = e1.cross(e2);

    points.iter().map(|p| vec2(p.dot(e1), p.dot(e3))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec3;
    use cgmath::InnerSpace;

    #[test]
    fn test_project_to_plane_preserves_planar_distances() {
        let normal = vec3(0.0, 0.0, 1.0);
        let points = vec![
            vec3(0.0, 0.0, 1.0),
            vec3(1.0, 0.0, 1.0),
            vec3(1.0, 1.0, 1.0),
            vec3(0.0, 1.0, 1.0),
        ];
        let projected = project_to_plane(&points, normal);
        assert_eq!(projected.len(), 4);
        let d01 = (projected[1] - projected[0]).magnitude();
        assert!((d01 - 1.0).abs() < 1e-9);
    }
}
