//!
//! Coincident cut-vertex welding: after slicing, both sides of a cut often
//! emit independent cut vertices at the same position (one per originating
//! triangle); welding collapses them to single entries so the cut-face
//! triangulator and later component extraction see a single, closed loop
//! rather than a zipper of near-duplicates.
//!

use super::Fragment;
use crate::math::{hash3, Vec3, DEFAULT_TOLERANCE};
use std::collections::HashMap;

///
/// Welds coincident positions (under `tol`) into canonical entries, returning the deduplicated
/// positions alongside a remap from original index to canonical index. Shared by
/// [Fragment::weld_cut_face_vertices] and the [slicer](crate::slicer), which welds its
/// freshly-cut vertex positions before either fragment's `cut_vertices` is built.
///
pub(crate) fn weld_positions(positions: &[Vec3], tol: f64) -> (Vec<Vec3>, Vec<usize>) {
    let mut canonical: HashMap<i64, usize> = HashMap::new();
    let mut welded = Vec::new();
    let mut remap = Vec::with_capacity(positions.len());
    for &p in positions {
        let hash = hash3(p, tol);
        if let Some(&local) = canonical.get(&hash) {
            remap.push(local);
        } else {
            let local = welded.len();
            canonical.insert(hash, local);
            welded.push(p);
            remap.push(local);
        }
    }
    (welded, remap)
}

pub(super) fn weld_cut_face_vertices(fragment: &mut Fragment) {
    let base = fragment.vertices.len();
    let positions: Vec<Vec3> = fragment.cut_vertices.iter().map(|v| v.position).collect();
    let (welded_positions, local_remap) = weld_positions(&positions, DEFAULT_TOLERANCE);

    let mut welded_vertices = vec![None; welded_positions.len()];
    let mut welded_adjacency = vec![None; welded_positions.len()];
    for (i, &local) in local_remap.iter().enumerate() {
        welded_vertices[local].get_or_insert(fragment.cut_vertices[i]);
        welded_adjacency[local].get_or_insert(fragment.vertex_adjacency[i]);
    }
    let welded_vertices: Vec<_> = welded_vertices.into_iter().flatten().collect();
    let welded_adjacency: Vec<_> = welded_adjacency.into_iter().flatten().collect();
    let remap: Vec<usize> = local_remap.iter().map(|&l| base + l).collect();

    let old_cut_count = fragment.cut_vertices.len();
    fragment.cut_vertices = welded_vertices;
    fragment.vertex_adjacency = welded_adjacency;

    let remap_index = |idx: usize| -> usize {
        if idx < base {
            idx
        } else {
            remap[idx - base]
        }
    };

    for submesh in fragment.triangles.iter_mut() {
        for idx in submesh.iter_mut() {
            *idx = remap_index(*idx);
        }
    }

    let mut kept_constraints = Vec::with_capacity(fragment.constraints.len());
    for mut c in fragment.constraints.drain(..) {
        c.v1 = remap_index(base + c.v1) - base;
        c.v2 = remap_index(base + c.v2) - base;
        if c.v1 != c.v2 {
            kept_constraints.push(c);
        } else {
            log::debug!(
                "weld_cut_face_vertices: dropping degenerate constraint after welding {} cut vertices down to {}",
                old_cut_count,
                fragment.cut_vertices.len()
            );
        }
    }
    fragment.constraints = kept_constraints;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{EdgeConstraint, MeshVertex};
    use crate::math::{vec2, vec3};

    fn cv(p: cgmath::Vector3<f64>) -> MeshVertex {
        MeshVertex::new(p, vec3(0.0, 0.0, 1.0), vec2(0.0, 0.0))
    }

    #[test]
    fn test_weld_collapses_coincident_cut_vertices() {
        let mut fragment = Fragment::from_surface(vec![], vec![]);
        // Two coincident pairs: (0,1) at origin, (2,3) at (1,0,0).
        fragment.push_cut_vertex(cv(vec3(0.0, 0.0, 0.0)), None);
        fragment.push_cut_vertex(cv(vec3(1.0, 0.0, 0.0)), None);
        fragment.push_cut_vertex(cv(vec3(0.0, 0.0, 0.0)), None);
        fragment.push_cut_vertex(cv(vec3(1.0, 0.0, 0.0)), None);
        fragment.add_mapped_triangle(1, 0, 1, 2);
        fragment.constraints.push(EdgeConstraint::new(0, 2));
        fragment.constraints.push(EdgeConstraint::new(1, 3));

        fragment.weld_cut_face_vertices();

        assert_eq!(fragment.cut_vertices.len(), 2);
        // The degenerate constraint (0 welds with 2, so edge (0,2) collapses) is dropped;
        // the (1,3) edge also collapses onto the same vertex pair and is dropped too.
        assert!(fragment.constraints.is_empty());
    }

    #[test]
    fn test_weld_preserves_distinct_vertices() {
        let mut fragment = Fragment::from_surface(vec![], vec![]);
        fragment.push_cut_vertex(cv(vec3(0.0, 0.0, 0.0)), None);
        fragment.push_cut_vertex(cv(vec3(5.0, 0.0, 0.0)), None);
        fragment.weld_cut_face_vertices();
        assert_eq!(fragment.cut_vertices.len(), 2);
    }
}
