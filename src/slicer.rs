//!
//! Splits a [Fragment] by an oriented plane into a `top` (on the side `n`
//! points toward) and `bottom` Fragment, interpolating vertex attributes
//! across crossed triangle edges, recording cut-face edge constraints, and
//! delegating the new cut face's fill to the [unconstrained](crate::triangulate::unconstrained)
//! or [constrained](crate::triangulate::constrained) triangulator.
//!

use crate::fragment::{weld_positions, EdgeConstraint, Fragment, MeshVertex};
use crate::math::{is_point_above_plane, line_plane_intersection, vec2, Vec2, Vec3, DEFAULT_TOLERANCE};
use crate::triangulate::{project_to_plane, ConstrainedTriangulator, Triangulator, UnconstrainedTriangulator};

/// Records a surface/cut-face triangle produced by a crossing, deferred until the shared
/// cut-vertex pool has been welded and the final per-side unified indices are known.
struct PendingSplit {
    submesh: usize,
    majority_is_top: bool,
    a1: usize,
    a2: usize,
    a3: usize,
    raw13: usize,
    raw23: usize,
}

///
/// Slices `fragment` by the plane through `plane_origin` with unit normal `plane_normal`
/// (pointing toward the returned `top` fragment). `texture_scale`/`texture_offset` control
/// the UV mapping applied to newly created cut-face vertices; `convex` selects the
/// unconstrained (convex cut face) or constrained (non-convex, possibly holed) triangulator
/// for filling the cut face.
///
pub fn slice(
    fragment: &Fragment,
    plane_normal: Vec3,
    plane_origin: Vec3,
    texture_scale: Vec2,
    texture_offset: Vec2,
    convex: bool,
) -> (Fragment, Fragment) {
    let n = plane_normal;
    let o = plane_origin;
    let vertex_count = fragment.vertices.len();
    let total = fragment.unified_vertex_count();

    let side: Vec<bool> = (0..total)
        .map(|i| is_point_above_plane(fragment.vertex(i).position, n, o))
        .collect();

    let mut top = Fragment::default();
    let mut bottom = Fragment::default();

    for i in 0..total {
        let vertex = *fragment.vertex(i);
        let target = if side[i] { &mut top } else { &mut bottom };
        let new_index = if i < vertex_count {
            target.push_vertex(vertex)
        } else {
            let adjacency = fragment.vertex_adjacency[i - vertex_count]
                .and_then(|old_nc| target.index_map.get(&old_nc).copied());
            target.push_cut_vertex(vertex, adjacency)
        };
        target.index_map.insert(i, new_index);
    }

    let mut shared_cut_positions: Vec<Vec3> = Vec::new();
    let mut shared_constraints: Vec<EdgeConstraint> = Vec::new();
    let mut pending: Vec<PendingSplit> = Vec::new();

    for submesh in 0..2 {
        for tri in fragment.triangles[submesh].chunks(3) {
            if tri.len() < 3 {
                continue;
            }
            let (ia, ib, ic) = (tri[0], tri[1], tri[2]);
            let (sa, sb, sc) = (side[ia], side[ib], side[ic]);

            if sa == sb && sb == sc {
                let target = if sa { &mut top } else { &mut bottom };
                target.add_mapped_triangle(
                    submesh,
                    target.index_map[&ia],
                    target.index_map[&ib],
                    target.index_map[&ic],
                );
                continue;
            }

            // Exactly one vertex differs from the other two: rotate so it lands last,
            // preserving the triangle's original (CCW) winding.
            let off = if sb == sc {
                0
            } else if sa == sc {
                1
            } else {
                2
            };
            let rotated = [tri[(off + 1) % 3], tri[(off + 2) % 3], tri[off]];
            let (v1, v2, v3) = (rotated[0], rotated[1], rotated[2]);
            let majority_is_top = side[v1];

            let p1 = fragment.vertex(v1).position;
            let p2 = fragment.vertex(v2).position;
            let p3 = fragment.vertex(v3).position;
            let Some((pos13, _s13)) = line_plane_intersection(p1, p3, n, o) else {
                log::warn!("slicer: degenerate edge/plane intersection, skipping crossing triangle");
                continue;
            };
            let Some((pos23, _s23)) = line_plane_intersection(p2, p3, n, o) else {
                log::warn!("slicer: degenerate edge/plane intersection, skipping crossing triangle");
                continue;
            };

            let raw13 = shared_cut_positions.len();
            shared_cut_positions.push(pos13);
            let raw23 = shared_cut_positions.len();
            shared_cut_positions.push(pos23);

            if majority_is_top {
                shared_constraints.push(EdgeConstraint::new(raw13, raw23));
            } else {
                shared_constraints.push(EdgeConstraint::new(raw23, raw13));
            }

            let (maj, min) = if majority_is_top {
                (&top, &bottom)
            } else {
                (&bottom, &top)
            };
            let a1 = maj.index_map[&v1];
            let a2 = maj.index_map[&v2];
            let a3 = min.index_map[&v3];

            pending.push(PendingSplit {
                submesh,
                majority_is_top,
                a1,
                a2,
                a3,
                raw13,
                raw23,
            });
        }
    }

    let (welded_positions, remap) = weld_positions(&shared_cut_positions, DEFAULT_TOLERANCE);

    let mut top_constraints = Vec::new();
    for c in &shared_constraints {
        let v1 = remap[c.v1];
        let v2 = remap[c.v2];
        if v1 != v2 {
            top_constraints.push(EdgeConstraint::new(v1, v2));
        }
    }

    let can_fill = welded_positions.len() >= 3;
    let mut uvs = vec![vec2(0.0, 0.0); welded_positions.len()];
    let mut fill_indices = Vec::new();

    if can_fill {
        let points2d = project_to_plane(&welded_positions, n);
        let (indices, scale, points) = if convex {
            let mut tri = UnconstrainedTriangulator::new(points2d);
            let indices = tri.triangulate();
            let scale = tri.normalization_scale_factor();
            (indices, scale, tri.points().to_vec())
        } else {
            let mut tri = ConstrainedTriangulator::new(points2d, top_constraints.clone());
            let indices = tri.triangulate();
            let scale = tri.normalization_scale_factor();
            (indices, scale, tri.points().to_vec())
        };
        if indices.is_empty() {
            log::warn!("slicer: cut-face triangulation produced no triangles, leaving cut face unfilled");
        } else {
            for (i, p) in points.iter().enumerate() {
                uvs[i] = vec2(
                    p.x * texture_scale.x * scale + texture_offset.x,
                    p.y * texture_scale.y * scale + texture_offset.y,
                );
            }
        }
        fill_indices = indices;
    }

    let mut unified_top = Vec::with_capacity(welded_positions.len());
    let mut unified_bottom = Vec::with_capacity(welded_positions.len());
    for (i, &pos) in welded_positions.iter().enumerate() {
        let top_vertex = MeshVertex::new(pos, -n, uvs[i]);
        let bottom_vertex = MeshVertex::new(pos, n, uvs[i]);
        unified_top.push(top.push_cut_vertex(top_vertex, None));
        unified_bottom.push(bottom.push_cut_vertex(bottom_vertex, None));
    }

    for p in &pending {
        let w13 = remap[p.raw13];
        let w23 = remap[p.raw23];
        if p.majority_is_top {
            let (c13, c23) = (unified_top[w13], unified_top[w23]);
            top.add_mapped_triangle(p.submesh, c23, c13, p.a2);
            top.add_mapped_triangle(p.submesh, c13, p.a1, p.a2);
            let (c13b, c23b) = (unified_bottom[w13], unified_bottom[w23]);
            bottom.add_mapped_triangle(p.submesh, p.a3, c13b, c23b);
        } else {
            let (c13, c23) = (unified_bottom[w13], unified_bottom[w23]);
            bottom.add_mapped_triangle(p.submesh, c23, c13, p.a2);
            bottom.add_mapped_triangle(p.submesh, c13, p.a1, p.a2);
            let (c13t, c23t) = (unified_top[w13], unified_top[w23]);
            top.add_mapped_triangle(p.submesh, p.a3, c13t, c23t);
        }
    }

    for tri in fill_indices.chunks(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        top.add_mapped_triangle(1, unified_top[a], unified_top[b], unified_top[c]);
        bottom.add_mapped_triangle(1, unified_bottom[a], unified_bottom[c], unified_bottom[b]);
    }

    top.index_map.clear();
    bottom.index_map.clear();

    (top, bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec3;
    use cgmath::InnerSpace;

    fn cube_vertex(p: Vec3) -> MeshVertex {
        MeshVertex::new(p, vec3(0.0, 0.0, 1.0), vec2(0.0, 0.0))
    }

    fn unit_cube() -> Fragment {
        let positions = [
            vec3(-0.5, -0.5, -0.5),
            vec3(0.5, -0.5, -0.5),
            vec3(0.5, 0.5, -0.5),
            vec3(-0.5, 0.5, -0.5),
            vec3(-0.5, -0.5, 0.5),
            vec3(0.5, -0.5, 0.5),
            vec3(0.5, 0.5, 0.5),
            vec3(-0.5, 0.5, 0.5),
        ];
        let vertices: Vec<MeshVertex> = positions.iter().map(|&p| cube_vertex(p)).collect();
        #[rustfmt::skip]
        let triangles = vec![
            0, 1, 2, 0, 2, 3, // bottom (z = -0.5)
            4, 6, 5, 4, 7, 6, // top (z = 0.5)
            0, 4, 5, 0, 5, 1, // y = -0.5
            3, 2, 6, 3, 6, 7, // y = 0.5
            0, 3, 7, 0, 7, 4, // x = -0.5
            1, 5, 6, 1, 6, 2, // x = 0.5
        ];
        Fragment::from_surface(vertices, triangles)
    }

    #[test]
    fn test_coplanar_vertex_slice_keeps_all_on_one_side() {
        let vertices = vec![
            cube_vertex(vec3(0.0, 0.0, 0.0)),
            cube_vertex(vec3(1.0, 0.0, 0.0)),
            cube_vertex(vec3(0.0, 0.0, 1.0)),
        ];
        let fragment = Fragment::from_surface(vertices, vec![0, 1, 2]);
        let (top, bottom) = slice(
            &fragment,
            vec3(0.0, 1.0, 0.0),
            vec3(0.0, 0.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 0.0),
            true,
        );
        assert_eq!(top.vertices.len(), 3);
        assert_eq!(top.triangles[0].len(), 3);
        assert!(bottom.vertices.is_empty());
        assert!(bottom.triangles[0].is_empty());
    }

    #[test]
    fn test_unit_cube_convex_slice_along_y_zero() {
        let cube = unit_cube();
        let (top, bottom) = slice(
            &cube,
            vec3(0.0, 1.0, 0.0),
            vec3(0.0, 0.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 0.0),
            true,
        );
        let top_surface_tris = top.triangles[0].len() / 3;
        let bottom_surface_tris = bottom.triangles[0].len() / 3;
        assert!((10..=14).contains(&top_surface_tris), "got {}", top_surface_tris);
        assert!((10..=14).contains(&bottom_surface_tris), "got {}", bottom_surface_tris);
        assert_eq!(top.triangles[1].len() / 3, 2);
        assert_eq!(bottom.triangles[1].len() / 3, 2);
        assert_eq!(top.cut_vertices.len(), 4);
        assert_eq!(bottom.cut_vertices.len(), 4);
        for v in &top.cut_vertices {
            assert!((v.position.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cut_face_mirror_symmetry() {
        let cube = unit_cube();
        let (top, bottom) = slice(
            &cube,
            vec3(0.0, 1.0, 0.0),
            vec3(0.0, 0.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 0.0),
            true,
        );
        assert_eq!(top.cut_vertices.len(), bottom.cut_vertices.len());
        for (a, b) in top.cut_vertices.iter().zip(bottom.cut_vertices.iter()) {
            assert!((a.position - b.position).magnitude() < 1e-9);
            assert!((a.normal + b.normal).magnitude() < 1e-9);
            assert!((a.uv - b.uv).magnitude() < 1e-9);
        }
    }

    #[test]
    fn test_degenerate_zero_normal_keeps_everything_on_top() {
        let cube = unit_cube();
        let (top, bottom) = slice(
            &cube,
            vec3(0.0, 0.0, 0.0),
            vec3(0.0, 0.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 0.0),
            true,
        );
        assert_eq!(top.vertices.len(), 8);
        assert!(bottom.vertices.is_empty());
    }
}
