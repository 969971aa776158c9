//!
//! Splits a [Fragment] that may have become topologically disconnected
//! (typically the non-convex half of a slice) into one Fragment per
//! connected component, using [UnionFind] over positional hashes,
//! cut/non-cut vertex adjacency, and triangle adjacency.
//!

use super::{EdgeConstraint, Fragment, MeshVertex};
use crate::union_find::UnionFind;
use std::collections::HashMap;

///
/// Splits `fragment` into its connected components. A fragment with a single
/// component returns a one-element vec containing an equivalent (but
/// reindexed) copy.
///
pub fn extract_connected_components(fragment: &Fragment) -> Vec<Fragment> {
    let vertex_count = fragment.vertices.len();
    let total = fragment.unified_vertex_count();
    let mut uf = UnionFind::new(total);

    let mut by_hash: HashMap<i64, usize> = HashMap::new();
    for i in 0..vertex_count {
        let hash = fragment.vertices[i].position_hash();
        if let Some(&first) = by_hash.get(&hash) {
            uf.union(first, i);
        } else {
            by_hash.insert(hash, i);
        }
    }

    for (i, adj) in fragment.vertex_adjacency.iter().enumerate() {
        if let Some(non_cut) = adj {
            // `union_preferring` keeps the lower, non-cut index as root, per the
            // component extractor's reliance on roots always indexing `vertices`.
            uf.union_preferring(*non_cut, vertex_count + i);
        }
    }

    for submesh in fragment.triangles.iter() {
        for tri in submesh.chunks(3) {
            if tri.len() < 3 {
                continue;
            }
            uf.union(tri[0], tri[1]);
            uf.union(tri[1], tri[2]);
        }
    }

    let mut roots: Vec<usize> = Vec::new();
    let mut root_slot: HashMap<usize, usize> = HashMap::new();
    let mut out: Vec<Fragment> = Vec::new();
    let mut index_map: HashMap<usize, usize> = HashMap::new();

    let root_of = |uf: &mut UnionFind, i: usize| uf.find(i);

    for i in 0..total {
        let root = root_of(&mut uf, i);
        let slot = *root_slot.entry(root).or_insert_with(|| {
            roots.push(root);
            out.push(Fragment::from_surface(Vec::new(), Vec::new()));
            out.len() - 1
        });
        let vertex = *fragment.vertex(i);
        let new_index = if i < vertex_count {
            out[slot].push_vertex(vertex)
        } else {
            let adj = fragment.vertex_adjacency[i - vertex_count].map(|old_nc| {
                *index_map
                    .get(&old_nc)
                    .expect("non-cut adjacency vertex must be assigned before its cut vertex shares its root")
            });
            out[slot].push_cut_vertex(vertex, adj)
        };
        index_map.insert(i, new_index);
    }

    for (submesh_idx, submesh) in fragment.triangles.iter().enumerate() {
        for tri in submesh.chunks(3) {
            if tri.len() < 3 {
                continue;
            }
            let root = root_of(&mut uf, tri[0]);
            let slot = root_slot[&root];
            out[slot].add_mapped_triangle(
                submesh_idx,
                index_map[&tri[0]],
                index_map[&tri[1]],
                index_map[&tri[2]],
            );
        }
    }

    for c in &fragment.constraints {
        let u1 = vertex_count + c.v1;
        let u2 = vertex_count + c.v2;
        let root1 = root_of(&mut uf, u1);
        let root2 = root_of(&mut uf, u2);
        if root1 != root2 {
            log::debug!("connected-component extraction split a constraint edge across components");
            continue;
        }
        let slot = root_slot[&root1];
        let base = out[slot].vertices.len();
        let new_v1 = index_map[&u1] - base;
        let new_v2 = index_map[&u2] - base;
        out[slot]
            .constraints
            .push(EdgeConstraint::new(new_v1, new_v2));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{vec2, vec3};

    fn v(p: cgmath::Vector3<f64>) -> MeshVertex {
        MeshVertex::new(p, vec3(0.0, 0.0, 1.0), vec2(0.0, 0.0))
    }

    #[test]
    fn test_two_disjoint_triangles_split_into_two_components() {
        let vertices = vec![
            v(vec3(0.0, 0.0, 0.0)),
            v(vec3(1.0, 0.0, 0.0)),
            v(vec3(0.0, 1.0, 0.0)),
            v(vec3(10.0, 0.0, 0.0)),
            v(vec3(11.0, 0.0, 0.0)),
            v(vec3(10.0, 1.0, 0.0)),
        ];
        let triangles = vec![0, 1, 2, 3, 4, 5];
        let fragment = Fragment::from_surface(vertices, triangles);
        let components = extract_connected_components(&fragment);
        assert_eq!(components.len(), 2);
        for c in &components {
            assert_eq!(c.vertices.len(), 3);
            assert_eq!(c.triangles[0].len(), 3);
        }
    }

    #[test]
    fn test_single_connected_mesh_stays_one_component() {
        let vertices = vec![
            v(vec3(0.0, 0.0, 0.0)),
            v(vec3(1.0, 0.0, 0.0)),
            v(vec3(1.0, 1.0, 0.0)),
            v(vec3(0.0, 1.0, 0.0)),
        ];
        let triangles = vec![0, 1, 2, 0, 2, 3];
        let fragment = Fragment::from_surface(vertices, triangles);
        let components = extract_connected_components(&fragment);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].vertices.len(), 4);
    }

    #[test]
    fn test_cut_vertex_adjacency_stitches_components_together() {
        // Two disjoint surface triangles, joined only via vertex_adjacency through a
        // cut vertex coincident with a vertex of each.
        let mut fragment = Fragment::from_surface(
            vec![
                v(vec3(0.0, 0.0, 0.0)),
                v(vec3(1.0, 0.0, 0.0)),
                v(vec3(0.0, 1.0, 0.0)),
                v(vec3(10.0, 0.0, 0.0)),
                v(vec3(11.0, 0.0, 0.0)),
                v(vec3(10.0, 1.0, 0.0)),
            ],
            vec![0, 1, 2, 3, 4, 5],
        );
        // A cut-face triangle spans the two islands; vertex_adjacency ties its corners
        // back to vertex 0 (island A) and vertex 3 (island B).
        let cv0 = fragment.push_cut_vertex(v(vec3(0.0, 0.0, 0.0)), Some(0));
        let cv1 = fragment.push_cut_vertex(v(vec3(10.0, 0.0, 0.0)), Some(3));
        let cv2 = fragment.push_cut_vertex(v(vec3(5.0, 5.0, 0.0)), None);
        fragment.add_mapped_triangle(1, cv0, cv1, cv2);
        let components = extract_connected_components(&fragment);
        assert_eq!(components.len(), 1);
    }
}
