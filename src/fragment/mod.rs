//!
//! The mesh representation the slicer, triangulators and component
//! extractor all operate on: a [Fragment] of surface geometry plus a
//! separate, freshly-triangulated cut-face submesh, joined by an edge
//! constraint list and a positional adjacency table.
//!

mod components;
mod weld;

pub use components::extract_connected_components;
pub(crate) use weld::weld_positions;

use crate::math::{hash3, Box3, Vec2, Vec3, DEFAULT_TOLERANCE};
use std::collections::HashMap;

///
/// A single mesh vertex. Equality (and therefore identity, for welding and
/// component extraction) is defined purely by the hashed position under
/// [DEFAULT_TOLERANCE] — normals and UVs never participate.
///
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshVertex {
    /// Position in the fragment's local space.
    pub position: Vec3,
    /// Unit normal.
    pub normal: Vec3,
    /// Texture coordinate.
    pub uv: Vec2,
}

impl MeshVertex {
    /// Creates a new vertex.
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        MeshVertex { position, normal, uv }
    }

    /// Positional hash used for identity, welding and component extraction.
    pub fn position_hash(&self) -> i64 {
        hash3(self.position, DEFAULT_TOLERANCE)
    }

    /// Linearly interpolates two vertices' normal and uv at parameter `s` (position is
    /// supplied separately by the caller, since it comes from an exact plane intersection
    /// rather than a naive lerp).
    pub fn interpolated(a: &MeshVertex, b: &MeshVertex, position: Vec3, s: f64) -> MeshVertex {
        MeshVertex {
            position,
            normal: (a.normal * (1.0 - s) + b.normal * s),
            uv: a.uv * (1.0 - s) + b.uv * s,
        }
    }
}

impl PartialEq for MeshVertex {
    fn eq(&self, other: &Self) -> bool {
        self.position_hash() == other.position_hash()
    }
}

///
/// A required edge in a cut-face triangulation, over [Fragment::cut_vertices]
/// indices. Directed (`v1 -> v2`) for the slicer's orientation bookkeeping,
/// but equality is undirected, as the constrained triangulator only cares
/// about presence of the edge, not its direction, when resolving swaps.
///
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeConstraint {
    /// First endpoint (into `cut_vertices`).
    pub v1: usize,
    /// Second endpoint (into `cut_vertices`).
    pub v2: usize,
    /// Scratch: id of one adjacent triangle, used during constrained triangulation.
    pub t1: Option<usize>,
    /// Scratch: id of the other adjacent triangle.
    pub t2: Option<usize>,
    /// Scratch: which edge slot of `t1` this constraint occupies.
    pub t1_edge: Option<usize>,
}

impl EdgeConstraint {
    /// Creates a directed constraint with no triangulation scratch filled in.
    pub fn new(v1: usize, v2: usize) -> Self {
        EdgeConstraint {
            v1,
            v2,
            t1: None,
            t2: None,
            t1_edge: None,
        }
    }
}

impl PartialEq for EdgeConstraint {
    fn eq(&self, other: &Self) -> bool {
        (self.v1 == other.v1 && self.v2 == other.v2) || (self.v1 == other.v2 && self.v2 == other.v1)
    }
}

///
/// A mesh specialised for slicing: separate surface (`triangles[0]`) and
/// cut-face (`triangles[1]`) submeshes over a shared, unified vertex index
/// space (`vertices` first, then `cut_vertices`), plus the bookkeeping the
/// slicer and triangulators need (edge constraints, vertex adjacency,
/// scratch index map).
///
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Fragment {
    /// Non-cut surface vertices.
    pub vertices: Vec<MeshVertex>,
    /// Cut-face vertices; in the unified index space these start at `vertices.len()`.
    pub cut_vertices: Vec<MeshVertex>,
    /// For each `cut_vertices[i]`, the index (into `vertices`) of a coincident
    /// non-cut vertex at the same position, if one exists.
    pub vertex_adjacency: Vec<Option<usize>>,
    /// `triangles[0]` = surface submesh, `triangles[1]` = cut-face submesh. Indices are
    /// into the unified space.
    pub triangles: [Vec<usize>; 2],
    /// Cut-face edge constraints driving the constrained triangulator.
    pub constraints: Vec<EdgeConstraint>,
    /// Scratch: source-fragment unified index -> this-fragment unified index, used by the slicer.
    #[cfg_attr(feature = "serialize", serde(skip))]
    pub index_map: HashMap<usize, usize>,
}

impl Fragment {
    /// Builds a Fragment containing all of `triangles` over `vertices`, with an empty cut face.
    pub fn from_surface(vertices: Vec<MeshVertex>, triangles: Vec<usize>) -> Self {
        Fragment {
            vertices,
            cut_vertices: Vec::new(),
            vertex_adjacency: Vec::new(),
            triangles: [triangles, Vec::new()],
            constraints: Vec::new(),
            index_map: HashMap::new(),
        }
    }

    /// Total size of the unified vertex index space.
    pub fn unified_vertex_count(&self) -> usize {
        self.vertices.len() + self.cut_vertices.len()
    }

    /// Resolves a unified index into a vertex reference.
    pub fn vertex(&self, unified_index: usize) -> &MeshVertex {
        if unified_index < self.vertices.len() {
            &self.vertices[unified_index]
        } else {
            &self.cut_vertices[unified_index - self.vertices.len()]
        }
    }

    /// True iff `unified_index` refers into `cut_vertices` rather than `vertices`.
    pub fn is_cut_index(&self, unified_index: usize) -> bool {
        unified_index >= self.vertices.len()
    }

    /// Appends `vertex` to `vertices`, returning its new unified index.
    pub fn push_vertex(&mut self, vertex: MeshVertex) -> usize {
        self.vertices.push(vertex);
        self.vertices.len() - 1
    }

    /// Appends `vertex` to `cut_vertices` (optionally recording adjacency to a non-cut
    /// vertex at the same position), returning its new unified index.
    pub fn push_cut_vertex(&mut self, vertex: MeshVertex, adjacency: Option<usize>) -> usize {
        self.cut_vertices.push(vertex);
        self.vertex_adjacency.push(adjacency);
        self.vertices.len() + self.cut_vertices.len() - 1
    }

    /// Appends a triangle of three unified indices to submesh `submesh` (0 = surface, 1 = cut face).
    pub fn add_mapped_triangle(&mut self, submesh: usize, a: usize, b: usize, c: usize) {
        self.triangles[submesh].push(a);
        self.triangles[submesh].push(b);
        self.triangles[submesh].push(c);
    }

    /// Axis-aligned bounding box of `vertices`, recomputed from scratch on every call.
    pub fn bounds(&self) -> Box3 {
        Box3::from_points(self.vertices.iter().map(|v| v.position))
    }

    /// Total triangle count across both submeshes.
    pub fn triangle_count(&self) -> usize {
        self.triangles[0].len() / 3 + self.triangles[1].len() / 3
    }

    ///
    /// Welds coincident `cut_vertices` (under [DEFAULT_TOLERANCE]) into single entries,
    /// remapping `constraints` and `triangles[1]` accordingly, and dropping any constraint
    /// whose endpoints collapsed onto the same vertex.
    ///
    pub fn weld_cut_face_vertices(&mut self) {
        weld::weld_cut_face_vertices(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{vec2, vec3};

    fn v(p: Vec3) -> MeshVertex {
        MeshVertex::new(p, vec3(0.0, 1.0, 0.0), vec2(0.0, 0.0))
    }

    #[test]
    fn test_vertex_equality_ignores_normal_and_uv() {
        let a = MeshVertex::new(vec3(1.0, 2.0, 3.0), vec3(0.0, 1.0, 0.0), vec2(0.0, 0.0));
        let b = MeshVertex::new(vec3(1.0, 2.0, 3.0), vec3(1.0, 0.0, 0.0), vec2(1.0, 1.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_edge_constraint_equality_is_undirected() {
        assert_eq!(EdgeConstraint::new(3, 5), EdgeConstraint::new(5, 3));
        assert_ne!(EdgeConstraint::new(3, 5), EdgeConstraint::new(3, 6));
    }

    #[test]
    fn test_unified_vertex_space_and_is_cut_index() {
        let mut frag = Fragment::from_surface(
            vec![v(vec3(0.0, 0.0, 0.0)), v(vec3(1.0, 0.0, 0.0))],
            vec![],
        );
        let cut_idx = frag.push_cut_vertex(v(vec3(2.0, 0.0, 0.0)), Some(0));
        assert_eq!(cut_idx, 2);
        assert!(frag.is_cut_index(cut_idx));
        assert!(!frag.is_cut_index(0));
        assert_eq!(frag.unified_vertex_count(), 3);
    }

    #[test]
    fn test_bounds_recomputed_from_vertices() {
        let frag = Fragment::from_surface(
            vec![v(vec3(-1.0, -2.0, -3.0)), v(vec3(4.0, 5.0, 6.0))],
            vec![],
        );
        let b = frag.bounds();
        assert_eq!(b.min, vec3(-1.0, -2.0, -3.0));
        assert_eq!(b.max, vec3(4.0, 5.0, 6.0));
    }
}
