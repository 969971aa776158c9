//!
//! The host exchange boundary (§4.11, elaborating §6): flat per-vertex
//! buffers in, flat buffers plus material-group ranges out. Grounded on the
//! donor's split between a raw buffer-shaped input (`mesh_builder`) and a
//! traversal-shaped output (`io`) — here collapsed to a pair of free
//! functions on [Fragment] plus the option structs the two public entry
//! points take, since this crate has no scene graph, material or physics
//! types of its own to adapt (those stay host-side).
//!

use crate::error::{FractureError, FractureResult};
use crate::fragment::{Fragment, MeshVertex};
use crate::math::{vec2, vec3, Vec2, Vec3};
use std::ops::Range;

///
/// Flat host mesh buffers: `positions`/`normals` are 3 floats per vertex,
/// `uvs` 2 floats per vertex, `indices` a flat triangle list (length a
/// multiple of 3).
///
#[derive(Debug, Clone, Default)]
pub struct MeshIn {
    /// Per-vertex positions, 3 floats each.
    pub positions: Vec<f32>,
    /// Per-vertex normals, 3 floats each.
    pub normals: Vec<f32>,
    /// Per-vertex texture coordinates, 2 floats each.
    pub uvs: Vec<f32>,
    /// Flat triangle index list.
    pub indices: Vec<u32>,
}

///
/// One output fragment: flat buffers in the same layout as [MeshIn], plus
/// the two material index ranges described in §6 — `surface_range` covers
/// the host's surface material, `cut_face_range` the freshly cut material,
/// both as half-open ranges into `indices`.
///
#[derive(Debug, Clone, Default)]
pub struct MeshOut {
    /// Per-vertex positions, 3 floats each.
    pub positions: Vec<f32>,
    /// Per-vertex normals, 3 floats each.
    pub normals: Vec<f32>,
    /// Per-vertex texture coordinates, 2 floats each.
    pub uvs: Vec<f32>,
    /// Flat triangle index list; `surface_range` followed by `cut_face_range`.
    pub indices: Vec<u32>,
    /// Index range using the host's surface material.
    pub surface_range: Range<usize>,
    /// Index range using the cut-face material.
    pub cut_face_range: Range<usize>,
}

impl Fragment {
    ///
    /// Builds a Fragment from flat host buffers. Fails with
    /// [FractureError::InvalidInput] if any buffer is empty, the attribute
    /// buffers' lengths are inconsistent with one another, or `indices`'
    /// length is not a multiple of 3.
    ///
    pub fn from_buffers(
        positions: &[f32],
        normals: &[f32],
        uvs: &[f32],
        indices: &[u32],
    ) -> FractureResult<Fragment> {
        if positions.is_empty() || indices.is_empty() {
            return Err(FractureError::InvalidInput(
                "mesh has no vertices or no indices".to_string(),
            ));
        }
        if positions.len() % 3 != 0 {
            return Err(FractureError::InvalidInput(
                "positions length is not a multiple of 3".to_string(),
            ));
        }
        let vertex_count = positions.len() / 3;
        if normals.len() != vertex_count * 3 {
            return Err(FractureError::InvalidInput(format!(
                "normals length {} does not match {} vertices",
                normals.len(),
                vertex_count
            )));
        }
        if uvs.len() != vertex_count * 2 {
            return Err(FractureError::InvalidInput(format!(
                "uvs length {} does not match {} vertices",
                uvs.len(),
                vertex_count
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(FractureError::InvalidInput(
                "index count is not a multiple of 3".to_string(),
            ));
        }

        let mut vertices = Vec::with_capacity(vertex_count);
        for i in 0..vertex_count {
            let position = vec3(
                positions[3 * i] as f64,
                positions[3 * i + 1] as f64,
                positions[3 * i + 2] as f64,
            );
            let normal = vec3(
                normals[3 * i] as f64,
                normals[3 * i + 1] as f64,
                normals[3 * i + 2] as f64,
            );
            let uv = vec2(uvs[2 * i] as f64, uvs[2 * i + 1] as f64);
            vertices.push(MeshVertex::new(position, normal, uv));
        }
        let triangles = indices.iter().map(|&i| i as usize).collect();
        Ok(Fragment::from_surface(vertices, triangles))
    }

    /// Flattens this Fragment into host buffers, per [MeshOut]'s layout.
    pub fn to_buffers(&self) -> MeshOut {
        let total = self.unified_vertex_count();
        let mut positions = Vec::with_capacity(total * 3);
        let mut normals = Vec::with_capacity(total * 3);
        let mut uvs = Vec::with_capacity(total * 2);
        for i in 0..total {
            let v = self.vertex(i);
            positions.push(v.position.x as f32);
            positions.push(v.position.y as f32);
            positions.push(v.position.z as f32);
            normals.push(v.normal.x as f32);
            normals.push(v.normal.y as f32);
            normals.push(v.normal.z as f32);
            uvs.push(v.uv.x as f32);
            uvs.push(v.uv.y as f32);
        }

        let surface_len = self.triangles[0].len();
        let mut indices = Vec::with_capacity(surface_len + self.triangles[1].len());
        indices.extend(self.triangles[0].iter().map(|&i| i as u32));
        indices.extend(self.triangles[1].iter().map(|&i| i as u32));
        let total_len = indices.len();

        MeshOut {
            positions,
            normals,
            uvs,
            indices,
            surface_range: 0..surface_len,
            cut_face_range: surface_len..total_len,
        }
    }
}

/// Which axes the recursive fracture driver is allowed to pick a random plane-normal component from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FracturePlanes {
    /// Randomise the X component of the slicing plane's normal.
    pub x: bool,
    /// Randomise the Y component.
    pub y: bool,
    /// Randomise the Z component.
    pub z: bool,
}

impl Default for FracturePlanes {
    /// All three axes enabled.
    fn default() -> Self {
        FracturePlanes { x: true, y: true, z: true }
    }
}

/// Whether a cut face is assumed convex (fast, unconstrained triangulation) or not
/// (slower, constrained triangulation plus post-slice component splitting).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractureMode {
    /// Cut faces are triangulated with the unconstrained (convex-only) triangulator.
    Convex,
    /// Cut faces are triangulated with the constrained triangulator and each half's
    /// connected components are extracted after every slice.
    NonConvex,
}

///
/// Options for [crate::fracture]. See §6 for field-by-field provenance; this
/// is the union of the fields the donor family of `FractureOptions` variants
/// carried, per the resolution recorded in DESIGN.md.
///
#[derive(Debug, Clone)]
pub struct FractureOptions {
    /// Target number of output fragments (≥ 1).
    pub fragment_count: usize,
    /// Which axes the driver's random plane normal may vary along; at least one must be `true`.
    pub fracture_planes: FracturePlanes,
    /// Convex or non-convex cut-face handling.
    pub fracture_mode: FractureMode,
    /// UV scale applied to newly created cut-face vertices.
    pub texture_scale: Vec2,
    /// UV offset applied to newly created cut-face vertices.
    pub texture_offset: Vec2,
    /// Optional PRNG seed; [crate::rng::DEFAULT_SEED] is used when absent.
    pub seed: Option<u32>,
}

impl Default for FractureOptions {
    fn default() -> Self {
        FractureOptions {
            fragment_count: 2,
            fracture_planes: FracturePlanes::default(),
            fracture_mode: FractureMode::Convex,
            texture_scale: vec2(1.0, 1.0),
            texture_offset: vec2(0.0, 0.0),
            seed: None,
        }
    }
}

/// Whether the Voronoi carver bisects against all other seeds in full 3D, or is
/// constrained to a plane (2.5D slab fracture).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoronoiMode {
    /// Seeds and bisecting planes are unconstrained in 3D.
    Full3D,
    /// Seeds are confined to a plane through the bounds centre; see [Axis].
    Planar2_5D,
}

/// An axis of the ambient coordinate frame, used to pick the plane for [VoronoiMode::Planar2_5D].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// The axis's index (0, 1 or 2), matching [crate::math::Box3::smallest_axis]'s convention.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The axis as an index, as returned by [crate::math::Box3::smallest_axis].
    pub fn from_index(index: usize) -> Axis {
        match index {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        }
    }
}

///
/// Options for [crate::voronoi_fracture]. See §6 for field-by-field provenance.
///
#[derive(Debug, Clone)]
pub struct VoronoiOptions {
    /// Target number of seeds/cells when `seed_points` is not supplied.
    pub fragment_count: usize,
    /// UV scale applied to newly created cut-face vertices.
    pub texture_scale: Vec2,
    /// UV offset applied to newly created cut-face vertices.
    pub texture_offset: Vec2,
    /// Optional PRNG seed; [crate::rng::DEFAULT_SEED] is used when absent.
    pub seed: Option<u32>,
    /// Full 3D or planar seed placement.
    pub mode: VoronoiMode,
    /// Explicit seed positions, overriding the generator entirely when present.
    pub seed_points: Option<Vec<Vec3>>,
    /// Centre of the impact-biased generator, if used.
    pub impact_point: Option<Vec3>,
    /// Radius of the impact-biased generator, if used.
    pub impact_radius: Option<f64>,
    /// Axis the `Planar2_5D` seed plane is perpendicular to; auto-selected (smallest
    /// bounds extent) when absent.
    pub projection_axis: Option<Axis>,
    /// Whether to use K-nearest-neighbour bisection instead of all-other-seeds.
    pub use_approximation: bool,
    /// Neighbour count used when `use_approximation` is set.
    pub k_neighbors: usize,
    /// Convex or non-convex cut-face handling.
    pub fracture_mode: FractureMode,
    /// Whether to split each carved cell into its connected components.
    pub detect_isolated_fragments: bool,
    /// Grain direction for anisotropic bisection; `None` is equivalent to isotropic.
    pub grain_direction: Option<Vec3>,
    /// Anisotropy factor (≥ 1.0); 1.0 is isotropic.
    pub anisotropy: f64,
}

impl Default for VoronoiOptions {
    fn default() -> Self {
        VoronoiOptions {
            fragment_count: 8,
            texture_scale: vec2(1.0, 1.0),
            texture_offset: vec2(0.0, 0.0),
            seed: None,
            mode: VoronoiMode::Full3D,
            seed_points: None,
            impact_point: None,
            impact_radius: None,
            projection_axis: None,
            use_approximation: false,
            k_neighbors: 12,
            fracture_mode: FractureMode::Convex,
            detect_isolated_fragments: false,
            grain_direction: None,
            anisotropy: 1.0,
        }
    }
}
