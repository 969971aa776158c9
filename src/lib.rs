//!
//! A 3D triangle mesh fracture engine.
//!
//! Given a triangle mesh (as flat host buffers, see [MeshIn]) and a set of
//! options, [fracture] and [voronoi_fracture] each produce a collection of
//! disjoint sub-meshes whose union approximates the input and whose new
//! "cut" faces are freshly triangulated with consistent normals and UVs.
//!
//! # Features
//!
//! - [fracture]: recursive binary slicing of a mesh by random planes until a
//!   target fragment count is reached.
//! - [voronoi_fracture]: Voronoi cell carving, slicing around a set of seed
//!   points (explicit, or drawn from a uniform/impact-biased/planar
//!   generator).
//! - Both strategies share one primitive, exposed for direct use: planar
//!   [slicing](slicer) of an indexed triangle mesh ([fragment::Fragment])
//!   with cut-face re-triangulation, backed by an
//!   [unconstrained](triangulate::UnconstrainedTriangulator) and a
//!   [constrained](triangulate::ConstrainedTriangulator) Delaunay
//!   triangulator and a [Union-Find](UnionFind) based
//!   [connected-component extractor](fragment::extract_connected_components).
//! - An explicit, seedable [PRNG](Lcg32) drives every random choice, so
//!   a given `seed` reproduces byte-identical output.
//!
//! Host integration (scene graphs, materials, physics, on-disk loading) is
//! deliberately out of scope; the crate only exchanges flat buffers via
//! [MeshIn]/[MeshOut].
//!

#![warn(missing_docs)]

pub mod math;

mod bin_sort;
mod error;
mod exchange;
mod fracture;
pub mod fragment;
mod rng;
mod seed;
pub mod slicer;
pub mod triangulate;
mod union_find;
mod voronoi;

pub use error::{FractureError, FractureResult};
pub use exchange::{
    Axis, FractureMode, FractureOptions, FracturePlanes, MeshIn, MeshOut, VoronoiMode,
    VoronoiOptions,
};
pub use fragment::{EdgeConstraint, Fragment, MeshVertex};
pub use rng::Lcg32;
pub use union_find::UnionFind;

///
/// Recursively slices `mesh` by random planes until at least
/// `options.fragment_count` fragments have been produced (§4.8), returning
/// one [MeshOut] per resulting fragment.
///
/// Fails with [FractureError::InvalidInput] only if `mesh`'s buffers
/// themselves are malformed (missing, mismatched lengths, or a
/// non-triangle index count) — degenerate slicing geometry never
/// propagates as an error; see the crate's error-handling policy on
/// [FractureError].
///
/// # Examples
///
/// ```
/// use mesh_fracture::{fracture, FractureOptions, FractureMode, FracturePlanes, MeshIn};
///
/// let mesh = MeshIn {
///     positions: vec![
///         -0.5, -0.5, -0.5,  0.5, -0.5, -0.5,  0.5, 0.5, -0.5, -0.5, 0.5, -0.5,
///         -0.5, -0.5, 0.5,   0.5, -0.5, 0.5,   0.5, 0.5, 0.5,  -0.5, 0.5, 0.5,
///     ],
///     normals: vec![0.0; 24],
///     uvs: vec![0.0; 16],
///     indices: vec![
///         0, 1, 2, 0, 2, 3, 4, 6, 5, 4, 7, 6,
///         0, 4, 5, 0, 5, 1, 3, 2, 6, 3, 6, 7,
///         0, 3, 7, 0, 7, 4, 1, 5, 6, 1, 6, 2,
///     ],
/// };
/// let options = FractureOptions {
///     fragment_count: 4,
///     fracture_planes: FracturePlanes { x: true, y: true, z: true },
///     fracture_mode: FractureMode::Convex,
///     seed: Some(7),
///     ..Default::default()
/// };
/// let fragments = fracture(&mesh, &options).unwrap();
/// assert_eq!(fragments.len(), 4);
/// ```
///
pub fn fracture(mesh: &MeshIn, options: &FractureOptions) -> FractureResult<Vec<MeshOut>> {
    let input = Fragment::from_buffers(&mesh.positions, &mesh.normals, &mesh.uvs, &mesh.indices)?;
    let mut rng = Lcg32::new(options.seed.unwrap_or(rng::DEFAULT_SEED));
    let fragments = fracture::fracture_fragment(input, options, &mut rng);
    Ok(fragments.iter().map(Fragment::to_buffers).collect())
}

///
/// Carves `mesh` into one fragment per Voronoi cell around
/// `options.seed_points`, or around a generated seed set when none is
/// supplied (§4.9, §4.10).
///
/// Fails with [FractureError::InvalidInput] under the same conditions as
/// [fracture]. A cell that carves down to zero vertices is dropped
/// silently, per §7's `EmptyCell` policy, rather than surfacing as an
/// error.
///
/// # Examples
///
/// ```
/// use mesh_fracture::{voronoi_fracture, VoronoiOptions, math::vec3, MeshIn};
///
/// let mesh = MeshIn {
///     positions: vec![
///         -1.0, -1.0, -1.0,  1.0, -1.0, -1.0,  1.0, 1.0, -1.0, -1.0, 1.0, -1.0,
///         -1.0, -1.0, 1.0,   1.0, -1.0, 1.0,   1.0, 1.0, 1.0,  -1.0, 1.0, 1.0,
///     ],
///     normals: vec![0.0; 24],
///     uvs: vec![0.0; 16],
///     indices: vec![
///         0, 1, 2, 0, 2, 3, 4, 6, 5, 4, 7, 6,
///         0, 4, 5, 0, 5, 1, 3, 2, 6, 3, 6, 7,
///         0, 3, 7, 0, 7, 4, 1, 5, 6, 1, 6, 2,
///     ],
/// };
/// let options = VoronoiOptions {
///     seed_points: Some(vec![
///         vec3(-0.5, -0.5, 0.0),
///         vec3(0.5, -0.5, 0.0),
///         vec3(0.0, 0.5, 0.0),
///     ]),
///     ..Default::default()
/// };
/// let cells = voronoi_fracture(&mesh, &options).unwrap();
/// assert_eq!(cells.len(), 3);
/// ```
///
pub fn voronoi_fracture(mesh: &MeshIn, options: &VoronoiOptions) -> FractureResult<Vec<MeshOut>> {
    let input = Fragment::from_buffers(&mesh.positions, &mesh.normals, &mesh.uvs, &mesh.indices)?;
    let mut rng = Lcg32::new(options.seed.unwrap_or(rng::DEFAULT_SEED));
    let bounds = input.bounds();
    let seeds = match &options.seed_points {
        Some(explicit) => explicit.clone(),
        None => seed::generate_seeds(&bounds, options, &mut rng),
    };
    let cells = voronoi::carve(&input, &seeds, options);
    Ok(cells.iter().map(Fragment::to_buffers).collect())
}
