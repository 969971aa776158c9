//!
//! The Voronoi cell carver (§4.10): for each seed, clones the input
//! [Fragment] and carves it down by the bisecting half-spaces between that
//! seed and either every other seed or a K-nearest-neighbour subset, using
//! the shared [slicer](crate::slicer). Supports isotropic and
//! grain-direction-stretched (anisotropic) bisecting planes and an optional
//! per-cell connected-component split.
//!

use crate::exchange::{FractureMode, VoronoiOptions};
use crate::fragment::{extract_connected_components, Fragment};
use crate::math::{InnerSpace, Vec3};
use crate::slicer;

///
/// The perpendicular bisecting plane of `a` and `b`: origin at their midpoint,
/// normal pointing from `a` toward `b`. Degenerate only when `a == b`, in which
/// case the zero-length direction is returned un-normalised (the slicer treats
/// a zero normal as the degenerate-geometry case and leaves its input
/// untouched on one side).
///
pub fn compute_bisecting_plane(a: Vec3, b: Vec3) -> (Vec3, Vec3) {
    let origin = 0.5 * (a + b);
    let d = b - a;
    let normal = if d.magnitude2() > 1e-18 {
        d.normalize()
    } else {
        d
    };
    (origin, normal)
}

///
/// Anisotropic variant of [compute_bisecting_plane]: stretches the cell boundary by
/// `anisotropy` along `grain`. At `anisotropy == 1.0` this is exactly
/// [compute_bisecting_plane], since the correction term `(1 - 1/A^2)` vanishes.
///
pub fn compute_anisotropic_bisecting_plane(a: Vec3, b: Vec3, grain: Vec3, anisotropy: f64) -> (Vec3, Vec3) {
    let origin = 0.5 * (a + b);
    let d = b - a;
    if d.magnitude2() < 1e-18 {
        return (origin, d);
    }
    let g = grain.normalize();
    let correction = (1.0 - 1.0 / (anisotropy * anisotropy)) * d.dot(g);
    let adjusted = d - correction * g;
    let normal = if adjusted.magnitude2() > 1e-18 {
        adjusted.normalize()
    } else {
        d.normalize()
    };
    (origin, normal)
}

/// Brute-force indices of the `k` seeds nearest to `seeds[i]` (excluding `i` itself),
/// ascending by squared distance.
fn k_nearest(seeds: &[Vec3], i: usize, k: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = (0..seeds.len())
        .filter(|&j| j != i)
        .map(|j| (j, (seeds[j] - seeds[i]).magnitude2()))
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    ranked.into_iter().take(k).map(|(j, _)| j).collect()
}

fn bisecting_plane_for(seed: Vec3, other: Vec3, options: &VoronoiOptions) -> (Vec3, Vec3) {
    match options.grain_direction {
        Some(grain) if options.anisotropy > 1.0 => {
            compute_anisotropic_bisecting_plane(seed, other, grain, options.anisotropy)
        }
        _ => compute_bisecting_plane(seed, other),
    }
}

///
/// Carves `fragment` into one Voronoi cell per entry of `seeds`. Each cell starts as a
/// full clone of `fragment` and is cut down by the bisecting plane against every
/// neighbour (all other seeds, or the `k_neighbors` nearest when
/// `options.use_approximation` is set — which also logs an [ApproximationWarning]-style
/// notice, since nearest-neighbour bisection alone does not guarantee a partition and
/// the resulting cells may overlap). A cell that empties out partway through is dropped
/// silently (the `EmptyCell` policy of §7); no failure here affects any other cell.
///
pub fn carve(fragment: &Fragment, seeds: &[Vec3], options: &VoronoiOptions) -> Vec<Fragment> {
    if options.use_approximation {
        log::warn!(
            "voronoi carve: use_approximation enabled with k_neighbors={}, output fragments may overlap",
            options.k_neighbors
        );
    }
    let convex = matches!(options.fracture_mode, FractureMode::Convex);

    let mut cells = Vec::with_capacity(seeds.len());
    for (i, &seed) in seeds.iter().enumerate() {
        let neighbors: Vec<usize> = if options.use_approximation {
            k_nearest(seeds, i, options.k_neighbors)
        } else {
            (0..seeds.len()).filter(|&j| j != i).collect()
        };

        let mut current = fragment.clone();
        for &j in &neighbors {
            let (origin, normal) = bisecting_plane_for(seed, seeds[j], options);
            // `bottom` is the half the slicer's normal (pointing toward the neighbour)
            // points away from, i.e. the half closer to `seed`.
            let (_top, bottom) = slicer::slice(
                &current,
                normal,
                origin,
                options.texture_scale,
                options.texture_offset,
                convex,
            );
            current = bottom;
            if current.vertices.is_empty() {
                log::debug!(
                    "voronoi carve: cell for seed {} emptied while bisecting against seed {}",
                    i,
                    j
                );
                break;
            }
        }

        if current.vertices.is_empty() {
            continue;
        }

        if options.detect_isolated_fragments && !convex {
            cells.extend(extract_connected_components(&current));
        } else {
            cells.push(current);
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{FractureMode, VoronoiMode, VoronoiOptions};
    use crate::fragment::MeshVertex;
    use crate::math::{vec2, vec3};

    fn cube_vertex(p: Vec3) -> MeshVertex {
        MeshVertex::new(p, vec3(0.0, 0.0, 1.0), vec2(0.0, 0.0))
    }

    fn cube(half_extent: f64) -> Fragment {
        let e = half_extent;
        let positions = [
            vec3(-e, -e, -e),
            vec3(e, -e, -e),
            vec3(e, e, -e),
            vec3(-e, e, -e),
            vec3(-e, -e, e),
            vec3(e, -e, e),
            vec3(e, e, e),
            vec3(-e, e, e),
        ];
        let vertices: Vec<MeshVertex> = positions.iter().map(|&p| cube_vertex(p)).collect();
        #[rustfmt::skip]
        let triangles = vec![
            0, 1, 2, 0, 2, 3,
            4, 6, 5, 4, 7, 6,
            0, 4, 5, 0, 5, 1,
            3, 2, 6, 3, 6, 7,
            0, 3, 7, 0, 7, 4,
            1, 5, 6, 1, 6, 2,
        ];
        Fragment::from_surface(vertices, triangles)
    }

    fn default_options() -> VoronoiOptions {
        VoronoiOptions {
            fragment_count: 3,
            texture_scale: vec2(1.0, 1.0),
            texture_offset: vec2(0.0, 0.0),
            seed: Some(1),
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

    #[test]
    fn test_bisecting_plane_passes_through_midpoint() {
        let a = vec3(1.0, 2.0, 3.0);
        let b = vec3(-3.0, 4.0, 1.0);
        let (origin, _) = compute_bisecting_plane(a, b);
        assert_eq!(origin, 0.5 * (a + b));
    }

    #[test]
    fn test_anisotropic_plane_degenerates_to_isotropic_at_unit_factor() {
        let a = vec3(0.0, 0.0, 0.0);
        let b = vec3(1.0, 2.0, 0.0);
        let grain = vec3(0.0, 1.0, 0.0);
        let (o1, n1) = compute_bisecting_plane(a, b);
        let (o2, n2) = compute_anisotropic_bisecting_plane(a, b, grain, 1.0);
        assert_eq!(o1, o2);
        assert!((n1 - n2).magnitude() < 1e-9);
    }

    #[test]
    fn test_cube_with_three_seeds_yields_three_nonempty_cells() {
        let fragment = cube(1.0);
        let seeds = vec![
            vec3(-0.5, -0.5, 0.0),
            vec3(0.5, -0.5, 0.0),
            vec3(0.0, 0.5, 0.0),
        ];
        let options = default_options();
        let cells = carve(&fragment, &seeds, &options);
        assert_eq!(cells.len(), 3);
        let total_vertices: usize = cells.iter().map(|c| c.vertices.len()).sum();
        assert!(total_vertices >= 24, "got {}", total_vertices);
        for c in &cells {
            assert!(!c.vertices.is_empty());
        }
    }

    #[test]
    fn test_k_nearest_excludes_self_and_respects_k() {
        let seeds = vec![
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(2.0, 0.0, 0.0),
            vec3(3.0, 0.0, 0.0),
        ];
        let nearest = k_nearest(&seeds, 0, 2);
        assert_eq!(nearest, vec![1, 2]);
    }
}
