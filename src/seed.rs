//!
//! Seed-point generation for the [Voronoi carver](crate::voronoi) (§4.9):
//! uniform sampling of a bounding box, an impact-biased variant that
//! clusters most of its points near an impact point with a
//! power-distribution radial falloff, and 2D variants of both that confine
//! seeds to a single plane through the box centre for "2.5D" slab
//! fracture.
//!

use crate::exchange::{Axis, VoronoiMode, VoronoiOptions};
use crate::math::{vec3, Box3, InnerSpace, Vec3};
use crate::rng::Lcg32;

/// Fraction of requested seeds placed by the impact-biased radial sampler; the
/// remainder is filled in uniformly, per §4.9.
const IMPACT_BIASED_FRACTION: f64 = 0.6;

/// Resolves `axis`, falling back to the bounding box's smallest extent when absent.
fn resolve_axis(axis: Option<Axis>, bounds: &Box3) -> Axis {
    axis.unwrap_or_else(|| Axis::from_index(bounds.smallest_axis()))
}

fn uniform_point(bounds: &Box3, rng: &mut Lcg32) -> Vec3 {
    vec3(
        rng.next_f64_range(bounds.min.x, bounds.max.x),
        rng.next_f64_range(bounds.min.y, bounds.max.y),
        rng.next_f64_range(bounds.min.z, bounds.max.z),
    )
}

fn clamp_to_bounds(p: Vec3, bounds: &Box3) -> Vec3 {
    vec3(
        p.x.clamp(bounds.min.x, bounds.max.x),
        p.y.clamp(bounds.min.y, bounds.max.y),
        p.z.clamp(bounds.min.z, bounds.max.z),
    )
}

/// Samples a point at radius `r * u^2` (`u` uniform in `[0, 1)`) and a uniformly
/// distributed spherical direction around `centre`, clamped back into `bounds`.
fn impact_biased_point(centre: Vec3, radius: f64, bounds: &Box3, rng: &mut Lcg32) -> Vec3 {
    let theta = rng.next_f64_range(0.0, std::f64::consts::TAU);
    let cos_phi = 1.0 - 2.0 * rng.next_f64();
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    let direction = vec3(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi);
    let u = rng.next_f64();
    let r = radius * u * u;
    clamp_to_bounds(centre + direction * r, bounds)
}

/// 2D analogue of [impact_biased_point]: direction confined to the plane perpendicular
/// to `axis`, the `axis` component held fixed at `centre`'s.
fn impact_biased_point_2d(centre: Vec3, radius: f64, axis: Axis, bounds: &Box3, rng: &mut Lcg32) -> Vec3 {
    let theta = rng.next_f64_range(0.0, std::f64::consts::TAU);
    let u = rng.next_f64();
    let r = radius * u * u;
    let (da, db) = (r * theta.cos(), r * theta.sin());
    let p = match axis {
        Axis::X => vec3(centre.x, centre.y + da, centre.z + db),
        Axis::Y => vec3(centre.x + da, centre.y, centre.z + db),
        Axis::Z => vec3(centre.x + da, centre.y + db, centre.z),
    };
    clamp_to_bounds(p, bounds)
}

/// Uniform sample confined to the plane perpendicular to `axis` through `bounds`'s centre.
fn uniform_point_2d(axis: Axis, bounds: &Box3, rng: &mut Lcg32) -> Vec3 {
    let centre = bounds.centre();
    match axis {
        Axis::X => vec3(
            centre.x,
            rng.next_f64_range(bounds.min.y, bounds.max.y),
            rng.next_f64_range(bounds.min.z, bounds.max.z),
        ),
        Axis::Y => vec3(
            rng.next_f64_range(bounds.min.x, bounds.max.x),
            centre.y,
            rng.next_f64_range(bounds.min.z, bounds.max.z),
        ),
        Axis::Z => vec3(
            rng.next_f64_range(bounds.min.x, bounds.max.x),
            rng.next_f64_range(bounds.min.y, bounds.max.y),
            centre.z,
        ),
    }
}

/// Uniform generator: `count` points independently uniform on each axis of `bounds`.
pub fn uniform(bounds: &Box3, count: usize, rng: &mut Lcg32) -> Vec<Vec3> {
    (0..count).map(|_| uniform_point(bounds, rng)).collect()
}

/// Impact-biased generator: `floor(0.6 * count)` points radially clustered around
/// `point` (clamped into `bounds`) with falloff radius `radius`, plus the remainder
/// uniform.
pub fn impact_based(bounds: &Box3, count: usize, point: Vec3, radius: f64, rng: &mut Lcg32) -> Vec<Vec3> {
    let centre = clamp_to_bounds(point, bounds);
    let biased_count = ((count as f64) * IMPACT_BIASED_FRACTION).floor() as usize;
    let mut seeds = Vec::with_capacity(count);
    for _ in 0..biased_count {
        seeds.push(impact_biased_point(centre, radius, bounds, rng));
    }
    for _ in biased_count..count {
        seeds.push(uniform_point(bounds, rng));
    }
    seeds
}

/// Planar uniform generator: like [uniform] but confined to the plane through `bounds`'s
/// centre perpendicular to `axis` (auto-selected as the smallest extent when `None`).
pub fn planar(bounds: &Box3, count: usize, axis: Option<Axis>, rng: &mut Lcg32) -> Vec<Vec3> {
    let axis = resolve_axis(axis, bounds);
    (0..count).map(|_| uniform_point_2d(axis, bounds, rng)).collect()
}

/// Planar impact-biased generator: like [impact_based] but confined to the plane
/// through `bounds`'s centre perpendicular to `axis`.
pub fn planar_impact_based(
    bounds: &Box3,
    count: usize,
    point: Vec3,
    radius: f64,
    axis: Option<Axis>,
    rng: &mut Lcg32,
) -> Vec<Vec3> {
    let axis = resolve_axis(axis, bounds);
    let centre = clamp_to_bounds(point, bounds);
    let biased_count = ((count as f64) * IMPACT_BIASED_FRACTION).floor() as usize;
    let mut seeds = Vec::with_capacity(count);
    for _ in 0..biased_count {
        seeds.push(impact_biased_point_2d(centre, radius, axis, bounds, rng));
    }
    for _ in biased_count..count {
        seeds.push(uniform_point_2d(axis, bounds, rng));
    }
    seeds
}

///
/// Dispatches to the right generator above based on `options`: explicit `seed_points`
/// takes precedence (handled by the caller, not here); otherwise picks uniform vs.
/// impact-biased by whether `impact_point`/`impact_radius` are set, and full-3D vs.
/// planar by `options.mode`.
///
pub fn generate_seeds(bounds: &Box3, options: &VoronoiOptions, rng: &mut Lcg32) -> Vec<Vec3> {
    let count = options.fragment_count;
    let impact = options.impact_point.zip(options.impact_radius);
    match (options.mode, impact) {
        (VoronoiMode::Full3D, None) => uniform(bounds, count, rng),
        (VoronoiMode::Full3D, Some((point, radius))) => impact_based(bounds, count, point, radius, rng),
        (VoronoiMode::Planar2_5D, None) => planar(bounds, count, options.projection_axis, rng),
        (VoronoiMode::Planar2_5D, Some((point, radius))) => {
            planar_impact_based(bounds, count, point, radius, options.projection_axis, rng)
        }
    }
}
