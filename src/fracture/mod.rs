//!
//! The recursive fracture driver (§4.8): repeatedly slices the fragment at
//! the front of a FIFO queue by a random axis-restricted plane through its
//! bounds centre, re-queuing the results, until the queue holds at least the
//! requested number of fragments.
//!

use crate::exchange::{FractureMode, FractureOptions};
use crate::fragment::{extract_connected_components, Fragment};
use crate::rng::Lcg32;
use crate::slicer;
use std::collections::VecDeque;

/// Hard ceiling on driver iterations, guarding against a fragment_count that
/// degenerate input geometry can never reach (e.g. every slice producing one
/// empty half in non-convex mode, so the queue stalls rather than drains).
const ITERATION_LIMIT: usize = 100_000;

///
/// Picks a unit plane normal with components restricted to the axes enabled
/// in `planes`; disabled axes are held at zero. At least one axis must be
/// enabled (validated by the caller) or the normal would be the zero vector,
/// which the slicer treats as the degenerate-geometry case.
///
fn random_restricted_normal(planes: crate::exchange::FracturePlanes, rng: &mut Lcg32) -> crate::math::Vec3 {
    use crate::math::{vec3, InnerSpace};
    let x = if planes.x { rng.next_f64_range(-1.0, 1.0) } else { 0.0 };
    let y = if planes.y { rng.next_f64_range(-1.0, 1.0) } else { 0.0 };
    let z = if planes.z { rng.next_f64_range(-1.0, 1.0) } else { 0.0 };
    let n = vec3(x, y, z);
    if n.magnitude2() < 1e-12 {
        // All enabled components happened to land near zero (astronomically
        // unlikely with a real PRNG draw, but keeps this total); nudge the
        // first enabled axis to 1 so the slicer never sees a zero normal.
        if planes.x {
            vec3(1.0, 0.0, 0.0)
        } else if planes.y {
            vec3(0.0, 1.0, 0.0)
        } else {
            vec3(0.0, 0.0, 1.0)
        }
    } else {
        n.normalize()
    }
}

///
/// Runs the recursive fracture driver over `input`, returning the queue's
/// final contents once it holds at least `options.fragment_count` fragments
/// (or the driver gives up after [ITERATION_LIMIT] iterations, whichever
/// comes first — see its doc comment).
///
pub fn fracture_fragment(input: Fragment, options: &FractureOptions, rng: &mut Lcg32) -> Vec<Fragment> {
    let target = options.fragment_count.max(1);
    let convex = matches!(options.fracture_mode, FractureMode::Convex);

    let mut queue: VecDeque<Fragment> = VecDeque::new();
    queue.push_back(input);

    let mut iterations = 0usize;
    while queue.len() < target {
        iterations += 1;
        if iterations > ITERATION_LIMIT {
            log::warn!(
                "fracture driver: gave up after {} iterations with {} of {} fragments",
                ITERATION_LIMIT,
                queue.len(),
                target
            );
            break;
        }

        let Some(fragment) = queue.pop_front() else {
            break;
        };
        let bounds = fragment.bounds();
        let normal = random_restricted_normal(options.fracture_planes, rng);
        let origin = bounds.centre();

        let (top, bottom) = slicer::slice(
            &fragment,
            normal,
            origin,
            options.texture_scale,
            options.texture_offset,
            convex,
        );

        if convex {
            queue.push_back(top);
            queue.push_back(bottom);
        } else {
            for half in [top, bottom] {
                for component in extract_connected_components(&half) {
                    queue.push_back(component);
                }
            }
        }
    }

    queue.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{FracturePlanes, FractureMode, FractureOptions};
    use crate::fragment::MeshVertex;
    use crate::math::{vec2, vec3};

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
        let vertices: Vec<MeshVertex> = positions
            .iter()
            .map(|&p| MeshVertex::new(p, vec3(0.0, 0.0, 1.0), vec2(0.0, 0.0)))
            .collect();
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

    fn default_options(fragment_count: usize) -> FractureOptions {
        FractureOptions {
            fragment_count,
            fracture_planes: FracturePlanes { x: true, y: true, z: true },
            fracture_mode: FractureMode::Convex,
            texture_scale: vec2(1.0, 1.0),
            texture_offset: vec2(0.0, 0.0),
            seed: Some(42),
        }
    }

    #[test]
    fn test_fragment_count_one_returns_input_unsliced() {
        let options = default_options(1);
        let mut rng = Lcg32::new(options.seed.unwrap());
        let result = fracture_fragment(unit_cube(), &options, &mut rng);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].triangles[0].len(), 36);
    }

    #[test]
    fn test_convex_fracture_reaches_exact_target_count() {
        let options = default_options(5);
        let mut rng = Lcg32::new(options.seed.unwrap());
        let result = fracture_fragment(unit_cube(), &options, &mut rng);
        assert_eq!(result.len(), 5);
        for fragment in &result {
            assert!(fragment.triangle_count() > 0 || fragment.vertices.is_empty());
        }
    }

    #[test]
    fn test_same_seed_reproduces_identical_fragment_shapes() {
        let options = default_options(6);
        let mut rng_a = Lcg32::new(7);
        let mut rng_b = Lcg32::new(7);
        let a = fracture_fragment(unit_cube(), &options, &mut rng_a);
        let b = fracture_fragment(unit_cube(), &options, &mut rng_b);
        assert_eq!(a.len(), b.len());
        for (fa, fb) in a.iter().zip(b.iter()) {
            assert_eq!(fa.vertices.len(), fb.vertices.len());
            assert_eq!(fa.cut_vertices.len(), fb.cut_vertices.len());
            assert_eq!(fa.triangle_count(), fb.triangle_count());
        }
    }

    #[test]
    fn test_restricted_axis_normal_has_zero_disabled_components() {
        let planes = FracturePlanes { x: true, y: false, z: true };
        let mut rng = Lcg32::new(3);
        for _ in 0..50 {
            let n = random_restricted_normal(planes, &mut rng);
            assert_eq!(n.y, 0.0);
        }
    }
}
