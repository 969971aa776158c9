//!
//! Linear algebra types and the stand-alone geometric predicates the rest of
//! the crate builds on: positional hashing, plane/segment classification and
//! intersection, and the 2D half-plane test used throughout the
//! triangulators. Basically re-exports the [cgmath](https://crates.io/crates/cgmath)
//! library for the vector types.
//!

pub use cgmath::prelude::*;
use cgmath::{Vector2, Vector3};

/// Vector with two elements.
pub type Vec2 = Vector2<f64>;
/// Vector with three elements.
pub type Vec3 = Vector3<f64>;

/// Constructs a [Vec2].
pub const fn vec2(x: f64, y: f64) -> Vec2 {
    Vector2::new(x, y)
}

/// Constructs a [Vec3].
pub const fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vector3::new(x, y, z)
}

/// Default tolerance used for positional hashing and hashing-driven equality.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

///
/// Axis-aligned bounding box.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3 {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Box3 {
    /// An empty box, ready to be grown with [Box3::include].
    pub fn empty() -> Self {
        Box3 {
            min: vec3(f64::MAX, f64::MAX, f64::MAX),
            max: vec3(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Builds the bounding box of a point cloud. Returns an empty box for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut b = Box3::empty();
        for p in points {
            b.include(p);
        }
        b
    }

    /// Grows the box, if necessary, so that it contains `p`.
    pub fn include(&mut self, p: Vec3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Centre of the box.
    pub fn centre(&self) -> Vec3 {
        0.5 * (self.min + self.max)
    }

    /// Per-axis extent (max - min). Negative/zero on an empty box.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Index (0, 1 or 2) of the axis along which the box is smallest.
    pub fn smallest_axis(&self) -> usize {
        let e = self.extent();
        let axes = [e.x, e.y, e.z];
        let mut best = 0;
        for i in 1..3 {
            if axes[i] < axes[best] {
                best = i;
            }
        }
        best
    }
}

/// Cantor pairing function for two (possibly negative) integers.
fn cantor_pair(a: i64, b: i64) -> i64 {
    (a + b) * (a + b + 1) / 2 + b
}

/// Floors `v` to a multiple of `tol` and returns the resulting grid cell index.
fn floor_to_cell(v: f64, tol: f64) -> i64 {
    (v / tol).floor() as i64
}

///
/// Deterministic hash of a 2D position, identical for any two positions that fall
/// within the same `tol`-sized grid cell.
///
pub fn hash2(v: Vec2, tol: f64) -> i64 {
    let a = floor_to_cell(v.x, tol);
    let b = floor_to_cell(v.y, tol);
    cantor_pair(a, b)
}

///
/// Deterministic hash of a 3D position, identical for any two positions that fall
/// within the same `tol`-sized grid cell. Built by Cantor-pairing the 2D hash of
/// `(x, y)` with the cell index of `z`.
///
pub fn hash3(v: Vec3, tol: f64) -> i64 {
    let xy = cantor_pair(floor_to_cell(v.x, tol), floor_to_cell(v.y, tol));
    let z = floor_to_cell(v.z, tol);
    cantor_pair(xy, z)
}

///
/// Returns true iff `p` lies on or above the plane through `o` with normal `n`,
/// i.e. `n . (p - o) >= 0`. The `>=` bias (rather than strict `>`) keeps vertices
/// that land exactly on the cutting plane on one consistent side, which is what
/// makes cut-face construction stable.
///
pub fn is_point_above_plane(p: Vec3, n: Vec3, o: Vec3) -> bool {
    n.dot(p - o) >= 0.0
}

///
/// Intersects the segment `a -> b` with the plane `(n, o)`. Returns `(point, s)`
/// where `point = a + s * (b - a)`. Returns `None` for a degenerate segment
/// (`a == b`), a degenerate plane (`n` is the zero vector), or a segment parallel
/// to the plane.
///
pub fn line_plane_intersection(a: Vec3, b: Vec3, n: Vec3, o: Vec3) -> Option<(Vec3, f64)> {
    let d = b - a;
    if d.magnitude2() < 1e-24 || n.magnitude2() < 1e-24 {
        return None;
    }
    let denom = n.dot(d);
    if denom.abs() < 1e-12 {
        return None;
    }
    let s = n.dot(o - a) / denom;
    if !s.is_finite() {
        return None;
    }
    Some((a + s * d, s))
}

/// Signed area (x2) of the triangle `a, b, c`.
fn cross2(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

///
/// Returns true iff `p` is on the right side of the directed line `a -> b`
/// (`<= 0` counts as right, consistent with CCW-wound triangles).
///
pub fn is_point_on_right_side_of_line(a: Vec2, b: Vec2, p: Vec2) -> bool {
    cross2(a, b, p) <= 0.0
}

///
/// Returns true iff the closed segments `a1 -> a2` and `b1 -> b2` intersect.
/// When `include_shared` is false, segments that only touch at a shared
/// endpoint are *not* considered intersecting; when true, a shared endpoint
/// counts (used to test whether two diagonals of a convex quad cross).
///
pub fn lines_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2, include_shared: bool) -> bool {
    if !include_shared && (a1 == b1 || a1 == b2 || a2 == b1 || a2 == b2) {
        return false;
    }
    let d1 = cross2(b1, b2, a1);
    let d2 = cross2(b1, b2, a2);
    let d3 = cross2(a1, a2, b1);
    let d4 = cross2(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    if include_shared {
        if d1 == 0.0 && on_segment(b1, b2, a1) {
            return true;
        }
        if d2 == 0.0 && on_segment(b1, b2, a2) {
            return true;
        }
        if d3 == 0.0 && on_segment(a1, a2, b1) {
            return true;
        }
        if d4 == 0.0 && on_segment(a1, a2, b2) {
            return true;
        }
    }
    false
}

/// Returns true iff `p`, known to be collinear with `a` and `b`, lies within the segment `a -> b`.
fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}
