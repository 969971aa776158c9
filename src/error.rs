//!
//! The error type surfaced by the core's public entry points.
//!

use thiserror::Error;

///
/// Error produced by [crate::fracture] or [crate::voronoi_fracture].
///
/// Only conditions that make the *request itself* unanswerable are
/// represented here. Geometric degeneracies encountered deep inside a single
/// slice or a single Voronoi cell (an empty cut face, a failed
/// triangulation, an empty cell) are not propagated as errors — per-fragment
/// failures must never poison sibling fragments, so those are logged and
/// the algorithm continues with a partial result.
///
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum FractureError {
    #[error("input mesh is invalid: {0}")]
    InvalidInput(String),
}

/// Convenience alias, mirroring the donor library's `TriMeshResult`.
pub type FractureResult<T> = Result<T, FractureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = FractureError::InvalidInput("index count not a multiple of 3".to_string());
        assert_eq!(
            err.to_string(),
            "input mesh is invalid: index count not a multiple of 3"
        );
    }
}
