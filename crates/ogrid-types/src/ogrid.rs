use serde::{Deserialize, Serialize};

/// Discretization and core sizing for an o-grid topology.
///
/// `ratio` controls the core block: `0.0` collapses the core onto the
/// axis/pole singularity (no central block), values in `(0, 1)` size the
/// core at `ratio` times the outer radius, and `1.0` selects the
/// single-block topology with no o-grid at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OGridSpec {
    /// Subdivisions along a quarter of the circumference.
    pub n_i: u32,
    /// Subdivisions across the ring, core boundary to outer boundary.
    pub n_r: u32,
    /// Subdivisions along the axis (ignored for spheres).
    pub n_axe: u32,
    /// Core size as a fraction of the outer radius, in `[0, 1]`.
    pub ratio: f64,
}

impl OGridSpec {
    pub fn new(n_i: u32, n_r: u32, n_axe: u32, ratio: f64) -> Self {
        Self { n_i, n_r, n_axe, ratio }
    }
}
