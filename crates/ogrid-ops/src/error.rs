use ogrid_kernel::geom::GeomError;
use ogrid_kernel::topology::TopologyError;
use thiserror::Error;

/// Failure modes of the o-grid builders.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid o-grid parameter: {detail}")]
    Validation { detail: String },
    #[error("volume boundary does not match the expected layout: {detail}")]
    StructuralMismatch { detail: String },
    #[error("no block topology is defined for this configuration: {detail}")]
    UnsupportedConfiguration { detail: &'static str },
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Geometry(#[from] GeomError),
}
