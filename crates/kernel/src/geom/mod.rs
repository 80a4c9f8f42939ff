pub mod primitives;
pub mod store;

pub use store::{
    CurveKind, GeomCurve, GeomCurveId, GeomError, GeomRef, GeomStore, GeomSurface, GeomSurfaceId,
    GeomVertex, GeomVertexId, GeomVolume, GeomVolumeId, SurfaceKind,
};
