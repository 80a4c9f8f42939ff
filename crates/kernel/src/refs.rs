//! A single reference type spanning both entity worlds.
//!
//! Commands track what they created or touched as flat sets of `EntityRef`,
//! ordered so reports and comparisons are deterministic.

use serde::{Deserialize, Serialize};

use crate::geom::{GeomCurveId, GeomRef, GeomSurfaceId, GeomVertexId, GeomVolumeId};
use crate::topology::{BlockId, TopoEdgeId, TopoFaceId, TopoVertexId};
use ogrid_types::Dim;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    GeomVertex(GeomVertexId),
    GeomCurve(GeomCurveId),
    GeomSurface(GeomSurfaceId),
    GeomVolume(GeomVolumeId),
    TopoVertex(TopoVertexId),
    TopoEdge(TopoEdgeId),
    TopoFace(TopoFaceId),
    Block(BlockId),
}

impl EntityRef {
    pub fn dim(&self) -> Dim {
        match self {
            EntityRef::GeomVertex(_) | EntityRef::TopoVertex(_) => Dim::D0,
            EntityRef::GeomCurve(_) | EntityRef::TopoEdge(_) => Dim::D1,
            EntityRef::GeomSurface(_) | EntityRef::TopoFace(_) => Dim::D2,
            EntityRef::GeomVolume(_) | EntityRef::Block(_) => Dim::D3,
        }
    }

    pub fn is_geom(&self) -> bool {
        matches!(
            self,
            EntityRef::GeomVertex(_)
                | EntityRef::GeomCurve(_)
                | EntityRef::GeomSurface(_)
                | EntityRef::GeomVolume(_)
        )
    }

    pub fn is_topo(&self) -> bool {
        !self.is_geom()
    }
}

impl From<GeomRef> for EntityRef {
    fn from(r: GeomRef) -> Self {
        match r {
            GeomRef::Vertex(id) => EntityRef::GeomVertex(id),
            GeomRef::Curve(id) => EntityRef::GeomCurve(id),
            GeomRef::Surface(id) => EntityRef::GeomSurface(id),
            GeomRef::Volume(id) => EntityRef::GeomVolume(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::GeomStore;
    use nalgebra::Point3;

    #[test]
    fn dims_follow_the_entity_kind() {
        let mut store = GeomStore::new();
        let v = store.add_vertex(Point3::origin());
        let r: EntityRef = GeomRef::Vertex(v).into();
        assert_eq!(r.dim(), Dim::D0);
        assert!(r.is_geom());
        assert!(!r.is_topo());
    }
}
