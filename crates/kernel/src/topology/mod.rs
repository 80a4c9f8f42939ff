//! Structured block topology: arenas, index tables, collapses and audits.

pub mod audit;
pub mod degeneracy;
pub mod store;
pub mod tables;

pub use store::{
    Block, BlockId, BlockSize, FaceSplit, GeomAssociation, TopoChange, TopoEdge, TopoEdgeId,
    TopoFace, TopoFaceId, TopoStore, TopoVertex, TopoVertexId, TopologyError,
};
pub use tables::{DirOnBlock, FaceOnBlock};
