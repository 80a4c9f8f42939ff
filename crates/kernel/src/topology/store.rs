//! Arena of structured-topology entities.
//!
//! Vertices, edges, faces and blocks live in slotmaps and reference each
//! other by key. Entities are never removed by modeling operations: merges
//! and collapses mark the losing entity destroyed so that a command can be
//! undone by flipping the flags back. Hard removal only happens when a
//! journal is rolled back after a failed build.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;
use tracing::instrument;

use crate::geom::{GeomCurveId, GeomSurfaceId, GeomVertexId, GeomVolumeId};
use crate::Tolerance;
use ogrid_types::Dim;

use super::tables::{FaceOnBlock, VTX_BY_EDGE_DIR, VTX_BY_FACE};

new_key_type! {
    pub struct TopoVertexId;
    pub struct TopoEdgeId;
    pub struct TopoFaceId;
    pub struct BlockId;
}

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("unknown {what} reference")]
    Missing { what: &'static str },
    #[error("face slot {face:?} holds {found} faces, expected exactly one")]
    NotSingleFace { face: FaceOnBlock, found: usize },
    #[error("faces cannot be fused: {reason}")]
    FuseMismatch { reason: &'static str },
    #[error("the face is shared with another block; a fused face cannot be collapsed")]
    FaceAlreadyFused,
    #[error("operation requires a quadrilateral face")]
    NotAQuad,
    #[error("operation requires a block with eight distinct corners")]
    DegenerateBlock,
    #[error("the given vertices are not an edge of the face")]
    NotAFaceEdge,
    #[error("no edge joins the given vertices")]
    NoSuchEdge,
    #[error("topology audit failed: {detail}")]
    Audit { detail: String },
}

/// Projection target of a topological entity on the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeomAssociation {
    #[default]
    None,
    Vertex(GeomVertexId),
    Curve(GeomCurveId),
    Surface(GeomSurfaceId),
    Volume(GeomVolumeId),
}

impl GeomAssociation {
    pub fn is_none(&self) -> bool {
        matches!(self, GeomAssociation::None)
    }

    pub fn dim(&self) -> Option<Dim> {
        match self {
            GeomAssociation::None => None,
            GeomAssociation::Vertex(_) => Some(Dim::D0),
            GeomAssociation::Curve(_) => Some(Dim::D1),
            GeomAssociation::Surface(_) => Some(Dim::D2),
            GeomAssociation::Volume(_) => Some(Dim::D3),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopoVertex {
    pub point: Point3<f64>,
    pub assoc: GeomAssociation,
    pub destroyed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopoEdge {
    pub ends: [TopoVertexId; 2],
    pub assoc: GeomAssociation,
    pub destroyed: bool,
}

impl TopoEdge {
    pub fn joins(&self, a: TopoVertexId, b: TopoVertexId) -> bool {
        (self.ends[0] == a && self.ends[1] == b) || (self.ends[0] == b && self.ends[1] == a)
    }
}

/// A face stores its corner cycle; four vertices for a quad, three after a
/// collapse turned it into a triangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopoFace {
    pub vertices: Vec<TopoVertexId>,
    pub assoc: GeomAssociation,
    pub destroyed: bool,
}

impl TopoFace {
    pub fn contains(&self, v: TopoVertexId) -> bool {
        self.vertices.contains(&v)
    }
}

/// Number of mesh cells along each block direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSize {
    pub n_i: u32,
    pub n_j: u32,
    pub n_k: u32,
}

impl BlockSize {
    pub fn new(n_i: u32, n_j: u32, n_k: u32) -> Self {
        Self { n_i, n_j, n_k }
    }

    pub fn along(&self, dir: super::tables::DirOnBlock) -> u32 {
        match dir {
            super::tables::DirOnBlock::I => self.n_i,
            super::tables::DirOnBlock::J => self.n_j,
            super::tables::DirOnBlock::K => self.n_k,
        }
    }

    pub fn cells(&self) -> u64 {
        u64::from(self.n_i) * u64::from(self.n_j) * u64::from(self.n_k)
    }
}

/// A structured block.
///
/// `verts` is always the eight-slot hexahedral view; after a face collapse
/// some slots repeat the surviving vertex. Face slots are indexed by
/// [`FaceOnBlock`] and hold one face normally, two after a split, none once
/// the face collapsed away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub verts: [TopoVertexId; 8],
    pub faces: [Vec<TopoFaceId>; 6],
    pub edges: Vec<TopoEdgeId>,
    pub size: BlockSize,
    pub assoc: GeomAssociation,
    pub destroyed: bool,
}

impl Block {
    pub fn distinct_verts(&self) -> Vec<TopoVertexId> {
        let mut out = Vec::with_capacity(8);
        for &v in &self.verts {
            if !out.contains(&v) {
                out.push(v);
            }
        }
        out
    }

    pub fn is_degenerate(&self) -> bool {
        self.distinct_verts().len() < 8
    }
}

/// One entry of the construction journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopoChange {
    CreatedVertex(TopoVertexId),
    CreatedEdge(TopoEdgeId),
    CreatedFace(TopoFaceId),
    CreatedBlock(BlockId),
    DestroyedVertex(TopoVertexId),
    DestroyedEdge(TopoEdgeId),
    DestroyedFace(TopoFaceId),
}

#[derive(Debug, Default)]
pub struct TopoStore {
    pub vertices: SlotMap<TopoVertexId, TopoVertex>,
    pub edges: SlotMap<TopoEdgeId, TopoEdge>,
    pub faces: SlotMap<TopoFaceId, TopoFace>,
    pub blocks: SlotMap<BlockId, Block>,
    journal: Vec<TopoChange>,
}

impl TopoStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Lookups ───

    pub fn vertex(&self, id: TopoVertexId) -> Result<&TopoVertex, TopologyError> {
        self.vertices.get(id).ok_or(TopologyError::Missing { what: "vertex" })
    }

    pub fn vertex_mut(&mut self, id: TopoVertexId) -> Result<&mut TopoVertex, TopologyError> {
        self.vertices.get_mut(id).ok_or(TopologyError::Missing { what: "vertex" })
    }

    pub fn edge(&self, id: TopoEdgeId) -> Result<&TopoEdge, TopologyError> {
        self.edges.get(id).ok_or(TopologyError::Missing { what: "edge" })
    }

    pub fn edge_mut(&mut self, id: TopoEdgeId) -> Result<&mut TopoEdge, TopologyError> {
        self.edges.get_mut(id).ok_or(TopologyError::Missing { what: "edge" })
    }

    pub fn face(&self, id: TopoFaceId) -> Result<&TopoFace, TopologyError> {
        self.faces.get(id).ok_or(TopologyError::Missing { what: "face" })
    }

    pub fn face_mut(&mut self, id: TopoFaceId) -> Result<&mut TopoFace, TopologyError> {
        self.faces.get_mut(id).ok_or(TopologyError::Missing { what: "face" })
    }

    pub fn block(&self, id: BlockId) -> Result<&Block, TopologyError> {
        self.blocks.get(id).ok_or(TopologyError::Missing { what: "block" })
    }

    pub fn block_mut(&mut self, id: BlockId) -> Result<&mut Block, TopologyError> {
        self.blocks.get_mut(id).ok_or(TopologyError::Missing { what: "block" })
    }

    pub fn live_blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().filter(|(_, b)| !b.destroyed)
    }

    pub fn live_faces(&self) -> impl Iterator<Item = (TopoFaceId, &TopoFace)> {
        self.faces.iter().filter(|(_, f)| !f.destroyed)
    }

    pub fn live_edges(&self) -> impl Iterator<Item = (TopoEdgeId, &TopoEdge)> {
        self.edges.iter().filter(|(_, e)| !e.destroyed)
    }

    pub fn live_vertices(&self) -> impl Iterator<Item = (TopoVertexId, &TopoVertex)> {
        self.vertices.iter().filter(|(_, v)| !v.destroyed)
    }

    // ─── Construction ───

    pub fn add_vertex(&mut self, point: Point3<f64>) -> TopoVertexId {
        let id = self.vertices.insert(TopoVertex {
            point,
            assoc: GeomAssociation::None,
            destroyed: false,
        });
        self.journal.push(TopoChange::CreatedVertex(id));
        id
    }

    fn add_edge(&mut self, a: TopoVertexId, b: TopoVertexId) -> TopoEdgeId {
        let id = self.edges.insert(TopoEdge {
            ends: [a, b],
            assoc: GeomAssociation::None,
            destroyed: false,
        });
        self.journal.push(TopoChange::CreatedEdge(id));
        id
    }

    fn add_face(&mut self, vertices: Vec<TopoVertexId>) -> TopoFaceId {
        let id = self.faces.insert(TopoFace {
            vertices,
            assoc: GeomAssociation::None,
            destroyed: false,
        });
        self.journal.push(TopoChange::CreatedFace(id));
        id
    }

    /// Create a block from its eight corner positions, with fresh vertices,
    /// twelve edges and six quad faces.
    #[instrument(skip(self, corners))]
    pub fn add_block(&mut self, corners: [Point3<f64>; 8], size: BlockSize) -> BlockId {
        let verts: Vec<TopoVertexId> = corners.iter().map(|p| self.add_vertex(*p)).collect();
        let verts: [TopoVertexId; 8] = [
            verts[0], verts[1], verts[2], verts[3], verts[4], verts[5], verts[6], verts[7],
        ];

        let mut edges = Vec::with_capacity(12);
        for dir_edges in &VTX_BY_EDGE_DIR {
            for &[a, b] in dir_edges {
                edges.push(self.add_edge(verts[a], verts[b]));
            }
        }

        let mut faces: [Vec<TopoFaceId>; 6] = Default::default();
        for (slot, corners) in faces.iter_mut().zip(VTX_BY_FACE.iter()) {
            let cycle = corners.iter().map(|&c| verts[c]).collect();
            slot.push(self.add_face(cycle));
        }

        let id = self.blocks.insert(Block {
            verts,
            faces,
            edges,
            size,
            assoc: GeomAssociation::None,
            destroyed: false,
        });
        self.journal.push(TopoChange::CreatedBlock(id));
        id
    }

    // ─── Block navigation ───

    pub fn block_vertex(&self, block: BlockId, corner: usize) -> Result<TopoVertexId, TopologyError> {
        let b = self.block(block)?;
        b.verts
            .get(corner)
            .copied()
            .ok_or(TopologyError::Missing { what: "corner" })
    }

    /// The single face in a slot. Errors when the slot was split or collapsed.
    pub fn face_of(&self, block: BlockId, face: FaceOnBlock) -> Result<TopoFaceId, TopologyError> {
        let faces = &self.block(block)?.faces[face.index()];
        if faces.len() != 1 {
            return Err(TopologyError::NotSingleFace {
                face,
                found: faces.len(),
            });
        }
        Ok(faces[0])
    }

    pub fn faces_of(&self, block: BlockId, face: FaceOnBlock) -> Result<&[TopoFaceId], TopologyError> {
        Ok(&self.block(block)?.faces[face.index()])
    }

    /// A live edge joining the two vertices, if any.
    pub fn edge_between(&self, a: TopoVertexId, b: TopoVertexId) -> Result<TopoEdgeId, TopologyError> {
        self.edges
            .iter()
            .find(|(_, e)| !e.destroyed && e.joins(a, b))
            .map(|(id, _)| id)
            .ok_or(TopologyError::NoSuchEdge)
    }

    /// The edge between two corners of a block, by corner index.
    pub fn block_edge(&self, block: BlockId, ca: usize, cb: usize) -> Result<TopoEdgeId, TopologyError> {
        let a = self.block_vertex(block, ca)?;
        let b = self.block_vertex(block, cb)?;
        self.edge_between(a, b)
    }

    /// Live edges bounding a face, walked along its corner cycle.
    pub fn edges_of_face(&self, face: TopoFaceId) -> Result<Vec<TopoEdgeId>, TopologyError> {
        let cycle = self.face(face)?.vertices.clone();
        let mut out = Vec::with_capacity(cycle.len());
        for i in 0..cycle.len() {
            let a = cycle[i];
            let b = cycle[(i + 1) % cycle.len()];
            out.push(self.edge_between(a, b)?);
        }
        Ok(out)
    }

    /// Live vertices coincident with `point`.
    pub fn vertices_at(&self, point: &Point3<f64>, tol: &Tolerance) -> Vec<TopoVertexId> {
        self.live_vertices()
            .filter(|(_, v)| tol.points_coincident(&v.point, point))
            .map(|(id, _)| id)
            .collect()
    }

    // ─── Merging ───

    /// Redirect every reference of `gone` onto `keep` and mark `gone`
    /// destroyed. Edges reduced to a point and faces reduced below three
    /// distinct corners are destroyed as well, and duplicated edges left by
    /// the merge are unified.
    #[instrument(skip(self))]
    pub fn merge_vertices(
        &mut self,
        keep: TopoVertexId,
        gone: TopoVertexId,
    ) -> Result<(), TopologyError> {
        if keep == gone {
            return Ok(());
        }
        if self.vertex(keep)?.destroyed || self.vertex(gone)?.destroyed {
            return Err(TopologyError::Missing { what: "vertex" });
        }

        let gone_assoc = self.vertices[gone].assoc;
        self.vertices[gone].destroyed = true;
        self.journal.push(TopoChange::DestroyedVertex(gone));
        if self.vertices[keep].assoc.is_none() {
            self.vertices[keep].assoc = gone_assoc;
        }

        // Edges.
        let mut dead_edges = Vec::new();
        for (id, edge) in self.edges.iter_mut().filter(|(_, e)| !e.destroyed) {
            for end in edge.ends.iter_mut() {
                if *end == gone {
                    *end = keep;
                }
            }
            if edge.ends[0] == edge.ends[1] {
                edge.destroyed = true;
                dead_edges.push(id);
            }
        }
        for id in &dead_edges {
            self.journal.push(TopoChange::DestroyedEdge(*id));
        }

        // Faces.
        let mut dead_faces = Vec::new();
        for (id, face) in self.faces.iter_mut().filter(|(_, f)| !f.destroyed) {
            for v in face.vertices.iter_mut() {
                if *v == gone {
                    *v = keep;
                }
            }
            dedup_cycle(&mut face.vertices);
            if face.vertices.len() < 3 {
                face.destroyed = true;
                dead_faces.push(id);
            }
        }
        for id in &dead_faces {
            self.journal.push(TopoChange::DestroyedFace(*id));
        }

        // Blocks.
        for (_, block) in self.blocks.iter_mut().filter(|(_, b)| !b.destroyed) {
            for v in block.verts.iter_mut() {
                if *v == gone {
                    *v = keep;
                }
            }
            block.edges.retain(|e| !dead_edges.contains(e));
            for slot in block.faces.iter_mut() {
                slot.retain(|f| !dead_faces.contains(f));
            }
        }

        self.dedupe_edges();
        Ok(())
    }

    /// Unify live edges sharing the same endpoint pair.
    fn dedupe_edges(&mut self) {
        let live: Vec<(TopoEdgeId, [TopoVertexId; 2])> = self
            .live_edges()
            .map(|(id, e)| (id, e.ends))
            .collect();
        let mut replaced: Vec<(TopoEdgeId, TopoEdgeId)> = Vec::new();
        for (i, (id_a, ends_a)) in live.iter().enumerate() {
            if replaced.iter().any(|(_, gone)| gone == id_a) {
                continue;
            }
            for (id_b, ends_b) in live.iter().skip(i + 1) {
                if replaced.iter().any(|(_, gone)| gone == id_b) {
                    continue;
                }
                let same = (ends_a == ends_b) || (ends_a[0] == ends_b[1] && ends_a[1] == ends_b[0]);
                if same {
                    replaced.push((*id_a, *id_b));
                }
            }
        }
        for (keep, gone) in replaced {
            let gone_assoc = self.edges[gone].assoc;
            self.edges[gone].destroyed = true;
            self.journal.push(TopoChange::DestroyedEdge(gone));
            if self.edges[keep].assoc.is_none() {
                self.edges[keep].assoc = gone_assoc;
            }
            for (_, block) in self.blocks.iter_mut().filter(|(_, b)| !b.destroyed) {
                if block.edges.contains(&keep) {
                    block.edges.retain(|e| *e != gone);
                } else {
                    for e in block.edges.iter_mut() {
                        if *e == gone {
                            *e = keep;
                        }
                    }
                }
            }
        }
    }

    /// Glue two coincident faces into one. Vertices are paired by position;
    /// the first face survives and takes over the second everywhere.
    #[instrument(skip(self, tol))]
    pub fn fuse_faces(
        &mut self,
        keep: TopoFaceId,
        gone: TopoFaceId,
        tol: &Tolerance,
    ) -> Result<(), TopologyError> {
        if keep == gone {
            return Err(TopologyError::FuseMismatch {
                reason: "a face cannot be fused with itself",
            });
        }
        let fk = self.face(keep)?;
        let fg = self.face(gone)?;
        if fk.destroyed || fg.destroyed {
            return Err(TopologyError::FuseMismatch {
                reason: "one of the faces was already fused away",
            });
        }
        if fk.vertices.len() != fg.vertices.len() {
            return Err(TopologyError::FuseMismatch {
                reason: "faces do not have the same number of corners",
            });
        }

        let keep_verts = fk.vertices.clone();
        let gone_verts = fg.vertices.clone();
        let mut pairs: Vec<(TopoVertexId, TopoVertexId)> = Vec::new();
        for &gv in &gone_verts {
            let gp = self.vertex(gv)?.point;
            let mut found = None;
            for &kv in &keep_verts {
                if tol.points_coincident(&self.vertex(kv)?.point, &gp) {
                    found = Some(kv);
                    break;
                }
            }
            let kv = found.ok_or(TopologyError::FuseMismatch {
                reason: "face corners do not coincide",
            })?;
            if pairs.iter().any(|(k, g)| *k == kv && *g != gv) {
                return Err(TopologyError::FuseMismatch {
                    reason: "two corners collapse onto the same vertex",
                });
            }
            pairs.push((kv, gv));
        }

        for (kv, gv) in pairs {
            self.merge_vertices(kv, gv)?;
        }

        let gone_assoc = self.faces[gone].assoc;
        self.faces[gone].destroyed = true;
        self.journal.push(TopoChange::DestroyedFace(gone));
        if self.faces[keep].assoc.is_none() {
            self.faces[keep].assoc = gone_assoc;
        }
        for (_, block) in self.blocks.iter_mut().filter(|(_, b)| !b.destroyed) {
            for slot in block.faces.iter_mut() {
                for f in slot.iter_mut() {
                    if *f == gone {
                        *f = keep;
                    }
                }
            }
        }
        Ok(())
    }

    // ─── Splitting ───

    /// Split the single face of a slot in two at parameter `t` of the face
    /// edge `(cut_a, cut_b)`.
    ///
    /// The cut edge (and, on a quad, its opposite edge) stays alive because
    /// faces of other slots still run along it; the cut instead overlays it
    /// with two sub-edges meeting at a new mid vertex, and joins the mid
    /// vertices with a new interior edge. On a triangle the interior edge
    /// runs from the single mid vertex to the far corner. `halves[0]`
    /// touches `cut_a`, `halves[1]` touches `cut_b`.
    #[instrument(skip(self))]
    pub fn split_face(
        &mut self,
        block: BlockId,
        face: FaceOnBlock,
        cut_a: TopoVertexId,
        cut_b: TopoVertexId,
        t: f64,
    ) -> Result<FaceSplit, TopologyError> {
        let face_id = self.face_of(block, face)?;
        let cycle = self.face(face_id)?.vertices.clone();
        let n = cycle.len();
        if n != 3 && n != 4 {
            return Err(TopologyError::NotAQuad);
        }

        // Rotate the cycle so that (w[1], w[2]) is the cut edge.
        let mut rotated = None;
        for s in 0..n {
            let at = |d: usize| cycle[(s + d) % n];
            if at(1) == cut_a && at(2) == cut_b {
                rotated = Some((0..n).map(at).collect::<Vec<_>>());
                break;
            }
            if at(1) == cut_b && at(2) == cut_a {
                let mut w: Vec<_> = (0..n).map(at).collect();
                w.reverse();
                w.rotate_right((4 - n) % n);
                rotated = Some(w);
                break;
            }
        }
        let w = rotated.ok_or(TopologyError::NotAFaceEdge)?;

        let p1 = self.vertex(w[1])?.point;
        let p2 = self.vertex(w[2])?.point;
        let mid_cut = self.add_vertex(p1 + (p2 - p1) * t);
        let cut_sub = [self.add_edge(w[1], mid_cut), self.add_edge(mid_cut, w[2])];

        let split = if n == 4 {
            let p0 = self.vertex(w[0])?.point;
            let p3 = self.vertex(w[3])?.point;
            let mid_opp = self.add_vertex(p0 + (p3 - p0) * t);
            let opp_sub = [self.add_edge(w[0], mid_opp), self.add_edge(mid_opp, w[3])];
            let mid_edge = self.add_edge(mid_cut, mid_opp);
            FaceSplit {
                mid_edge,
                mid_vertices: [mid_cut, mid_opp],
                halves: [
                    self.add_face(vec![w[0], w[1], mid_cut, mid_opp]),
                    self.add_face(vec![mid_opp, mid_cut, w[2], w[3]]),
                ],
                cut_sub,
                opp_sub: Some(opp_sub),
            }
        } else {
            // Triangle: the interior edge reaches the far corner.
            let mid_edge = self.add_edge(mid_cut, w[0]);
            FaceSplit {
                mid_edge,
                mid_vertices: [mid_cut, w[0]],
                halves: [
                    self.add_face(vec![w[0], w[1], mid_cut]),
                    self.add_face(vec![mid_cut, w[2], w[0]]),
                ],
                cut_sub,
                opp_sub: None,
            }
        };

        self.faces[face_id].destroyed = true;
        self.journal.push(TopoChange::DestroyedFace(face_id));
        self.block_mut(block)?.faces[face.index()] = split.halves.to_vec();

        Ok(split)
    }

    // ─── Journal ───

    pub fn take_journal(&mut self) -> Vec<TopoChange> {
        std::mem::take(&mut self.journal)
    }

    /// Undo everything recorded since the last `take_journal`, removing
    /// created entities and reviving destroyed ones.
    #[instrument(skip(self))]
    pub fn rollback_journal(&mut self) {
        let journal = std::mem::take(&mut self.journal);
        for change in journal.into_iter().rev() {
            match change {
                TopoChange::CreatedVertex(id) => {
                    self.vertices.remove(id);
                }
                TopoChange::CreatedEdge(id) => {
                    self.edges.remove(id);
                }
                TopoChange::CreatedFace(id) => {
                    self.faces.remove(id);
                }
                TopoChange::CreatedBlock(id) => {
                    self.blocks.remove(id);
                }
                TopoChange::DestroyedVertex(id) => {
                    if let Some(v) = self.vertices.get_mut(id) {
                        v.destroyed = false;
                    }
                }
                TopoChange::DestroyedEdge(id) => {
                    if let Some(e) = self.edges.get_mut(id) {
                        e.destroyed = false;
                    }
                }
                TopoChange::DestroyedFace(id) => {
                    if let Some(f) = self.faces.get_mut(id) {
                        f.destroyed = false;
                    }
                }
            }
        }
    }

    pub(super) fn journal_destroyed_face(&mut self, id: TopoFaceId) {
        self.journal.push(TopoChange::DestroyedFace(id));
    }

    /// Replay a recorded change set forward, or reverse it. Only destroyed
    /// flags are touched, never the arenas, so identifiers stay valid across
    /// any number of undo/redo round trips. Reversal walks the list
    /// backwards so an entity created and later destroyed by the same
    /// change set ends up in its initial state.
    pub fn apply_changes(&mut self, changes: &[TopoChange], reverse: bool) {
        let apply = |store: &mut Self, change: &TopoChange| {
            let (created_dead, destroyed_dead) = if reverse { (true, false) } else { (false, true) };
            match *change {
                TopoChange::CreatedVertex(id) => {
                    if let Some(v) = store.vertices.get_mut(id) {
                        v.destroyed = created_dead;
                    }
                }
                TopoChange::CreatedEdge(id) => {
                    if let Some(e) = store.edges.get_mut(id) {
                        e.destroyed = created_dead;
                    }
                }
                TopoChange::CreatedFace(id) => {
                    if let Some(f) = store.faces.get_mut(id) {
                        f.destroyed = created_dead;
                    }
                }
                TopoChange::CreatedBlock(id) => {
                    if let Some(b) = store.blocks.get_mut(id) {
                        b.destroyed = created_dead;
                    }
                }
                TopoChange::DestroyedVertex(id) => {
                    if let Some(v) = store.vertices.get_mut(id) {
                        v.destroyed = destroyed_dead;
                    }
                }
                TopoChange::DestroyedEdge(id) => {
                    if let Some(e) = store.edges.get_mut(id) {
                        e.destroyed = destroyed_dead;
                    }
                }
                TopoChange::DestroyedFace(id) => {
                    if let Some(f) = store.faces.get_mut(id) {
                        f.destroyed = destroyed_dead;
                    }
                }
            }
        };
        if reverse {
            for change in changes.iter().rev() {
                apply(self, change);
            }
        } else {
            for change in changes.iter() {
                apply(self, change);
            }
        }
    }

    /// Flip the destroyed flag of an entity set, for command undo/redo.
    pub fn set_destroyed_block(&mut self, id: BlockId, destroyed: bool) -> Result<(), TopologyError> {
        self.block_mut(id)?.destroyed = destroyed;
        Ok(())
    }
}

/// Outcome of [`TopoStore::split_face`].
#[derive(Debug, Clone, Copy)]
pub struct FaceSplit {
    /// Interior edge between the two halves.
    pub mid_edge: TopoEdgeId,
    /// Mid vertex on the cut edge, then the far end of the interior edge
    /// (a new mid vertex on a quad, the pre-existing far corner on a
    /// triangle).
    pub mid_vertices: [TopoVertexId; 2],
    pub halves: [TopoFaceId; 2],
    /// Sub-edges overlaying the cut edge on either side of the mid vertex.
    pub cut_sub: [TopoEdgeId; 2],
    /// Sub-edges overlaying the opposite edge, absent on a triangle.
    pub opp_sub: Option<[TopoEdgeId; 2]>,
}

/// Remove circularly-consecutive duplicates from a corner cycle.
fn dedup_cycle(cycle: &mut Vec<TopoVertexId>) {
    let mut i = 0;
    while cycle.len() > 1 && i < cycle.len() {
        let next = (i + 1) % cycle.len();
        if cycle[i] == cycle[next] {
            cycle.remove(next);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::tables::DirOnBlock;

    fn unit_corners() -> [Point3<f64>; 8] {
        let mut corners = [Point3::origin(); 8];
        for (idx, c) in corners.iter_mut().enumerate() {
            let (i, j, k) = super::super::tables::corner_bits(idx);
            *c = Point3::new(i as f64, j as f64, k as f64);
        }
        corners
    }

    fn shifted_corners(dx: f64) -> [Point3<f64>; 8] {
        let mut corners = unit_corners();
        for c in corners.iter_mut() {
            c.x += dx;
        }
        corners
    }

    #[test]
    fn block_creation_builds_full_frame() {
        let mut store = TopoStore::new();
        let b = store.add_block(unit_corners(), BlockSize::new(2, 3, 4));
        let block = store.block(b).unwrap();
        assert_eq!(block.edges.len(), 12);
        assert!(block.faces.iter().all(|slot| slot.len() == 1));
        assert_eq!(store.live_vertices().count(), 8);
        assert_eq!(block.size.along(DirOnBlock::J), 3);
    }

    #[test]
    fn fuse_shares_the_common_face() {
        let tol = Tolerance::default();
        let mut store = TopoStore::new();
        let left = store.add_block(unit_corners(), BlockSize::new(2, 2, 2));
        let right = store.add_block(shifted_corners(1.0), BlockSize::new(2, 2, 2));

        let fa = store.face_of(left, FaceOnBlock::IMax).unwrap();
        let fb = store.face_of(right, FaceOnBlock::IMin).unwrap();
        store.fuse_faces(fa, fb, &tol).unwrap();

        assert_eq!(store.face_of(right, FaceOnBlock::IMin).unwrap(), fa);
        assert_eq!(store.live_vertices().count(), 12);
        assert_eq!(store.live_edges().count(), 20);
        assert_eq!(store.live_faces().count(), 11);
    }

    #[test]
    fn fusing_twice_is_an_error() {
        let tol = Tolerance::default();
        let mut store = TopoStore::new();
        let left = store.add_block(unit_corners(), BlockSize::new(2, 2, 2));
        let right = store.add_block(shifted_corners(1.0), BlockSize::new(2, 2, 2));
        let fa = store.face_of(left, FaceOnBlock::IMax).unwrap();
        let fb = store.face_of(right, FaceOnBlock::IMin).unwrap();
        store.fuse_faces(fa, fb, &tol).unwrap();
        let err = store.fuse_faces(fa, fb, &tol);
        assert!(matches!(err, Err(TopologyError::FuseMismatch { .. })));
    }

    #[test]
    fn fuse_rejects_disjoint_faces() {
        let tol = Tolerance::default();
        let mut store = TopoStore::new();
        let left = store.add_block(unit_corners(), BlockSize::new(2, 2, 2));
        let right = store.add_block(shifted_corners(5.0), BlockSize::new(2, 2, 2));
        let fa = store.face_of(left, FaceOnBlock::IMax).unwrap();
        let fb = store.face_of(right, FaceOnBlock::IMin).unwrap();
        assert!(matches!(
            store.fuse_faces(fa, fb, &tol),
            Err(TopologyError::FuseMismatch { .. })
        ));
    }

    #[test]
    fn split_face_leaves_two_quads_in_the_slot() {
        let mut store = TopoStore::new();
        let b = store.add_block(unit_corners(), BlockSize::new(2, 2, 2));
        let v0 = store.block_vertex(b, 0).unwrap();
        let v1 = store.block_vertex(b, 1).unwrap();
        let split = store.split_face(b, FaceOnBlock::JMin, v0, v1, 0.5).unwrap();

        let slot = store.faces_of(b, FaceOnBlock::JMin).unwrap();
        assert_eq!(slot.len(), 2);
        let mid = store.vertex(split.mid_vertices[0]).unwrap();
        assert!((mid.point.x - 0.5).abs() < 1e-12);
        assert!(store.face(split.halves[0]).unwrap().contains(v0));
        assert!(store.face(split.halves[1]).unwrap().contains(v1));
        // Cut edge survives for the neighbouring slot, overlaid by sub-edges.
        assert!(!store.edge(store.edge_between(v0, v1).unwrap()).unwrap().destroyed);
        assert_eq!(store.live_edges().count(), 17);
        super::super::audit::audit(&store).unwrap();
    }

    #[test]
    fn split_of_a_collapsed_face_reaches_the_apex() {
        let mut store = TopoStore::new();
        let b = store.add_block(unit_corners(), BlockSize::new(2, 2, 2));
        let apex = store.degenerate_face_to_vertex(b, FaceOnBlock::KMax).unwrap();
        let v0 = store.block_vertex(b, 0).unwrap();
        let v2 = store.block_vertex(b, 2).unwrap();
        let split = store.split_face(b, FaceOnBlock::IMin, v0, v2, 0.5).unwrap();

        assert_eq!(split.mid_vertices[1], apex);
        assert!(split.opp_sub.is_none());
        assert_eq!(store.face(split.halves[0]).unwrap().vertices.len(), 3);
        assert_eq!(store.face(split.halves[1]).unwrap().vertices.len(), 3);
        super::super::audit::audit(&store).unwrap();
    }

    #[test]
    fn rollback_removes_created_entities() {
        let mut store = TopoStore::new();
        store.add_block(unit_corners(), BlockSize::new(2, 2, 2));
        store.take_journal();

        store.add_block(shifted_corners(3.0), BlockSize::new(2, 2, 2));
        store.rollback_journal();

        assert_eq!(store.live_blocks().count(), 1);
        assert_eq!(store.live_vertices().count(), 8);
        assert_eq!(store.live_edges().count(), 12);
    }

    #[test]
    fn merge_collapses_duplicate_edges() {
        let mut store = TopoStore::new();
        let b = store.add_block(unit_corners(), BlockSize::new(2, 2, 2));
        let v4 = store.block_vertex(b, 4).unwrap();
        let v5 = store.block_vertex(b, 5).unwrap();
        store.merge_vertices(v4, v5).unwrap();

        // Edge (4,5) died, edges (4,6)/(5,7) stay distinct.
        assert_eq!(store.live_edges().count(), 11);
        let kmax = store.face_of(b, FaceOnBlock::KMax).unwrap();
        assert_eq!(store.face(kmax).unwrap().vertices.len(), 3);
    }
}
