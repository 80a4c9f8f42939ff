//! Block face collapses.
//!
//! A collapse rotates the block so the doomed face sits on k_max, then merges
//! its corners pairwise. The block keeps its eight-slot corner view with
//! repeated entries, so every index table keeps working on degenerate blocks.

use tracing::instrument;

use super::store::{BlockId, TopoEdgeId, TopoFaceId, TopoStore, TopoVertexId, TopologyError};
use super::tables::{
    dir_permutation_to_kmax, face_permutation_to_kmax, permutation_to_kmax, FaceOnBlock,
};

impl TopoStore {
    /// Whether `face_id` also sits in a face slot of another live block.
    /// Fusion and collapse are mutually exclusive for a face.
    fn face_is_shared(&self, block: BlockId, face_id: TopoFaceId) -> bool {
        self.live_blocks()
            .filter(|&(id, _)| id != block)
            .any(|(_, b)| b.faces.iter().any(|slot| slot.contains(&face_id)))
    }

    /// Rotate the block corners so `face` becomes the k_max face. Face slots
    /// and per-direction sizes follow the rotation; edges are untouched.
    #[instrument(skip(self))]
    pub fn permute_to_kmax(&mut self, block: BlockId, face: FaceOnBlock) -> Result<(), TopologyError> {
        if face == FaceOnBlock::KMax {
            return Ok(());
        }
        if self.block(block)?.is_degenerate() {
            return Err(TopologyError::DegenerateBlock);
        }

        let perm = permutation_to_kmax(face);
        let face_perm = face_permutation_to_kmax(face);
        let dir_perm = dir_permutation_to_kmax(face);

        let b = self.block_mut(block)?;
        let old_verts = b.verts;
        for (new_idx, &old_idx) in perm.iter().enumerate() {
            b.verts[new_idx] = old_verts[old_idx];
        }
        let old_faces = b.faces.clone();
        for new_face in FaceOnBlock::ALL {
            b.faces[new_face.index()] = old_faces[face_perm[new_face.index()].index()].clone();
        }
        let old_size = b.size;
        b.size.n_i = old_size.along(dir_perm[0]);
        b.size.n_j = old_size.along(dir_perm[1]);
        b.size.n_k = old_size.along(dir_perm[2]);
        Ok(())
    }

    /// Collapse a block face onto one of its edges.
    ///
    /// `merge_a` and `merge_b` are two adjacent corners of the face; they are
    /// merged together, as is the opposite corner pair. What remains of the
    /// face is the edge joining the two survivors, which is returned. The
    /// two faces crossing that edge become triangles. A face fused with
    /// another block cannot be collapsed.
    #[instrument(skip(self))]
    pub fn degenerate_face_to_edge(
        &mut self,
        block: BlockId,
        face: FaceOnBlock,
        merge_a: TopoVertexId,
        merge_b: TopoVertexId,
    ) -> Result<TopoEdgeId, TopologyError> {
        let face_id = self.face_of(block, face)?;
        if self.face(face_id)?.vertices.len() != 4 {
            return Err(TopologyError::NotAQuad);
        }
        if self.face_is_shared(block, face_id) {
            return Err(TopologyError::FaceAlreadyFused);
        }
        self.permute_to_kmax(block, face)?;

        // Corner indices of the merged pair, post-rotation.
        let b = self.block(block)?;
        let idx_of = |v: TopoVertexId| b.verts[4..8].iter().position(|&w| w == v).map(|p| p + 4);
        let ia = idx_of(merge_a).ok_or(TopologyError::NotAFaceEdge)?;
        let ib = idx_of(merge_b).ok_or(TopologyError::NotAFaceEdge)?;
        // The pair must span a face edge, not the diagonal.
        let (oa, ob) = match (ia.min(ib), ia.max(ib)) {
            (4, 5) => (6, 7),
            (6, 7) => (4, 5),
            (4, 6) => (5, 7),
            (5, 7) => (4, 6),
            _ => return Err(TopologyError::NotAFaceEdge),
        };
        let gone_b = merge_b;
        let keep_o = self.block_vertex(block, oa)?;
        let gone_o = self.block_vertex(block, ob)?;

        self.merge_vertices(merge_a, gone_b)?;
        self.merge_vertices(keep_o, gone_o)?;

        // The collapsed face died inside the merges; clear its slot.
        let face_id = {
            let b = self.block_mut(block)?;
            let slot = &mut b.faces[FaceOnBlock::KMax.index()];
            let id = slot.first().copied();
            slot.clear();
            id
        };
        if let Some(id) = face_id {
            if let Ok(f) = self.face_mut(id) {
                if !f.destroyed {
                    f.destroyed = true;
                    self.journal_destroyed_face(id);
                }
            }
        }

        self.edge_between(merge_a, keep_o)
    }

    /// Collapse a block face onto a single vertex. The first corner of the
    /// rotated face survives and is returned. A face fused with another
    /// block cannot be collapsed.
    #[instrument(skip(self))]
    pub fn degenerate_face_to_vertex(
        &mut self,
        block: BlockId,
        face: FaceOnBlock,
    ) -> Result<TopoVertexId, TopologyError> {
        let face_id = self.face_of(block, face)?;
        if self.face(face_id)?.vertices.len() != 4 {
            return Err(TopologyError::NotAQuad);
        }
        if self.face_is_shared(block, face_id) {
            return Err(TopologyError::FaceAlreadyFused);
        }
        self.permute_to_kmax(block, face)?;

        let survivor = self.block_vertex(block, 4)?;
        for corner in [5, 6, 7] {
            let gone = self.block_vertex(block, corner)?;
            self.merge_vertices(survivor, gone)?;
        }

        let face_id = {
            let b = self.block_mut(block)?;
            let slot = &mut b.faces[FaceOnBlock::KMax.index()];
            let id = slot.first().copied();
            slot.clear();
            id
        };
        if let Some(id) = face_id {
            if let Ok(f) = self.face_mut(id) {
                if !f.destroyed {
                    f.destroyed = true;
                    self.journal_destroyed_face(id);
                }
            }
        }

        Ok(survivor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::store::BlockSize;
    use crate::topology::tables::corner_bits;
    use crate::Tolerance;
    use nalgebra::Point3;

    fn cube_corners(dx: f64) -> [Point3<f64>; 8] {
        let mut corners = [Point3::origin(); 8];
        for (idx, c) in corners.iter_mut().enumerate() {
            let (i, j, k) = corner_bits(idx);
            *c = Point3::new(i as f64 + dx, j as f64, k as f64);
        }
        corners
    }

    fn wedge_corners() -> [Point3<f64>; 8] {
        // Top corners pinched by pairs: 4 with 5, 6 with 7.
        let mut corners = [Point3::origin(); 8];
        for (idx, c) in corners.iter_mut().enumerate() {
            let (i, j, k) = corner_bits(idx);
            *c = if k == 1 {
                Point3::new(0.5, j as f64, 1.0)
            } else {
                Point3::new(i as f64, j as f64, 0.0)
            };
        }
        corners
    }

    #[test]
    fn collapse_to_edge_leaves_five_faces_and_six_corners() {
        let mut store = TopoStore::new();
        let b = store.add_block(wedge_corners(), BlockSize::new(2, 3, 4));
        let v4 = store.block_vertex(b, 4).unwrap();
        let v5 = store.block_vertex(b, 5).unwrap();

        let ridge = store
            .degenerate_face_to_edge(b, FaceOnBlock::KMax, v4, v5)
            .unwrap();

        let block = store.block(b).unwrap();
        assert!(block.faces[FaceOnBlock::KMax.index()].is_empty());
        assert_eq!(block.distinct_verts().len(), 6);
        assert_eq!(store.live_faces().count(), 5);
        // The ridge runs along j between the two merged pairs.
        let e = store.edge(ridge).unwrap();
        assert!(e.joins(v4, store.block_vertex(b, 6).unwrap()));
        // The faces crossing the ridge became triangles.
        let imin = store.face_of(b, FaceOnBlock::IMin).unwrap();
        assert_eq!(store.face(imin).unwrap().vertices.len(), 4);
        let jmin = store.face_of(b, FaceOnBlock::JMin).unwrap();
        assert_eq!(store.face(jmin).unwrap().vertices.len(), 3);
    }

    #[test]
    fn collapse_to_vertex_leaves_a_pyramid() {
        let mut store = TopoStore::new();
        let b = store.add_block(wedge_corners(), BlockSize::new(2, 2, 2));
        let apex = store.degenerate_face_to_vertex(b, FaceOnBlock::KMax).unwrap();

        let block = store.block(b).unwrap();
        assert_eq!(block.distinct_verts().len(), 5);
        assert!(block.faces[FaceOnBlock::KMax.index()].is_empty());
        assert_eq!(store.live_faces().count(), 5);
        for face in [
            FaceOnBlock::IMin,
            FaceOnBlock::IMax,
            FaceOnBlock::JMin,
            FaceOnBlock::JMax,
        ] {
            let id = store.face_of(b, face).unwrap();
            let f = store.face(id).unwrap();
            assert_eq!(f.vertices.len(), 3);
            assert!(f.contains(apex));
        }
    }

    #[test]
    fn collapse_rejects_a_fused_face() {
        let tol = Tolerance::default();
        let mut store = TopoStore::new();
        let left = store.add_block(cube_corners(0.0), BlockSize::new(2, 2, 2));
        let right = store.add_block(cube_corners(1.0), BlockSize::new(2, 2, 2));
        let fa = store.face_of(left, FaceOnBlock::IMax).unwrap();
        let fb = store.face_of(right, FaceOnBlock::IMin).unwrap();
        store.fuse_faces(fa, fb, &tol).unwrap();

        let v5 = store.block_vertex(left, 5).unwrap();
        let v7 = store.block_vertex(left, 7).unwrap();
        assert!(matches!(
            store.degenerate_face_to_edge(left, FaceOnBlock::IMax, v5, v7),
            Err(TopologyError::FaceAlreadyFused)
        ));
        assert!(matches!(
            store.degenerate_face_to_vertex(right, FaceOnBlock::IMin),
            Err(TopologyError::FaceAlreadyFused)
        ));
        // The shared face and both blocks are left intact.
        assert_eq!(store.live_faces().count(), 11);
        assert_eq!(store.block(left).unwrap().distinct_verts().len(), 8);
    }

    #[test]
    fn collapse_rejects_a_diagonal_pair() {
        let mut store = TopoStore::new();
        let b = store.add_block(wedge_corners(), BlockSize::new(2, 2, 2));
        let v4 = store.block_vertex(b, 4).unwrap();
        let v7 = store.block_vertex(b, 7).unwrap();
        assert!(matches!(
            store.degenerate_face_to_edge(b, FaceOnBlock::KMax, v4, v7),
            Err(TopologyError::NotAFaceEdge)
        ));
    }
}
