//! Structural checks over a topology arena.
//!
//! `audit` validates the referential integrity every modeling operation is
//! supposed to maintain; generators run it once a build is complete.

use std::collections::HashMap;

use tracing::instrument;

use crate::geom::GeomStore;

use super::store::{GeomAssociation, TopoFaceId, TopoStore, TopologyError};

fn fail(detail: String) -> Result<(), TopologyError> {
    Err(TopologyError::Audit { detail })
}

#[instrument(skip(store))]
pub fn audit(store: &TopoStore) -> Result<(), TopologyError> {
    for (id, edge) in store.live_edges() {
        if edge.ends[0] == edge.ends[1] {
            return fail(format!("edge {id:?} joins a vertex to itself"));
        }
        for end in edge.ends {
            if store.vertex(end).map(|v| v.destroyed).unwrap_or(true) {
                return fail(format!("edge {id:?} references a dead vertex"));
            }
        }
        if matches!(edge.assoc, GeomAssociation::Vertex(_)) {
            return fail(format!("edge {id:?} is associated to a geometric vertex"));
        }
    }

    for (id, face) in store.live_faces() {
        let n = face.vertices.len();
        if n != 3 && n != 4 {
            return fail(format!("face {id:?} has {n} corners"));
        }
        for i in 0..n {
            let a = face.vertices[i];
            let b = face.vertices[(i + 1) % n];
            if a == b {
                return fail(format!("face {id:?} repeats a corner"));
            }
            if store.edge_between(a, b).is_err() {
                return fail(format!("face {id:?} has an unbacked side"));
            }
        }
        if matches!(
            face.assoc,
            GeomAssociation::Vertex(_) | GeomAssociation::Curve(_)
        ) {
            return fail(format!("face {id:?} is associated below dimension 2"));
        }
    }

    for (id, block) in store.live_blocks() {
        for &v in &block.verts {
            if store.vertex(v).map(|v| v.destroyed).unwrap_or(true) {
                return fail(format!("block {id:?} references a dead vertex"));
            }
        }
        for &e in &block.edges {
            let edge = store
                .edge(e)
                .map_err(|_| TopologyError::Audit {
                    detail: format!("block {id:?} references a missing edge"),
                })?;
            if edge.destroyed {
                return fail(format!("block {id:?} references a dead edge"));
            }
            for end in edge.ends {
                if !block.verts.contains(&end) {
                    return fail(format!("block {id:?} edge leaves the block corners"));
                }
            }
        }
        for slot in &block.faces {
            for &f in slot {
                let face = store
                    .face(f)
                    .map_err(|_| TopologyError::Audit {
                        detail: format!("block {id:?} references a missing face"),
                    })?;
                if face.destroyed {
                    return fail(format!("block {id:?} references a dead face"));
                }
            }
        }
        if block.size.cells() == 0 {
            return fail(format!("block {id:?} has an empty discretization"));
        }
        if matches!(
            block.assoc,
            GeomAssociation::Vertex(_) | GeomAssociation::Curve(_) | GeomAssociation::Surface(_)
        ) {
            return fail(format!("block {id:?} is associated below dimension 3"));
        }
    }

    Ok(())
}

/// Association checks that need the geometry at hand: an edge lying on a
/// curve must keep each endpoint unassociated, on that same curve, or on
/// one of the curve's end vertices.
#[instrument(skip(store, geom))]
pub fn audit_associations(store: &TopoStore, geom: &GeomStore) -> Result<(), TopologyError> {
    for (id, edge) in store.live_edges() {
        let curve = match edge.assoc {
            GeomAssociation::Curve(c) => c,
            _ => continue,
        };
        let ends = match geom.curve(curve) {
            Ok(c) => &c.ends,
            Err(_) => return fail(format!("edge {id:?} references a missing curve")),
        };
        for end in edge.ends {
            let ok = match store.vertex(end)?.assoc {
                GeomAssociation::None => true,
                GeomAssociation::Curve(c) => c == curve,
                GeomAssociation::Vertex(v) => ends.contains(&v),
                _ => false,
            };
            if !ok {
                return fail(format!(
                    "edge {id:?} lies on a curve but endpoint {end:?} is pinned elsewhere"
                ));
            }
        }
    }
    Ok(())
}

/// Faces referenced by exactly one live block, i.e. on the boundary of the
/// block assembly.
pub fn boundary_faces(store: &TopoStore) -> Vec<TopoFaceId> {
    let mut refs: HashMap<TopoFaceId, usize> = HashMap::new();
    for (_, block) in store.live_blocks() {
        for slot in &block.faces {
            for &f in slot {
                *refs.entry(f).or_insert(0) += 1;
            }
        }
    }
    let mut out: Vec<TopoFaceId> = refs
        .into_iter()
        .filter(|&(_, count)| count == 1)
        .map(|(f, _)| f)
        .collect();
    out.sort();
    out
}

/// Boundary faces, their edges and vertices that carry no geometric
/// association. A finished o-grid build must leave this empty.
pub fn unassociated_boundary(store: &TopoStore) -> Result<Vec<String>, TopologyError> {
    let mut missing = Vec::new();
    for f in boundary_faces(store) {
        let face = store.face(f)?;
        if face.assoc.is_none() {
            missing.push(format!("face {f:?}"));
        }
        for (i, &v) in face.vertices.iter().enumerate() {
            if store.vertex(v)?.assoc.is_none() {
                missing.push(format!("vertex {v:?}"));
            }
            let next = face.vertices[(i + 1) % face.vertices.len()];
            let e = store.edge_between(v, next)?;
            if store.edge(e)?.assoc.is_none() {
                missing.push(format!("edge {e:?}"));
            }
        }
    }
    missing.sort();
    missing.dedup();
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::CurveKind;
    use crate::topology::store::BlockSize;
    use crate::topology::tables::{corner_bits, FaceOnBlock};
    use crate::Tolerance;
    use nalgebra::Point3;

    fn unit_corners(dx: f64) -> [Point3<f64>; 8] {
        let mut corners = [Point3::origin(); 8];
        for (idx, c) in corners.iter_mut().enumerate() {
            let (i, j, k) = corner_bits(idx);
            *c = Point3::new(i as f64 + dx, j as f64, k as f64);
        }
        corners
    }

    #[test]
    fn fresh_block_passes_audit() {
        let mut store = TopoStore::new();
        store.add_block(unit_corners(0.0), BlockSize::new(2, 2, 2));
        audit(&store).unwrap();
    }

    #[test]
    fn fused_pair_has_ten_boundary_faces() {
        let tol = Tolerance::default();
        let mut store = TopoStore::new();
        let left = store.add_block(unit_corners(0.0), BlockSize::new(2, 2, 2));
        let right = store.add_block(unit_corners(1.0), BlockSize::new(2, 2, 2));
        let fa = store.face_of(left, FaceOnBlock::IMax).unwrap();
        let fb = store.face_of(right, FaceOnBlock::IMin).unwrap();
        store.fuse_faces(fa, fb, &tol).unwrap();

        audit(&store).unwrap();
        let boundary = boundary_faces(&store);
        assert_eq!(boundary.len(), 10);
        assert!(!boundary.contains(&fa));
    }

    #[test]
    fn degenerate_block_passes_audit() {
        let mut store = TopoStore::new();
        let b = store.add_block(unit_corners(0.0), BlockSize::new(2, 2, 2));
        let v4 = store.block_vertex(b, 4).unwrap();
        let v5 = store.block_vertex(b, 5).unwrap();
        store
            .degenerate_face_to_edge(b, FaceOnBlock::KMax, v4, v5)
            .unwrap();
        audit(&store).unwrap();
    }

    #[test]
    fn edge_on_a_curve_rejects_a_stray_endpoint() {
        let mut geom = GeomStore::new();
        let a = Point3::origin();
        let b = Point3::new(1.0, 0.0, 0.0);
        let ga = geom.add_vertex(a);
        let gb = geom.add_vertex(b);
        let curve = geom.add_curve(CurveKind::Segment { a, b }, vec![ga, gb]);
        let stray = geom.add_vertex(Point3::new(5.0, 5.0, 5.0));

        let mut store = TopoStore::new();
        let blk = store.add_block(unit_corners(0.0), BlockSize::new(2, 2, 2));
        let v0 = store.block_vertex(blk, 0).unwrap();
        let v1 = store.block_vertex(blk, 1).unwrap();
        let e = store.edge_between(v0, v1).unwrap();
        store.edge_mut(e).unwrap().assoc = GeomAssociation::Curve(curve);

        // Unassociated endpoints pass, as do the curve and its end vertices.
        audit_associations(&store, &geom).unwrap();
        store.vertex_mut(v0).unwrap().assoc = GeomAssociation::Vertex(ga);
        store.vertex_mut(v1).unwrap().assoc = GeomAssociation::Curve(curve);
        audit_associations(&store, &geom).unwrap();

        // An endpoint pinned on an unrelated vertex is reported.
        store.vertex_mut(v1).unwrap().assoc = GeomAssociation::Vertex(stray);
        assert!(matches!(
            audit_associations(&store, &geom),
            Err(TopologyError::Audit { .. })
        ));
    }
}
