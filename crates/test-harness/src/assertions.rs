//! Assertion helpers with diagnostic output.
//!
//! Every failure names its context and spells out expected vs actual, so a
//! scenario that trips half way through points straight at the step.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;
use ogrid_kernel::geom::{GeomStore, GeomVolumeId};
use ogrid_kernel::topology::{audit, BlockId, GeomAssociation, TopoEdgeId, TopoFaceId, TopoStore};
use ogrid_kernel::Tolerance;

use crate::helpers::HarnessError;

fn fail(detail: String) -> HarnessError {
    HarnessError::AssertionFailed { detail }
}

/// Assert the number of live blocks.
pub fn assert_block_count(topo: &TopoStore, expected: usize, ctx: &str) -> Result<(), HarnessError> {
    let found = topo.live_blocks().count();
    if found != expected {
        return Err(fail(format!("[{ctx}] expected {expected} blocks, got {found}")));
    }
    Ok(())
}

/// Assert that every boundary face, edge and vertex of the topology carries
/// a geometric association.
pub fn assert_boundary_fully_associated(topo: &TopoStore, ctx: &str) -> Result<(), HarnessError> {
    let missing = audit::unassociated_boundary(topo)?;
    if !missing.is_empty() {
        return Err(fail(format!(
            "[{ctx}] {} unassociated boundary entities: {}",
            missing.len(),
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Assert that no association points outside `vol`: every target is the
/// volume itself or one of its boundary surfaces, curves or vertices.
pub fn assert_associations_inside_volume(
    topo: &TopoStore,
    geom: &GeomStore,
    vol: GeomVolumeId,
    ctx: &str,
) -> Result<(), HarnessError> {
    let boundary = geom.volume(vol)?;
    let check = |assoc: &GeomAssociation, what: String| -> Result<(), HarnessError> {
        let ok = match assoc {
            GeomAssociation::None => true,
            GeomAssociation::Vertex(v) => boundary.vertices.contains(v),
            GeomAssociation::Curve(c) => boundary.curves.contains(c),
            GeomAssociation::Surface(s) => boundary.surfaces.contains(s),
            GeomAssociation::Volume(v) => *v == vol,
        };
        if ok {
            Ok(())
        } else {
            Err(fail(format!("[{ctx}] {what} is associated outside the volume")))
        }
    };
    for (id, v) in topo.live_vertices() {
        check(&v.assoc, format!("vertex {id:?}"))?;
    }
    for (id, e) in topo.live_edges() {
        check(&e.assoc, format!("edge {id:?}"))?;
    }
    for (id, f) in topo.live_faces() {
        check(&f.assoc, format!("face {id:?}"))?;
    }
    for (id, b) in topo.live_blocks() {
        check(&b.assoc, format!("block {id:?}"))?;
    }
    Ok(())
}

/// Assert all given blocks share exactly one common edge and return it.
pub fn assert_common_edge(
    topo: &TopoStore,
    blocks: &[BlockId],
    ctx: &str,
) -> Result<TopoEdgeId, HarnessError> {
    let mut common: Option<HashSet<TopoEdgeId>> = None;
    for &b in blocks {
        let edges: HashSet<TopoEdgeId> = topo.block(b)?.edges.iter().copied().collect();
        common = Some(match common {
            None => edges,
            Some(acc) => acc.intersection(&edges).copied().collect(),
        });
    }
    let common = common.unwrap_or_default();
    if common.len() != 1 {
        return Err(fail(format!(
            "[{ctx}] expected one shared edge across {} blocks, got {}",
            blocks.len(),
            common.len()
        )));
    }
    common
        .into_iter()
        .next()
        .ok_or_else(|| fail(format!("[{ctx}] empty edge set")))
}

/// Assert all given blocks share one common vertex sitting at `point`.
pub fn assert_common_vertex_at(
    topo: &TopoStore,
    blocks: &[BlockId],
    point: &Point3<f64>,
    tol: &Tolerance,
    ctx: &str,
) -> Result<(), HarnessError> {
    let mut common: Option<HashSet<_>> = None;
    for &b in blocks {
        let verts: HashSet<_> = topo.block(b)?.distinct_verts().into_iter().collect();
        common = Some(match common {
            None => verts,
            Some(acc) => acc.intersection(&verts).copied().collect(),
        });
    }
    let common = common.unwrap_or_default();
    if common.len() != 1 {
        return Err(fail(format!(
            "[{ctx}] expected one shared vertex across {} blocks, got {}",
            blocks.len(),
            common.len()
        )));
    }
    for v in common {
        let p = topo.vertex(v)?.point;
        if !tol.points_coincident(&p, point) {
            return Err(fail(format!(
                "[{ctx}] shared vertex sits at {p:?}, expected {point:?}"
            )));
        }
    }
    Ok(())
}

/// Faces referenced by exactly two of the given blocks, with their owners.
fn shared_faces(
    topo: &TopoStore,
    blocks: &[BlockId],
) -> Result<HashMap<TopoFaceId, Vec<BlockId>>, HarnessError> {
    let mut owners: HashMap<TopoFaceId, Vec<BlockId>> = HashMap::new();
    for &b in blocks {
        for slot in &topo.block(b)?.faces {
            for &f in slot {
                owners.entry(f).or_default().push(b);
            }
        }
    }
    owners.retain(|_, bs| bs.len() == 2);
    Ok(owners)
}

/// Assert the given blocks form one closed fusion ring: each shares a face
/// with exactly two others and the ring is connected.
pub fn assert_closed_ring(topo: &TopoStore, blocks: &[BlockId], ctx: &str) -> Result<(), HarnessError> {
    let mut neighbors: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
    for (_, pair) in shared_faces(topo, blocks)? {
        neighbors.entry(pair[0]).or_default().push(pair[1]);
        neighbors.entry(pair[1]).or_default().push(pair[0]);
    }
    for &b in blocks {
        let n = neighbors.get(&b).map(Vec::len).unwrap_or(0);
        if n != 2 {
            return Err(fail(format!(
                "[{ctx}] block {b:?} shares faces with {n} ring members, expected 2"
            )));
        }
    }
    let mut seen = HashSet::new();
    let mut at = blocks[0];
    let mut prev: Option<BlockId> = None;
    loop {
        seen.insert(at);
        let next = neighbors[&at]
            .iter()
            .copied()
            .find(|&n| Some(n) != prev && !seen.contains(&n));
        match next {
            Some(n) => {
                prev = Some(at);
                at = n;
            }
            None => break,
        }
    }
    if seen.len() != blocks.len() {
        return Err(fail(format!(
            "[{ctx}] ring is not connected: reached {} of {} blocks",
            seen.len(),
            blocks.len()
        )));
    }
    Ok(())
}

/// Assert every corner of `block` sits at radial distance `expected` from
/// the z axis.
pub fn assert_corner_radius(
    topo: &TopoStore,
    block: BlockId,
    expected: f64,
    tol: &Tolerance,
    ctx: &str,
) -> Result<(), HarnessError> {
    for v in topo.block(block)?.distinct_verts() {
        let p = topo.vertex(v)?.point;
        let r = (p.x * p.x + p.y * p.y).sqrt();
        if (r - expected).abs() > tol.coincidence {
            return Err(fail(format!(
                "[{ctx}] corner at {p:?} has radius {r:.6}, expected {expected:.6}"
            )));
        }
    }
    Ok(())
}
