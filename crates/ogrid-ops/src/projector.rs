//! Projection passes that complete an association sparsely seeded by a
//! builder.
//!
//! Builders that pin their corners straight onto geometric vertices leave
//! edges and faces unassociated; these passes walk the incidence of the
//! geometry to find, for each such entity, the boundary element its
//! endpoints have in common.

use nalgebra::Point3;
use ogrid_kernel::geom::{GeomCurveId, GeomRef, GeomSurfaceId};
use ogrid_kernel::topology::GeomAssociation;
use tracing::instrument;

use crate::builder::BuildCtx;
use crate::error::BuildError;

fn as_geom_ref(assoc: GeomAssociation) -> Option<GeomRef> {
    match assoc {
        GeomAssociation::Vertex(v) => Some(GeomRef::Vertex(v)),
        GeomAssociation::Curve(c) => Some(GeomRef::Curve(c)),
        GeomAssociation::Surface(s) => Some(GeomRef::Surface(s)),
        // A volume carries no boundary constraint.
        GeomAssociation::Volume(_) | GeomAssociation::None => None,
    }
}

/// Move every vertex pinned to a geometric vertex onto its exact position.
#[instrument(skip(ctx))]
pub(crate) fn snap_vertices(ctx: &mut BuildCtx<'_>) -> Result<(), BuildError> {
    let pinned: Vec<_> = ctx
        .topo
        .live_vertices()
        .filter_map(|(id, v)| match v.assoc {
            GeomAssociation::Vertex(gv) => Some((id, gv)),
            _ => None,
        })
        .collect();
    for (id, gv) in pinned {
        let point = ctx.geom.vertex(gv)?.point;
        ctx.topo.vertex_mut(id)?.point = point;
    }
    Ok(())
}

/// Associate unassociated edges whose endpoints share a curve, or failing
/// that a surface. Edges with an unconstrained endpoint are left alone.
#[instrument(skip(ctx))]
pub(crate) fn project_edges_on_curves(ctx: &mut BuildCtx<'_>) -> Result<(), BuildError> {
    let candidates: Vec<_> = ctx
        .topo
        .live_edges()
        .filter(|(_, e)| e.assoc.is_none())
        .map(|(id, e)| (id, e.ends))
        .collect();

    for (id, ends) in candidates {
        let ra = match as_geom_ref(ctx.topo.vertex(ends[0])?.assoc) {
            Some(r) => r,
            None => continue,
        };
        let rb = match as_geom_ref(ctx.topo.vertex(ends[1])?.assoc) {
            Some(r) => r,
            None => continue,
        };
        let pa = ctx.topo.vertex(ends[0])?.point;
        let pb = ctx.topo.vertex(ends[1])?.point;
        let mid = nalgebra::center(&pa, &pb);

        let curves_a = ctx.geom.reachable_curves(&ra);
        let curves_b = ctx.geom.reachable_curves(&rb);
        let common: Vec<GeomCurveId> = curves_a
            .iter()
            .copied()
            .filter(|c| curves_b.contains(c))
            .collect();
        if let Some(best) = closest(ctx, &mid, common.iter().map(|&c| GeomRef::Curve(c)))? {
            if let GeomRef::Curve(c) = best {
                ctx.topo.edge_mut(id)?.assoc = GeomAssociation::Curve(c);
            }
            continue;
        }

        let surfs_a = ctx.geom.reachable_surfaces(&ra);
        let surfs_b = ctx.geom.reachable_surfaces(&rb);
        let common: Vec<GeomSurfaceId> = surfs_a
            .iter()
            .copied()
            .filter(|s| surfs_b.contains(s))
            .collect();
        if let Some(GeomRef::Surface(s)) =
            closest(ctx, &mid, common.iter().map(|&s| GeomRef::Surface(s)))?
        {
            ctx.topo.edge_mut(id)?.assoc = GeomAssociation::Surface(s);
        }
    }
    Ok(())
}

/// Associate unassociated faces whose corners all share a surface.
#[instrument(skip(ctx))]
pub(crate) fn project_faces_on_surfaces(ctx: &mut BuildCtx<'_>) -> Result<(), BuildError> {
    let candidates: Vec<_> = ctx
        .topo
        .live_faces()
        .filter(|(_, f)| f.assoc.is_none())
        .map(|(id, f)| (id, f.vertices.clone()))
        .collect();

    'faces: for (id, cycle) in candidates {
        let mut common: Option<Vec<GeomSurfaceId>> = None;
        let mut centroid = Point3::origin();
        for &v in &cycle {
            let vert = ctx.topo.vertex(v)?;
            centroid += vert.point.coords;
            let r = match as_geom_ref(vert.assoc) {
                Some(r) => r,
                None => continue 'faces,
            };
            let surfs = ctx.geom.reachable_surfaces(&r);
            common = Some(match common {
                None => surfs,
                Some(prev) => prev.into_iter().filter(|s| surfs.contains(s)).collect(),
            });
        }
        centroid.coords /= cycle.len() as f64;
        let common = common.unwrap_or_default();
        if let Some(GeomRef::Surface(s)) =
            closest(ctx, &centroid, common.iter().map(|&s| GeomRef::Surface(s)))?
        {
            ctx.topo.face_mut(id)?.assoc = GeomAssociation::Surface(s);
        }
    }
    Ok(())
}

/// The candidate whose projection lies closest to `p`.
fn closest(
    ctx: &BuildCtx<'_>,
    p: &Point3<f64>,
    refs: impl Iterator<Item = GeomRef>,
) -> Result<Option<GeomRef>, BuildError> {
    let mut best: Option<(f64, GeomRef)> = None;
    for r in refs {
        let q = ctx.geom.project(p, &r)?;
        let d = (q - p).norm();
        if best.as_ref().map_or(true, |(bd, _)| d < *bd) {
            best = Some((d, r));
        }
    }
    Ok(best.map(|(_, r)| r))
}
