//! Reference closure of an entity, for command pre-execution bookkeeping.
//!
//! A command declares up front which entities its execution may read or
//! touch. The closure of a seed entity is the seed itself, everything
//! transitively below it (volume to surfaces to curves to vertices, block to
//! faces to edges to vertices) and everything transitively above it. The
//! lists are per dimension, sorted and deduplicated, so two closures compare
//! and intersect cheaply.

use ogrid_kernel::EntityRef;
use ogrid_types::Dim;

use crate::context::Context;

/// Per-dimension closure sets. Each list is sorted by the entity order.
#[derive(Debug, Clone, Default)]
pub struct Closure {
    pub per_dim: [Vec<EntityRef>; 4],
}

impl Closure {
    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.per_dim[entity.dim().as_usize()].binary_search(entity).is_ok()
    }

    pub fn dim(&self, dim: Dim) -> &[EntityRef] {
        &self.per_dim[dim.as_usize()]
    }

    pub fn len(&self) -> usize {
        self.per_dim.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.per_dim.iter().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRef> {
        self.per_dim.iter().flatten()
    }

    fn finish(mut members: Vec<EntityRef>) -> Self {
        members.sort();
        members.dedup();
        let mut per_dim: [Vec<EntityRef>; 4] = Default::default();
        for m in members {
            per_dim[m.dim().as_usize()].push(m);
        }
        Self { per_dim }
    }
}

/// One step down the incidence hierarchy.
fn down_neighbors(ctx: &Context, entity: &EntityRef) -> Vec<EntityRef> {
    let mut out = Vec::new();
    match *entity {
        EntityRef::GeomVolume(v) => {
            if let Ok(vol) = ctx.geom.volume(v) {
                out.extend(vol.surfaces.iter().map(|&s| EntityRef::GeomSurface(s)));
                out.extend(vol.curves.iter().map(|&c| EntityRef::GeomCurve(c)));
                out.extend(vol.vertices.iter().map(|&p| EntityRef::GeomVertex(p)));
            }
        }
        EntityRef::GeomSurface(s) => {
            if let Ok(surf) = ctx.geom.surface(s) {
                out.extend(surf.curves.iter().map(|&c| EntityRef::GeomCurve(c)));
            }
        }
        EntityRef::GeomCurve(c) => {
            if let Ok(curve) = ctx.geom.curve(c) {
                out.extend(curve.ends.iter().map(|&p| EntityRef::GeomVertex(p)));
            }
        }
        EntityRef::GeomVertex(_) | EntityRef::TopoVertex(_) => {}
        EntityRef::Block(b) => {
            if let Ok(block) = ctx.topo.block(b) {
                for slot in &block.faces {
                    out.extend(slot.iter().map(|&f| EntityRef::TopoFace(f)));
                }
                out.extend(block.edges.iter().map(|&e| EntityRef::TopoEdge(e)));
                out.extend(block.verts.iter().map(|&v| EntityRef::TopoVertex(v)));
            }
        }
        EntityRef::TopoFace(f) => {
            if let Ok(edges) = ctx.topo.edges_of_face(f) {
                out.extend(edges.into_iter().map(EntityRef::TopoEdge));
            }
            if let Ok(face) = ctx.topo.face(f) {
                out.extend(face.vertices.iter().map(|&v| EntityRef::TopoVertex(v)));
            }
        }
        EntityRef::TopoEdge(e) => {
            if let Ok(edge) = ctx.topo.edge(e) {
                out.extend(edge.ends.iter().map(|&v| EntityRef::TopoVertex(v)));
            }
        }
    }
    out
}

/// One step up the incidence hierarchy.
fn up_neighbors(ctx: &Context, entity: &EntityRef) -> Vec<EntityRef> {
    let mut out = Vec::new();
    match *entity {
        EntityRef::GeomVertex(v) => {
            out.extend(ctx.geom.curves_of_vertex(v).into_iter().map(EntityRef::GeomCurve));
        }
        EntityRef::GeomCurve(c) => {
            out.extend(ctx.geom.surfaces_of_curve(c).into_iter().map(EntityRef::GeomSurface));
        }
        EntityRef::GeomSurface(s) => {
            out.extend(ctx.geom.volumes_of_surface(s).into_iter().map(EntityRef::GeomVolume));
        }
        EntityRef::GeomVolume(_) | EntityRef::Block(_) => {}
        EntityRef::TopoVertex(v) => {
            out.extend(
                ctx.topo
                    .live_edges()
                    .filter(|(_, e)| e.ends.contains(&v))
                    .map(|(id, _)| EntityRef::TopoEdge(id)),
            );
        }
        EntityRef::TopoEdge(e) => {
            for (fid, _) in ctx.topo.live_faces() {
                if let Ok(edges) = ctx.topo.edges_of_face(fid) {
                    if edges.contains(&e) {
                        out.push(EntityRef::TopoFace(fid));
                    }
                }
            }
            out.extend(
                ctx.topo
                    .live_blocks()
                    .filter(|(_, b)| b.edges.contains(&e))
                    .map(|(id, _)| EntityRef::Block(id)),
            );
        }
        EntityRef::TopoFace(f) => {
            out.extend(
                ctx.topo
                    .live_blocks()
                    .filter(|(_, b)| b.faces.iter().any(|slot| slot.contains(&f)))
                    .map(|(id, _)| EntityRef::Block(id)),
            );
        }
    }
    out
}

fn sweep(
    ctx: &Context,
    seed: EntityRef,
    step: impl Fn(&Context, &EntityRef) -> Vec<EntityRef>,
    acc: &mut Vec<EntityRef>,
) {
    let mut stack = vec![seed];
    while let Some(e) = stack.pop() {
        for n in step(ctx, &e) {
            if !acc.contains(&n) {
                acc.push(n);
                stack.push(n);
            }
        }
    }
}

/// Full reference closure of `seed`: the seed, everything transitively below
/// it and everything transitively above it.
pub fn reference_closure(ctx: &Context, seed: EntityRef) -> Closure {
    let mut members = vec![seed];
    sweep(ctx, seed, down_neighbors, &mut members);
    sweep(ctx, seed, up_neighbors, &mut members);
    Closure::finish(members)
}

/// Entities directly incident to the closure but not part of it: the
/// immediate neighbourhood a command may invalidate without owning.
pub fn adjacency_references(ctx: &Context, closure: &Closure) -> Vec<EntityRef> {
    let mut out = Vec::new();
    for member in closure.iter() {
        for n in down_neighbors(ctx, member).into_iter().chain(up_neighbors(ctx, member)) {
            if !closure.contains(&n) {
                out.push(n);
            }
        }
    }
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogrid_kernel::geom::primitives::make_cylinder;
    use ogrid_types::CylinderSpec;

    fn cylinder_ctx() -> (Context, ogrid_kernel::geom::GeomVolumeId) {
        let mut ctx = Context::new();
        let spec = CylinderSpec {
            center: [0.0, 0.0, 0.0],
            axis: [0.0, 0.0, 1.0],
            radius: 1.0,
            height: 2.0,
            angle_deg: 360.0,
        };
        let vol = make_cylinder(&mut ctx.geom, &spec).unwrap();
        (ctx, vol)
    }

    #[test]
    fn volume_closure_covers_its_boundary() {
        let (ctx, vol) = cylinder_ctx();
        let closure = reference_closure(&ctx, EntityRef::GeomVolume(vol));
        let boundary = ctx.geom.volume(vol).unwrap();
        assert_eq!(closure.dim(Dim::D3), &[EntityRef::GeomVolume(vol)]);
        assert_eq!(closure.dim(Dim::D2).len(), boundary.surfaces.len());
        assert_eq!(closure.dim(Dim::D1).len(), boundary.curves.len());
        assert_eq!(closure.dim(Dim::D0).len(), boundary.vertices.len());
        for &s in &boundary.surfaces {
            assert!(closure.contains(&EntityRef::GeomSurface(s)));
        }
    }

    #[test]
    fn vertex_closure_climbs_back_to_the_volume() {
        let (ctx, vol) = cylinder_ctx();
        let v = ctx.geom.volume(vol).unwrap().vertices[0];
        let closure = reference_closure(&ctx, EntityRef::GeomVertex(v));
        assert!(closure.contains(&EntityRef::GeomVolume(vol)));
    }

    #[test]
    fn unrelated_volumes_have_disjoint_closures() {
        let (mut ctx, vol_a) = cylinder_ctx();
        let spec = CylinderSpec {
            center: [10.0, 0.0, 0.0],
            axis: [0.0, 0.0, 1.0],
            radius: 1.0,
            height: 2.0,
            angle_deg: 360.0,
        };
        let vol_b = make_cylinder(&mut ctx.geom, &spec).unwrap();
        let ca = reference_closure(&ctx, EntityRef::GeomVolume(vol_a));
        let cb = reference_closure(&ctx, EntityRef::GeomVolume(vol_b));
        for m in ca.iter() {
            assert!(!cb.contains(m), "closures of unrelated volumes must not meet");
        }
        assert!(adjacency_references(&ctx, &ca).is_empty());
    }
}
