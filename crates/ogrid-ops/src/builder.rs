//! Entry point of the o-grid builders and the plumbing they share.
//!
//! [`execute_ogrid`] dispatches on the primitive shape, its portion and the
//! ratio family, runs the matching builder, audits the result and either
//! hands back the construction journal or rolls everything back.

use nalgebra::Point3;
use ogrid_kernel::geom::{GeomStore, GeomVolumeId};
use ogrid_kernel::topology::{
    audit, BlockId, BlockSize, FaceOnBlock, GeomAssociation, TopoChange, TopoEdgeId, TopoFaceId,
    TopoStore, TopoVertexId,
};
use ogrid_kernel::Tolerance;
use ogrid_types::{OGridSpec, PrimitiveShape};
use tracing::{info, instrument};

use crate::case::classify;
use crate::error::BuildError;

/// Outcome of a successful o-grid construction.
#[derive(Debug, Clone)]
pub struct OGridBuild {
    /// Blocks of the new topology, in creation order.
    pub blocks: Vec<BlockId>,
    /// Everything the construction did, for undo/redo.
    pub changes: Vec<TopoChange>,
}

/// Build the block topology of `volume` according to `grid`.
///
/// The topology store must have an empty journal on entry; on failure the
/// store is rolled back to that state.
#[instrument(skip(geom, topo, tol))]
pub fn execute_ogrid(
    geom: &GeomStore,
    topo: &mut TopoStore,
    tol: &Tolerance,
    volume: GeomVolumeId,
    grid: &OGridSpec,
) -> Result<OGridBuild, BuildError> {
    let kind = classify(grid)?;
    let shape = geom.volume(volume)?.shape;
    let portion = shape.portion().map_err(|e| BuildError::Validation {
        detail: e.to_string(),
    })?;

    let mut ctx = BuildCtx::new(geom, topo, tol, volume)?;
    let built = match shape {
        PrimitiveShape::Cylinder(spec) => {
            crate::cylinder::build(&mut ctx, &spec, grid, portion, kind)
        }
        PrimitiveShape::Cone(spec) => crate::cone::build(&mut ctx, &spec, grid, portion, kind),
        PrimitiveShape::Sphere(spec) => crate::sphere::build(&mut ctx, &spec, grid, kind),
        PrimitiveShape::HollowCylinder(spec) => {
            crate::hollow::build_cylinder(&mut ctx, &spec, grid, portion)
        }
        PrimitiveShape::HollowSphere(spec) => crate::hollow::build_sphere(&mut ctx, &spec, grid),
    };

    let checked = built.and_then(|_| {
        ctx.associate_blocks_to_volume()?;
        audit::audit(ctx.topo)?;
        audit::audit_associations(ctx.topo, ctx.geom)?;
        Ok(())
    });
    let blocks = ctx.blocks;

    match checked {
        Ok(()) => {
            let changes = topo.take_journal();
            info!(blocks = blocks.len(), changes = changes.len(), "o-grid built");
            Ok(OGridBuild { blocks, changes })
        }
        Err(err) => {
            topo.rollback_journal();
            Err(err)
        }
    }
}

/// Mutable construction state handed to the per-shape builders.
///
/// The geometric boundary lists are copied up front; their indices follow
/// the enumeration orders documented by the primitive factories.
pub(crate) struct BuildCtx<'a> {
    pub geom: &'a GeomStore,
    pub topo: &'a mut TopoStore,
    pub tol: &'a Tolerance,
    pub volume: GeomVolumeId,
    pub surfaces: Vec<ogrid_kernel::geom::GeomSurfaceId>,
    pub curves: Vec<ogrid_kernel::geom::GeomCurveId>,
    pub geom_vertices: Vec<ogrid_kernel::geom::GeomVertexId>,
    pub blocks: Vec<BlockId>,
}

impl<'a> BuildCtx<'a> {
    fn new(
        geom: &'a GeomStore,
        topo: &'a mut TopoStore,
        tol: &'a Tolerance,
        volume: GeomVolumeId,
    ) -> Result<Self, BuildError> {
        let v = geom.volume(volume)?;
        Ok(Self {
            geom,
            topo,
            tol,
            volume,
            surfaces: v.surfaces.clone(),
            curves: v.curves.clone(),
            geom_vertices: v.vertices.clone(),
            blocks: Vec::new(),
        })
    }

    /// Gate on the exact boundary layout the builder indexes into.
    pub fn expect_boundary(
        &self,
        surfaces: usize,
        curves: usize,
        vertices: usize,
    ) -> Result<(), BuildError> {
        let got = (
            self.surfaces.len(),
            self.curves.len(),
            self.geom_vertices.len(),
        );
        if got != (surfaces, curves, vertices) {
            return Err(BuildError::StructuralMismatch {
                detail: format!(
                    "expected {surfaces} surfaces, {curves} curves, {vertices} vertices, \
                     found {} / {} / {}",
                    got.0, got.1, got.2
                ),
            });
        }
        Ok(())
    }

    pub fn add_block(&mut self, corners: [Point3<f64>; 8], size: BlockSize) -> BlockId {
        let id = self.topo.add_block(corners, size);
        self.blocks.push(id);
        id
    }

    fn associate_blocks_to_volume(&mut self) -> Result<(), BuildError> {
        for &b in &self.blocks {
            self.topo.block_mut(b)?.assoc = GeomAssociation::Volume(self.volume);
        }
        Ok(())
    }

    // ─── Boundary lookups ───

    fn surface_assoc(&self, i: usize) -> Result<GeomAssociation, BuildError> {
        self.surfaces
            .get(i)
            .map(|&s| GeomAssociation::Surface(s))
            .ok_or_else(|| BuildError::StructuralMismatch {
                detail: format!("surface index {i} out of range"),
            })
    }

    fn curve_assoc(&self, i: usize) -> Result<GeomAssociation, BuildError> {
        self.curves
            .get(i)
            .map(|&c| GeomAssociation::Curve(c))
            .ok_or_else(|| BuildError::StructuralMismatch {
                detail: format!("curve index {i} out of range"),
            })
    }

    /// Point of the `i`-th boundary vertex.
    pub fn geom_point(&self, i: usize) -> Result<Point3<f64>, BuildError> {
        let id = *self
            .geom_vertices
            .get(i)
            .ok_or_else(|| BuildError::StructuralMismatch {
                detail: format!("vertex index {i} out of range"),
            })?;
        Ok(self.geom.vertex(id)?.point)
    }

    /// Point at parameter `t` of the `i`-th boundary curve.
    pub fn sample_curve(&self, i: usize, t: f64) -> Result<Point3<f64>, BuildError> {
        let id = *self
            .curves
            .get(i)
            .ok_or_else(|| BuildError::StructuralMismatch {
                detail: format!("curve index {i} out of range"),
            })?;
        Ok(self.geom.curve(id)?.point_at(t))
    }

    pub fn corner(&self, block: BlockId, corner: usize) -> Result<TopoVertexId, BuildError> {
        Ok(self.topo.block_vertex(block, corner)?)
    }

    // ─── Associations by entity id ───

    pub fn vertex_on_curve(&mut self, v: TopoVertexId, curve: usize) -> Result<(), BuildError> {
        let assoc = self.curve_assoc(curve)?;
        self.topo.vertex_mut(v)?.assoc = assoc;
        Ok(())
    }

    pub fn vertex_on_surface(&mut self, v: TopoVertexId, surface: usize) -> Result<(), BuildError> {
        let assoc = self.surface_assoc(surface)?;
        self.topo.vertex_mut(v)?.assoc = assoc;
        Ok(())
    }

    /// Pin a topological vertex onto a geometric one: association plus an
    /// exact coordinate snap.
    pub fn vertex_on_geom_vertex(&mut self, v: TopoVertexId, i: usize) -> Result<(), BuildError> {
        let id = *self
            .geom_vertices
            .get(i)
            .ok_or_else(|| BuildError::StructuralMismatch {
                detail: format!("vertex index {i} out of range"),
            })?;
        let point = self.geom.vertex(id)?.point;
        let vert = self.topo.vertex_mut(v)?;
        vert.assoc = GeomAssociation::Vertex(id);
        vert.point = point;
        Ok(())
    }

    pub fn edge_id_on_curve(&mut self, e: TopoEdgeId, curve: usize) -> Result<(), BuildError> {
        let assoc = self.curve_assoc(curve)?;
        self.topo.edge_mut(e)?.assoc = assoc;
        Ok(())
    }

    pub fn edge_id_on_surface(&mut self, e: TopoEdgeId, surface: usize) -> Result<(), BuildError> {
        let assoc = self.surface_assoc(surface)?;
        self.topo.edge_mut(e)?.assoc = assoc;
        Ok(())
    }

    pub fn face_id_on_surface(&mut self, f: TopoFaceId, surface: usize) -> Result<(), BuildError> {
        let assoc = self.surface_assoc(surface)?;
        self.topo.face_mut(f)?.assoc = assoc;
        Ok(())
    }

    // ─── Associations by block position ───

    pub fn corner_on_curve(
        &mut self,
        block: BlockId,
        corner: usize,
        curve: usize,
    ) -> Result<(), BuildError> {
        let v = self.corner(block, corner)?;
        self.vertex_on_curve(v, curve)
    }

    pub fn corner_on_surface(
        &mut self,
        block: BlockId,
        corner: usize,
        surface: usize,
    ) -> Result<(), BuildError> {
        let v = self.corner(block, corner)?;
        self.vertex_on_surface(v, surface)
    }

    pub fn corner_on_geom_vertex(
        &mut self,
        block: BlockId,
        corner: usize,
        i: usize,
    ) -> Result<(), BuildError> {
        let v = self.corner(block, corner)?;
        self.vertex_on_geom_vertex(v, i)
    }

    pub fn edge_on_curve(
        &mut self,
        block: BlockId,
        ca: usize,
        cb: usize,
        curve: usize,
    ) -> Result<(), BuildError> {
        let e = self.topo.block_edge(block, ca, cb)?;
        self.edge_id_on_curve(e, curve)
    }

    pub fn edge_on_surface(
        &mut self,
        block: BlockId,
        ca: usize,
        cb: usize,
        surface: usize,
    ) -> Result<(), BuildError> {
        let e = self.topo.block_edge(block, ca, cb)?;
        self.edge_id_on_surface(e, surface)
    }

    /// Project a whole face slot onto a surface: every face of the slot,
    /// their edges and their corner vertices. More specific associations
    /// (curves, geometric vertices) are expected to overwrite afterwards.
    pub fn skin(
        &mut self,
        block: BlockId,
        face: FaceOnBlock,
        surface: usize,
    ) -> Result<(), BuildError> {
        let assoc = self.surface_assoc(surface)?;
        let faces: Vec<TopoFaceId> = self.topo.faces_of(block, face)?.to_vec();
        for f in faces {
            self.topo.face_mut(f)?.assoc = assoc;
            for e in self.topo.edges_of_face(f)? {
                self.topo.edge_mut(e)?.assoc = assoc;
            }
            let cycle = self.topo.face(f)?.vertices.clone();
            for v in cycle {
                self.topo.vertex_mut(v)?.assoc = assoc;
            }
        }
        Ok(())
    }

    /// Glue two block faces together.
    pub fn weld(
        &mut self,
        block_a: BlockId,
        face_a: FaceOnBlock,
        block_b: BlockId,
        face_b: FaceOnBlock,
    ) -> Result<(), BuildError> {
        let fa = self.topo.face_of(block_a, face_a)?;
        let fb = self.topo.face_of(block_b, face_b)?;
        self.topo.fuse_faces(fa, fb, self.tol)?;
        Ok(())
    }
}
