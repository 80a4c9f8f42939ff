//! Block topologies over hollow cylinders and hollow spheres.
//!
//! The inner wall replaces the o-grid core, so these builders take no
//! ratio and no core kind. Corner positions come straight from the
//! boundary entities, and most associations are recovered by the
//! projection passes once the pinned corners are in place.

use std::f64::consts::FRAC_1_SQRT_2;

use nalgebra::Point3;

use ogrid_kernel::geom::primitives::Frame;
use ogrid_kernel::topology::tables::VTX_BY_FACE_BITS;
use ogrid_kernel::topology::{BlockId, BlockSize, FaceOnBlock};
use ogrid_types::{HollowCylinderSpec, HollowSphereSpec, OGridSpec, Portion};

use crate::builder::BuildCtx;
use crate::error::BuildError;
use crate::projector;

pub(crate) fn build_cylinder(
    ctx: &mut BuildCtx<'_>,
    _spec: &HollowCylinderSpec,
    grid: &OGridSpec,
    portion: Portion,
) -> Result<(), BuildError> {
    match portion {
        Portion::Quarter => cylinder_wedge(ctx, grid, 2 * grid.n_i),
        Portion::Half => cylinder_wedge(ctx, grid, 4 * grid.n_i),
        Portion::Full => cylinder_full(ctx, grid),
        Portion::Eighth => Err(BuildError::StructuralMismatch {
            detail: "eighth portions only arise on spheres".into(),
        }),
    }
}

fn finish(ctx: &mut BuildCtx<'_>) -> Result<(), BuildError> {
    projector::snap_vertices(ctx)?;
    projector::project_edges_on_curves(ctx)?;
    projector::project_faces_on_surfaces(ctx)?;
    Ok(())
}

/// Any angular portion of a hollow cylinder is a single curved slab with
/// all eight corners on boundary vertices.
fn cylinder_wedge(ctx: &mut BuildCtx<'_>, grid: &OGridSpec, n_arc: u32) -> Result<(), BuildError> {
    ctx.expect_boundary(6, 12, 8)?;
    let b = ctx.add_block(
        [
            ctx.geom_point(4)?, // bottom outer at the cut angle
            ctx.geom_point(0)?, // bottom outer at angle 0
            ctx.geom_point(5)?,
            ctx.geom_point(1)?,
            ctx.geom_point(6)?,
            ctx.geom_point(2)?,
            ctx.geom_point(7)?,
            ctx.geom_point(3)?,
        ],
        BlockSize::new(n_arc, grid.n_axe, grid.n_r),
    );
    for corner in 0..8 {
        let gv = [4, 0, 5, 1, 6, 2, 7, 3][corner];
        ctx.corner_on_geom_vertex(b, corner, gv)?;
    }
    finish(ctx)
}

/// Four blocks around the annulus, with corners sampled on the four
/// bounding circles.
fn cylinder_full(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(4, 6, 4)?;
    let size = BlockSize::new(2 * grid.n_i, grid.n_axe, grid.n_r);
    let mut blocks = Vec::with_capacity(4);
    for q in 0..4 {
        let t_a = 0.125 + 0.25 * q as f64;
        let t_b = (t_a + 0.25) % 1.0;
        // i circumferential, j axial, k from the inner wall to the outer.
        let corners = [
            ctx.sample_curve(3, t_a)?,
            ctx.sample_curve(3, t_b)?,
            ctx.sample_curve(1, t_a)?,
            ctx.sample_curve(1, t_b)?,
            ctx.sample_curve(2, t_a)?,
            ctx.sample_curve(2, t_b)?,
            ctx.sample_curve(0, t_a)?,
            ctx.sample_curve(0, t_b)?,
        ];
        let b = ctx.add_block(corners, size);
        for (corner, curve) in [(0, 3), (1, 3), (2, 1), (3, 1), (4, 2), (5, 2), (6, 0), (7, 0)] {
            ctx.corner_on_curve(b, corner, curve)?;
        }
        blocks.push(b);
    }
    for q in 0..4 {
        ctx.weld(blocks[q], FaceOnBlock::IMax, blocks[(q + 1) % 4], FaceOnBlock::IMin)?;
    }
    finish(ctx)
}

// ─── Hollow sphere ───

pub(crate) fn build_sphere(
    ctx: &mut BuildCtx<'_>,
    spec: &HollowSphereSpec,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    let frame = Frame::at(spec.center);
    match spec.portion {
        Portion::Full => sphere_full(ctx, &frame, spec, grid),
        Portion::Half => sphere_half(ctx, &frame, spec, grid),
        Portion::Quarter => sphere_quarter(ctx, &frame, spec, grid),
        Portion::Eighth => sphere_eighth(ctx, &frame, spec, grid),
    }
}

fn shell(
    ctx: &mut BuildCtx<'_>,
    ext: &[Point3<f64>; 8],
    int: &[Point3<f64>; 8],
    row: usize,
    size: BlockSize,
) -> BlockId {
    let r = VTX_BY_FACE_BITS[row];
    ctx.add_block(
        [
            ext[r[0]], ext[r[1]], ext[r[2]], ext[r[3]],
            int[r[0]], int[r[1]], int[r[2]], int[r[3]],
        ],
        size,
    )
}

/// Six shell blocks between two concentric cubes, inner wall on KMax.
fn sphere_full(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    spec: &HollowSphereSpec,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    use FaceOnBlock::{IMax, IMin, JMax, JMin, KMax, KMin};
    ctx.expect_boundary(2, 0, 0)?;
    let cube = |d: f64| -> [Point3<f64>; 8] {
        std::array::from_fn(|n| {
            let s = |bit: usize| if n >> bit & 1 == 1 { d } else { -d };
            f.pt(s(0), s(1), s(2))
        })
    };
    let ext = cube(spec.r_ext / 3.0_f64.sqrt());
    let int = cube(spec.r_int / 3.0_f64.sqrt());

    let size = BlockSize::new(2 * grid.n_i, 2 * grid.n_i, grid.n_r);
    let s: Vec<BlockId> = (0..6).map(|row| shell(ctx, &ext, &int, row, size)).collect();
    let seams = [
        (s[0], JMin, s[2], JMax),
        (s[0], IMin, s[5], JMax),
        (s[0], IMax, s[4], JMin),
        (s[2], IMin, s[5], IMax),
        (s[2], IMax, s[4], IMax),
        (s[1], JMax, s[2], JMin),
        (s[1], IMin, s[5], JMin),
        (s[1], IMax, s[4], JMax),
        (s[3], IMin, s[5], IMin),
        (s[1], JMin, s[3], JMax),
        (s[3], IMax, s[4], IMin),
        (s[0], JMax, s[3], JMin),
    ];
    for (a, fa, b, fb) in seams {
        ctx.weld(a, fa, b, fb)?;
    }
    for &b in &s {
        ctx.skin(b, KMin, 0)?;
        ctx.skin(b, KMax, 1)?;
    }
    Ok(())
}

/// Five shells; the two polar shells get their cut plane faces split at
/// the polar axis, outer and inner rims alike.
fn sphere_half(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    spec: &HollowSphereSpec,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    use FaceOnBlock::{IMax, IMin, JMax, JMin, KMax, KMin};
    ctx.expect_boundary(4, 6, 4)?;
    let ring = |r: f64| -> [Point3<f64>; 8] {
        let d2 = r * FRAC_1_SQRT_2;
        let d3 = r / 3.0_f64.sqrt();
        std::array::from_fn(|n| {
            let sx = if n & 1 == 1 { 1.0 } else { -1.0 };
            let sz = if n >> 1 & 1 == 1 { 1.0 } else { -1.0 };
            if n >> 2 & 1 == 1 {
                f.pt(sx * d2, 0.0, sz * d2)
            } else {
                f.pt(sx * d3, d3, sz * d3)
            }
        })
    };
    let ext = ring(spec.r_ext);
    let int = ring(spec.r_int);

    let side = BlockSize::new(grid.n_i, 2 * grid.n_i, grid.n_r);
    let sx_neg = shell(ctx, &ext, &int, 0, side);
    let sx_pos = shell(ctx, &ext, &int, 1, side);
    let sz_neg = shell(ctx, &ext, &int, 2, side);
    let sz_pos = shell(ctx, &ext, &int, 3, side);
    let s_top = shell(
        ctx,
        &ext,
        &int,
        4,
        BlockSize::new(2 * grid.n_i, 2 * grid.n_i, grid.n_r),
    );
    let shells = [sx_neg, sx_pos, sz_neg, sz_pos, s_top];
    let seams = [
        (sx_neg, JMin, sz_neg, JMax),
        (sx_neg, IMax, s_top, JMin),
        (sz_neg, IMax, s_top, IMax),
        (sx_pos, JMax, sz_neg, JMin),
        (sx_pos, IMax, s_top, JMax),
        (sx_pos, JMin, sz_pos, JMax),
        (sz_pos, IMax, s_top, IMin),
        (sx_neg, JMax, sz_pos, JMin),
    ];
    for (a, fa, b, fb) in seams {
        ctx.weld(a, fa, b, fb)?;
    }

    let (ca, cb) = (ctx.corner(sz_neg, 0)?, ctx.corner(sz_neg, 2)?);
    let south = ctx.topo.split_face(sz_neg, IMin, ca, cb, 0.5)?;
    let (ca, cb) = (ctx.corner(sz_pos, 0)?, ctx.corner(sz_pos, 2)?);
    let north = ctx.topo.split_face(sz_pos, IMin, ca, cb, 0.5)?;

    for &b in &shells {
        ctx.skin(b, KMin, 0)?;
        ctx.skin(b, KMax, 1)?;
    }
    ctx.skin(sx_pos, IMin, 2)?;
    ctx.skin(sx_neg, IMin, 3)?;

    ctx.edge_id_on_curve(south.mid_edge, 5)?;
    ctx.face_id_on_surface(south.halves[0], 2)?;
    ctx.face_id_on_surface(south.halves[1], 3)?;
    ctx.edge_id_on_curve(south.cut_sub[0], 0)?;
    ctx.edge_id_on_curve(south.cut_sub[1], 1)?;
    if let Some([oa, ob]) = south.opp_sub {
        ctx.edge_id_on_curve(oa, 2)?;
        ctx.edge_id_on_curve(ob, 3)?;
    }
    ctx.edge_id_on_curve(north.mid_edge, 4)?;
    ctx.face_id_on_surface(north.halves[0], 3)?;
    ctx.face_id_on_surface(north.halves[1], 2)?;
    ctx.edge_id_on_curve(north.cut_sub[0], 1)?;
    ctx.edge_id_on_curve(north.cut_sub[1], 0)?;
    if let Some([oa, ob]) = north.opp_sub {
        ctx.edge_id_on_curve(oa, 3)?;
        ctx.edge_id_on_curve(ob, 2)?;
    }

    // Rim chords back onto the four boundary arcs.
    ctx.edge_on_curve(sx_pos, 0, 2, 0)?;
    ctx.edge_on_curve(sx_pos, 4, 6, 2)?;
    ctx.edge_on_curve(sx_neg, 0, 2, 1)?;
    ctx.edge_on_curve(sx_neg, 4, 6, 3)?;
    ctx.corner_on_curve(sx_pos, 0, 0)?;
    ctx.corner_on_curve(sx_pos, 2, 0)?;
    ctx.corner_on_curve(sx_pos, 4, 2)?;
    ctx.corner_on_curve(sx_pos, 6, 2)?;
    ctx.corner_on_curve(sx_neg, 0, 1)?;
    ctx.corner_on_curve(sx_neg, 2, 1)?;
    ctx.corner_on_curve(sx_neg, 4, 3)?;
    ctx.corner_on_curve(sx_neg, 6, 3)?;

    ctx.vertex_on_geom_vertex(south.mid_vertices[0], 1)?;
    ctx.vertex_on_geom_vertex(south.mid_vertices[1], 3)?;
    ctx.vertex_on_geom_vertex(north.mid_vertices[0], 0)?;
    ctx.vertex_on_geom_vertex(north.mid_vertices[1], 2)?;
    finish(ctx)
}

/// Four shells; the polar shells reach the poles directly, so no splits.
fn sphere_quarter(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    spec: &HollowSphereSpec,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    use FaceOnBlock::{IMax, IMin, JMax, JMin, KMax, KMin};
    ctx.expect_boundary(4, 6, 4)?;
    let layer = |r: f64| -> [Point3<f64>; 8] {
        let d2 = r * FRAC_1_SQRT_2;
        let d3 = r / 3.0_f64.sqrt();
        [
            f.pt(0.0, d2, -d2),
            f.pt(d3, d3, -d3),
            f.pt(0.0, d2, d2),
            f.pt(d3, d3, d3),
            f.pt(0.0, 0.0, -r),
            f.pt(d2, 0.0, -d2),
            f.pt(0.0, 0.0, r),
            f.pt(d2, 0.0, d2),
        ]
    };
    let ext = layer(spec.r_ext);
    let int = layer(spec.r_int);

    let b_x = shell(ctx, &ext, &int, 1, BlockSize::new(grid.n_i, 2 * grid.n_i, grid.n_r));
    let b_zn = shell(ctx, &ext, &int, 2, BlockSize::new(grid.n_i, grid.n_i, grid.n_r));
    let b_zp = shell(ctx, &ext, &int, 3, BlockSize::new(grid.n_i, grid.n_i, grid.n_r));
    let b_top = shell(ctx, &ext, &int, 4, BlockSize::new(2 * grid.n_i, grid.n_i, grid.n_r));
    let shells = [b_x, b_zn, b_zp, b_top];
    let seams = [
        (b_zn, IMax, b_top, IMax),
        (b_x, JMax, b_zn, JMin),
        (b_x, IMax, b_top, JMax),
        (b_x, JMin, b_zp, JMax),
        (b_zp, IMax, b_top, IMin),
    ];
    for (a, fa, b, fb) in seams {
        ctx.weld(a, fa, b, fb)?;
    }

    for &b in &shells {
        ctx.skin(b, KMin, 0)?;
        ctx.skin(b, KMax, 1)?;
    }
    ctx.skin(b_x, IMin, 2)?;
    ctx.skin(b_zn, IMin, 2)?;
    ctx.skin(b_zp, IMin, 2)?;
    ctx.skin(b_zn, JMax, 3)?;
    ctx.skin(b_zp, JMin, 3)?;
    ctx.skin(b_top, JMin, 3)?;

    ctx.edge_on_curve(b_x, 0, 2, 0)?;
    ctx.edge_on_curve(b_zn, 0, 2, 0)?;
    ctx.edge_on_curve(b_zp, 0, 2, 0)?;
    ctx.edge_on_curve(b_zp, 0, 1, 1)?;
    ctx.edge_on_curve(b_top, 0, 1, 1)?;
    ctx.edge_on_curve(b_zn, 2, 3, 1)?;
    ctx.edge_on_curve(b_x, 4, 6, 2)?;
    ctx.edge_on_curve(b_zn, 4, 6, 2)?;
    ctx.edge_on_curve(b_zp, 4, 6, 2)?;
    ctx.edge_on_curve(b_zp, 4, 5, 3)?;
    ctx.edge_on_curve(b_top, 4, 5, 3)?;
    ctx.edge_on_curve(b_zn, 6, 7, 3)?;
    // Polar segments between the two walls.
    ctx.edge_on_curve(b_zp, 0, 4, 4)?;
    ctx.edge_on_curve(b_zn, 2, 6, 5)?;

    ctx.corner_on_curve(b_zp, 2, 0)?;
    ctx.corner_on_curve(b_zn, 0, 0)?;
    ctx.corner_on_curve(b_zp, 6, 2)?;
    ctx.corner_on_curve(b_zn, 4, 2)?;
    ctx.corner_on_curve(b_zp, 1, 1)?;
    ctx.corner_on_curve(b_zn, 3, 1)?;
    ctx.corner_on_curve(b_zp, 5, 3)?;
    ctx.corner_on_curve(b_zn, 7, 3)?;

    ctx.corner_on_geom_vertex(b_zp, 0, 0)?;
    ctx.corner_on_geom_vertex(b_zn, 2, 1)?;
    ctx.corner_on_geom_vertex(b_zp, 4, 2)?;
    ctx.corner_on_geom_vertex(b_zn, 6, 3)?;
    finish(ctx)
}

/// Three shells covering the eighth, radial edges joining the two walls.
fn sphere_eighth(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    spec: &HollowSphereSpec,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    use FaceOnBlock::{IMax, IMin, JMax, JMin, KMax, KMin};
    ctx.expect_boundary(5, 9, 6)?;
    let layer = |r: f64| -> [Point3<f64>; 8] {
        let d2 = r * FRAC_1_SQRT_2;
        let d3 = r / 3.0_f64.sqrt();
        [
            f.pt(0.0, d2, 0.0),
            f.pt(d2, d2, 0.0),
            f.pt(0.0, d2, d2),
            f.pt(d3, d3, d3),
            f.pt(0.0, 0.0, 0.0),
            f.pt(d2, 0.0, 0.0),
            f.pt(0.0, 0.0, d2),
            f.pt(d2, 0.0, d2),
        ]
    };
    let ext = layer(spec.r_ext);
    let int = layer(spec.r_int);

    let size = BlockSize::new(grid.n_i, grid.n_i, grid.n_r);
    let b_x = shell(ctx, &ext, &int, 1, size);
    let b_z = shell(ctx, &ext, &int, 3, size);
    let b_y = shell(ctx, &ext, &int, 4, size);
    let shells = [b_x, b_z, b_y];
    ctx.weld(b_x, IMax, b_y, JMax)?;
    ctx.weld(b_x, JMin, b_z, JMax)?;
    ctx.weld(b_z, IMax, b_y, IMin)?;

    for &b in &shells {
        ctx.skin(b, KMin, 0)?;
        ctx.skin(b, KMax, 1)?;
    }
    ctx.skin(b_x, JMax, 2)?;
    ctx.skin(b_y, IMax, 2)?;
    ctx.skin(b_z, JMin, 3)?;
    ctx.skin(b_y, JMin, 3)?;
    ctx.skin(b_x, IMin, 4)?;
    ctx.skin(b_z, IMin, 4)?;

    ctx.edge_on_curve(b_x, 2, 3, 0)?;
    ctx.edge_on_curve(b_y, 1, 3, 0)?;
    ctx.edge_on_curve(b_z, 0, 1, 1)?;
    ctx.edge_on_curve(b_y, 0, 1, 1)?;
    ctx.edge_on_curve(b_x, 0, 2, 2)?;
    ctx.edge_on_curve(b_z, 0, 2, 2)?;
    ctx.edge_on_curve(b_x, 6, 7, 3)?;
    ctx.edge_on_curve(b_y, 5, 7, 3)?;
    ctx.edge_on_curve(b_z, 4, 5, 4)?;
    ctx.edge_on_curve(b_y, 4, 5, 4)?;
    ctx.edge_on_curve(b_x, 4, 6, 5)?;
    ctx.edge_on_curve(b_z, 4, 6, 5)?;
    // Radials between the walls.
    ctx.edge_on_curve(b_x, 2, 6, 6)?;
    ctx.edge_on_curve(b_y, 1, 5, 7)?;
    ctx.edge_on_curve(b_z, 0, 4, 8)?;

    ctx.corner_on_curve(b_x, 3, 0)?;
    ctx.corner_on_curve(b_y, 0, 1)?;
    ctx.corner_on_curve(b_z, 2, 2)?;
    ctx.corner_on_curve(b_x, 7, 3)?;
    ctx.corner_on_curve(b_y, 4, 4)?;
    ctx.corner_on_curve(b_z, 6, 5)?;

    ctx.corner_on_geom_vertex(b_x, 2, 0)?;
    ctx.corner_on_geom_vertex(b_y, 1, 1)?;
    ctx.corner_on_geom_vertex(b_z, 0, 2)?;
    ctx.corner_on_geom_vertex(b_x, 6, 3)?;
    ctx.corner_on_geom_vertex(b_y, 5, 4)?;
    ctx.corner_on_geom_vertex(b_z, 4, 5)?;
    finish(ctx)
}
