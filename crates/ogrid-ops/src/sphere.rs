//! Block topologies over spheres.
//!
//! The o-grid shell decomposition wraps one block around each exposed
//! face of an inner cube, using the face tables so every shell keeps the
//! outer layer on KMin and the inner layer on KMax. Portions keep the
//! poles on the local z axis, in the cut plane for halves and quarters.

use nalgebra::Point3;

use ogrid_kernel::geom::primitives::Frame;
use ogrid_kernel::topology::tables::VTX_BY_FACE_BITS;
use ogrid_kernel::topology::{BlockId, BlockSize, FaceOnBlock, TopoVertexId};
use ogrid_types::{OGridSpec, Portion, SphereSpec};

use crate::builder::BuildCtx;
use crate::case::GridKind;
use crate::error::BuildError;

pub(crate) fn build(
    ctx: &mut BuildCtx<'_>,
    spec: &SphereSpec,
    grid: &OGridSpec,
    kind: GridKind,
) -> Result<(), BuildError> {
    let frame = Frame::at(spec.center);
    let r = spec.radius;
    match (spec.portion, kind) {
        (Portion::Full, GridKind::OneBlock) => one_block_full(ctx, &frame, r, grid),
        (Portion::Full, k) => ogrid_full(ctx, &frame, r, grid, k == GridKind::Degenerate),
        (Portion::Half, GridKind::OneBlock) => one_block_half(ctx, &frame, r, grid),
        (Portion::Half, k) => ogrid_half(ctx, &frame, r, grid, k == GridKind::Degenerate),
        (Portion::Quarter, GridKind::OneBlock) => one_block_quarter(ctx, &frame, r, grid),
        (Portion::Quarter, k) => ogrid_quarter(ctx, &frame, r, grid, k == GridKind::Degenerate),
        (Portion::Eighth, GridKind::OneBlock) => one_block_eighth(ctx, &frame, r, grid),
        (Portion::Eighth, k) => ogrid_eighth(ctx, &frame, r, grid, k == GridKind::Degenerate),
    }
}

/// One shell block per cube face: outer layer on KMin, inner on KMax.
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

fn scale(frame: &Frame, pts: &[Point3<f64>; 8], q: f64) -> [Point3<f64>; 8] {
    let c = frame.pt(0.0, 0.0, 0.0);
    pts.map(|p| c + (p - c) * q)
}

// ─── Single block ───

fn one_block_full(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    r: f64,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    ctx.expect_boundary(1, 0, 0)?;
    let d = r / 3.0_f64.sqrt();
    let b = ctx.add_block(
        [
            f.pt(-d, -d, -d),
            f.pt(d, -d, -d),
            f.pt(-d, d, -d),
            f.pt(d, d, -d),
            f.pt(-d, -d, d),
            f.pt(d, -d, d),
            f.pt(-d, d, d),
            f.pt(d, d, d),
        ],
        BlockSize::new(2 * grid.n_i, 2 * grid.n_i, 2 * grid.n_i),
    );
    for face in FaceOnBlock::ALL {
        ctx.skin(b, face, 0)?;
    }
    Ok(())
}

fn one_block_half(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    r: f64,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    ctx.expect_boundary(3, 3, 2)?;
    let d2 = r * std::f64::consts::FRAC_1_SQRT_2;
    let d3 = r / 3.0_f64.sqrt();
    let b = ctx.add_block(
        [
            f.pt(-d2, 0.0, -d2),
            f.pt(d2, 0.0, -d2),
            f.pt(-d3, d3, -d3),
            f.pt(d3, d3, -d3),
            f.pt(-d2, 0.0, d2),
            f.pt(d2, 0.0, d2),
            f.pt(-d3, d3, d3),
            f.pt(d3, d3, d3),
        ],
        BlockSize::new(2 * grid.n_i, grid.n_i, 2 * grid.n_i),
    );
    for face in [
        FaceOnBlock::IMin,
        FaceOnBlock::IMax,
        FaceOnBlock::JMax,
        FaceOnBlock::KMin,
        FaceOnBlock::KMax,
    ] {
        ctx.skin(b, face, 0)?;
    }

    // The equator face spans both half disks: split it at the polar axis.
    let (c0, c1) = (ctx.corner(b, 0)?, ctx.corner(b, 1)?);
    let split = ctx.topo.split_face(b, FaceOnBlock::JMin, c0, c1, 0.5)?;
    ctx.edge_id_on_curve(split.mid_edge, 2)?;
    ctx.face_id_on_surface(split.halves[0], 2)?;
    ctx.face_id_on_surface(split.halves[1], 1)?;
    ctx.edge_id_on_curve(split.cut_sub[0], 1)?;
    ctx.edge_id_on_curve(split.cut_sub[1], 0)?;
    if let Some([oa, ob]) = split.opp_sub {
        ctx.edge_id_on_curve(oa, 1)?;
        ctx.edge_id_on_curve(ob, 0)?;
    }

    ctx.edge_on_curve(b, 1, 5, 0)?;
    ctx.edge_on_curve(b, 0, 4, 1)?;
    ctx.corner_on_curve(b, 1, 0)?;
    ctx.corner_on_curve(b, 5, 0)?;
    ctx.corner_on_curve(b, 0, 1)?;
    ctx.corner_on_curve(b, 4, 1)?;

    ctx.vertex_on_geom_vertex(split.mid_vertices[0], 1)?;
    ctx.vertex_on_geom_vertex(split.mid_vertices[1], 0)?;
    Ok(())
}

fn one_block_quarter(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    r: f64,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    ctx.expect_boundary(3, 3, 2)?;
    let d2 = r * std::f64::consts::FRAC_1_SQRT_2;
    let d3 = r / 3.0_f64.sqrt();
    let b = ctx.add_block(
        [
            f.pt(0.0, 0.0, -d2),
            f.pt(d2, 0.0, -d2),
            f.pt(0.0, d2, -d2),
            f.pt(d3, d3, -d3),
            f.pt(0.0, 0.0, d2),
            f.pt(d2, 0.0, d2),
            f.pt(0.0, d2, d2),
            f.pt(d3, d3, d3),
        ],
        BlockSize::new(grid.n_i, grid.n_i, 2 * grid.n_i),
    );
    for face in [
        FaceOnBlock::IMax,
        FaceOnBlock::JMax,
        FaceOnBlock::KMin,
        FaceOnBlock::KMax,
    ] {
        ctx.skin(b, face, 0)?;
    }
    ctx.skin(b, FaceOnBlock::JMin, 1)?;
    ctx.skin(b, FaceOnBlock::IMin, 2)?;

    ctx.edge_on_curve(b, 0, 1, 0)?;
    ctx.edge_on_curve(b, 1, 5, 0)?;
    ctx.edge_on_curve(b, 5, 4, 0)?;
    ctx.edge_on_curve(b, 0, 2, 1)?;
    ctx.edge_on_curve(b, 2, 6, 1)?;
    ctx.edge_on_curve(b, 6, 4, 1)?;
    ctx.edge_on_curve(b, 0, 4, 2)?;
    ctx.corner_on_curve(b, 1, 0)?;
    ctx.corner_on_curve(b, 5, 0)?;
    ctx.corner_on_curve(b, 2, 1)?;
    ctx.corner_on_curve(b, 6, 1)?;

    ctx.corner_on_geom_vertex(b, 0, 1)?;
    ctx.corner_on_geom_vertex(b, 4, 0)?;
    Ok(())
}

fn one_block_eighth(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    r: f64,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    ctx.expect_boundary(4, 6, 4)?;
    let d2 = r * std::f64::consts::FRAC_1_SQRT_2;
    let d3 = r / 3.0_f64.sqrt();
    let b = ctx.add_block(
        [
            f.pt(0.0, 0.0, 0.0),
            f.pt(r, 0.0, 0.0),
            f.pt(0.0, r, 0.0),
            f.pt(d2, d2, 0.0),
            f.pt(0.0, 0.0, r),
            f.pt(d2, 0.0, d2),
            f.pt(0.0, d2, d2),
            f.pt(d3, d3, d3),
        ],
        BlockSize::new(grid.n_i, grid.n_i, grid.n_i),
    );
    for face in [FaceOnBlock::IMax, FaceOnBlock::JMax, FaceOnBlock::KMax] {
        ctx.skin(b, face, 0)?;
    }
    ctx.skin(b, FaceOnBlock::KMin, 1)?;
    ctx.skin(b, FaceOnBlock::IMin, 2)?;
    ctx.skin(b, FaceOnBlock::JMin, 3)?;

    ctx.edge_on_curve(b, 1, 3, 0)?;
    ctx.edge_on_curve(b, 2, 3, 0)?;
    ctx.edge_on_curve(b, 2, 6, 1)?;
    ctx.edge_on_curve(b, 4, 6, 1)?;
    ctx.edge_on_curve(b, 1, 5, 2)?;
    ctx.edge_on_curve(b, 4, 5, 2)?;
    ctx.edge_on_curve(b, 0, 1, 3)?;
    ctx.edge_on_curve(b, 0, 2, 4)?;
    ctx.edge_on_curve(b, 0, 4, 5)?;
    ctx.corner_on_curve(b, 3, 0)?;
    ctx.corner_on_curve(b, 6, 1)?;
    ctx.corner_on_curve(b, 5, 2)?;

    ctx.corner_on_geom_vertex(b, 0, 0)?;
    ctx.corner_on_geom_vertex(b, 1, 1)?;
    ctx.corner_on_geom_vertex(b, 2, 2)?;
    ctx.corner_on_geom_vertex(b, 4, 3)?;
    Ok(())
}

// ─── O-grid shells ───

fn ogrid_full(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    r: f64,
    grid: &OGridSpec,
    degenerate: bool,
) -> Result<(), BuildError> {
    ctx.expect_boundary(1, 0, 0)?;
    let d3 = r / 3.0_f64.sqrt();
    let ext: [Point3<f64>; 8] = std::array::from_fn(|n| {
        let s = |bit: usize| if n >> bit & 1 == 1 { d3 } else { -d3 };
        f.pt(s(0), s(1), s(2))
    });
    let int = if degenerate {
        [f.pt(0.0, 0.0, 0.0); 8]
    } else {
        scale(f, &ext, grid.ratio)
    };

    let size = BlockSize::new(2 * grid.n_i, 2 * grid.n_i, grid.n_r);
    let shells: Vec<BlockId> = (0..6).map(|row| shell(ctx, &ext, &int, row, size)).collect();
    if degenerate {
        for &b in &shells {
            ctx.topo.degenerate_face_to_vertex(b, FaceOnBlock::KMax)?;
        }
    } else {
        let core = ctx.add_block(int, BlockSize::new(2 * grid.n_i, 2 * grid.n_i, 2 * grid.n_i));
        for (face, &b) in FaceOnBlock::ALL.iter().zip(&shells) {
            ctx.weld(core, *face, b, FaceOnBlock::KMax)?;
        }
    }
    weld_shell_ring(ctx, &shells)?;

    for &b in &shells {
        ctx.skin(b, FaceOnBlock::KMin, 0)?;
    }
    Ok(())
}

/// The twelve seams between the six shells of a full cube wrap.
fn weld_shell_ring(ctx: &mut BuildCtx<'_>, s: &[BlockId]) -> Result<(), BuildError> {
    use FaceOnBlock::{IMax, IMin, JMax, JMin};
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
    Ok(())
}

fn ogrid_half(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    r: f64,
    grid: &OGridSpec,
    degenerate: bool,
) -> Result<(), BuildError> {
    use FaceOnBlock::{IMax, IMin, JMax, JMin, KMax, KMin};
    ctx.expect_boundary(3, 3, 2)?;
    let d2 = r * std::f64::consts::FRAC_1_SQRT_2;
    let d3 = r / 3.0_f64.sqrt();
    // Bit 0 is x, bit 1 is z; bit 2 picks the dome layer or the equator rim.
    let ext: [Point3<f64>; 8] = std::array::from_fn(|n| {
        let sx = if n & 1 == 1 { 1.0 } else { -1.0 };
        let sz = if n >> 1 & 1 == 1 { 1.0 } else { -1.0 };
        if n >> 2 & 1 == 1 {
            f.pt(sx * d2, 0.0, sz * d2)
        } else {
            f.pt(sx * d3, d3, sz * d3)
        }
    });
    let int = if degenerate {
        [f.pt(0.0, 0.0, 0.0); 8]
    } else {
        scale(f, &ext, grid.ratio)
    };

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

    let core = if degenerate {
        for &b in &shells {
            ctx.topo.degenerate_face_to_vertex(b, KMax)?;
        }
        None
    } else {
        let core = ctx.add_block(int, BlockSize::new(2 * grid.n_i, 2 * grid.n_i, grid.n_i));
        for (face, &b) in [IMin, IMax, JMin, JMax, KMin].iter().zip(&shells) {
            ctx.weld(core, *face, b, KMax)?;
        }
        Some(core)
    };
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

    // The two polar shells each carry a face spanning both half disks:
    // split them at the polar axis, south side first.
    let (ca, cb) = (ctx.corner(sz_neg, 0)?, ctx.corner(sz_neg, 2)?);
    let south = ctx.topo.split_face(sz_neg, IMin, ca, cb, 0.5)?;
    let (ca, cb) = (ctx.corner(sz_pos, 0)?, ctx.corner(sz_pos, 2)?);
    let north = ctx.topo.split_face(sz_pos, IMin, ca, cb, 0.5)?;

    let mut inner_mids: Option<(TopoVertexId, TopoVertexId)> = None;
    if let Some(core) = core {
        let (ca, cb) = (ctx.corner(core, 4)?, ctx.corner(core, 5)?);
        let inner = ctx.topo.split_face(core, KMax, ca, cb, 0.5)?;
        // The shell splits already placed mid vertices on the inner rim:
        // fold the core's copies into them.
        let (s_in, n_in) = (south.mid_vertices[1], north.mid_vertices[1]);
        ctx.topo.merge_vertices(s_in, inner.mid_vertices[0])?;
        ctx.topo.merge_vertices(n_in, inner.mid_vertices[1])?;
        ctx.face_id_on_surface(inner.halves[0], 2)?;
        ctx.face_id_on_surface(inner.halves[1], 1)?;
        inner_mids = Some((s_in, n_in));
    }

    for &b in &shells {
        ctx.skin(b, KMin, 0)?;
    }
    ctx.skin(sx_pos, IMin, 1)?;
    ctx.skin(sx_neg, IMin, 2)?;

    ctx.face_id_on_surface(south.halves[0], 1)?;
    ctx.face_id_on_surface(south.halves[1], 2)?;
    ctx.face_id_on_surface(north.halves[0], 2)?;
    ctx.face_id_on_surface(north.halves[1], 1)?;
    ctx.edge_id_on_curve(south.cut_sub[0], 0)?;
    ctx.edge_id_on_curve(south.cut_sub[1], 1)?;
    ctx.edge_id_on_curve(north.cut_sub[0], 1)?;
    ctx.edge_id_on_curve(north.cut_sub[1], 0)?;
    ctx.edge_id_on_curve(south.mid_edge, 2)?;
    ctx.edge_id_on_curve(north.mid_edge, 2)?;
    let (s_pole, n_pole) = (south.mid_vertices[0], north.mid_vertices[0]);
    if let Some((s_in, n_in)) = inner_mids {
        // Vertex merges dedupe the overlapping sub edges, so resolve the
        // survivors by endpoints.
        let e = ctx.topo.edge_between(s_in, n_in)?;
        ctx.edge_id_on_curve(e, 2)?;
        let (i5, i4) = (ctx.corner(sz_neg, 4)?, ctx.corner(sz_neg, 6)?);
        let (i6, i7) = (ctx.corner(sz_pos, 4)?, ctx.corner(sz_pos, 6)?);
        for (a, b, surf) in [(i5, s_in, 1), (s_in, i4, 2), (i6, n_in, 2), (n_in, i7, 1)] {
            let e = ctx.topo.edge_between(a, b)?;
            ctx.edge_id_on_surface(e, surf)?;
        }
        ctx.vertex_on_curve(s_in, 2)?;
        ctx.vertex_on_curve(n_in, 2)?;
    }
    if degenerate {
        let centre = ctx.corner(sz_neg, 4)?;
        ctx.vertex_on_curve(centre, 2)?;
    }

    // Rim chords back onto the boundary arcs.
    ctx.edge_on_curve(sx_pos, 0, 2, 0)?;
    ctx.edge_on_curve(sx_neg, 0, 2, 1)?;
    ctx.corner_on_curve(sx_pos, 0, 0)?;
    ctx.corner_on_curve(sx_pos, 2, 0)?;
    ctx.corner_on_curve(sx_neg, 0, 1)?;
    ctx.corner_on_curve(sx_neg, 2, 1)?;

    ctx.vertex_on_geom_vertex(s_pole, 1)?;
    ctx.vertex_on_geom_vertex(n_pole, 0)?;
    Ok(())
}

fn ogrid_quarter(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    r: f64,
    grid: &OGridSpec,
    degenerate: bool,
) -> Result<(), BuildError> {
    use FaceOnBlock::{IMax, IMin, JMax, JMin, KMax, KMin};
    ctx.expect_boundary(3, 3, 2)?;
    let d2 = r * std::f64::consts::FRAC_1_SQRT_2;
    let d3 = r / 3.0_f64.sqrt();
    let ext = [
        f.pt(0.0, d2, -d2),
        f.pt(d3, d3, -d3),
        f.pt(0.0, d2, d2),
        f.pt(d3, d3, d3),
        f.pt(0.0, 0.0, -d2),
        f.pt(d2, 0.0, -d2),
        f.pt(0.0, 0.0, d2),
        f.pt(d2, 0.0, d2),
    ];
    let int = if degenerate {
        [f.pt(0.0, 0.0, 0.0); 8]
    } else {
        scale(f, &ext, grid.ratio)
    };

    let b_x = shell(ctx, &ext, &int, 1, BlockSize::new(grid.n_i, 2 * grid.n_i, grid.n_r));
    let b_zn = shell(ctx, &ext, &int, 2, BlockSize::new(grid.n_i, grid.n_i, grid.n_r));
    let b_zp = shell(ctx, &ext, &int, 3, BlockSize::new(grid.n_i, grid.n_i, grid.n_r));
    let b_top = shell(ctx, &ext, &int, 4, BlockSize::new(2 * grid.n_i, grid.n_i, grid.n_r));
    let shells = [b_x, b_zn, b_zp, b_top];

    let core = if degenerate {
        for &b in &shells {
            ctx.topo.degenerate_face_to_vertex(b, KMax)?;
        }
        None
    } else {
        let core = ctx.add_block(int, BlockSize::new(grid.n_i, 2 * grid.n_i, grid.n_i));
        ctx.weld(core, IMax, b_x, KMax)?;
        ctx.weld(core, JMin, b_zn, KMax)?;
        ctx.weld(core, JMax, b_zp, KMax)?;
        ctx.weld(core, KMin, b_top, KMax)?;
        Some(core)
    };
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
    }
    ctx.skin(b_x, IMin, 1)?;
    ctx.skin(b_zn, IMin, 1)?;
    ctx.skin(b_zp, IMin, 1)?;
    ctx.skin(b_zn, JMax, 2)?;
    ctx.skin(b_zp, JMin, 2)?;
    ctx.skin(b_top, JMin, 2)?;
    if let Some(core) = core {
        ctx.skin(core, KMax, 1)?;
        ctx.skin(core, IMin, 2)?;
    }

    ctx.edge_on_curve(b_x, 0, 2, 0)?;
    ctx.edge_on_curve(b_zn, 0, 2, 0)?;
    ctx.edge_on_curve(b_zp, 0, 2, 0)?;
    ctx.edge_on_curve(b_zp, 0, 1, 1)?;
    ctx.edge_on_curve(b_top, 0, 1, 1)?;
    ctx.edge_on_curve(b_zn, 2, 3, 1)?;
    ctx.corner_on_curve(b_zp, 2, 0)?;
    ctx.corner_on_curve(b_zn, 0, 0)?;
    ctx.corner_on_curve(b_zp, 1, 1)?;
    ctx.corner_on_curve(b_zn, 3, 1)?;

    // Polar segment.
    ctx.edge_on_curve(b_zn, 2, 6, 2)?;
    ctx.edge_on_curve(b_zp, 0, 4, 2)?;
    if let Some(core) = core {
        ctx.edge_on_curve(core, 4, 6, 2)?;
        ctx.corner_on_curve(core, 4, 2)?;
        ctx.corner_on_curve(core, 6, 2)?;
    } else {
        let centre = ctx.corner(b_zn, 4)?;
        ctx.vertex_on_curve(centre, 2)?;
    }

    ctx.corner_on_geom_vertex(b_zp, 0, 0)?;
    ctx.corner_on_geom_vertex(b_zn, 2, 1)?;
    Ok(())
}

fn ogrid_eighth(
    ctx: &mut BuildCtx<'_>,
    f: &Frame,
    r: f64,
    grid: &OGridSpec,
    degenerate: bool,
) -> Result<(), BuildError> {
    use FaceOnBlock::{IMax, IMin, JMax, JMin, KMax, KMin};
    ctx.expect_boundary(4, 6, 4)?;
    let d2 = r * std::f64::consts::FRAC_1_SQRT_2;
    let d3 = r / 3.0_f64.sqrt();
    let ext = [
        f.pt(0.0, d2, 0.0),
        f.pt(d2, d2, 0.0),
        f.pt(0.0, d2, d2),
        f.pt(d3, d3, d3),
        f.pt(0.0, 0.0, 0.0),
        f.pt(d2, 0.0, 0.0),
        f.pt(0.0, 0.0, d2),
        f.pt(d2, 0.0, d2),
    ];
    let int = if degenerate {
        [f.pt(0.0, 0.0, 0.0); 8]
    } else {
        scale(f, &ext, grid.ratio)
    };

    let size = BlockSize::new(grid.n_i, grid.n_i, grid.n_r);
    let b_x = shell(ctx, &ext, &int, 1, size);
    let b_z = shell(ctx, &ext, &int, 3, size);
    let b_y = shell(ctx, &ext, &int, 4, size);
    let shells = [b_x, b_z, b_y];

    let core = if degenerate {
        for &b in &shells {
            ctx.topo.degenerate_face_to_vertex(b, KMax)?;
        }
        None
    } else {
        let core = ctx.add_block(int, BlockSize::new(grid.n_i, grid.n_i, grid.n_i));
        ctx.weld(core, IMax, b_x, KMax)?;
        ctx.weld(core, JMax, b_z, KMax)?;
        ctx.weld(core, KMin, b_y, KMax)?;
        Some(core)
    };
    ctx.weld(b_x, IMax, b_y, JMax)?;
    ctx.weld(b_x, JMin, b_z, JMax)?;
    ctx.weld(b_z, IMax, b_y, IMin)?;

    for &b in &shells {
        ctx.skin(b, KMin, 0)?;
    }
    ctx.skin(b_x, JMax, 1)?;
    ctx.skin(b_y, IMax, 1)?;
    ctx.skin(b_x, IMin, 3)?;
    ctx.skin(b_z, IMin, 3)?;
    ctx.skin(b_z, JMin, 2)?;
    ctx.skin(b_y, JMin, 2)?;
    if let Some(core) = core {
        ctx.skin(core, JMin, 1)?;
        ctx.skin(core, KMax, 3)?;
        ctx.skin(core, IMin, 2)?;
    }

    ctx.edge_on_curve(b_x, 2, 3, 0)?;
    ctx.edge_on_curve(b_y, 1, 3, 0)?;
    ctx.edge_on_curve(b_z, 0, 1, 1)?;
    ctx.edge_on_curve(b_y, 0, 1, 1)?;
    ctx.edge_on_curve(b_x, 0, 2, 2)?;
    ctx.edge_on_curve(b_z, 0, 2, 2)?;
    ctx.corner_on_curve(b_x, 3, 0)?;
    ctx.corner_on_curve(b_y, 0, 1)?;
    ctx.corner_on_curve(b_z, 2, 2)?;

    // Radial segments toward the centre.
    ctx.edge_on_curve(b_x, 2, 6, 3)?;
    ctx.edge_on_curve(b_y, 1, 5, 4)?;
    ctx.edge_on_curve(b_z, 0, 4, 5)?;
    let centre = if let Some(core) = core {
        ctx.edge_on_curve(core, 4, 5, 3)?;
        ctx.edge_on_curve(core, 4, 0, 4)?;
        ctx.edge_on_curve(core, 4, 6, 5)?;
        ctx.corner_on_curve(core, 5, 3)?;
        ctx.corner_on_curve(core, 0, 4)?;
        ctx.corner_on_curve(core, 6, 5)?;
        ctx.corner(core, 4)?
    } else {
        ctx.corner(b_x, 4)?
    };
    ctx.vertex_on_geom_vertex(centre, 0)?;

    ctx.corner_on_geom_vertex(b_x, 2, 1)?;
    ctx.corner_on_geom_vertex(b_y, 1, 2)?;
    ctx.corner_on_geom_vertex(b_z, 0, 3)?;
    Ok(())
}
