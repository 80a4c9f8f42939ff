//! Block topologies over cylinders.
//!
//! All of these builders also serve cone frustums: a cylinder is a frustum
//! with equal radii, and both primitives expose the same boundary order, so
//! the only difference is the radius used at each axial level.

use std::f64::consts::FRAC_1_SQRT_2;

use nalgebra::Point3;

use ogrid_kernel::geom::primitives::Frame;
use ogrid_kernel::topology::{BlockSize, FaceOnBlock};
use ogrid_types::{CylinderSpec, OGridSpec, Portion};

use crate::builder::BuildCtx;
use crate::case::GridKind;
use crate::error::BuildError;

/// A solid of revolution between two axial levels, possibly with different
/// radii at the base and the top.
pub(crate) struct Revolution {
    pub frame: Frame,
    pub r_bot: f64,
    pub r_top: f64,
    pub height: f64,
}

pub(crate) fn build(
    ctx: &mut BuildCtx<'_>,
    spec: &CylinderSpec,
    grid: &OGridSpec,
    portion: Portion,
    kind: GridKind,
) -> Result<(), BuildError> {
    let rev = Revolution {
        frame: Frame::new(spec.center, spec.axis)?,
        r_bot: spec.radius,
        r_top: spec.radius,
        height: spec.height,
    };
    build_revolution(ctx, &rev, grid, portion, kind)
}

pub(crate) fn build_revolution(
    ctx: &mut BuildCtx<'_>,
    rev: &Revolution,
    grid: &OGridSpec,
    portion: Portion,
    kind: GridKind,
) -> Result<(), BuildError> {
    match (portion, kind) {
        (Portion::Full, GridKind::OneBlock) => one_block_full(ctx, rev, grid),
        (Portion::Full, GridKind::OGrid) => ogrid_full(ctx, rev, grid),
        (Portion::Full, GridKind::Degenerate) => degenerate_full(ctx, rev, grid),
        (Portion::Half, GridKind::OneBlock) => one_block_half(ctx, grid),
        (Portion::Half, GridKind::OGrid) => ogrid_half(ctx, grid),
        (Portion::Quarter, GridKind::OneBlock) => one_block_quarter(ctx, grid),
        (Portion::Quarter, GridKind::OGrid) => ogrid_quarter(ctx, grid),
        (Portion::Quarter | Portion::Half, GridKind::Degenerate) => degenerate_wedge(ctx, grid),
        (Portion::Eighth, _) => Err(BuildError::StructuralMismatch {
            detail: "eighth portions only arise on spheres".into(),
        }),
    }
}

fn lerp(from: Point3<f64>, to: Point3<f64>, s: f64) -> Point3<f64> {
    from + (to - from) * s
}

// ─── Full revolution ───

/// Ratio 1: a single block whose square section is inscribed in the circle.
fn one_block_full(
    ctx: &mut BuildCtx<'_>,
    rev: &Revolution,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    ctx.expect_boundary(3, 3, 2)?;
    let f = &rev.frame;
    let (db, dt) = (rev.r_bot * FRAC_1_SQRT_2, rev.r_top * FRAC_1_SQRT_2);
    let h = rev.height;

    let b = ctx.add_block(
        [
            f.pt(-db, -db, 0.0),
            f.pt(db, -db, 0.0),
            f.pt(-db, db, 0.0),
            f.pt(db, db, 0.0),
            f.pt(-dt, -dt, h),
            f.pt(dt, -dt, h),
            f.pt(-dt, dt, h),
            f.pt(dt, dt, h),
        ],
        BlockSize::new(2 * grid.n_i, 2 * grid.n_i, grid.n_axe),
    );

    for face in [
        FaceOnBlock::IMin,
        FaceOnBlock::IMax,
        FaceOnBlock::JMin,
        FaceOnBlock::JMax,
    ] {
        ctx.skin(b, face, 0)?;
    }
    ctx.skin(b, FaceOnBlock::KMax, 1)?;
    ctx.skin(b, FaceOnBlock::KMin, 2)?;
    rim(ctx, b, FaceOnBlock::KMin, 2)?;
    rim(ctx, b, FaceOnBlock::KMax, 0)?;
    Ok(())
}

/// Five blocks: four around the inner square, plus the core.
fn ogrid_full(
    ctx: &mut BuildCtx<'_>,
    rev: &Revolution,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    ctx.expect_boundary(3, 3, 2)?;
    let f = &rev.frame;
    let (db, dt) = (rev.r_bot * FRAC_1_SQRT_2, rev.r_top * FRAC_1_SQRT_2);
    let h = rev.height;
    let q = grid.ratio;

    // Outer square corners, walked counter-clockwise from (-x, -y).
    let o = [(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)];
    let p = |c: (f64, f64), scale: f64, top: bool| {
        let d = if top { dt } else { db };
        f.pt(c.0 * d * scale, c.1 * d * scale, if top { h } else { 0.0 })
    };

    let b1 = ctx.add_block(
        [
            p(o[0], 1.0, false),
            p(o[0], q, false),
            p(o[1], 1.0, false),
            p(o[1], q, false),
            p(o[0], 1.0, true),
            p(o[0], q, true),
            p(o[1], 1.0, true),
            p(o[1], q, true),
        ],
        BlockSize::new(grid.n_r, 2 * grid.n_i, grid.n_axe),
    );
    let b2 = ctx.add_block(
        [
            p(o[1], q, false),
            p(o[2], q, false),
            p(o[1], 1.0, false),
            p(o[2], 1.0, false),
            p(o[1], q, true),
            p(o[2], q, true),
            p(o[1], 1.0, true),
            p(o[2], 1.0, true),
        ],
        BlockSize::new(2 * grid.n_i, grid.n_r, grid.n_axe),
    );
    let b3 = ctx.add_block(
        [
            p(o[3], q, false),
            p(o[3], 1.0, false),
            p(o[2], q, false),
            p(o[2], 1.0, false),
            p(o[3], q, true),
            p(o[3], 1.0, true),
            p(o[2], q, true),
            p(o[2], 1.0, true),
        ],
        BlockSize::new(grid.n_r, 2 * grid.n_i, grid.n_axe),
    );
    let b4 = ctx.add_block(
        [
            p(o[0], 1.0, false),
            p(o[3], 1.0, false),
            p(o[0], q, false),
            p(o[3], q, false),
            p(o[0], 1.0, true),
            p(o[3], 1.0, true),
            p(o[0], q, true),
            p(o[3], q, true),
        ],
        BlockSize::new(2 * grid.n_i, grid.n_r, grid.n_axe),
    );
    let b5 = ctx.add_block(
        [
            p(o[0], q, false),
            p(o[3], q, false),
            p(o[1], q, false),
            p(o[2], q, false),
            p(o[0], q, true),
            p(o[3], q, true),
            p(o[1], q, true),
            p(o[2], q, true),
        ],
        BlockSize::new(2 * grid.n_i, 2 * grid.n_i, grid.n_axe),
    );

    // Core first, then the ring.
    ctx.weld(b1, FaceOnBlock::IMax, b5, FaceOnBlock::IMin)?;
    ctx.weld(b2, FaceOnBlock::JMin, b5, FaceOnBlock::JMax)?;
    ctx.weld(b3, FaceOnBlock::IMin, b5, FaceOnBlock::IMax)?;
    ctx.weld(b4, FaceOnBlock::JMax, b5, FaceOnBlock::JMin)?;
    ctx.weld(b1, FaceOnBlock::JMax, b2, FaceOnBlock::IMin)?;
    ctx.weld(b2, FaceOnBlock::IMax, b3, FaceOnBlock::JMax)?;
    ctx.weld(b3, FaceOnBlock::JMin, b4, FaceOnBlock::IMax)?;
    ctx.weld(b4, FaceOnBlock::IMin, b1, FaceOnBlock::JMin)?;

    ctx.skin(b1, FaceOnBlock::IMin, 0)?;
    ctx.skin(b2, FaceOnBlock::JMax, 0)?;
    ctx.skin(b3, FaceOnBlock::IMax, 0)?;
    ctx.skin(b4, FaceOnBlock::JMin, 0)?;
    for &b in &[b1, b2, b3, b4, b5] {
        ctx.skin(b, FaceOnBlock::KMax, 1)?;
        ctx.skin(b, FaceOnBlock::KMin, 2)?;
    }

    // Bottom and top circles.
    ctx.edge_on_curve(b1, 0, 2, 2)?;
    ctx.edge_on_curve(b2, 2, 3, 2)?;
    ctx.edge_on_curve(b3, 1, 3, 2)?;
    ctx.edge_on_curve(b4, 0, 1, 2)?;
    ctx.edge_on_curve(b1, 4, 6, 0)?;
    ctx.edge_on_curve(b2, 6, 7, 0)?;
    ctx.edge_on_curve(b3, 5, 7, 0)?;
    ctx.edge_on_curve(b4, 4, 5, 0)?;
    for corner in [0, 2] {
        ctx.corner_on_curve(b1, corner, 2)?;
        ctx.corner_on_curve(b1, corner + 4, 0)?;
    }
    for corner in [1, 3] {
        ctx.corner_on_curve(b3, corner, 2)?;
        ctx.corner_on_curve(b3, corner + 4, 0)?;
    }
    Ok(())
}

/// Ratio 0: four blocks collapsing onto the axis of revolution.
fn degenerate_full(
    ctx: &mut BuildCtx<'_>,
    rev: &Revolution,
    grid: &OGridSpec,
) -> Result<(), BuildError> {
    ctx.expect_boundary(3, 3, 2)?;
    let f = &rev.frame;
    let (db, dt) = (rev.r_bot * FRAC_1_SQRT_2, rev.r_top * FRAC_1_SQRT_2);
    let h = rev.height;
    let o = [(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)];
    let size = BlockSize::new(2 * grid.n_i, grid.n_axe, grid.n_r);

    // i circumferential, j axial, k toward the axis.
    let mut blocks = Vec::with_capacity(4);
    for q in 0..4 {
        let (xa, ya) = o[q];
        let (xb, yb) = o[(q + 1) % 4];
        let b = ctx.add_block(
            [
                f.pt(xa * db, ya * db, 0.0),
                f.pt(xb * db, yb * db, 0.0),
                f.pt(xa * dt, ya * dt, h),
                f.pt(xb * dt, yb * dt, h),
                f.pt(0.0, 0.0, 0.0),
                f.pt(0.0, 0.0, 0.0),
                f.pt(0.0, 0.0, h),
                f.pt(0.0, 0.0, h),
            ],
            size,
        );
        let (va, vb) = (ctx.corner(b, 4)?, ctx.corner(b, 5)?);
        ctx.topo.degenerate_face_to_edge(b, FaceOnBlock::KMax, va, vb)?;
        blocks.push(b);
    }
    for q in 0..4 {
        ctx.weld(
            blocks[q],
            FaceOnBlock::IMax,
            blocks[(q + 1) % 4],
            FaceOnBlock::IMin,
        )?;
    }

    for &b in &blocks {
        ctx.skin(b, FaceOnBlock::KMin, 0)?;
    }
    for &b in &blocks {
        ctx.skin(b, FaceOnBlock::JMax, 1)?;
        ctx.skin(b, FaceOnBlock::JMin, 2)?;
    }
    for &b in &blocks {
        ctx.edge_on_curve(b, 2, 3, 0)?;
        ctx.edge_on_curve(b, 0, 1, 2)?;
        ctx.corner_on_curve(b, 2, 0)?;
        ctx.corner_on_curve(b, 3, 0)?;
        ctx.corner_on_curve(b, 0, 2)?;
        ctx.corner_on_curve(b, 1, 2)?;
    }
    Ok(())
}

// ─── Wedges ───

/// Ratio 1, angle at most 135 degrees: one block spanning the whole wedge.
fn one_block_quarter(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(5, 9, 6)?;
    let b = ctx.add_block(
        [
            ctx.geom_point(0)?,        // bottom axis
            ctx.geom_point(2)?,        // bottom rim at angle 0
            ctx.geom_point(4)?,        // bottom rim at the cut angle
            ctx.sample_curve(1, 0.5)?, // bottom arc midpoint
            ctx.geom_point(1)?,
            ctx.geom_point(3)?,
            ctx.geom_point(5)?,
            ctx.sample_curve(0, 0.5)?,
        ],
        BlockSize::new(grid.n_i, grid.n_i, grid.n_axe),
    );

    ctx.skin(b, FaceOnBlock::IMax, 0)?;
    ctx.skin(b, FaceOnBlock::JMax, 0)?;
    ctx.skin(b, FaceOnBlock::KMax, 1)?;
    ctx.skin(b, FaceOnBlock::KMin, 2)?;
    ctx.skin(b, FaceOnBlock::JMin, 3)?;
    ctx.skin(b, FaceOnBlock::IMin, 4)?;

    ctx.edge_on_curve(b, 1, 3, 1)?;
    ctx.edge_on_curve(b, 3, 2, 1)?;
    ctx.edge_on_curve(b, 5, 7, 0)?;
    ctx.edge_on_curve(b, 7, 6, 0)?;
    ctx.edge_on_curve(b, 0, 1, 2)?;
    ctx.edge_on_curve(b, 0, 2, 4)?;
    ctx.edge_on_curve(b, 4, 5, 3)?;
    ctx.edge_on_curve(b, 4, 6, 5)?;
    ctx.edge_on_curve(b, 1, 5, 6)?;
    ctx.edge_on_curve(b, 2, 6, 7)?;
    ctx.edge_on_curve(b, 0, 4, 8)?;
    ctx.corner_on_curve(b, 3, 1)?;
    ctx.corner_on_curve(b, 7, 0)?;

    ctx.corner_on_geom_vertex(b, 0, 0)?;
    ctx.corner_on_geom_vertex(b, 4, 1)?;
    ctx.corner_on_geom_vertex(b, 1, 2)?;
    ctx.corner_on_geom_vertex(b, 5, 3)?;
    ctx.corner_on_geom_vertex(b, 2, 4)?;
    ctx.corner_on_geom_vertex(b, 6, 5)?;
    Ok(())
}

/// Ratio 1, angle between 135 and 360 degrees: one block whose diameter
/// face is split in two at the axis.
fn one_block_half(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(5, 9, 6)?;
    let b = ctx.add_block(
        [
            ctx.geom_point(4)?, // bottom rim at the cut angle
            ctx.geom_point(2)?, // bottom rim at angle 0
            ctx.sample_curve(1, 0.75)?,
            ctx.sample_curve(1, 0.25)?,
            ctx.geom_point(5)?,
            ctx.geom_point(3)?,
            ctx.sample_curve(0, 0.75)?,
            ctx.sample_curve(0, 0.25)?,
        ],
        BlockSize::new(2 * grid.n_i, grid.n_r, grid.n_axe),
    );

    ctx.skin(b, FaceOnBlock::IMin, 0)?;
    ctx.skin(b, FaceOnBlock::IMax, 0)?;
    ctx.skin(b, FaceOnBlock::JMax, 0)?;
    ctx.skin(b, FaceOnBlock::KMax, 1)?;
    ctx.skin(b, FaceOnBlock::KMin, 2)?;

    // The diameter face covers both cut planes: split it at the axis.
    let (c0, c1) = (ctx.corner(b, 0)?, ctx.corner(b, 1)?);
    let split = ctx.topo.split_face(b, FaceOnBlock::JMin, c0, c1, 0.5)?;
    ctx.vertex_on_geom_vertex(split.mid_vertices[0], 0)?;
    ctx.vertex_on_geom_vertex(split.mid_vertices[1], 1)?;
    ctx.edge_id_on_curve(split.mid_edge, 8)?;
    ctx.face_id_on_surface(split.halves[0], 4)?;
    ctx.face_id_on_surface(split.halves[1], 3)?;
    ctx.edge_id_on_curve(split.cut_sub[0], 4)?;
    ctx.edge_id_on_curve(split.cut_sub[1], 2)?;
    if let Some([oa, ob]) = split.opp_sub {
        ctx.edge_id_on_curve(oa, 5)?;
        ctx.edge_id_on_curve(ob, 3)?;
    }

    ctx.edge_on_curve(b, 1, 3, 1)?;
    ctx.edge_on_curve(b, 3, 2, 1)?;
    ctx.edge_on_curve(b, 2, 0, 1)?;
    ctx.edge_on_curve(b, 5, 7, 0)?;
    ctx.edge_on_curve(b, 7, 6, 0)?;
    ctx.edge_on_curve(b, 6, 4, 0)?;
    ctx.edge_on_curve(b, 1, 5, 6)?;
    ctx.edge_on_curve(b, 0, 4, 7)?;
    ctx.corner_on_curve(b, 2, 1)?;
    ctx.corner_on_curve(b, 3, 1)?;
    ctx.corner_on_curve(b, 6, 0)?;
    ctx.corner_on_curve(b, 7, 0)?;

    ctx.corner_on_geom_vertex(b, 0, 4)?;
    ctx.corner_on_geom_vertex(b, 4, 5)?;
    ctx.corner_on_geom_vertex(b, 1, 2)?;
    ctx.corner_on_geom_vertex(b, 5, 3)?;
    Ok(())
}

/// Ratio 0, any wedge angle: one block wrapping the arc, collapsed onto
/// the axis.
fn degenerate_wedge(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(5, 9, 6)?;
    let axis_bot = ctx.geom_point(0)?;
    let axis_top = ctx.geom_point(1)?;
    let b = ctx.add_block(
        [
            ctx.geom_point(4)?, // bottom rim at the cut angle
            ctx.geom_point(2)?, // bottom rim at angle 0
            ctx.geom_point(5)?,
            ctx.geom_point(3)?,
            axis_bot,
            axis_bot,
            axis_top,
            axis_top,
        ],
        BlockSize::new(4 * grid.n_i, grid.n_axe, grid.n_r),
    );
    let (va, vb) = (ctx.corner(b, 4)?, ctx.corner(b, 5)?);
    ctx.topo.degenerate_face_to_edge(b, FaceOnBlock::KMax, va, vb)?;

    ctx.skin(b, FaceOnBlock::KMin, 0)?;
    ctx.skin(b, FaceOnBlock::JMax, 1)?;
    ctx.skin(b, FaceOnBlock::JMin, 2)?;
    ctx.skin(b, FaceOnBlock::IMax, 3)?;
    ctx.skin(b, FaceOnBlock::IMin, 4)?;

    ctx.edge_on_curve(b, 2, 3, 0)?;
    ctx.edge_on_curve(b, 0, 1, 1)?;
    ctx.edge_on_curve(b, 1, 3, 6)?;
    ctx.edge_on_curve(b, 0, 2, 7)?;
    ctx.edge_on_curve(b, 1, 4, 2)?;
    ctx.edge_on_curve(b, 0, 4, 4)?;
    ctx.edge_on_curve(b, 3, 6, 3)?;
    ctx.edge_on_curve(b, 2, 6, 5)?;
    ctx.edge_on_curve(b, 4, 6, 8)?;

    ctx.corner_on_geom_vertex(b, 0, 4)?;
    ctx.corner_on_geom_vertex(b, 1, 2)?;
    ctx.corner_on_geom_vertex(b, 2, 5)?;
    ctx.corner_on_geom_vertex(b, 3, 3)?;
    ctx.corner_on_geom_vertex(b, 4, 0)?;
    ctx.corner_on_geom_vertex(b, 6, 1)?;
    Ok(())
}

/// Strict o-grid, angle at most 135 degrees: a core block plus two blocks
/// reaching the lateral skin.
fn ogrid_quarter(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(5, 9, 6)?;
    let q2 = grid.ratio * FRAC_1_SQRT_2;
    let axis_b = ctx.geom_point(0)?;
    let axis_t = ctx.geom_point(1)?;
    let rim0_b = ctx.geom_point(2)?;
    let rim0_t = ctx.geom_point(3)?;
    let rima_b = ctx.geom_point(4)?;
    let rima_t = ctx.geom_point(5)?;
    let mid_b = ctx.sample_curve(1, 0.5)?;
    let mid_t = ctx.sample_curve(0, 0.5)?;

    let i0_b = lerp(axis_b, rim0_b, q2);
    let i0_t = lerp(axis_t, rim0_t, q2);
    let ia_b = lerp(axis_b, rima_b, q2);
    let ia_t = lerp(axis_t, rima_t, q2);
    // Fourth corner of the inner parallelogram.
    let im_b = Point3::from(i0_b.coords + ia_b.coords - axis_b.coords);
    let im_t = Point3::from(i0_t.coords + ia_t.coords - axis_t.coords);

    let b1 = ctx.add_block(
        [axis_b, i0_b, ia_b, im_b, axis_t, i0_t, ia_t, im_t],
        BlockSize::new(grid.n_i, grid.n_i, grid.n_axe),
    );
    let b2 = ctx.add_block(
        [i0_b, rim0_b, im_b, mid_b, i0_t, rim0_t, im_t, mid_t],
        BlockSize::new(grid.n_r, grid.n_i, grid.n_axe),
    );
    let b3 = ctx.add_block(
        [ia_b, im_b, rima_b, mid_b, ia_t, im_t, rima_t, mid_t],
        BlockSize::new(grid.n_i, grid.n_r, grid.n_axe),
    );

    ctx.weld(b1, FaceOnBlock::IMax, b2, FaceOnBlock::IMin)?;
    ctx.weld(b1, FaceOnBlock::JMax, b3, FaceOnBlock::JMin)?;
    ctx.weld(b2, FaceOnBlock::JMax, b3, FaceOnBlock::IMax)?;

    ctx.skin(b2, FaceOnBlock::IMax, 0)?;
    ctx.skin(b3, FaceOnBlock::JMax, 0)?;
    for &b in &[b1, b2, b3] {
        ctx.skin(b, FaceOnBlock::KMax, 1)?;
        ctx.skin(b, FaceOnBlock::KMin, 2)?;
    }
    ctx.skin(b1, FaceOnBlock::JMin, 3)?;
    ctx.skin(b2, FaceOnBlock::JMin, 3)?;
    ctx.skin(b1, FaceOnBlock::IMin, 4)?;
    ctx.skin(b3, FaceOnBlock::IMin, 4)?;

    // Arcs.
    ctx.edge_on_curve(b2, 1, 3, 1)?;
    ctx.edge_on_curve(b3, 2, 3, 1)?;
    ctx.corner_on_curve(b2, 3, 1)?;
    ctx.edge_on_curve(b2, 5, 7, 0)?;
    ctx.edge_on_curve(b3, 6, 7, 0)?;
    ctx.corner_on_curve(b2, 7, 0)?;
    // Radii; the inner corner sits halfway along each one.
    ctx.edge_on_curve(b1, 0, 1, 2)?;
    ctx.edge_on_curve(b2, 0, 1, 2)?;
    ctx.corner_on_curve(b1, 1, 2)?;
    ctx.edge_on_curve(b1, 0, 2, 4)?;
    ctx.edge_on_curve(b3, 0, 2, 4)?;
    ctx.corner_on_curve(b1, 2, 4)?;
    ctx.edge_on_curve(b1, 4, 5, 3)?;
    ctx.edge_on_curve(b2, 4, 5, 3)?;
    ctx.corner_on_curve(b1, 5, 3)?;
    ctx.edge_on_curve(b1, 4, 6, 5)?;
    ctx.edge_on_curve(b3, 4, 6, 5)?;
    ctx.corner_on_curve(b1, 6, 5)?;
    // Inner o-grid chords lie in the cap disks.
    ctx.edge_on_surface(b1, 1, 3, 2)?;
    ctx.edge_on_surface(b1, 2, 3, 2)?;
    ctx.edge_on_surface(b2, 2, 3, 2)?;
    ctx.corner_on_surface(b1, 3, 2)?;
    ctx.edge_on_surface(b1, 5, 7, 1)?;
    ctx.edge_on_surface(b1, 6, 7, 1)?;
    ctx.edge_on_surface(b2, 6, 7, 1)?;
    ctx.corner_on_surface(b1, 7, 1)?;
    // Verticals.
    ctx.edge_on_curve(b2, 1, 5, 6)?;
    ctx.edge_on_curve(b3, 2, 6, 7)?;
    ctx.edge_on_curve(b1, 0, 4, 8)?;
    ctx.edge_on_surface(b3, 3, 7, 0)?;

    ctx.corner_on_geom_vertex(b1, 0, 0)?;
    ctx.corner_on_geom_vertex(b1, 4, 1)?;
    ctx.corner_on_geom_vertex(b2, 1, 2)?;
    ctx.corner_on_geom_vertex(b2, 5, 3)?;
    ctx.corner_on_geom_vertex(b3, 2, 4)?;
    ctx.corner_on_geom_vertex(b3, 6, 5)?;
    Ok(())
}

/// Strict o-grid, angle between 135 and 360 degrees: four blocks, with the
/// core chord face split in two at the axis.
fn ogrid_half(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(5, 9, 6)?;
    let q = grid.ratio;
    let q2 = q * FRAC_1_SQRT_2;
    let axis_b = ctx.geom_point(0)?;
    let axis_t = ctx.geom_point(1)?;
    let rim0_b = ctx.geom_point(2)?;
    let rim0_t = ctx.geom_point(3)?;
    let rima_b = ctx.geom_point(4)?;
    let rima_t = ctx.geom_point(5)?;
    let q1_b = ctx.sample_curve(1, 0.25)?;
    let q3_b = ctx.sample_curve(1, 0.75)?;
    let q1_t = ctx.sample_curve(0, 0.25)?;
    let q3_t = ctx.sample_curve(0, 0.75)?;

    // Inner ring: chord ends scale by ratio/sqrt(2), arc quarter-points by
    // the plain ratio.
    let pa_b = lerp(axis_b, rim0_b, q2);
    let pa_t = lerp(axis_t, rim0_t, q2);
    let pb_b = lerp(axis_b, rima_b, q2);
    let pb_t = lerp(axis_t, rima_t, q2);
    let p1_b = lerp(axis_b, q1_b, q);
    let p1_t = lerp(axis_t, q1_t, q);
    let p3_b = lerp(axis_b, q3_b, q);
    let p3_t = lerp(axis_t, q3_t, q);

    let b1 = ctx.add_block(
        [pb_b, pa_b, p3_b, p1_b, pb_t, pa_t, p3_t, p1_t],
        BlockSize::new(2 * grid.n_i, grid.n_i, grid.n_axe),
    );
    let b2 = ctx.add_block(
        [pa_b, rim0_b, p1_b, q1_b, pa_t, rim0_t, p1_t, q1_t],
        BlockSize::new(grid.n_r, grid.n_i, grid.n_axe),
    );
    let b3 = ctx.add_block(
        [p3_b, p1_b, q3_b, q1_b, p3_t, p1_t, q3_t, q1_t],
        BlockSize::new(2 * grid.n_i, grid.n_r, grid.n_axe),
    );
    let b4 = ctx.add_block(
        [rima_b, pb_b, q3_b, p3_b, rima_t, pb_t, q3_t, p3_t],
        BlockSize::new(grid.n_r, grid.n_i, grid.n_axe),
    );

    ctx.weld(b1, FaceOnBlock::IMax, b2, FaceOnBlock::IMin)?;
    ctx.weld(b1, FaceOnBlock::JMax, b3, FaceOnBlock::JMin)?;
    ctx.weld(b1, FaceOnBlock::IMin, b4, FaceOnBlock::IMax)?;
    ctx.weld(b2, FaceOnBlock::JMax, b3, FaceOnBlock::IMax)?;
    ctx.weld(b3, FaceOnBlock::IMin, b4, FaceOnBlock::JMax)?;

    ctx.skin(b2, FaceOnBlock::IMax, 0)?;
    ctx.skin(b3, FaceOnBlock::JMax, 0)?;
    ctx.skin(b4, FaceOnBlock::IMin, 0)?;
    for &b in &[b1, b2, b3, b4] {
        ctx.skin(b, FaceOnBlock::KMax, 1)?;
        ctx.skin(b, FaceOnBlock::KMin, 2)?;
    }
    ctx.skin(b2, FaceOnBlock::JMin, 3)?;
    ctx.skin(b4, FaceOnBlock::JMin, 4)?;

    // The core chord face covers both cut planes: split it at the axis.
    let (c0, c1) = (ctx.corner(b1, 0)?, ctx.corner(b1, 1)?);
    let split = ctx.topo.split_face(b1, FaceOnBlock::JMin, c0, c1, 0.5)?;
    ctx.vertex_on_geom_vertex(split.mid_vertices[0], 0)?;
    ctx.vertex_on_geom_vertex(split.mid_vertices[1], 1)?;
    ctx.edge_id_on_curve(split.mid_edge, 8)?;
    ctx.face_id_on_surface(split.halves[0], 4)?;
    ctx.face_id_on_surface(split.halves[1], 3)?;
    ctx.edge_id_on_curve(split.cut_sub[0], 4)?;
    ctx.edge_id_on_curve(split.cut_sub[1], 2)?;
    if let Some([oa, ob]) = split.opp_sub {
        ctx.edge_id_on_curve(oa, 5)?;
        ctx.edge_id_on_curve(ob, 3)?;
    }
    ctx.edge_on_surface(b1, 1, 5, 3)?;
    ctx.edge_on_surface(b1, 0, 4, 4)?;

    // Arcs.
    ctx.edge_on_curve(b2, 1, 3, 1)?;
    ctx.edge_on_curve(b3, 2, 3, 1)?;
    ctx.edge_on_curve(b4, 0, 2, 1)?;
    ctx.corner_on_curve(b2, 3, 1)?;
    ctx.corner_on_curve(b3, 2, 1)?;
    ctx.edge_on_curve(b2, 5, 7, 0)?;
    ctx.edge_on_curve(b3, 6, 7, 0)?;
    ctx.edge_on_curve(b4, 4, 6, 0)?;
    ctx.corner_on_curve(b2, 7, 0)?;
    ctx.corner_on_curve(b3, 6, 0)?;
    // Radii.
    ctx.edge_on_curve(b2, 0, 1, 2)?;
    ctx.edge_on_curve(b4, 0, 1, 4)?;
    ctx.edge_on_curve(b2, 4, 5, 3)?;
    ctx.edge_on_curve(b4, 4, 5, 5)?;
    ctx.corner_on_curve(b1, 1, 2)?;
    ctx.corner_on_curve(b1, 0, 4)?;
    ctx.corner_on_curve(b1, 5, 3)?;
    ctx.corner_on_curve(b1, 4, 5)?;
    // Inner o-grid chords lie in the cap disks.
    ctx.edge_on_surface(b1, 1, 3, 2)?;
    ctx.edge_on_surface(b1, 2, 3, 2)?;
    ctx.edge_on_surface(b1, 0, 2, 2)?;
    ctx.edge_on_surface(b2, 2, 3, 2)?;
    ctx.edge_on_surface(b4, 2, 3, 2)?;
    ctx.corner_on_surface(b1, 2, 2)?;
    ctx.corner_on_surface(b1, 3, 2)?;
    ctx.edge_on_surface(b1, 5, 7, 1)?;
    ctx.edge_on_surface(b1, 6, 7, 1)?;
    ctx.edge_on_surface(b1, 4, 6, 1)?;
    ctx.edge_on_surface(b2, 6, 7, 1)?;
    ctx.edge_on_surface(b4, 6, 7, 1)?;
    ctx.corner_on_surface(b1, 6, 1)?;
    ctx.corner_on_surface(b1, 7, 1)?;
    // Verticals.
    ctx.edge_on_curve(b2, 1, 5, 6)?;
    ctx.edge_on_curve(b4, 0, 4, 7)?;
    ctx.edge_on_surface(b3, 2, 6, 0)?;
    ctx.edge_on_surface(b3, 3, 7, 0)?;

    ctx.corner_on_geom_vertex(b2, 1, 2)?;
    ctx.corner_on_geom_vertex(b2, 5, 3)?;
    ctx.corner_on_geom_vertex(b4, 0, 4)?;
    ctx.corner_on_geom_vertex(b4, 4, 5)?;
    Ok(())
}

/// Pull the edges and corners of a cap face down from its surface onto the
/// bounding circle.
fn rim(
    ctx: &mut BuildCtx<'_>,
    block: ogrid_kernel::topology::BlockId,
    face: FaceOnBlock,
    curve: usize,
) -> Result<(), BuildError> {
    let f = ctx.topo.face_of(block, face)?;
    for e in ctx.topo.edges_of_face(f)? {
        ctx.edge_id_on_curve(e, curve)?;
    }
    let cycle = ctx.topo.face(f)?.vertices.clone();
    for v in cycle {
        ctx.vertex_on_curve(v, curve)?;
    }
    Ok(())
}
