//! Block topologies over cones.
//!
//! Frustums reuse the revolution builders shared with cylinders. A null
//! first radius collapses the blocks onto the apex instead, which rules
//! out the fully degenerate core.

use std::f64::consts::FRAC_1_SQRT_2;

use nalgebra::Point3;

use ogrid_kernel::geom::primitives::Frame;
use ogrid_kernel::topology::{BlockSize, FaceOnBlock};
use ogrid_types::{ConeProfile, ConeSpec, OGridSpec, Portion};

use crate::builder::BuildCtx;
use crate::case::GridKind;
use crate::cylinder::{build_revolution, Revolution};
use crate::error::BuildError;
use crate::projector;

pub(crate) fn build(
    ctx: &mut BuildCtx<'_>,
    spec: &ConeSpec,
    grid: &OGridSpec,
    portion: Portion,
    kind: GridKind,
) -> Result<(), BuildError> {
    match spec.profile {
        ConeProfile::Frustum { r1, r2 } => {
            let rev = Revolution {
                frame: Frame::new(spec.center, spec.axis)?,
                r_bot: r1,
                r_top: r2,
                height: spec.height,
            };
            build_revolution(ctx, &rev, grid, portion, kind)
        }
        ConeProfile::Apex { .. } => {
            if kind == GridKind::Degenerate {
                return Err(BuildError::UnsupportedConfiguration {
                    detail: "a cone with a null first radius cannot be combined with a fully degenerate core",
                });
            }
            match (portion, kind) {
                (Portion::Full, GridKind::OneBlock) => apex_one_block_full(ctx, grid),
                (Portion::Full, _) => apex_ogrid_full(ctx, grid),
                (Portion::Half, GridKind::OneBlock) => apex_one_block_half(ctx, grid),
                (Portion::Half, _) => apex_ogrid_half(ctx, grid),
                (Portion::Quarter, GridKind::OneBlock) => apex_one_block_quarter(ctx, grid),
                (Portion::Quarter, _) => apex_ogrid_quarter(ctx, grid),
                (Portion::Eighth, _) => Err(BuildError::StructuralMismatch {
                    detail: "eighth portions only arise on spheres".into(),
                }),
            }
        }
    }
}

fn lerp(from: Point3<f64>, to: Point3<f64>, s: f64) -> Point3<f64> {
    from + (to - from) * s
}

fn finish(ctx: &mut BuildCtx<'_>) -> Result<(), BuildError> {
    projector::snap_vertices(ctx)?;
    projector::project_edges_on_curves(ctx)?;
    projector::project_faces_on_surfaces(ctx)?;
    Ok(())
}

// ─── Single block ───

fn apex_one_block_quarter(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(4, 6, 4)?;
    let apex = ctx.geom_point(0)?;
    let b = ctx.add_block(
        [
            ctx.geom_point(2)?, // far rim at angle 0
            ctx.sample_curve(0, 0.5)?,
            ctx.geom_point(1)?, // far disk centre
            ctx.geom_point(3)?, // far rim at the cut angle
            apex,
            apex,
            apex,
            apex,
        ],
        BlockSize::new(grid.n_i, grid.n_i, grid.n_axe),
    );
    ctx.topo.degenerate_face_to_vertex(b, FaceOnBlock::KMax)?;

    ctx.corner_on_geom_vertex(b, 0, 2)?;
    ctx.corner_on_geom_vertex(b, 2, 1)?;
    ctx.corner_on_geom_vertex(b, 3, 3)?;
    let tip = ctx.corner(b, 4)?;
    ctx.vertex_on_geom_vertex(tip, 0)?;
    ctx.corner_on_curve(b, 1, 0)?;
    finish(ctx)
}

fn apex_one_block_half(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(4, 6, 4)?;
    let apex = ctx.geom_point(0)?;
    let b = ctx.add_block(
        [
            ctx.sample_curve(0, 0.75)?,
            ctx.sample_curve(0, 0.25)?,
            ctx.geom_point(3)?, // far rim at the cut angle
            ctx.geom_point(2)?, // far rim at angle 0
            apex,
            apex,
            apex,
            apex,
        ],
        BlockSize::new(2 * grid.n_i, grid.n_i, grid.n_axe),
    );
    ctx.topo.degenerate_face_to_vertex(b, FaceOnBlock::KMax)?;

    ctx.corner_on_geom_vertex(b, 2, 3)?;
    ctx.corner_on_geom_vertex(b, 3, 2)?;
    let tip = ctx.corner(b, 4)?;
    ctx.vertex_on_geom_vertex(tip, 0)?;
    ctx.corner_on_curve(b, 0, 0)?;
    ctx.corner_on_curve(b, 1, 0)?;

    // The diameter face is a triangle through the apex: split it at the
    // axis so each half lands in its own cut plane.
    let (c2, c3) = (ctx.corner(b, 2)?, ctx.corner(b, 3)?);
    let split = ctx.topo.split_face(b, FaceOnBlock::JMax, c2, c3, 0.5)?;
    ctx.vertex_on_geom_vertex(split.mid_vertices[0], 1)?;
    finish(ctx)
}

fn apex_one_block_full(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(2, 2, 2)?;
    let apex = ctx.geom_point(0)?;
    let b = ctx.add_block(
        [
            ctx.sample_curve(0, 0.125)?,
            ctx.sample_curve(0, 0.375)?,
            ctx.sample_curve(0, 0.875)?,
            ctx.sample_curve(0, 0.625)?,
            apex,
            apex,
            apex,
            apex,
        ],
        BlockSize::new(2 * grid.n_i, 2 * grid.n_i, grid.n_axe),
    );
    ctx.topo.degenerate_face_to_vertex(b, FaceOnBlock::KMax)?;

    let tip = ctx.corner(b, 4)?;
    ctx.vertex_on_geom_vertex(tip, 0)?;
    for corner in 0..4 {
        ctx.corner_on_curve(b, corner, 0)?;
    }
    finish(ctx)
}

// ─── O-grid ───

fn apex_ogrid_quarter(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(4, 6, 4)?;
    let q = grid.ratio;
    let q2 = q * FRAC_1_SQRT_2;
    let apex = ctx.geom_point(0)?;
    let centre = ctx.geom_point(1)?;
    let rim0 = ctx.geom_point(2)?;
    let rima = ctx.geom_point(3)?;
    let m = ctx.sample_curve(0, 0.5)?;
    let im = lerp(centre, m, q);
    let ir0 = lerp(centre, rim0, q2);
    let ira = lerp(centre, rima, q2);

    let b1 = ctx.add_block(
        [m, rima, im, ira, apex, apex, apex, apex],
        BlockSize::new(grid.n_i, grid.n_r, grid.n_axe),
    );
    let b2 = ctx.add_block(
        [m, im, rim0, ir0, apex, apex, apex, apex],
        BlockSize::new(grid.n_r, grid.n_i, grid.n_axe),
    );
    let b5 = ctx.add_block(
        [im, ira, ir0, centre, apex, apex, apex, apex],
        BlockSize::new(grid.n_i, grid.n_i, grid.n_axe),
    );
    for &b in &[b1, b2, b5] {
        ctx.topo.degenerate_face_to_vertex(b, FaceOnBlock::KMax)?;
    }

    ctx.weld(b1, FaceOnBlock::JMax, b5, FaceOnBlock::JMin)?;
    ctx.weld(b2, FaceOnBlock::IMax, b5, FaceOnBlock::IMin)?;
    ctx.weld(b1, FaceOnBlock::IMin, b2, FaceOnBlock::JMin)?;

    ctx.corner_on_curve(b1, 0, 0)?;
    ctx.corner_on_curve(b1, 3, 4)?;
    ctx.corner_on_curve(b2, 3, 3)?;
    ctx.corner_on_surface(b1, 2, 1)?;
    ctx.corner_on_geom_vertex(b1, 1, 3)?;
    ctx.corner_on_geom_vertex(b2, 2, 2)?;
    ctx.corner_on_geom_vertex(b5, 3, 1)?;
    let tip = ctx.corner(b5, 4)?;
    ctx.vertex_on_geom_vertex(tip, 0)?;
    finish(ctx)
}

fn apex_ogrid_half(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(4, 6, 4)?;
    let q = grid.ratio;
    let q2 = q * FRAC_1_SQRT_2;
    let apex = ctx.geom_point(0)?;
    let centre = ctx.geom_point(1)?;
    let rim0 = ctx.geom_point(2)?;
    let rima = ctx.geom_point(3)?;
    let q1 = ctx.sample_curve(0, 0.25)?;
    let q3 = ctx.sample_curve(0, 0.75)?;
    let iq1 = lerp(centre, q1, q);
    let iq3 = lerp(centre, q3, q);
    let ir0 = lerp(centre, rim0, q2);
    let ira = lerp(centre, rima, q2);

    let b1 = ctx.add_block(
        [q3, rima, iq3, ira, apex, apex, apex, apex],
        BlockSize::new(grid.n_i, grid.n_r, grid.n_axe),
    );
    let b2 = ctx.add_block(
        [q3, iq3, q1, iq1, apex, apex, apex, apex],
        BlockSize::new(grid.n_r, 2 * grid.n_i, grid.n_axe),
    );
    let b3 = ctx.add_block(
        [iq1, ir0, q1, rim0, apex, apex, apex, apex],
        BlockSize::new(grid.n_i, grid.n_r, grid.n_axe),
    );
    let b5 = ctx.add_block(
        [iq3, ira, iq1, ir0, apex, apex, apex, apex],
        BlockSize::new(grid.n_i, 2 * grid.n_i, grid.n_axe),
    );
    for &b in &[b1, b2, b3, b5] {
        ctx.topo.degenerate_face_to_vertex(b, FaceOnBlock::KMax)?;
    }

    // Split the core diameter face before welding merges its corners with
    // the neighbours.
    let (c1, c3) = (ctx.corner(b5, 1)?, ctx.corner(b5, 3)?);
    let split = ctx.topo.split_face(b5, FaceOnBlock::IMax, c1, c3, 0.5)?;
    ctx.vertex_on_geom_vertex(split.mid_vertices[0], 1)?;

    ctx.weld(b1, FaceOnBlock::JMax, b5, FaceOnBlock::JMin)?;
    ctx.weld(b2, FaceOnBlock::IMax, b5, FaceOnBlock::IMin)?;
    ctx.weld(b3, FaceOnBlock::JMin, b5, FaceOnBlock::JMax)?;
    ctx.weld(b1, FaceOnBlock::IMin, b2, FaceOnBlock::JMin)?;
    ctx.weld(b2, FaceOnBlock::JMax, b3, FaceOnBlock::IMin)?;

    ctx.corner_on_curve(b1, 0, 0)?;
    ctx.corner_on_curve(b3, 2, 0)?;
    ctx.corner_on_curve(b1, 3, 4)?;
    ctx.corner_on_curve(b3, 1, 3)?;
    ctx.corner_on_surface(b1, 2, 1)?;
    ctx.corner_on_surface(b3, 0, 1)?;
    ctx.corner_on_geom_vertex(b1, 1, 3)?;
    ctx.corner_on_geom_vertex(b3, 3, 2)?;
    let tip = ctx.corner(b5, 4)?;
    ctx.vertex_on_geom_vertex(tip, 0)?;
    finish(ctx)
}

fn apex_ogrid_full(ctx: &mut BuildCtx<'_>, grid: &OGridSpec) -> Result<(), BuildError> {
    ctx.expect_boundary(2, 2, 2)?;
    let q = grid.ratio;
    let apex = ctx.geom_point(0)?;
    let q1 = ctx.sample_curve(0, 0.125)?;
    let q2 = ctx.sample_curve(0, 0.375)?;
    let q3 = ctx.sample_curve(0, 0.625)?;
    let q4 = ctx.sample_curve(0, 0.875)?;
    let centre = nalgebra::center(&q2, &q4);
    let iq1 = lerp(centre, q1, q);
    let iq2 = lerp(centre, q2, q);
    let iq3 = lerp(centre, q3, q);
    let iq4 = lerp(centre, q4, q);

    let b1 = ctx.add_block(
        [q1, q2, iq1, iq2, apex, apex, apex, apex],
        BlockSize::new(2 * grid.n_i, grid.n_r, grid.n_axe),
    );
    let b2 = ctx.add_block(
        [q1, iq1, q4, iq4, apex, apex, apex, apex],
        BlockSize::new(grid.n_r, 2 * grid.n_i, grid.n_axe),
    );
    let b3 = ctx.add_block(
        [iq4, iq3, q4, q3, apex, apex, apex, apex],
        BlockSize::new(2 * grid.n_i, grid.n_r, grid.n_axe),
    );
    let b4 = ctx.add_block(
        [iq2, q2, iq3, q3, apex, apex, apex, apex],
        BlockSize::new(grid.n_r, 2 * grid.n_i, grid.n_axe),
    );
    let b5 = ctx.add_block(
        [iq1, iq2, iq4, iq3, apex, apex, apex, apex],
        BlockSize::new(2 * grid.n_i, 2 * grid.n_i, grid.n_axe),
    );
    for &b in &[b1, b2, b3, b4, b5] {
        ctx.topo.degenerate_face_to_vertex(b, FaceOnBlock::KMax)?;
    }

    ctx.weld(b1, FaceOnBlock::JMax, b5, FaceOnBlock::JMin)?;
    ctx.weld(b2, FaceOnBlock::IMax, b5, FaceOnBlock::IMin)?;
    ctx.weld(b3, FaceOnBlock::JMin, b5, FaceOnBlock::JMax)?;
    ctx.weld(b4, FaceOnBlock::IMin, b5, FaceOnBlock::IMax)?;
    ctx.weld(b1, FaceOnBlock::IMin, b2, FaceOnBlock::JMin)?;
    ctx.weld(b2, FaceOnBlock::JMax, b3, FaceOnBlock::IMin)?;
    ctx.weld(b3, FaceOnBlock::IMax, b4, FaceOnBlock::JMax)?;
    ctx.weld(b4, FaceOnBlock::JMin, b1, FaceOnBlock::IMax)?;

    ctx.corner_on_curve(b1, 0, 0)?;
    ctx.corner_on_curve(b1, 1, 0)?;
    ctx.corner_on_curve(b3, 3, 0)?;
    ctx.corner_on_curve(b3, 2, 0)?;
    ctx.corner_on_surface(b1, 2, 1)?;
    ctx.corner_on_surface(b1, 3, 1)?;
    ctx.corner_on_surface(b3, 1, 1)?;
    ctx.corner_on_surface(b3, 0, 1)?;
    let tip = ctx.corner(b5, 4)?;
    ctx.vertex_on_geom_vertex(tip, 0)?;
    finish(ctx)
}
