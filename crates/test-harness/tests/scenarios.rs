//! End-to-end scenarios over the real command path.

use nalgebra::Point3;
use ogrid_kernel::topology::{BlockId, BlockSize, FaceOnBlock, TopoStore, TopologyError};
use ogrid_kernel::Tolerance;
use ogrid_types::{OGridSpec, Portion};
use test_harness::assertions::*;
use test_harness::Scenario;

/// Split the blocks of a full-cylinder o-grid into (core, laterals) by cell
/// count; the core is the single `2n_i × 2n_i × n_axe` block.
fn core_and_laterals(s: &Scenario, blocks: &[BlockId], core_cells: u64) -> (BlockId, Vec<BlockId>) {
    let mut core = None;
    let mut laterals = Vec::new();
    for &b in blocks {
        if s.ctx.topo.block(b).unwrap().size.cells() == core_cells {
            core = Some(b);
        } else {
            laterals.push(b);
        }
    }
    (core.expect("one core block"), laterals)
}

// ── Reference scenario: full cylinder, ratio one half ───────────────────────

#[test]
fn full_cylinder_reference_scenario() {
    let mut s = Scenario::new();
    s.cylinder("cyl", 1.0, 2.0, 360.0).unwrap();
    let blocks = s.ogrid("cyl", OGridSpec::new(4, 2, 3, 0.5)).unwrap();
    assert_eq!(blocks.len(), 5, "core plus four laterals");

    // lateral blocks mesh 2n_i x n_r x n_axe cells, the core 2n_i x 2n_i x n_axe
    let (core, laterals) = core_and_laterals(&s, &blocks, 8 * 8 * 3);
    for &b in &laterals {
        assert_eq!(s.ctx.topo.block(b).unwrap().size.cells(), 8 * 2 * 3);
    }
    assert_eq!(s.ctx.topo.block(core).unwrap().size, BlockSize::new(8, 8, 3));

    assert_boundary_fully_associated(&s.ctx.topo, "full cylinder").unwrap();
    let vol = s.volume("cyl").unwrap();
    assert_associations_inside_volume(&s.ctx.topo, &s.ctx.geom, vol, "full cylinder").unwrap();

    assert_eq!(
        s.script(),
        ["Création d'une topologie en o-grid sur Vol0000"],
        "the replay log holds one command"
    );
}

#[test]
fn ogrid_laterals_form_a_closed_fusion_ring() {
    let mut s = Scenario::new();
    s.cylinder("cyl", 2.0, 1.0, 360.0).unwrap();
    let blocks = s.ogrid("cyl", OGridSpec::new(3, 2, 2, 0.5)).unwrap();
    let (core, laterals) = core_and_laterals(&s, &blocks, 6 * 6 * 2);
    assert_eq!(laterals.len(), 4);
    assert_closed_ring(&s.ctx.topo, &laterals, "cylinder ring").unwrap();

    // core corners sit at the ratio of the outer radius
    assert_corner_radius(&s.ctx.topo, core, 1.0, &s.ctx.tolerance, "core ratio").unwrap();
}

#[test]
fn degenerate_cylinder_blocks_share_the_axis() {
    let mut s = Scenario::new();
    s.cylinder("cyl", 1.0, 2.0, 360.0).unwrap();
    let blocks = s.ogrid("cyl", OGridSpec::new(4, 2, 3, 0.0)).unwrap();
    assert_eq!(blocks.len(), 4, "the degenerate o-grid has no core block");
    let edge = assert_common_edge(&s.ctx.topo, &blocks, "axis edge").unwrap();
    let ends = s.ctx.topo.edge(edge).unwrap().ends;
    for v in ends {
        let p = s.ctx.topo.vertex(v).unwrap().point;
        assert!(
            p.x.abs() < 1e-9 && p.y.abs() < 1e-9,
            "the shared edge lies on the revolution axis, got {p:?}"
        );
    }
}

#[test]
fn quarter_sphere_degenerate_blocks_meet_at_the_center() {
    let mut s = Scenario::new();
    s.sphere("sph", 1.0, Portion::Quarter).unwrap();
    let blocks = s.ogrid("sph", OGridSpec::new(2, 2, 2, 0.0)).unwrap();
    assert_eq!(blocks.len(), 4);
    assert_common_vertex_at(
        &s.ctx.topo,
        &blocks,
        &Point3::origin(),
        &s.ctx.tolerance,
        "sphere center",
    )
    .unwrap();
}

// ── Association sweep over every supported shape and portion ────────────────

#[test]
fn every_shape_and_portion_associates_its_whole_boundary() {
    type Builder = fn(&mut Scenario) -> ();
    let cases: Vec<(&str, Builder, OGridSpec)> = vec![
        ("cylinder full ogrid", |s| {
            s.cylinder("v", 1.0, 2.0, 360.0).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.5)),
        ("cylinder full one-block", |s| {
            s.cylinder("v", 1.0, 2.0, 360.0).unwrap();
        }, OGridSpec::new(2, 2, 2, 1.0)),
        ("cylinder half", |s| {
            s.cylinder("v", 1.0, 2.0, 180.0).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.5)),
        ("cylinder quarter degenerate", |s| {
            s.cylinder("v", 1.0, 2.0, 90.0).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.0)),
        ("cone frustum", |s| {
            s.cone("v", 0.5, 1.0, 2.0, 360.0).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.5)),
        ("cone apex", |s| {
            s.cone("v", 0.0, 1.0, 2.0, 360.0).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.5)),
        ("sphere full", |s| {
            s.sphere("v", 1.0, Portion::Full).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.5)),
        ("sphere half", |s| {
            s.sphere("v", 1.0, Portion::Half).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.5)),
        ("sphere eighth", |s| {
            s.sphere("v", 1.0, Portion::Eighth).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.5)),
        ("hollow cylinder full", |s| {
            s.hollow_cylinder("v", 0.5, 1.0, 2.0, 360.0).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.5)),
        ("hollow cylinder quarter", |s| {
            s.hollow_cylinder("v", 0.5, 1.0, 2.0, 90.0).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.5)),
        ("hollow sphere full", |s| {
            s.hollow_sphere("v", 0.5, 1.0, Portion::Full).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.5)),
        ("hollow sphere quarter", |s| {
            s.hollow_sphere("v", 0.5, 1.0, Portion::Quarter).unwrap();
        }, OGridSpec::new(2, 2, 2, 0.5)),
    ];

    for (name, build, grid) in cases {
        let mut s = Scenario::new();
        build(&mut s);
        s.ogrid("v", grid).unwrap_or_else(|e| panic!("[{name}] build failed: {e}"));
        assert_boundary_fully_associated(&s.ctx.topo, name).unwrap();
        let vol = s.volume("v").unwrap();
        assert_associations_inside_volume(&s.ctx.topo, &s.ctx.geom, vol, name).unwrap();
    }
}

// ── Fusion ──────────────────────────────────────────────────────────────────

/// Two unit blocks with a coincident face between them.
fn side_by_side() -> (TopoStore, BlockId, BlockId) {
    let mut topo = TopoStore::new();
    let unit = BlockSize::new(1, 1, 1);
    let pt = Point3::new;
    let a = topo.add_block(
        [
            pt(0.0, 0.0, 0.0),
            pt(1.0, 0.0, 0.0),
            pt(0.0, 1.0, 0.0),
            pt(1.0, 1.0, 0.0),
            pt(0.0, 0.0, 1.0),
            pt(1.0, 0.0, 1.0),
            pt(0.0, 1.0, 1.0),
            pt(1.0, 1.0, 1.0),
        ],
        unit,
    );
    let b = topo.add_block(
        [
            pt(1.0, 0.0, 0.0),
            pt(2.0, 0.0, 0.0),
            pt(1.0, 1.0, 0.0),
            pt(2.0, 1.0, 0.0),
            pt(1.0, 0.0, 1.0),
            pt(2.0, 0.0, 1.0),
            pt(1.0, 1.0, 1.0),
            pt(2.0, 1.0, 1.0),
        ],
        unit,
    );
    (topo, a, b)
}

#[test]
fn fusion_is_symmetric_and_refusal_is_an_error() {
    let tol = Tolerance::default();

    let (mut topo, a, b) = side_by_side();
    let keep = topo.face_of(a, FaceOnBlock::IMax).unwrap();
    let gone = topo.face_of(b, FaceOnBlock::IMin).unwrap();
    topo.fuse_faces(keep, gone, &tol).unwrap();
    let faces_ab = topo.live_faces().count();
    assert_eq!(faces_ab, 11, "two cubes share one face after fusion");

    // same pair, roles swapped: the topology comes out identical
    let (mut topo2, a2, b2) = side_by_side();
    let keep2 = topo2.face_of(b2, FaceOnBlock::IMin).unwrap();
    let gone2 = topo2.face_of(a2, FaceOnBlock::IMax).unwrap();
    topo2.fuse_faces(keep2, gone2, &tol).unwrap();
    assert_eq!(topo2.live_faces().count(), faces_ab);
    assert_eq!(topo2.live_vertices().count(), topo.live_vertices().count());

    // fusing the same pair twice must be rejected
    let err = topo.fuse_faces(keep, gone, &tol);
    assert!(
        matches!(err, Err(TopologyError::FuseMismatch { .. })),
        "re-fusing an already fused pair: {err:?}"
    );
}

// ── History through the scenario ────────────────────────────────────────────

#[test]
fn two_step_history_undoes_and_redoes_in_order() {
    use command_engine::CommandStatus;

    let mut s = Scenario::new();
    s.cylinder("cyl", 1.0, 2.0, 360.0).unwrap();
    s.sphere("sph", 1.0, Portion::Full).unwrap();
    s.ogrid("cyl", OGridSpec::new(2, 2, 2, 0.5)).unwrap();
    let n_after_first = s.ctx.topo.live_blocks().count();
    s.ogrid("sph", OGridSpec::new(2, 2, 2, 1.0)).unwrap();
    let n_after_second = s.ctx.topo.live_blocks().count();
    assert!(n_after_second > n_after_first);

    assert_eq!(s.undo(), CommandStatus::Done);
    assert_eq!(s.ctx.topo.live_blocks().count(), n_after_first);
    assert_eq!(s.undo(), CommandStatus::Done);
    assert_eq!(s.ctx.topo.live_blocks().count(), 0);
    assert_eq!(s.undo(), CommandStatus::Fail, "nothing left to undo");

    assert_eq!(s.redo(), CommandStatus::Done);
    assert_eq!(s.redo(), CommandStatus::Done);
    assert_eq!(s.ctx.topo.live_blocks().count(), n_after_second);
    assert_eq!(s.script().len(), 2);
}
