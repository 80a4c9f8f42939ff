//! Command lifecycle, history and bookkeeping, end to end on real volumes.

use command_engine::{
    Command, CommandError, CommandManager, CommandState, CommandStatus, Context, NewOGridCommand,
};
use ogrid_kernel::geom::primitives::make_cylinder;
use ogrid_kernel::geom::GeomVolumeId;
use ogrid_kernel::topology::{BlockId, GeomAssociation, TopoStore};
use ogrid_kernel::EntityRef;
use ogrid_types::{CylinderSpec, Dim, OGridSpec};

fn cylinder(ctx: &mut Context) -> GeomVolumeId {
    let spec = CylinderSpec {
        center: [0.0, 0.0, 0.0],
        axis: [0.0, 0.0, 1.0],
        radius: 1.0,
        height: 2.0,
        angle_deg: 360.0,
    };
    make_cylinder(&mut ctx.geom, &spec).unwrap()
}

fn run_ogrid(
    ctx: &mut Context,
    mgr: &mut CommandManager,
    vol: GeomVolumeId,
    grid: OGridSpec,
) -> Result<(), CommandError> {
    let cmd = Box::new(NewOGridCommand::new(ctx, vol, grid));
    mgr.execute(ctx, cmd)
}

/// Live blocks with their corner coordinates and associations, sorted so two
/// snapshots compare directly.
fn snapshot(topo: &TopoStore) -> Vec<(BlockId, Vec<[f64; 3]>, GeomAssociation)> {
    let mut out: Vec<_> = topo
        .live_blocks()
        .map(|(id, b)| {
            let corners = b
                .verts
                .iter()
                .map(|&v| {
                    let p = topo.vertex(v).unwrap().point;
                    [p.x, p.y, p.z]
                })
                .collect();
            (id, corners, b.assoc)
        })
        .collect();
    out.sort_by_key(|(id, _, _)| *id);
    out
}

// ── Execution and result reporting ──────────────────────────────────────────

#[test]
fn execute_builds_and_names_blocks() {
    let mut ctx = Context::new();
    let mut mgr = CommandManager::new();
    let vol = cylinder(&mut ctx);

    run_ogrid(&mut ctx, &mut mgr, vol, OGridSpec::new(4, 2, 3, 0.5)).unwrap();

    let last = mgr.last_command().expect("history holds the command");
    assert_eq!(last.state(), CommandState::Done);
    let blocks = last.result().created_blocks();
    assert_eq!(blocks.len(), 5, "full cylinder o-grid is a core plus four laterals");
    for &b in &blocks {
        assert!(
            ctx.registry.name_of(&EntityRef::Block(b)).is_some(),
            "every created block gets a display name"
        );
    }
    assert_eq!(ctx.registry.name_of(&EntityRef::Block(blocks[0])), Some("Bl0000"));
    assert!(last.result().destroyed_entities(Dim::D3).is_empty());
    assert!(!last.result().created_entities(Dim::D0).is_empty());
}

#[test]
fn script_command_names_the_volume() {
    let mut ctx = Context::new();
    let vol = cylinder(&mut ctx);
    let cmd = NewOGridCommand::new(&mut ctx, vol, OGridSpec::new(4, 2, 3, 0.5));
    assert_eq!(
        cmd.script_command(),
        "Création d'une topologie en o-grid sur Vol0000"
    );
}

// ── Undo / redo ─────────────────────────────────────────────────────────────

#[test]
fn undo_then_redo_restores_the_exact_topology() {
    let mut ctx = Context::new();
    let mut mgr = CommandManager::new();
    let vol = cylinder(&mut ctx);
    run_ogrid(&mut ctx, &mut mgr, vol, OGridSpec::new(4, 2, 3, 0.5)).unwrap();

    let before = snapshot(&ctx.topo);
    assert_eq!(before.len(), 5);

    assert_eq!(mgr.undo(&mut ctx), CommandStatus::Done);
    assert_eq!(ctx.topo.live_blocks().count(), 0, "undo hides every created block");
    assert_eq!(ctx.topo.live_vertices().count(), 0);
    assert!(mgr.can_redo());
    assert!(!mgr.can_undo());

    assert_eq!(mgr.redo(&mut ctx), CommandStatus::Done);
    assert_eq!(snapshot(&ctx.topo), before, "redo reproduces identical entities");
    assert!(mgr.can_undo());
    assert!(!mgr.can_redo());
}

#[test]
fn names_survive_an_undo_redo_round_trip() {
    let mut ctx = Context::new();
    let mut mgr = CommandManager::new();
    let vol = cylinder(&mut ctx);
    run_ogrid(&mut ctx, &mut mgr, vol, OGridSpec::new(2, 2, 2, 0.5)).unwrap();

    let block = mgr.last_command().unwrap().result().created_blocks()[0];
    let name = ctx.registry.name_of(&EntityRef::Block(block)).unwrap().to_owned();

    mgr.undo(&mut ctx);
    assert_eq!(
        ctx.registry.name_of(&EntityRef::Block(block)),
        Some(name.as_str()),
        "an undone entity keeps its name for the redo"
    );
    mgr.redo(&mut ctx);
    assert_eq!(ctx.registry.resolve(&name), Some(EntityRef::Block(block)));
}

#[test]
fn new_command_clears_redo_and_frees_its_names() {
    let mut ctx = Context::new();
    let mut mgr = CommandManager::new();
    let vol = cylinder(&mut ctx);

    run_ogrid(&mut ctx, &mut mgr, vol, OGridSpec::new(2, 2, 2, 0.5)).unwrap();
    let first_block = mgr.last_command().unwrap().result().created_blocks()[0];
    mgr.undo(&mut ctx);
    assert!(mgr.can_redo());

    // A fresh execution on the emptied document forks the history.
    run_ogrid(&mut ctx, &mut mgr, vol, OGridSpec::new(3, 2, 2, 1.0)).unwrap();
    assert!(!mgr.can_redo(), "executing clears the redo stack");
    assert_eq!(
        ctx.registry.name_of(&EntityRef::Block(first_block)),
        None,
        "names owned only by dropped redo entries are released"
    );
}

#[test]
fn undo_redo_on_empty_stacks_fail_quietly() {
    let mut ctx = Context::new();
    let mut mgr = CommandManager::new();
    assert_eq!(mgr.undo(&mut ctx), CommandStatus::Fail);
    assert_eq!(mgr.redo(&mut ctx), CommandStatus::Fail);
}

// ── State machine ───────────────────────────────────────────────────────────

#[test]
fn executing_a_done_command_again_is_an_invalid_state() {
    let mut ctx = Context::new();
    let vol = cylinder(&mut ctx);
    let mut cmd = NewOGridCommand::new(&mut ctx, vol, OGridSpec::new(2, 2, 2, 0.5));
    cmd.execute(&mut ctx).unwrap();
    assert_eq!(cmd.state(), CommandState::Done);

    match cmd.execute(&mut ctx) {
        Err(CommandError::InvalidState { from, .. }) => assert_eq!(from, CommandState::Done),
        other => panic!("expected InvalidState, got {other:?}"),
    }
}

#[test]
fn redo_before_undo_fails_without_touching_state() {
    let mut ctx = Context::new();
    let vol = cylinder(&mut ctx);
    let mut cmd = NewOGridCommand::new(&mut ctx, vol, OGridSpec::new(2, 2, 2, 0.5));
    cmd.execute(&mut ctx).unwrap();
    assert_eq!(cmd.redo(&mut ctx), CommandStatus::Fail);
    assert_eq!(cmd.state(), CommandState::Done);
}

#[test]
fn validation_failure_marks_the_command_failed_and_registers_nothing() {
    let mut ctx = Context::new();
    let mut mgr = CommandManager::new();
    let vol = cylinder(&mut ctx);
    ctx.registry.name_for(EntityRef::GeomVolume(vol));
    let names_before = ctx.registry.len();

    let err = run_ogrid(&mut ctx, &mut mgr, vol, OGridSpec::new(4, 2, 3, 1.5));
    assert!(err.is_err(), "ratio above one must be rejected");
    assert!(!mgr.can_undo(), "a failed command never enters the history");
    assert_eq!(ctx.topo.live_blocks().count(), 0);
    assert_eq!(ctx.registry.len(), names_before, "no partial registration");
}

// ── Reference closures ──────────────────────────────────────────────────────

#[test]
fn pre_execution_captures_the_volume_closure() {
    let mut ctx = Context::new();
    let vol = cylinder(&mut ctx);
    let mut cmd = NewOGridCommand::new(&mut ctx, vol, OGridSpec::new(2, 2, 2, 0.5));
    cmd.execute(&mut ctx).unwrap();

    let closure = &cmd.core().closure;
    assert!(closure.contains(&EntityRef::GeomVolume(vol)));
    let boundary = ctx.geom.volume(vol).unwrap();
    assert_eq!(closure.dim(Dim::D2).len(), boundary.surfaces.len());
    assert_eq!(closure.dim(Dim::D1).len(), boundary.curves.len());
}

// ── Change record ───────────────────────────────────────────────────────────

#[test]
fn info_command_serializes_and_round_trips() {
    let mut ctx = Context::new();
    let vol = cylinder(&mut ctx);
    let mut cmd = NewOGridCommand::new(&mut ctx, vol, OGridSpec::new(2, 2, 2, 0.5));
    cmd.execute(&mut ctx).unwrap();

    let json = serde_json::to_string(cmd.info()).unwrap();
    let back: command_engine::InfoCommand = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), cmd.info().len());
}
