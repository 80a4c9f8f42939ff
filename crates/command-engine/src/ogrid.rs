//! The o-grid construction as a reversible command.

use ogrid_kernel::geom::GeomVolumeId;
use ogrid_kernel::EntityRef;
use ogrid_ops::{classify, execute_ogrid, OGridBuild};
use ogrid_types::OGridSpec;
use tracing::instrument;

use crate::command::{Command, CommandCore, CommandError, CommandStatus};
use crate::context::Context;
use crate::reftrack::reference_closure;

/// Builds the block topology of one volume. Undo flips the recorded journal
/// backwards, redo replays it forwards; the topology is never recomputed, so
/// entity identifiers are stable across any number of round trips.
#[derive(Debug)]
pub struct NewOGridCommand {
    core: CommandCore,
    volume: GeomVolumeId,
    grid: OGridSpec,
    volume_name: String,
    build: Option<OGridBuild>,
}

impl NewOGridCommand {
    pub fn new(ctx: &mut Context, volume: GeomVolumeId, grid: OGridSpec) -> Self {
        let volume_name = ctx.registry.name_for(EntityRef::GeomVolume(volume));
        Self {
            core: CommandCore::new(format!("NewOGrid({volume_name})")),
            volume,
            grid,
            volume_name,
            build: None,
        }
    }

    /// Blocks created by the construction, in creation order.
    pub fn blocks(&self) -> &[ogrid_kernel::topology::BlockId] {
        self.build.as_ref().map(|b| b.blocks.as_slice()).unwrap_or(&[])
    }
}

impl Command for NewOGridCommand {
    fn core(&self) -> &CommandCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }

    fn script_command(&self) -> String {
        format!("Création d'une topologie en o-grid sur {}", self.volume_name)
    }

    #[instrument(skip(self, ctx), fields(volume = %self.volume_name))]
    fn pre_execute(&mut self, ctx: &mut Context) -> Result<(), CommandError> {
        classify(&self.grid)?;
        ctx.geom.volume(self.volume)?;
        self.core.closure = reference_closure(ctx, EntityRef::GeomVolume(self.volume));
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(volume = %self.volume_name))]
    fn internal_execute(&mut self, ctx: &mut Context) -> Result<(), CommandError> {
        let build = execute_ogrid(&ctx.geom, &mut ctx.topo, &ctx.tolerance, self.volume, &self.grid)?;
        self.core.info.record_topo(&build.changes);
        // Registration happens only after the construction succeeded.
        for &b in &build.blocks {
            ctx.registry.name_for(EntityRef::Block(b));
        }
        self.build = Some(build);
        Ok(())
    }

    fn internal_undo(&mut self, ctx: &mut Context) -> CommandStatus {
        let Some(build) = &self.build else {
            return CommandStatus::Fail;
        };
        if build.blocks.iter().any(|&b| ctx.topo.block(b).is_err()) {
            return CommandStatus::Fail;
        }
        ctx.topo.apply_changes(&build.changes, true);
        CommandStatus::Done
    }

    fn internal_redo(&mut self, ctx: &mut Context) -> CommandStatus {
        let Some(build) = &self.build else {
            return CommandStatus::Fail;
        };
        if build.blocks.iter().any(|&b| ctx.topo.block(b).is_err()) {
            return CommandStatus::Fail;
        }
        ctx.topo.apply_changes(&build.changes, false);
        CommandStatus::Done
    }
}
