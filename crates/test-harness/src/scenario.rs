//! Scenario — fluent API for scripting o-grid workflows in tests.
//!
//! Drives the real command path (`CommandManager` over `NewOGridCommand`),
//! not a simulation. Volumes are addressed by readable names instead of
//! arena keys.

use std::collections::HashMap;

use command_engine::{Command, CommandManager, CommandStatus, Context, NewOGridCommand};
use ogrid_kernel::geom::primitives::{
    make_cone, make_cylinder, make_hollow_cylinder, make_hollow_sphere, make_sphere,
};
use ogrid_kernel::geom::GeomVolumeId;
use ogrid_kernel::topology::BlockId;
use ogrid_types::{OGridSpec, Portion};

use crate::helpers::*;

/// A document plus its history, with named-volume access and a script log.
pub struct Scenario {
    pub ctx: Context,
    pub manager: CommandManager,
    named_volumes: HashMap<String, GeomVolumeId>,
    script: Vec<String>,
}

impl Scenario {
    pub fn new() -> Self {
        Self {
            ctx: Context::new(),
            manager: CommandManager::new(),
            named_volumes: HashMap::new(),
            script: Vec::new(),
        }
    }

    fn check_name_available(&self, name: &str) -> Result<(), HarnessError> {
        if self.named_volumes.contains_key(name) {
            return Err(HarnessError::DuplicateName { name: name.into() });
        }
        Ok(())
    }

    fn register(&mut self, name: &str, vol: GeomVolumeId) -> GeomVolumeId {
        self.named_volumes.insert(name.to_owned(), vol);
        vol
    }

    pub fn volume(&self, name: &str) -> Result<GeomVolumeId, HarnessError> {
        self.named_volumes
            .get(name)
            .copied()
            .ok_or_else(|| HarnessError::VolumeNotFound { name: name.into() })
    }

    // ── Volume shortcuts ────────────────────────────────────────────────

    pub fn cylinder(
        &mut self,
        name: &str,
        radius: f64,
        height: f64,
        angle_deg: f64,
    ) -> Result<GeomVolumeId, HarnessError> {
        self.check_name_available(name)?;
        let vol = make_cylinder(&mut self.ctx.geom, &cylinder_spec(radius, height, angle_deg))?;
        Ok(self.register(name, vol))
    }

    pub fn cone(
        &mut self,
        name: &str,
        r1: f64,
        r2: f64,
        height: f64,
        angle_deg: f64,
    ) -> Result<GeomVolumeId, HarnessError> {
        self.check_name_available(name)?;
        let vol = make_cone(&mut self.ctx.geom, &cone_spec(r1, r2, height, angle_deg))?;
        Ok(self.register(name, vol))
    }

    pub fn sphere(
        &mut self,
        name: &str,
        radius: f64,
        portion: Portion,
    ) -> Result<GeomVolumeId, HarnessError> {
        self.check_name_available(name)?;
        let vol = make_sphere(&mut self.ctx.geom, &sphere_spec(radius, portion))?;
        Ok(self.register(name, vol))
    }

    pub fn hollow_cylinder(
        &mut self,
        name: &str,
        r_int: f64,
        r_ext: f64,
        height: f64,
        angle_deg: f64,
    ) -> Result<GeomVolumeId, HarnessError> {
        self.check_name_available(name)?;
        let vol = make_hollow_cylinder(
            &mut self.ctx.geom,
            &hollow_cylinder_spec(r_int, r_ext, height, angle_deg),
        )?;
        Ok(self.register(name, vol))
    }

    pub fn hollow_sphere(
        &mut self,
        name: &str,
        r_int: f64,
        r_ext: f64,
        portion: Portion,
    ) -> Result<GeomVolumeId, HarnessError> {
        self.check_name_available(name)?;
        let vol = make_hollow_sphere(&mut self.ctx.geom, &hollow_sphere_spec(r_int, r_ext, portion))?;
        Ok(self.register(name, vol))
    }

    // ── History ─────────────────────────────────────────────────────────

    /// Build an o-grid topology on a named volume. Returns the created
    /// blocks in creation order.
    pub fn ogrid(&mut self, name: &str, grid: OGridSpec) -> Result<Vec<BlockId>, HarnessError> {
        let vol = self.volume(name)?;
        let cmd = Box::new(NewOGridCommand::new(&mut self.ctx, vol, grid));
        self.script.push(cmd.script_command());
        self.manager.execute(&mut self.ctx, cmd)?;
        let blocks = self
            .manager
            .last_command()
            .map(|c| c.result().created_blocks())
            .unwrap_or_default();
        Ok(blocks)
    }

    pub fn undo(&mut self) -> CommandStatus {
        self.manager.undo(&mut self.ctx)
    }

    pub fn redo(&mut self) -> CommandStatus {
        self.manager.redo(&mut self.ctx)
    }

    /// Replay strings of every executed command, in order.
    pub fn script(&self) -> &[String] {
        &self.script
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}
