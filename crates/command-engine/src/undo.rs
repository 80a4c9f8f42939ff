//! Two-stack undo/redo history over boxed commands.

use tracing::debug;

use crate::command::{Command, CommandError, CommandStatus};
use crate::context::Context;
use crate::info::ChangeKind;

/// Document history. Executing a new command clears the redo stack and
/// releases the display names its dropped entries were the sole owner of;
/// the arena slots themselves stay allocated (identifiers are never reused
/// within a document).
#[derive(Default)]
pub struct CommandManager {
    undo: Vec<Box<dyn Command>>,
    redo: Vec<Box<dyn Command>>,
}

impl CommandManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `cmd` and push it on the undo stack.
    pub fn execute(
        &mut self,
        ctx: &mut Context,
        mut cmd: Box<dyn Command>,
    ) -> Result<(), CommandError> {
        cmd.execute(ctx)?;
        for dropped in self.redo.drain(..) {
            debug!(command = dropped.name(), "dropping redo entry");
            for change in dropped.info().entries() {
                if matches!(change.kind, ChangeKind::Created) {
                    ctx.registry.deregister(&change.entity);
                }
            }
        }
        self.undo.push(cmd);
        Ok(())
    }

    pub fn undo(&mut self, ctx: &mut Context) -> CommandStatus {
        let Some(mut cmd) = self.undo.pop() else {
            return CommandStatus::Fail;
        };
        match cmd.undo(ctx) {
            CommandStatus::Done => {
                self.redo.push(cmd);
                CommandStatus::Done
            }
            // A failed command belongs on neither stack.
            CommandStatus::Fail => CommandStatus::Fail,
        }
    }

    pub fn redo(&mut self, ctx: &mut Context) -> CommandStatus {
        let Some(mut cmd) = self.redo.pop() else {
            return CommandStatus::Fail;
        };
        match cmd.redo(ctx) {
            CommandStatus::Done => {
                self.undo.push(cmd);
                CommandStatus::Done
            }
            CommandStatus::Fail => CommandStatus::Fail,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Most recently executed or redone command.
    pub fn last_command(&self) -> Option<&dyn Command> {
        self.undo.last().map(|c| c.as_ref())
    }
}
