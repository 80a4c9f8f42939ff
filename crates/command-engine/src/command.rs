//! Command lifecycle: states, errors and the [`Command`] trait.
//!
//! A command moves `Initial → PreExecuted → Done → Undone → Done → …`.
//! Pre-execution validates arguments and computes reference closures without
//! touching the document; execution stages its changes in the command's
//! [`InfoCommand`] and registers names only once the internal step has
//! succeeded, so a failure never leaves a partial registration behind.

use ogrid_kernel::geom::GeomError;
use ogrid_kernel::topology::TopologyError;
use ogrid_ops::BuildError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::Context;
use crate::info::InfoCommand;
use crate::reftrack::Closure;
use crate::result::CommandResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandState {
    Initial,
    PreExecuted,
    Done,
    Undone,
    Failed,
}

/// Outcome of an undo or redo attempt. A `Fail` leaves the document
/// untouched; it is not an error because stale stack entries are a normal
/// consequence of interleaved history edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Done,
    Fail,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("cannot {attempted} a command in state {from:?}")]
    InvalidState {
        from: CommandState,
        attempted: &'static str,
    },
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Geometry(#[from] GeomError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// State every command carries: identity, lifecycle and change record.
#[derive(Debug)]
pub struct CommandCore {
    pub id: Uuid,
    pub name: String,
    pub state: CommandState,
    pub info: InfoCommand,
    /// Entities the command declared during pre-execution.
    pub closure: Closure,
}

impl CommandCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            state: CommandState::Initial,
            info: InfoCommand::new(),
            closure: Closure::default(),
        }
    }
}

/// A reversible operation on a [`Context`].
///
/// Implementors provide the four `internal_*` hooks and the shared
/// [`CommandCore`]; the provided `execute`/`undo`/`redo` drive the state
/// machine around them.
pub trait Command {
    fn core(&self) -> &CommandCore;
    fn core_mut(&mut self) -> &mut CommandCore;

    /// Replay string for the scripting layer, e.g.
    /// `Création d'une topologie en o-grid sur Vol0000`.
    fn script_command(&self) -> String;

    /// Validate arguments and compute reference closures. Must not mutate
    /// the document.
    fn pre_execute(&mut self, ctx: &mut Context) -> Result<(), CommandError>;

    /// Perform the operation, staging every change in the command's
    /// [`InfoCommand`].
    fn internal_execute(&mut self, ctx: &mut Context) -> Result<(), CommandError>;

    /// Reverse the recorded changes. `Fail` means a back-reference went
    /// stale and the document was left untouched.
    fn internal_undo(&mut self, ctx: &mut Context) -> CommandStatus;

    /// Replay the recorded changes without recomputation.
    fn internal_redo(&mut self, ctx: &mut Context) -> CommandStatus;

    fn name(&self) -> &str {
        &self.core().name
    }

    fn state(&self) -> CommandState {
        self.core().state
    }

    fn info(&self) -> &InfoCommand {
        &self.core().info
    }

    fn result(&self) -> CommandResult<'_> {
        let core = self.core();
        CommandResult::new(&core.name, &core.info)
    }

    fn execute(&mut self, ctx: &mut Context) -> Result<(), CommandError> {
        match self.state() {
            CommandState::Initial => {
                if let Err(e) = self.pre_execute(ctx) {
                    self.core_mut().state = CommandState::Failed;
                    return Err(e);
                }
                self.core_mut().state = CommandState::PreExecuted;
            }
            CommandState::PreExecuted => {}
            from => {
                return Err(CommandError::InvalidState {
                    from,
                    attempted: "execute",
                })
            }
        }
        match self.internal_execute(ctx) {
            Ok(()) => {
                info!(command = self.name(), script = %self.script_command(), "executed");
                self.core_mut().state = CommandState::Done;
                Ok(())
            }
            Err(e) => {
                warn!(command = self.name(), error = %e, "execution failed");
                self.core_mut().state = CommandState::Failed;
                Err(e)
            }
        }
    }

    fn undo(&mut self, ctx: &mut Context) -> CommandStatus {
        if self.state() != CommandState::Done {
            return CommandStatus::Fail;
        }
        match self.internal_undo(ctx) {
            CommandStatus::Done => {
                info!(command = self.name(), "undone");
                self.core_mut().state = CommandState::Undone;
                CommandStatus::Done
            }
            CommandStatus::Fail => {
                warn!(command = self.name(), "undo failed, stale back-reference");
                self.core_mut().state = CommandState::Failed;
                CommandStatus::Fail
            }
        }
    }

    fn redo(&mut self, ctx: &mut Context) -> CommandStatus {
        if self.state() != CommandState::Undone {
            return CommandStatus::Fail;
        }
        match self.internal_redo(ctx) {
            CommandStatus::Done => {
                info!(command = self.name(), "redone");
                self.core_mut().state = CommandState::Done;
                CommandStatus::Done
            }
            CommandStatus::Fail => {
                warn!(command = self.name(), "redo failed, stale back-reference");
                self.core_mut().state = CommandState::Failed;
                CommandStatus::Fail
            }
        }
    }
}
