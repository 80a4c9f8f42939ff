//! Reversible command framework over the o-grid builders.
//!
//! Commands validate in a pre-execution step, stage their changes in an
//! [`InfoCommand`] and replay that record for undo/redo instead of ever
//! recomputing. The [`CommandManager`] keeps the two-stack history; the
//! [`Context`] owns the per-document arenas and display name registry.

pub mod command;
pub mod context;
pub mod info;
pub mod ogrid;
pub mod reftrack;
pub mod result;
pub mod undo;

pub use command::{Command, CommandCore, CommandError, CommandState, CommandStatus};
pub use context::{Context, EntityRegistry};
pub use info::{ChangeKind, EntityChange, InfoCommand};
pub use ogrid::NewOGridCommand;
pub use reftrack::{adjacency_references, reference_closure, Closure};
pub use result::CommandResult;
pub use undo::CommandManager;
