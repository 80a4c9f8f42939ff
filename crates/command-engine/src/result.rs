//! Read-only view over a command's change record.

use ogrid_kernel::topology::BlockId;
use ogrid_kernel::EntityRef;
use ogrid_types::Dim;

use crate::info::{ChangeKind, InfoCommand};

/// Filtering facade over an [`InfoCommand`], handed out by a finished
/// command so callers can ask "what did you make" without walking the raw
/// record.
#[derive(Debug, Clone, Copy)]
pub struct CommandResult<'a> {
    name: &'a str,
    info: &'a InfoCommand,
}

impl<'a> CommandResult<'a> {
    pub fn new(name: &'a str, info: &'a InfoCommand) -> Self {
        Self { name, info }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    fn filtered<'b>(
        &'b self,
        dim: Dim,
        pred: impl Fn(&ChangeKind) -> bool + 'b,
    ) -> impl Iterator<Item = EntityRef> + 'b {
        self.info
            .entries()
            .iter()
            .filter(move |c| c.entity.dim() == dim && pred(&c.kind))
            .map(|c| c.entity)
    }

    pub fn created_entities(&self, dim: Dim) -> Vec<EntityRef> {
        self.filtered(dim, |k| matches!(k, ChangeKind::Created)).collect()
    }

    pub fn modified_entities(&self, dim: Dim) -> Vec<EntityRef> {
        self.filtered(dim, |k| matches!(k, ChangeKind::Modified)).collect()
    }

    /// Destroyed entities of one dimension, replacements included.
    pub fn destroyed_entities(&self, dim: Dim) -> Vec<EntityRef> {
        self.filtered(dim, |k| {
            matches!(k, ChangeKind::Destroyed | ChangeKind::Replaced { .. })
        })
        .collect()
    }

    /// Blocks created by the command, in record order.
    pub fn created_blocks(&self) -> Vec<BlockId> {
        self.info
            .entries()
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Created))
            .filter_map(|c| match c.entity {
                EntityRef::Block(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}
