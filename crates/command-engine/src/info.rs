//! Per-command record of touched entities.
//!
//! An [`InfoCommand`] is the ordered list of what a command created, modified
//! or destroyed. It lives as long as the command sits on an undo stack and
//! is what `undo`/`redo` replay, so it must stay exact: a later touch of the
//! same entity upgrades the recorded kind instead of appending a duplicate.

use ogrid_kernel::topology::TopoChange;
use ogrid_kernel::EntityRef;
use serde::{Deserialize, Serialize};

/// What happened to one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Created,
    Modified,
    Destroyed,
    /// Destroyed and superseded by one or more entities.
    Replaced { by: Vec<EntityRef> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityChange {
    pub entity: EntityRef,
    pub kind: ChangeKind,
}

/// Ordered change record of a single command, one entry per touched entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfoCommand {
    changes: Vec<EntityChange>,
}

impl InfoCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a touch of `entity`.
    ///
    /// Upgrade rules for an entity already on record:
    /// - `Created` then `Destroyed`: the entity never existed outside this
    ///   command, the entry is dropped entirely.
    /// - `Created` then anything else: stays `Created` (the observer only
    ///   cares that it is new).
    /// - `Modified` or `Destroyed` then a later kind: the later kind wins.
    pub fn record(&mut self, entity: EntityRef, kind: ChangeKind) {
        let Some(pos) = self.changes.iter().position(|c| c.entity == entity) else {
            self.changes.push(EntityChange { entity, kind });
            return;
        };
        let was_created = matches!(self.changes[pos].kind, ChangeKind::Created);
        if was_created && matches!(kind, ChangeKind::Destroyed) {
            self.changes.remove(pos);
        } else if !was_created {
            self.changes[pos].kind = kind;
        }
    }

    /// Fold a topology construction journal into the record.
    pub fn record_topo(&mut self, changes: &[TopoChange]) {
        for change in changes {
            let (entity, kind) = match *change {
                TopoChange::CreatedVertex(id) => (EntityRef::TopoVertex(id), ChangeKind::Created),
                TopoChange::CreatedEdge(id) => (EntityRef::TopoEdge(id), ChangeKind::Created),
                TopoChange::CreatedFace(id) => (EntityRef::TopoFace(id), ChangeKind::Created),
                TopoChange::CreatedBlock(id) => (EntityRef::Block(id), ChangeKind::Created),
                TopoChange::DestroyedVertex(id) => (EntityRef::TopoVertex(id), ChangeKind::Destroyed),
                TopoChange::DestroyedEdge(id) => (EntityRef::TopoEdge(id), ChangeKind::Destroyed),
                TopoChange::DestroyedFace(id) => (EntityRef::TopoFace(id), ChangeKind::Destroyed),
            };
            self.record(entity, kind);
        }
    }

    pub fn entries(&self) -> &[EntityChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogrid_kernel::topology::TopoStore;

    #[test]
    fn created_then_destroyed_is_dropped() {
        let mut topo = TopoStore::new();
        let v = topo.add_vertex(nalgebra::Point3::origin());
        let mut info = InfoCommand::new();
        info.record(EntityRef::TopoVertex(v), ChangeKind::Created);
        info.record(EntityRef::TopoVertex(v), ChangeKind::Destroyed);
        assert!(info.is_empty(), "a transient entity leaves no trace");
    }

    #[test]
    fn created_then_modified_stays_created() {
        let mut topo = TopoStore::new();
        let v = topo.add_vertex(nalgebra::Point3::origin());
        let mut info = InfoCommand::new();
        info.record(EntityRef::TopoVertex(v), ChangeKind::Created);
        info.record(EntityRef::TopoVertex(v), ChangeKind::Modified);
        assert_eq!(info.len(), 1);
        assert_eq!(info.entries()[0].kind, ChangeKind::Created);
    }

    #[test]
    fn modified_then_destroyed_upgrades() {
        let mut topo = TopoStore::new();
        let v = topo.add_vertex(nalgebra::Point3::origin());
        let mut info = InfoCommand::new();
        info.record(EntityRef::TopoVertex(v), ChangeKind::Modified);
        info.record(EntityRef::TopoVertex(v), ChangeKind::Destroyed);
        assert_eq!(info.entries()[0].kind, ChangeKind::Destroyed);
    }
}
