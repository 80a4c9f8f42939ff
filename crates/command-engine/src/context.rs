//! Per-document state threaded through every command.
//!
//! A [`Context`] owns the geometric and topological arenas plus the display
//! name registry. No internal locking: `&mut Context` is the mutation
//! discipline, one writer at a time.

use std::collections::HashMap;

use ogrid_kernel::geom::GeomStore;
use ogrid_kernel::topology::TopoStore;
use ogrid_kernel::{EntityRef, Tolerance};

/// Everything a command needs to read and mutate.
#[derive(Debug, Default)]
pub struct Context {
    pub geom: GeomStore,
    pub topo: TopoStore,
    pub registry: EntityRegistry,
    pub tolerance: Tolerance,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sequential display names for entities, `Vol0000` style.
///
/// Names are handed out lazily, on first request, and survive undo: an
/// undone entity keeps its name so a redo shows the same labels. Dropping a
/// redo entry is the only point where names are released.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    counters: HashMap<&'static str, u32>,
    by_name: HashMap<String, EntityRef>,
    by_entity: HashMap<EntityRef, String>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn prefix(entity: &EntityRef) -> &'static str {
        match entity {
            EntityRef::GeomVertex(_) => "Pt",
            EntityRef::GeomCurve(_) => "Crb",
            EntityRef::GeomSurface(_) => "Surf",
            EntityRef::GeomVolume(_) => "Vol",
            EntityRef::TopoVertex(_) => "Som",
            EntityRef::TopoEdge(_) => "Ar",
            EntityRef::TopoFace(_) => "Fa",
            EntityRef::Block(_) => "Bl",
        }
    }

    /// Display name of `entity`, assigning the next free one if it has none.
    pub fn name_for(&mut self, entity: EntityRef) -> String {
        if let Some(name) = self.by_entity.get(&entity) {
            return name.clone();
        }
        let prefix = Self::prefix(&entity);
        let counter = self.counters.entry(prefix).or_insert(0);
        let name = format!("{prefix}{:04}", *counter);
        *counter += 1;
        self.by_name.insert(name.clone(), entity);
        self.by_entity.insert(entity, name.clone());
        name
    }

    /// Name already assigned to `entity`, if any.
    pub fn name_of(&self, entity: &EntityRef) -> Option<&str> {
        self.by_entity.get(entity).map(String::as_str)
    }

    /// Entity behind a display name.
    pub fn resolve(&self, name: &str) -> Option<EntityRef> {
        self.by_name.get(name).copied()
    }

    /// Drop the name of `entity`. The counter does not rewind, so the name
    /// is never reused for a different entity.
    pub fn deregister(&mut self, entity: &EntityRef) {
        if let Some(name) = self.by_entity.remove(entity) {
            self.by_name.remove(&name);
        }
    }

    pub fn len(&self) -> usize {
        self.by_entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn names_are_sequential_per_prefix() {
        let mut ctx = Context::new();
        let v0 = ctx.geom.add_vertex(Point3::origin());
        let v1 = ctx.geom.add_vertex(Point3::new(1.0, 0.0, 0.0));
        assert_eq!(ctx.registry.name_for(EntityRef::GeomVertex(v0)), "Pt0000");
        assert_eq!(ctx.registry.name_for(EntityRef::GeomVertex(v1)), "Pt0001");
        // asking again returns the same name
        assert_eq!(ctx.registry.name_for(EntityRef::GeomVertex(v0)), "Pt0000");
        assert_eq!(ctx.registry.resolve("Pt0001"), Some(EntityRef::GeomVertex(v1)));
    }

    #[test]
    fn deregister_never_reuses_a_name() {
        let mut ctx = Context::new();
        let v0 = ctx.geom.add_vertex(Point3::origin());
        let name = ctx.registry.name_for(EntityRef::GeomVertex(v0));
        ctx.registry.deregister(&EntityRef::GeomVertex(v0));
        assert_eq!(ctx.registry.resolve(&name), None);
        let v1 = ctx.geom.add_vertex(Point3::new(1.0, 0.0, 0.0));
        assert_eq!(ctx.registry.name_for(EntityRef::GeomVertex(v1)), "Pt0001");
    }
}
