//! Entity store with deferred add/remove
//!
//! `add_entity` and `destroy` are not observable through queries until
//! `commit()` runs. Every system in a frame therefore sees one stable
//! snapshot of the live set. The store is the sole owner of all component
//! data; entity handles are plain ids.

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;

use super::components::{Component, ComponentSlots, Shape, Transform};
use super::entity::{Entity, EntityId, Tag};
use crate::Aabb;
use crate::error::SimError;

#[derive(Debug, Clone)]
struct Record {
    entity: Entity,
    components: ComponentSlots,
}

/// Owner of every entity and component
#[derive(Debug, Clone)]
pub struct EntityStore {
    /// Next id to hand out (ids are never reused)
    next_id: u32,
    /// Pending and live records, keyed by id
    records: BTreeMap<EntityId, Record>,
    /// Committed entities in commit (= id) order
    live: Vec<EntityId>,
    /// Committed entities per tag
    by_tag: HashMap<Tag, Vec<EntityId>>,
    /// Created since the last commit
    pending: Vec<EntityId>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            records: BTreeMap::new(),
            live: Vec::new(),
            by_tag: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Create an entity. The handle is usable immediately for attaching
    /// components, but the entity only shows up in queries after `commit()`.
    pub fn add_entity(&mut self, tag: Tag) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.records.insert(
            id,
            Record {
                entity: Entity::new(id, tag),
                components: ComponentSlots::default(),
            },
        );
        self.pending.push(id);
        id
    }

    /// All committed entities, including ones destroyed this frame
    pub fn entities(&self) -> &[EntityId] {
        &self.live
    }

    /// Committed entities with `tag`
    pub fn entities_with_tag(&self, tag: Tag) -> &[EntityId] {
        self.by_tag.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Committed, still-active entities with `tag`
    pub fn active_with_tag(&self, tag: Tag) -> Vec<EntityId> {
        self.entities_with_tag(tag)
            .iter()
            .copied()
            .filter(|&id| self.is_active(id))
            .collect()
    }

    /// Identity record for a pending or committed entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.records.get(&id).map(|r| &r.entity)
    }

    pub fn tag(&self, id: EntityId) -> Option<Tag> {
        self.entity(id).map(Entity::tag)
    }

    /// False for destroyed and unknown entities
    pub fn is_active(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(Entity::is_active)
    }

    /// True once the entity has been committed into the live set
    pub fn is_live(&self, id: EntityId) -> bool {
        self.records.contains_key(&id) && !self.pending.contains(&id)
    }

    /// Mark inactive; the entity stays queryable until the next commit
    pub fn destroy(&mut self, id: EntityId) {
        match self.records.get_mut(&id) {
            Some(record) => record.entity.destroy(),
            None => log::debug!("destroy on unknown entity {id}"),
        }
    }

    /// Apply pending additions, then sweep out destroyed entities
    pub fn commit(&mut self) {
        for id in std::mem::take(&mut self.pending) {
            if let Some(record) = self.records.get(&id) {
                self.live.push(id);
                self.by_tag.entry(record.entity.tag()).or_default().push(id);
            }
        }

        let records = &mut self.records;
        let before = self.live.len();
        self.live.retain(|id| {
            let alive = records.get(id).is_some_and(|r| r.entity.is_active());
            if !alive {
                records.remove(id);
            }
            alive
        });
        for ids in self.by_tag.values_mut() {
            ids.retain(|id| records.contains_key(id));
        }

        let removed = before - self.live.len();
        if removed > 0 {
            log::trace!("commit swept {removed} entities, {} live", self.live.len());
        }
    }

    /// Number of committed entities
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Attach (or replace) a component
    pub fn insert<C: Component>(&mut self, id: EntityId, component: C) -> Result<(), SimError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(SimError::UnknownEntity(id))?;
        *C::slot_mut(&mut record.components) = Some(component);
        Ok(())
    }

    /// Detach a component, returning it if present
    pub fn remove<C: Component>(&mut self, id: EntityId) -> Option<C> {
        self.records
            .get_mut(&id)
            .and_then(|r| C::slot_mut(&mut r.components).take())
    }

    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        self.get::<C>(id).is_some()
    }

    pub fn get<C: Component>(&self, id: EntityId) -> Option<&C> {
        self.records
            .get(&id)
            .and_then(|r| C::slot(&r.components).as_ref())
    }

    pub fn get_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        self.records
            .get_mut(&id)
            .and_then(|r| C::slot_mut(&mut r.components).as_mut())
    }

    /// Like `get`, but names what is missing
    pub fn component<C: Component>(&self, id: EntityId) -> Result<&C, SimError> {
        let record = self.records.get(&id).ok_or(SimError::UnknownEntity(id))?;
        C::slot(&record.components)
            .as_ref()
            .ok_or(SimError::MissingComponent {
                id,
                component: C::NAME,
            })
    }

    pub fn component_mut<C: Component>(&mut self, id: EntityId) -> Result<&mut C, SimError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(SimError::UnknownEntity(id))?;
        C::slot_mut(&mut record.components)
            .as_mut()
            .ok_or(SimError::MissingComponent {
                id,
                component: C::NAME,
            })
    }

    /// Collision box from `Transform` + `Shape`
    pub fn aabb(&self, id: EntityId) -> Result<Aabb, SimError> {
        let transform = self.component::<Transform>(id)?;
        let shape = self.component::<Shape>(id)?;
        Ok(shape.aabb_at(transform.pos))
    }

    /// Center of the collision box
    pub fn center(&self, id: EntityId) -> Result<Vec2, SimError> {
        self.aabb(id).map(|a| a.center())
    }
}
