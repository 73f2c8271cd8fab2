//! Entity registry
//!
//! Entities live in one vector in creation order; a [`Handle`] is the index.
//! Nothing is ever removed, so handles stay valid and are never aliased.
//! Deactivated entities stay in place and drop out of collision checks.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, Handle};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    player: Option<Handle>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity. A second Player is rejected.
    pub fn spawn(&mut self, entity: Entity) -> Result<Handle> {
        if entity.kind == EntityKind::Player && self.player.is_some() {
            return Err(Error::DuplicateEntity(EntityKind::Player));
        }
        let handle = Handle(self.entities.len() as u32);
        if entity.kind == EntityKind::Player {
            self.player = Some(handle);
        }
        self.entities.push(entity);
        Ok(handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&Entity> {
        self.entities.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Entity> {
        self.entities.get_mut(handle.index())
    }

    /// Returns true if the flag actually changed
    pub fn set_active(&mut self, handle: Handle, active: bool) -> bool {
        match self.get_mut(handle) {
            Some(entity) if entity.active != active => {
                entity.active = active;
                true
            }
            _ => false,
        }
    }

    pub fn is_active(&self, handle: Handle) -> bool {
        self.get(handle).is_some_and(|e| e.active)
    }

    pub fn player(&self) -> Option<Handle> {
        self.player
    }

    pub fn player_entity(&self) -> Option<&Entity> {
        self.player.and_then(|h| self.get(h))
    }

    pub fn player_entity_mut(&mut self) -> Option<&mut Entity> {
        let handle = self.player?;
        self.get_mut(handle)
    }

    /// Entities of one kind in creation order, active or not
    pub fn iter(&self, kind: EntityKind) -> impl Iterator<Item = (Handle, &Entity)> + Clone {
        self.all().filter(move |(_, e)| e.kind == kind)
    }

    /// Active entities of one kind in creation order
    pub fn iter_active(
        &self,
        kind: EntityKind,
    ) -> impl Iterator<Item = (Handle, &Entity)> + Clone {
        self.iter(kind).filter(|(_, e)| e.active)
    }

    pub fn all(&self) -> impl Iterator<Item = (Handle, &Entity)> + Clone {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (Handle(i as u32), e))
    }

    /// Handles of one kind, for loops that mutate while walking
    pub fn handles(&self, kind: EntityKind) -> Vec<Handle> {
        self.iter(kind).map(|(h, _)| h).collect()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.iter(kind).count()
    }

    pub fn count_active(&self, kind: EntityKind) -> usize {
        self.iter_active(kind).count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
