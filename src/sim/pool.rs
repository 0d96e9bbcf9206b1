//! Slot arena for entity collections
//!
//! Entities are addressed by stable `EntityId`s. Removal empties a slot instead
//! of shifting the vector, so ids gathered during an update or collision pass
//! stay valid until the pass ends.

use serde::{Deserialize, Serialize};

/// Stable handle into an `EntityPool`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPool<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for EntityPool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> EntityPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> EntityId {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(value);
                EntityId(index)
            }
            None => {
                self.slots.push(Some(value));
                EntityId(self.slots.len() - 1)
            }
        }
    }

    /// Empty the slot; returns the entity if it was still alive
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let taken = self.slots.get_mut(id.0).and_then(Option::take);
        if taken.is_some() {
            self.len -= 1;
            self.free.push(id.0);
        }
        taken
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|v| (EntityId(i), v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|v| (EntityId(i), v)))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Ids of live entities, detached from the pool borrow
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Remove every entity for which `dead` returns true
    pub fn remove_where<F: FnMut(&T) -> bool>(&mut self, mut dead: F) -> usize {
        let mut removed = 0;
        for index in 0..self.slots.len() {
            if self.slots[index].as_ref().is_some_and(&mut dead) {
                self.slots[index] = None;
                self.free.push(index);
                removed += 1;
            }
        }
        self.len -= removed;
        removed
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}
