use serde::{Deserialize, Serialize};

use crate::error::BoardError;

/// A generation-checked handle into an [`UndoableObjects`] arena.
///
/// Handles stay valid across undo and redo of the object they name. A handle
/// whose slot was reclaimed (its insertion rolled back or made unreachable)
/// fails the generation check instead of aliasing the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
enum Change<T> {
    Inserted(ObjId),
    /// Removal, carrying the removed value for restoration.
    Removed(ObjId, T),
    /// First write to an object within a batch, carrying the previous value.
    Modified(ObjId, T),
}

impl<T> Change<T> {
    fn id(&self) -> ObjId {
        match self {
            Change::Inserted(id) | Change::Removed(id, _) | Change::Modified(id, _) => *id,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// A versioned arena of mutable board entities with atomic batch undo.
///
/// All mutations accumulate in an open change batch. `commit` seals the batch
/// onto the undo stack as one atomic unit; `rollback` reverts it. Each batch
/// records, per touched object, only what is needed to invert it: the id for
/// an insertion, the previous value for the first modification or a removal.
///
/// Slots of removed objects stay reserved while any history batch still
/// refers to them, so undo can restore an object under its original handle.
/// A slot is reclaimed (generation bumped, index reused) only when its
/// insertion is annulled: rolled back, or discarded together with the whole
/// redo stack.
#[derive(Debug, Clone)]
pub struct UndoableObjects<T: Clone> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    pending: Vec<Change<T>>,
    undo_stack: Vec<Vec<Change<T>>>,
    redo_stack: Vec<Vec<Change<T>>>,
}

impl<T: Clone> Default for UndoableObjects<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> UndoableObjects<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            pending: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: ObjId) -> bool {
        self.get(id).is_ok()
    }

    pub fn get(&self, id: ObjId) -> Result<&T, BoardError> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.value.as_ref())
            .ok_or(BoardError::StaleObject(id))
    }

    /// Iterates over all live objects with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (ObjId, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|v| {
                (
                    ObjId {
                        index: i as u32,
                        generation: s.generation,
                    },
                    v,
                )
            })
        })
    }

    pub fn insert(&mut self, value: T) -> ObjId {
        self.invalidate_redo();
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                ObjId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                ObjId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.pending.push(Change::Inserted(id));
        id
    }

    pub fn remove(&mut self, id: ObjId) -> Result<T, BoardError> {
        self.invalidate_redo();
        let value = {
            let slot = self
                .slots
                .get_mut(id.index as usize)
                .filter(|s| s.generation == id.generation)
                .ok_or(BoardError::StaleObject(id))?;
            slot.value.take().ok_or(BoardError::StaleObject(id))?
        };
        self.pending.push(Change::Removed(id, value.clone()));
        Ok(value)
    }

    /// Mutates an object in place, capturing its previous value the first
    /// time the open batch touches it.
    pub fn update(&mut self, id: ObjId, f: impl FnOnce(&mut T)) -> Result<(), BoardError> {
        self.invalidate_redo();
        let previous = self.get(id)?.clone();
        if !self.pending.iter().any(|c| c.id() == id) {
            self.pending.push(Change::Modified(id, previous));
        }
        let slot = &mut self.slots[id.index as usize];
        if let Some(value) = slot.value.as_mut() {
            f(value);
        }
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Seals the open batch onto the undo stack. Returns the number of
    /// changes committed.
    pub fn commit(&mut self) -> usize {
        let n = self.pending.len();
        if n > 0 {
            self.undo_stack.push(std::mem::take(&mut self.pending));
        }
        n
    }

    /// Reverts the open batch. Objects inserted by the batch are reclaimed.
    pub fn rollback(&mut self) -> usize {
        let batch = std::mem::take(&mut self.pending);
        let n = batch.len();
        for change in batch.into_iter().rev() {
            match change {
                Change::Inserted(id) => self.reclaim(id),
                Change::Removed(id, value) => {
                    self.slots[id.index as usize].value = Some(value);
                }
                Change::Modified(id, previous) => {
                    self.slots[id.index as usize].value = Some(previous);
                }
            }
        }
        n
    }

    /// Undoes the most recent committed batch atomically. Returns the handles
    /// it touched, or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Vec<ObjId>> {
        debug_assert!(self.pending.is_empty(), "undo with an open batch");
        let batch = self.undo_stack.pop()?;
        let ids = touched_ids(&batch);
        let opposite = self.apply_inverse(batch);
        self.redo_stack.push(opposite);
        Some(ids)
    }

    /// Re-applies the most recently undone batch.
    pub fn redo(&mut self) -> Option<Vec<ObjId>> {
        debug_assert!(self.pending.is_empty(), "redo with an open batch");
        let batch = self.redo_stack.pop()?;
        let ids = touched_ids(&batch);
        let opposite = self.apply_inverse(batch);
        self.undo_stack.push(opposite);
        Some(ids)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Applies the inverse of a batch and returns the batch that inverts the
    /// inversion, for the opposite stack.
    fn apply_inverse(&mut self, batch: Vec<Change<T>>) -> Vec<Change<T>> {
        let mut opposite = Vec::with_capacity(batch.len());
        for change in batch.into_iter().rev() {
            match change {
                Change::Inserted(id) => {
                    if let Some(value) = self.slots[id.index as usize].value.take() {
                        opposite.push(Change::Removed(id, value));
                    }
                }
                Change::Removed(id, value) => {
                    self.slots[id.index as usize].value = Some(value);
                    opposite.push(Change::Inserted(id));
                }
                Change::Modified(id, previous) => {
                    let slot = &mut self.slots[id.index as usize];
                    if let Some(current) = slot.value.as_mut() {
                        let old = std::mem::replace(current, previous);
                        opposite.push(Change::Modified(id, old));
                    }
                }
            }
        }
        opposite
    }

    /// A fresh mutation makes the undone future unreachable. Insertions that
    /// now can never be redone release their slots for reuse.
    fn invalidate_redo(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }
        let discarded: Vec<Vec<Change<T>>> = self.redo_stack.drain(..).collect();
        for batch in discarded {
            for change in batch {
                if let Change::Removed(id, _) = change {
                    // In a redo batch this is an inverted insertion; the
                    // object is gone for good now.
                    self.reclaim(id);
                }
            }
        }
    }

    fn reclaim(&mut self, id: ObjId) {
        let slot = &mut self.slots[id.index as usize];
        debug_assert!(slot.generation == id.generation);
        slot.value = None;
        slot.generation += 1;
        self.free.push(id.index);
    }
}

fn touched_ids<T>(batch: &[Change<T>]) -> Vec<ObjId> {
    let mut ids: Vec<ObjId> = Vec::with_capacity(batch.len());
    for change in batch {
        if !ids.contains(&change.id()) {
            ids.push(change.id());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut store: UndoableObjects<i32> = UndoableObjects::new();
        let a = store.insert(1);
        let b = store.insert(2);
        store.commit();
        assert_eq!(store.get(a), Ok(&1));
        assert_eq!(store.remove(b), Ok(2));
        assert_eq!(store.get(b), Err(BoardError::StaleObject(b)));
        store.commit();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rollback_reverts_batch() {
        let mut store: UndoableObjects<i32> = UndoableObjects::new();
        let a = store.insert(1);
        store.commit();
        let b = store.insert(2);
        store.update(a, |v| *v = 10).unwrap();
        store.remove(a).unwrap();
        assert_eq!(store.rollback(), 3);
        assert_eq!(store.get(a), Ok(&1));
        assert!(!store.contains(b));
    }

    #[test]
    fn test_rolled_back_insert_handle_goes_stale() {
        let mut store: UndoableObjects<i32> = UndoableObjects::new();
        let a = store.insert(1);
        store.rollback();
        // The slot is reused, but the old handle fails its generation check.
        let b = store.insert(2);
        assert_ne!(a, b);
        assert_eq!(store.get(a), Err(BoardError::StaleObject(a)));
        assert_eq!(store.get(b), Ok(&2));
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut store: UndoableObjects<i32> = UndoableObjects::new();
        let a = store.insert(1);
        store.commit();
        store.update(a, |v| *v = 2).unwrap();
        let b = store.insert(5);
        store.commit();
        store.remove(a).unwrap();
        store.commit();

        assert_eq!(store.undo(), Some(vec![a]));
        assert_eq!(store.get(a), Ok(&2));
        store.undo().unwrap();
        assert_eq!(store.get(a), Ok(&1));
        assert!(!store.contains(b));
        store.undo().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.undo(), None);

        store.redo().unwrap();
        assert_eq!(store.get(a), Ok(&1));
        store.redo().unwrap();
        assert_eq!(store.get(a), Ok(&2));
        assert_eq!(store.get(b), Ok(&5));
        store.redo().unwrap();
        assert!(!store.contains(a));
        assert_eq!(store.redo(), None);
    }

    #[test]
    fn test_mutation_discards_redo() {
        let mut store: UndoableObjects<i32> = UndoableObjects::new();
        let a = store.insert(1);
        store.commit();
        store.undo().unwrap();
        assert!(store.can_redo());
        let b = store.insert(2);
        store.commit();
        assert!(!store.can_redo());
        // The annulled insertion's slot was reclaimed for b.
        assert_eq!(store.get(a), Err(BoardError::StaleObject(a)));
        assert_eq!(store.get(b), Ok(&2));
    }

    #[test]
    fn test_modified_logs_only_first_write() {
        let mut store: UndoableObjects<i32> = UndoableObjects::new();
        let a = store.insert(1);
        store.commit();
        store.update(a, |v| *v = 2).unwrap();
        store.update(a, |v| *v = 3).unwrap();
        assert_eq!(store.commit(), 1);
        store.undo().unwrap();
        assert_eq!(store.get(a), Ok(&1));
        store.redo().unwrap();
        assert_eq!(store.get(a), Ok(&3));
    }
}
