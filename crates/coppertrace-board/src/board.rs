use uuid::Uuid;

use coppertrace_geometry::{Shape, Vector};
use coppertrace_rules::{BoardRules, LayerStructure, NULL_CLASS};

use crate::error::BoardError;
use crate::item::Item;
use crate::store::{ObjId, UndoableObjects};
use crate::tree::SearchTree;

/// Handle to a placed board item.
pub type ItemId = ObjId;

/// A rules edit recorded for one committed batch: the rules before and after.
#[derive(Debug, Clone)]
struct RulesEdit {
    before: BoardRules,
    after: BoardRules,
}

/// One committed batch as seen by the board: whether the item store holds a
/// batch for it, and the rules edit if the batch touched rules.
#[derive(Debug)]
struct BatchRecord {
    has_items: bool,
    rules: Option<RulesEdit>,
}

/// The routing board: items, rules, and the spatial index over both.
///
/// All structural mutations accumulate in an open change batch and become one
/// atomic undo step on [`RoutingBoard::commit`]. The search tree is kept in
/// sync eagerly on every mutation, so queries between mutations always see
/// current geometry; it is not part of the undo state itself but is resynced
/// from the store whenever undo or redo changes items or rules.
#[derive(Debug)]
pub struct RoutingBoard {
    pub id: Uuid,
    pub name: String,
    pub rules: BoardRules,
    items: UndoableObjects<Item>,
    tree: SearchTree,
    /// Rules before the first rules write of the open batch.
    rules_before: Option<BoardRules>,
    /// One record per committed batch, aligned with the item store's stacks.
    undo_batches: Vec<BatchRecord>,
    redo_batches: Vec<BatchRecord>,
}

impl RoutingBoard {
    pub fn new(name: &str, layer_structure: LayerStructure) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            rules: BoardRules::new(layer_structure),
            items: UndoableObjects::new(),
            tree: SearchTree::new(),
            rules_before: None,
            undo_batches: Vec::new(),
            redo_batches: Vec::new(),
        }
    }

    pub fn layer_count(&self) -> usize {
        self.rules.layer_count()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, id: ItemId) -> Result<&Item, BoardError> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.items.iter()
    }

    // ── Item mutations ───────────────────────────────────────────────

    /// Places an item and registers it in the search tree.
    pub fn insert_item(&mut self, item: Item) -> Result<ItemId, BoardError> {
        self.validate_item(&item)?;
        self.redo_batches.clear();
        let id = self.items.insert(item);
        if let Ok(item) = self.items.get(id) {
            self.tree.insert(id, item, &self.rules.clearance_matrix);
        }
        Ok(id)
    }

    /// Ripup: deregisters from the search tree first, then removes.
    pub fn remove_item(&mut self, id: ItemId) -> Result<Item, BoardError> {
        self.tree.remove(id)?;
        self.redo_batches.clear();
        self.items.remove(id)
    }

    /// Replaces the shape of an item on one layer. The tree entry is
    /// deregistered before the mutation and re-registered after, since
    /// bounding regions are never updated in place.
    pub fn change_item_shape(
        &mut self,
        id: ItemId,
        layer: usize,
        shape: Shape,
    ) -> Result<(), BoardError> {
        if layer >= self.layer_count() {
            return Err(BoardError::LayerOutOfRange {
                index: layer,
                count: self.layer_count(),
            });
        }
        self.reregister(id, |item| item.shapes[layer] = Some(shape))
    }

    pub fn move_item(&mut self, id: ItemId, v: Vector) -> Result<(), BoardError> {
        self.reregister(id, |item| item.translate(v))
    }

    /// Moves an item to another clearance class.
    pub fn change_item_class(&mut self, id: ItemId, class: usize) -> Result<(), BoardError> {
        if class >= self.rules.clearance_matrix.get_class_count() {
            return Err(coppertrace_rules::RulesError::UnknownClass(class).into());
        }
        self.reregister(id, |item| item.clearance_class = class)
    }

    fn reregister(&mut self, id: ItemId, f: impl FnOnce(&mut Item)) -> Result<(), BoardError> {
        self.tree.remove(id)?;
        self.redo_batches.clear();
        self.items.update(id, f)?;
        if let Ok(item) = self.items.get(id) {
            self.tree.insert(id, item, &self.rules.clearance_matrix);
        }
        Ok(())
    }

    fn validate_item(&self, item: &Item) -> Result<(), BoardError> {
        if item.shapes.len() != self.layer_count() {
            return Err(BoardError::LayerOutOfRange {
                index: item.shapes.len(),
                count: self.layer_count(),
            });
        }
        if item.layers().next().is_none() {
            return Err(BoardError::ShapelessItem);
        }
        if item.clearance_class >= self.rules.clearance_matrix.get_class_count() {
            return Err(coppertrace_rules::RulesError::UnknownClass(item.clearance_class).into());
        }
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Items on `layer` whose exact shape violates the required clearance
    /// against `shape`, with same-net overlaps excluded.
    pub fn find_overlapping(
        &self,
        shape: &Shape,
        layer: usize,
        net: Option<u32>,
        clearance_class: usize,
    ) -> Result<Vec<ItemId>, BoardError> {
        if layer >= self.layer_count() {
            return Err(BoardError::LayerOutOfRange {
                index: layer,
                count: self.layer_count(),
            });
        }
        if clearance_class >= self.rules.clearance_matrix.get_class_count() {
            return Err(coppertrace_rules::RulesError::UnknownClass(clearance_class).into());
        }
        Ok(self.tree.find_overlapping(
            shape,
            layer,
            net,
            clearance_class,
            &self.rules.clearance_matrix,
            &self.items,
        ))
    }

    // ── Rule mutations ───────────────────────────────────────────────

    pub fn append_clearance_class(&mut self, name: &str) -> Result<usize, BoardError> {
        self.touch_rules();
        let index = self.rules.clearance_matrix.append_class(name)?;
        Ok(index)
    }

    /// Removes a clearance class. Fails without mutation while any item still
    /// references the class; reassign items first via
    /// [`RoutingBoard::change_item_class`].
    pub fn remove_clearance_class(&mut self, index: usize) -> Result<(), BoardError> {
        let in_use = self
            .items
            .iter()
            .filter(|(_, item)| item.clearance_class == index)
            .count();
        if in_use > 0 {
            return Err(BoardError::ClassInUse {
                class: index,
                item_count: in_use,
            });
        }
        self.touch_rules();
        self.rules.clearance_matrix.remove_class(index)?;
        self.rules.clearance_class_removed(index);
        // Renumber item references above the removed index.
        let shifted: Vec<ItemId> = self
            .items
            .iter()
            .filter(|(_, item)| item.clearance_class > index)
            .map(|(id, _)| id)
            .collect();
        for id in shifted {
            self.items.update(id, |item| item.clearance_class -= 1)?;
        }
        self.tree
            .clearance_class_removed(index, &self.rules.clearance_matrix, &self.items);
        Ok(())
    }

    /// Sets the clearance between two classes on one layer and invalidates
    /// the affected compensation state.
    pub fn set_clearance_value(
        &mut self,
        i: usize,
        j: usize,
        layer: usize,
        value: i32,
    ) -> Result<(), BoardError> {
        self.touch_rules();
        self.rules.clearance_matrix.set_value(i, j, layer, value)?;
        self.tree
            .clearance_value_changed(&[i, j], &self.rules.clearance_matrix, &self.items);
        Ok(())
    }

    pub fn set_clearance_value_all_layers(
        &mut self,
        i: usize,
        j: usize,
        value: i32,
    ) -> Result<(), BoardError> {
        self.touch_rules();
        self.rules
            .clearance_matrix
            .set_value_all_layers(i, j, value)?;
        self.tree
            .clearance_value_changed(&[i, j], &self.rules.clearance_matrix, &self.items);
        Ok(())
    }

    pub fn set_inner_clearance_value(
        &mut self,
        i: usize,
        j: usize,
        value: i32,
    ) -> Result<(), BoardError> {
        self.touch_rules();
        self.rules.clearance_matrix.set_inner_value(i, j, value)?;
        self.tree
            .clearance_value_changed(&[i, j], &self.rules.clearance_matrix, &self.items);
        Ok(())
    }

    /// Runs a compound rules edit inside the open batch, with undo capture.
    /// Compensation state is rebuilt afterwards, so the edit may touch the
    /// clearance matrix as well as the library records.
    pub fn edit_rules(
        &mut self,
        f: impl FnOnce(&mut BoardRules) -> Result<(), coppertrace_rules::RulesError>,
    ) -> Result<(), BoardError> {
        self.touch_rules();
        f(&mut self.rules)?;
        self.tree.rebuild(&self.rules.clearance_matrix, &self.items);
        Ok(())
    }

    /// The clearance required between an item and a class on a layer when the
    /// item belongs to the null class: none.
    pub fn clearance_value(&self, i: usize, j: usize, layer: usize) -> i32 {
        if i == NULL_CLASS || j == NULL_CLASS {
            return 0;
        }
        self.rules.clearance_matrix.value(i, j, layer)
    }

    // ── Transactions ─────────────────────────────────────────────────

    pub fn has_pending_changes(&self) -> bool {
        self.items.has_pending() || self.rules_before.is_some()
    }

    /// Seals the open batch as one atomic undo step. Returns the number of
    /// item changes committed.
    pub fn commit(&mut self) -> usize {
        let n = self.items.commit();
        let edit = self
            .rules_before
            .take()
            .filter(|before| *before != self.rules)
            .map(|before| RulesEdit {
                before,
                after: self.rules.clone(),
            });
        if n > 0 || edit.is_some() {
            self.undo_batches.push(BatchRecord {
                has_items: n > 0,
                rules: edit,
            });
            self.redo_batches.clear();
        }
        n
    }

    /// Reverts the open batch: items, rules, and search tree state.
    pub fn rollback(&mut self) -> usize {
        let n = self.items.rollback();
        let rules_changed = if let Some(before) = self.rules_before.take() {
            self.rules = before;
            true
        } else {
            false
        };
        if n > 0 || rules_changed {
            self.tree.rebuild(&self.rules.clearance_matrix, &self.items);
        }
        n
    }

    /// Undoes the most recent committed batch. Fails while a batch is open.
    pub fn undo(&mut self) -> Result<bool, BoardError> {
        if self.has_pending_changes() {
            return Err(BoardError::PendingChanges);
        }
        let Some(record) = self.undo_batches.pop() else {
            return Ok(false);
        };
        if let Some(e) = &record.rules {
            self.rules = e.before.clone();
        }
        if record.has_items {
            self.items.undo();
        }
        self.redo_batches.push(record);
        self.tree.rebuild(&self.rules.clearance_matrix, &self.items);
        Ok(true)
    }

    /// Re-applies the most recently undone batch.
    pub fn redo(&mut self) -> Result<bool, BoardError> {
        if self.has_pending_changes() {
            return Err(BoardError::PendingChanges);
        }
        let Some(record) = self.redo_batches.pop() else {
            return Ok(false);
        };
        if let Some(e) = &record.rules {
            self.rules = e.after.clone();
        }
        if record.has_items {
            self.items.redo();
        }
        self.undo_batches.push(record);
        self.tree.rebuild(&self.rules.clearance_matrix, &self.items);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_batches.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_batches.is_empty()
    }

    /// Captures the rules state before the first rules write of a batch.
    fn touch_rules(&mut self) {
        self.redo_batches.clear();
        if self.rules_before.is_none() {
            self.rules_before = Some(self.rules.clone());
        }
    }
}
