use std::collections::{HashMap, HashSet};

use rstar::{RTree, RTreeObject, AABB};

use coppertrace_geometry::{IntBox, Shape};
use coppertrace_rules::ClearanceMatrix;

use crate::error::BoardError;
use crate::item::Item;
use crate::store::{ObjId, UndoableObjects};

/// One R-tree entry: the clearance-compensated bounding region of an item's
/// shape on one layer. The tree holds handles into the store, never item data.
#[derive(Debug, Clone, PartialEq)]
struct TreeNode {
    item: ObjId,
    layer: usize,
    min: [i64; 2],
    max: [i64; 2],
}

impl TreeNode {
    fn new(item: ObjId, layer: usize, bbox: &IntBox) -> Self {
        Self {
            item,
            layer,
            min: [bbox.ll.x as i64, bbox.ll.y as i64],
            max: [bbox.ur.x as i64, bbox.ur.y as i64],
        }
    }
}

impl RTreeObject for TreeNode {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// The incremental spatial index of all placed items.
///
/// Bounding regions are pre-expanded ("compensated") by the largest clearance
/// the item's class can require on that layer, so a query can prune with its
/// own uncompensated bounding box and still never miss a clearance violation.
/// Bounding-box matches are only candidates: every hit is confirmed with an
/// exact clearance-aware shape test before being reported.
#[derive(Debug, Default)]
pub struct SearchTree {
    tree: RTree<TreeNode>,
    /// Live nodes per registered item, for removal and stale-handle checks.
    registered: HashMap<ObjId, Vec<TreeNode>>,
    /// Reverse index: clearance class -> items compensated with it. Keeps
    /// rule-change invalidation proportional to the affected items.
    by_class: HashMap<usize, HashSet<ObjId>>,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn contains(&self, id: ObjId) -> bool {
        self.registered.contains_key(&id)
    }

    /// Registers every layer shape of an item under its handle.
    pub fn insert(&mut self, id: ObjId, item: &Item, matrix: &ClearanceMatrix) {
        debug_assert!(!self.registered.contains_key(&id), "double insert");
        let mut nodes = Vec::new();
        for layer in item.layers() {
            if let Some(shape) = item.shape_on_layer(layer) {
                let comp = matrix.max_value_for_class(item.clearance_class, layer);
                let bbox = shape.bounding_box().offset(comp);
                let node = TreeNode::new(id, layer, &bbox);
                self.tree.insert(node.clone());
                nodes.push(node);
            }
        }
        self.registered.insert(id, nodes);
        self.by_class
            .entry(item.clearance_class)
            .or_default()
            .insert(id);
    }

    /// Deregisters an item. Must run before the item's shape or class
    /// mutates, since bounding regions are never updated in place.
    pub fn remove(&mut self, id: ObjId) -> Result<(), BoardError> {
        let nodes = self.registered.remove(&id).ok_or_else(|| {
            log::error!("search tree query against unregistered handle {:?}", id);
            BoardError::NotInTree(id)
        })?;
        for node in nodes {
            self.tree.remove(&node);
        }
        for items in self.by_class.values_mut() {
            items.remove(&id);
        }
        Ok(())
    }

    /// All items on `layer` whose shape violates the required clearance
    /// against `shape`, the clearance looked up per candidate from the matrix
    /// by the pair of classes. Same-net items are never violations.
    pub fn find_overlapping(
        &self,
        shape: &Shape,
        layer: usize,
        net: Option<u32>,
        clearance_class: usize,
        matrix: &ClearanceMatrix,
        store: &UndoableObjects<Item>,
    ) -> Vec<ObjId> {
        let bbox = shape.bounding_box();
        if bbox.is_empty() {
            return Vec::new();
        }
        let envelope = AABB::from_corners(
            [bbox.ll.x as i64, bbox.ll.y as i64],
            [bbox.ur.x as i64, bbox.ur.y as i64],
        );
        let mut hits = Vec::new();
        for node in self.tree.locate_in_envelope_intersecting(&envelope) {
            if node.layer != layer || hits.contains(&node.item) {
                continue;
            }
            let item = match store.get(node.item) {
                Ok(item) => item,
                Err(_) => {
                    log::error!("search tree holds stale handle {:?}", node.item);
                    continue;
                }
            };
            if item.shares_net(net) {
                continue;
            }
            let clearance = matrix.value(item.clearance_class, clearance_class, layer);
            if let Some(other) = item.shape_on_layer(layer) {
                if other.intersects_with_clearance(shape, clearance) {
                    hits.push(node.item);
                }
            }
        }
        hits
    }

    /// Re-registers every item whose compensation depends on one of the given
    /// clearance classes. Called after a matrix cell changes; O(affected).
    pub fn clearance_value_changed(
        &mut self,
        classes: &[usize],
        matrix: &ClearanceMatrix,
        store: &UndoableObjects<Item>,
    ) {
        let affected: Vec<ObjId> = classes
            .iter()
            .filter_map(|c| self.by_class.get(c))
            .flatten()
            .copied()
            .collect();
        log::debug!(
            "clearance change on classes {:?}: recompensating {} items",
            classes,
            affected.len()
        );
        for id in affected {
            // Registered by construction of the reverse index.
            let _ = self.remove(id);
            if let Ok(item) = store.get(id) {
                self.insert(id, item, matrix);
            }
        }
    }

    /// Rebuilds compensation for every item whose class index shifted when a
    /// class was removed from the matrix. The store must already be renumbered.
    pub fn clearance_class_removed(
        &mut self,
        removed: usize,
        matrix: &ClearanceMatrix,
        store: &UndoableObjects<Item>,
    ) {
        let affected: Vec<ObjId> = self
            .by_class
            .iter()
            .filter(|(&class, _)| class >= removed)
            .flat_map(|(_, items)| items.iter().copied())
            .collect();
        for id in affected {
            let _ = self.remove(id);
            if let Ok(item) = store.get(id) {
                self.insert(id, item, matrix);
            }
        }
        self.by_class.retain(|_, items| !items.is_empty());
    }

    /// Drops everything and re-registers all live items. Used after undo or
    /// redo of a batch that changed the rules themselves.
    pub fn rebuild(&mut self, matrix: &ClearanceMatrix, store: &UndoableObjects<Item>) {
        self.tree = RTree::new();
        self.registered.clear();
        self.by_class.clear();
        for (id, item) in store.iter() {
            self.insert(id, item, matrix);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;
    use coppertrace_geometry::IntBox;

    fn setup() -> (SearchTree, UndoableObjects<Item>, ClearanceMatrix) {
        (SearchTree::new(), UndoableObjects::new(), ClearanceMatrix::new(2))
    }

    fn trace(store: &mut UndoableObjects<Item>, bbox: IntBox, net: u32) -> (ObjId, Item) {
        let item = Item::on_layer(ItemKind::Trace, 0, 2, Shape::Box(bbox), Some(net), 0);
        let id = store.insert(item.clone());
        (id, item)
    }

    #[test]
    fn test_insert_query_remove() {
        let (mut tree, mut store, matrix) = setup();
        let (a, item_a) = trace(&mut store, IntBox::new(0, 0, 10, 2), 1);
        tree.insert(a, &item_a, &matrix);
        let probe = Shape::Box(IntBox::new(5, 1, 8, 5));
        let hits = tree.find_overlapping(&probe, 0, Some(2), 0, &matrix, &store);
        assert_eq!(hits, vec![a]);
        // Same net is never a violation; other layers are not searched.
        assert!(tree.find_overlapping(&probe, 0, Some(1), 0, &matrix, &store).is_empty());
        assert!(tree.find_overlapping(&probe, 1, Some(2), 0, &matrix, &store).is_empty());
        tree.remove(a).unwrap();
        assert!(tree.find_overlapping(&probe, 0, Some(2), 0, &matrix, &store).is_empty());
        assert_eq!(tree.remove(a), Err(BoardError::NotInTree(a)));
    }

    #[test]
    fn test_bounding_box_match_is_not_enough() {
        let (mut tree, mut store, matrix) = setup();
        // A thin diagonal-ish simplex whose bounding box covers the probe but
        // whose exact shape does not reach it.
        let item = Item::on_layer(
            ItemKind::Keepout,
            0,
            2,
            Shape::Simplex(
                coppertrace_geometry::Simplex::from_lines(vec![
                    coppertrace_geometry::Line::new(
                        coppertrace_geometry::Point::new(0, 0),
                        coppertrace_geometry::Point::new(20, 20),
                    )
                    .unwrap(),
                    coppertrace_geometry::Line::new(
                        coppertrace_geometry::Point::new(20, 20),
                        coppertrace_geometry::Point::new(0, 2),
                    )
                    .unwrap(),
                    coppertrace_geometry::Line::new(
                        coppertrace_geometry::Point::new(0, 2),
                        coppertrace_geometry::Point::new(0, 0),
                    )
                    .unwrap(),
                ]),
            ),
            None,
            0,
        );
        let id = store.insert(item.clone());
        tree.insert(id, &item, &matrix);
        // Bounding box [0,20]x[0,20] overlaps, the triangle does not.
        let probe = Shape::Box(IntBox::new(12, 0, 18, 4));
        assert!(tree.find_overlapping(&probe, 0, None, 0, &matrix, &store).is_empty());
    }

    #[test]
    fn test_compensation_invalidation_on_value_change() {
        let (mut tree, mut store, mut matrix) = setup();
        let (a, item_a) = trace(&mut store, IntBox::new(0, 0, 10, 10), 1);
        tree.insert(a, &item_a, &matrix);
        // Probe 5 units away: no violation while clearance is 0.
        let probe = Shape::Box(IntBox::new(15, 0, 20, 10));
        assert!(tree.find_overlapping(&probe, 0, Some(2), 0, &matrix, &store).is_empty());
        matrix.set_value(0, 0, 0, 8).unwrap();
        tree.clearance_value_changed(&[0], &matrix, &store);
        // The very next query sees the new value.
        assert_eq!(
            tree.find_overlapping(&probe, 0, Some(2), 0, &matrix, &store),
            vec![a]
        );
    }
}
