use serde::{Deserialize, Serialize};

use crate::error::RulesError;

/// Index of the built-in "default" clearance class.
pub const DEFAULT_CLASS: usize = 0;

/// Index of the built-in "null" class: no clearance required against anything.
pub const NULL_CLASS: usize = 1;

/// Characters that may not appear in a clearance class name (reserved by the
/// rules file syntax).
const RESERVED_NAME_CHARS: [char; 4] = ['(', ')', ' ', '_'];

/// The symmetric class x class x layer table of minimum required separations.
///
/// Rows 0 and 1 are the built-in "default" and "null" classes and cannot be
/// removed. Every write mirrors to the symmetric cell, so
/// `value(i, j, l) == value(j, i, l)` holds at all times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceMatrix {
    layer_count: usize,
    class_names: Vec<String>,
    /// `values[i][j * layer_count + layer]`, kept symmetric in (i, j).
    values: Vec<Vec<i32>>,
}

impl ClearanceMatrix {
    /// Creates the two built-in classes with all clearances zero.
    pub fn new(layer_count: usize) -> Self {
        let mut m = ClearanceMatrix {
            layer_count,
            class_names: Vec::new(),
            values: Vec::new(),
        };
        m.push_class("default");
        m.push_class("null");
        m
    }

    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    pub fn get_class_count(&self) -> usize {
        self.class_names.len()
    }

    pub fn get_name(&self, index: usize) -> Option<&str> {
        self.class_names.get(index).map(String::as_str)
    }

    pub fn class_index(&self, name: &str) -> Option<usize> {
        self.class_names.iter().position(|n| n == name)
    }

    /// A legal class name is non-empty and free of reserved characters.
    pub fn is_legal_class_name(name: &str) -> bool {
        !name.is_empty() && !name.contains(RESERVED_NAME_CHARS)
    }

    /// Appends a class and returns its index. The new class starts with the
    /// default class's clearances.
    pub fn append_class(&mut self, name: &str) -> Result<usize, RulesError> {
        if !Self::is_legal_class_name(name) {
            return Err(RulesError::IllegalClassName(name.to_string()));
        }
        if self.class_index(name).is_some() {
            return Err(RulesError::DuplicateClassName(name.to_string()));
        }
        let index = self.push_class(name);
        for other in 0..index {
            for layer in 0..self.layer_count {
                let v = self.values[DEFAULT_CLASS][other * self.layer_count + layer];
                self.values[index][other * self.layer_count + layer] = v;
                self.values[other][index * self.layer_count + layer] = v;
            }
        }
        for layer in 0..self.layer_count {
            self.values[index][index * self.layer_count + layer] =
                self.values[DEFAULT_CLASS][DEFAULT_CLASS * self.layer_count + layer];
        }
        log::info!("appended clearance class '{}' as index {}", name, index);
        Ok(index)
    }

    /// Removes a class, shifting all higher class indices down by one.
    ///
    /// The built-in classes cannot be removed. The caller is responsible for
    /// first making sure no item references the class and for renumbering item
    /// class indices above `index`.
    pub fn remove_class(&mut self, index: usize) -> Result<(), RulesError> {
        if index >= self.get_class_count() {
            return Err(RulesError::UnknownClass(index));
        }
        if index <= NULL_CLASS {
            return Err(RulesError::ImmortalClass(index));
        }
        let name = self.class_names.remove(index);
        self.values.remove(index);
        for row in &mut self.values {
            let start = index * self.layer_count;
            row.drain(start..start + self.layer_count);
        }
        log::info!("removed clearance class '{}' (index {})", name, index);
        Ok(())
    }

    /// The required separation between classes `i` and `j` on `layer`.
    ///
    /// Indices are validated by the mutation surface; passing stale indices
    /// here is a programming error.
    pub fn value(&self, i: usize, j: usize, layer: usize) -> i32 {
        self.values[i][j * self.layer_count + layer]
    }

    /// Sets the clearance between `i` and `j` on one layer, mirroring the
    /// symmetric cell.
    pub fn set_value(&mut self, i: usize, j: usize, layer: usize, value: i32) -> Result<(), RulesError> {
        self.check_cell(i, j, layer, value)?;
        self.values[i][j * self.layer_count + layer] = value;
        self.values[j][i * self.layer_count + layer] = value;
        Ok(())
    }

    /// Sets the clearance between `i` and `j` on every layer.
    pub fn set_value_all_layers(&mut self, i: usize, j: usize, value: i32) -> Result<(), RulesError> {
        for layer in 0..self.layer_count {
            self.set_value(i, j, layer, value)?;
        }
        Ok(())
    }

    /// Sets the clearance between `i` and `j` on every inner layer.
    ///
    /// Layer writes have no precedence rule: whichever of the three write
    /// modes ran last wins per cell.
    pub fn set_inner_value(&mut self, i: usize, j: usize, value: i32) -> Result<(), RulesError> {
        if self.layer_count <= 2 {
            self.check_cell(i, j, 0, value)?;
            return Ok(());
        }
        for layer in 1..self.layer_count - 1 {
            self.set_value(i, j, layer, value)?;
        }
        Ok(())
    }

    /// True when the classes have identical clearances against every third
    /// class on every layer; such classes are candidates for merging.
    pub fn is_equal(&self, i: usize, j: usize) -> bool {
        if i >= self.get_class_count() || j >= self.get_class_count() {
            return false;
        }
        if i == j {
            return true;
        }
        (0..self.get_class_count())
            .filter(|&k| k != i && k != j)
            .all(|k| {
                (0..self.layer_count).all(|l| self.value(i, k, l) == self.value(j, k, l))
            })
    }

    /// Pairs `(keep, remove)` of mergeable classes. Only non-built-in classes
    /// appear as removal candidates; on a pruned matrix this is empty.
    pub fn prune_candidates(&self) -> Vec<(usize, usize)> {
        let n = self.get_class_count();
        let mut out = Vec::new();
        for j in NULL_CLASS + 1..n {
            if let Some(i) = (0..j).find(|&i| self.is_equal(i, j)) {
                out.push((i, j));
            }
        }
        out
    }

    /// The largest clearance required between `class` and any class on `layer`.
    /// This is the compensation bound the search tree prunes with.
    pub fn max_value_for_class(&self, class: usize, layer: usize) -> i32 {
        (0..self.get_class_count())
            .map(|j| self.value(class, j, layer))
            .max()
            .unwrap_or(0)
    }

    /// The largest clearance anywhere on `layer`.
    pub fn max_value(&self, layer: usize) -> i32 {
        (0..self.get_class_count())
            .map(|i| self.max_value_for_class(i, layer))
            .max()
            .unwrap_or(0)
    }

    fn check_cell(&self, i: usize, j: usize, layer: usize, value: i32) -> Result<(), RulesError> {
        if i >= self.get_class_count() {
            return Err(RulesError::UnknownClass(i));
        }
        if j >= self.get_class_count() {
            return Err(RulesError::UnknownClass(j));
        }
        if layer >= self.layer_count {
            return Err(RulesError::LayerOutOfRange {
                index: layer,
                count: self.layer_count,
            });
        }
        if value < 0 {
            return Err(RulesError::NegativeValue(value));
        }
        Ok(())
    }

    fn push_class(&mut self, name: &str) -> usize {
        let index = self.class_names.len();
        self.class_names.push(name.to_string());
        for row in &mut self.values {
            row.extend(std::iter::repeat(0).take(self.layer_count));
        }
        self.values.push(vec![0; (index + 1) * self.layer_count]);
        index
    }
}

/// Item kinds that can carry their own default clearance class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemClass {
    Trace,
    Via,
    Pin,
    SmdPin,
    Area,
}

const ITEM_CLASS_COUNT: usize = 5;

impl ItemClass {
    fn ordinal(self) -> usize {
        match self {
            ItemClass::Trace => 0,
            ItemClass::Via => 1,
            ItemClass::Pin => 2,
            ItemClass::SmdPin => 3,
            ItemClass::Area => 4,
        }
    }
}

/// The clearance class newly created items of each kind start with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultItemClearanceClasses {
    arr: [usize; ITEM_CLASS_COUNT],
}

impl Default for DefaultItemClearanceClasses {
    fn default() -> Self {
        Self {
            arr: [DEFAULT_CLASS; ITEM_CLASS_COUNT],
        }
    }
}

impl DefaultItemClearanceClasses {
    pub fn get(&self, item_class: ItemClass) -> usize {
        self.arr[item_class.ordinal()]
    }

    pub fn set(&mut self, item_class: ItemClass, index: usize) {
        self.arr[item_class.ordinal()] = index;
    }

    pub fn set_all(&mut self, index: usize) {
        self.arr = [index; ITEM_CLASS_COUNT];
    }

    /// Mirrors a clearance matrix renumbering.
    pub fn clearance_class_removed(&mut self, removed: usize) {
        for entry in &mut self.arr {
            if *entry == removed {
                *entry = DEFAULT_CLASS;
            } else if *entry > removed {
                *entry -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> ClearanceMatrix {
        let mut m = ClearanceMatrix::new(4);
        m.append_class("signal").unwrap();
        m.append_class("power").unwrap();
        m
    }

    #[test]
    fn test_builtin_classes() {
        let m = ClearanceMatrix::new(2);
        assert_eq!(m.get_class_count(), 2);
        assert_eq!(m.get_name(DEFAULT_CLASS), Some("default"));
        assert_eq!(m.get_name(NULL_CLASS), Some("null"));
        assert_eq!(m.value(0, 1, 0), 0);
    }

    #[test]
    fn test_name_validation() {
        assert!(ClearanceMatrix::is_legal_class_name("signal-1"));
        assert!(!ClearanceMatrix::is_legal_class_name(""));
        assert!(!ClearanceMatrix::is_legal_class_name("has space"));
        assert!(!ClearanceMatrix::is_legal_class_name("paren("));
        assert!(!ClearanceMatrix::is_legal_class_name("under_score"));
        let mut m = matrix();
        assert_eq!(
            m.append_class("signal"),
            Err(RulesError::DuplicateClassName("signal".to_string()))
        );
    }

    #[test]
    fn test_symmetry_after_writes() {
        let mut m = matrix();
        m.set_value(2, 3, 1, 250).unwrap();
        m.set_value_all_layers(0, 2, 100).unwrap();
        m.set_inner_value(2, 3, 150).unwrap();
        for i in 0..m.get_class_count() {
            for j in 0..m.get_class_count() {
                for l in 0..4 {
                    assert_eq!(m.value(i, j, l), m.value(j, i, l), "({i},{j},{l})");
                }
            }
        }
        // Inner write after the per-layer write wins on the inner layers.
        assert_eq!(m.value(2, 3, 1), 150);
        assert_eq!(m.value(2, 3, 2), 150);
        assert_eq!(m.value(2, 3, 0), 0);
    }

    #[test]
    fn test_new_class_starts_from_default() {
        let mut m = ClearanceMatrix::new(2);
        m.set_value_all_layers(0, 0, 200).unwrap();
        let idx = m.append_class("signal").unwrap();
        assert_eq!(m.value(idx, idx, 0), 200);
        assert_eq!(m.value(idx, 0, 0), 200);
        // Nothing requires clearance against the null class by default.
        assert_eq!(m.value(idx, NULL_CLASS, 0), 0);
    }

    #[test]
    fn test_remove_class_renumbers() {
        let mut m = matrix();
        m.set_value_all_layers(3, 3, 400).unwrap();
        m.remove_class(2).unwrap();
        assert_eq!(m.get_class_count(), 3);
        assert_eq!(m.get_name(2), Some("power"));
        // The former class 3 moved to index 2 with its values intact.
        assert_eq!(m.value(2, 2, 0), 400);
        assert_eq!(m.remove_class(NULL_CLASS), Err(RulesError::ImmortalClass(1)));
        assert_eq!(m.remove_class(99), Err(RulesError::UnknownClass(99)));
    }

    #[test]
    fn test_prune_candidates_and_idempotence() {
        let mut m = matrix();
        // "signal" and "power" both still have all-zero rows: mergeable.
        let c = m.prune_candidates();
        assert!(c.contains(&(0, 2)) || c.contains(&(2, 3)));
        m.set_value_all_layers(2, 3, 100).unwrap();
        m.set_value_all_layers(2, 2, 100).unwrap();
        m.set_value_all_layers(2, 0, 50).unwrap();
        // Now every class row is distinct against third classes.
        assert!(m.prune_candidates().is_empty());
        // Prune on a pruned matrix stays a no-op.
        assert!(m.prune_candidates().is_empty());
    }

    #[test]
    fn test_max_value_tracks_writes() {
        let mut m = matrix();
        m.set_value(2, 3, 1, 250).unwrap();
        assert_eq!(m.max_value(1), 250);
        assert_eq!(m.max_value(0), 0);
        assert_eq!(m.max_value_for_class(2, 1), 250);
        assert_eq!(m.max_value_for_class(0, 1), 0);
    }
}
