//! Design rules for board routing: the clearance matrix, net classes, via
//! types and the padstack library.
//!
//! Rules are owned here and referenced by index or name from board items;
//! nothing in this crate holds references back into the board.

pub mod clearance;
pub mod error;
pub mod layer;
pub mod net;
pub mod padstack;
pub mod via;

pub use clearance::{
    ClearanceMatrix, DefaultItemClearanceClasses, ItemClass, DEFAULT_CLASS, NULL_CLASS,
};
pub use error::RulesError;
pub use layer::{Layer, LayerStructure};
pub use net::{NetClass, NetClasses};
pub use padstack::{Padstack, Padstacks};
pub use via::{ViaInfo, ViaInfos, ViaRule};

use serde::{Deserialize, Serialize};

/// All rules of one board, bundled for ownership by the board itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardRules {
    pub layer_structure: LayerStructure,
    pub clearance_matrix: ClearanceMatrix,
    pub net_classes: NetClasses,
    pub via_infos: ViaInfos,
    pub via_rules: Vec<ViaRule>,
    pub padstacks: Padstacks,
    pub default_item_clearance_classes: DefaultItemClearanceClasses,
}

impl BoardRules {
    pub fn new(layer_structure: LayerStructure) -> Self {
        let layer_count = layer_structure.count();
        Self {
            layer_structure,
            clearance_matrix: ClearanceMatrix::new(layer_count),
            net_classes: NetClasses::new(layer_count),
            via_infos: ViaInfos::new(),
            via_rules: Vec::new(),
            padstacks: Padstacks::new(layer_count),
            default_item_clearance_classes: DefaultItemClearanceClasses::default(),
        }
    }

    pub fn layer_count(&self) -> usize {
        self.layer_structure.count()
    }

    /// Propagates a clearance class removal into every record that refers to
    /// classes by index. The matrix itself is mutated by the caller.
    pub fn clearance_class_removed(&mut self, removed: usize) {
        self.net_classes.clearance_class_removed(removed);
        self.via_infos.clearance_class_removed(removed);
        self.default_item_clearance_classes
            .clearance_class_removed(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_rules_setup() {
        let rules = BoardRules::new(LayerStructure::two_sided());
        assert_eq!(rules.layer_count(), 2);
        assert_eq!(rules.clearance_matrix.get_class_count(), 2);
        assert_eq!(
            rules
                .default_item_clearance_classes
                .get(ItemClass::Trace),
            DEFAULT_CLASS
        );
    }

    #[test]
    fn test_class_removal_propagates() {
        let mut rules = BoardRules::new(LayerStructure::two_sided());
        rules.clearance_matrix.append_class("signal").unwrap();
        rules.clearance_matrix.append_class("power").unwrap();
        rules
            .via_infos
            .append(ViaInfo::new("v", "ps", 3, true))
            .unwrap();
        rules.default_item_clearance_classes.set_all(2);
        rules.clearance_matrix.remove_class(2).unwrap();
        rules.clearance_class_removed(2);
        assert_eq!(rules.via_infos.find("v").unwrap().clearance_class, 2);
        assert_eq!(
            rules.default_item_clearance_classes.get(ItemClass::Via),
            DEFAULT_CLASS
        );
    }
}
