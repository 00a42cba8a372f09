use serde::{Deserialize, Serialize};

use crate::error::RulesError;

/// A board layer, identified by its position in the [`LayerStructure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    /// Signal layers carry traces; non-signal layers (power planes) do not.
    pub is_signal: bool,
}

impl Layer {
    pub fn new(name: &str, is_signal: bool) -> Self {
        Self {
            name: name.to_string(),
            is_signal,
        }
    }
}

/// The layer stack of a board, outermost layers first and last.
///
/// Layers are addressed by index everywhere in the core; names only matter at
/// the persistence boundary, where files written against a different layer
/// ordering are resolved by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStructure {
    layers: Vec<Layer>,
}

impl LayerStructure {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// A common default: two signal layers named "front" and "back".
    pub fn two_sided() -> Self {
        Self::new(vec![Layer::new("front", true), Layer::new("back", true)])
    }

    pub fn count(&self) -> usize {
        self.layers.len()
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    /// Resolves a layer name to an index, as an error when absent.
    pub fn resolve(&self, name: &str) -> Result<usize, RulesError> {
        self.index_of(name)
            .ok_or_else(|| RulesError::UnknownLayer(name.to_string()))
    }

    /// Inner layers are everything between the two outer layers.
    pub fn is_inner(&self, index: usize) -> bool {
        index > 0 && index + 1 < self.layers.len()
    }

    pub fn signal_count(&self) -> usize {
        self.layers.iter().filter(|l| l.is_signal).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_layer() -> LayerStructure {
        LayerStructure::new(vec![
            Layer::new("front", true),
            Layer::new("in1", true),
            Layer::new("in2", false),
            Layer::new("back", true),
        ])
    }

    #[test]
    fn test_inner_layers() {
        let ls = four_layer();
        assert!(!ls.is_inner(0));
        assert!(ls.is_inner(1));
        assert!(ls.is_inner(2));
        assert!(!ls.is_inner(3));
    }

    #[test]
    fn test_resolve_by_name() {
        let ls = four_layer();
        assert_eq!(ls.resolve("in2").unwrap(), 2);
        assert_eq!(
            ls.resolve("in9"),
            Err(RulesError::UnknownLayer("in9".to_string()))
        );
        assert_eq!(ls.signal_count(), 3);
    }
}
