use serde::{Deserialize, Serialize};

use coppertrace_geometry::Shape;

use crate::error::RulesError;

/// The per-layer shape set of a pin or via, referenced by name from the
/// library records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Padstack {
    pub name: String,
    /// One optional shape per board layer; `None` on layers the padstack does
    /// not touch.
    pub shapes: Vec<Option<Shape>>,
    /// Whether SMD pins may attach to a via with this padstack.
    pub attach_allowed: bool,
}

impl Padstack {
    pub fn new(name: &str, shapes: Vec<Option<Shape>>, attach_allowed: bool) -> Self {
        Self {
            name: name.to_string(),
            shapes,
            attach_allowed,
        }
    }

    pub fn shape_on_layer(&self, layer: usize) -> Option<&Shape> {
        self.shapes.get(layer).and_then(|s| s.as_ref())
    }

    /// First layer with a shape, for drill span checks.
    pub fn from_layer(&self) -> Option<usize> {
        self.shapes.iter().position(|s| s.is_some())
    }

    pub fn to_layer(&self) -> Option<usize> {
        self.shapes.iter().rposition(|s| s.is_some())
    }
}

/// The padstack library of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Padstacks {
    layer_count: usize,
    padstacks: Vec<Padstack>,
}

impl Padstacks {
    pub fn new(layer_count: usize) -> Self {
        Self {
            layer_count,
            padstacks: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.padstacks.len()
    }

    pub fn get(&self, index: usize) -> Option<&Padstack> {
        self.padstacks.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&Padstack> {
        self.padstacks.iter().find(|p| p.name == name)
    }

    pub fn append(&mut self, padstack: Padstack) -> Result<usize, RulesError> {
        if self.find(&padstack.name).is_some() {
            return Err(RulesError::DuplicateName(padstack.name));
        }
        debug_assert_eq!(padstack.shapes.len(), self.layer_count);
        self.padstacks.push(padstack);
        Ok(self.padstacks.len() - 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Padstack> {
        self.padstacks.iter()
    }
}
