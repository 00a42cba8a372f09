use serde::{Deserialize, Serialize};

use crate::clearance::DEFAULT_CLASS;
use crate::error::RulesError;

/// A named group of nets sharing routing defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetClass {
    pub name: String,
    /// Clearance class applied to traces of nets in this class.
    pub clearance_class: usize,
    /// Trace half width per layer, in board units.
    pub trace_half_width: Vec<i32>,
    /// Name of the via rule used when this class changes layers.
    pub via_rule: Option<String>,
}

impl NetClass {
    pub fn new(name: &str, layer_count: usize) -> Self {
        Self {
            name: name.to_string(),
            clearance_class: DEFAULT_CLASS,
            trace_half_width: vec![0; layer_count],
            via_rule: None,
        }
    }
}

/// The net classes of a board. Index 0 is the built-in default class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetClasses {
    classes: Vec<NetClass>,
}

impl NetClasses {
    pub fn new(layer_count: usize) -> Self {
        Self {
            classes: vec![NetClass::new("default", layer_count)],
        }
    }

    pub fn count(&self) -> usize {
        self.classes.len()
    }

    pub fn get(&self, index: usize) -> Option<&NetClass> {
        self.classes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut NetClass> {
        self.classes.get_mut(index)
    }

    pub fn find(&self, name: &str) -> Option<&NetClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.name == name)
    }

    pub fn append(&mut self, class: NetClass) -> Result<usize, RulesError> {
        if self.find(&class.name).is_some() {
            return Err(RulesError::DuplicateName(class.name));
        }
        self.classes.push(class);
        Ok(self.classes.len() - 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetClass> {
        self.classes.iter()
    }

    /// Clears a removed clearance class back to the default and shifts the
    /// references above it, mirroring the matrix renumbering.
    pub fn clearance_class_removed(&mut self, removed: usize) {
        for c in &mut self.classes {
            if c.clearance_class == removed {
                c.clearance_class = DEFAULT_CLASS;
            } else if c.clearance_class > removed {
                c.clearance_class -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_lookup() {
        let mut nc = NetClasses::new(2);
        let idx = nc.append(NetClass::new("power", 2)).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(nc.index_of("power"), Some(1));
        assert!(matches!(
            nc.append(NetClass::new("power", 2)),
            Err(RulesError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_clearance_class_renumbering() {
        let mut nc = NetClasses::new(2);
        nc.append(NetClass::new("a", 2)).unwrap();
        nc.append(NetClass::new("b", 2)).unwrap();
        nc.get_mut(1).unwrap().clearance_class = 3;
        nc.get_mut(2).unwrap().clearance_class = 4;
        nc.clearance_class_removed(3);
        assert_eq!(nc.get(1).unwrap().clearance_class, DEFAULT_CLASS);
        assert_eq!(nc.get(2).unwrap().clearance_class, 3);
    }
}
