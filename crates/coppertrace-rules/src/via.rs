use serde::{Deserialize, Serialize};

use crate::error::RulesError;

/// A usable via type: a padstack plus the rule attributes of placing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViaInfo {
    pub name: String,
    pub padstack: String,
    pub clearance_class: usize,
    /// Whether the autorouter may attach this via directly under an SMD pad.
    pub attach_smd_allowed: bool,
}

impl ViaInfo {
    pub fn new(name: &str, padstack: &str, clearance_class: usize, attach_smd_allowed: bool) -> Self {
        Self {
            name: name.to_string(),
            padstack: padstack.to_string(),
            clearance_class,
            attach_smd_allowed,
        }
    }
}

/// The via types of a board, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViaInfos {
    vias: Vec<ViaInfo>,
}

impl ViaInfos {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.vias.len()
    }

    pub fn get(&self, index: usize) -> Option<&ViaInfo> {
        self.vias.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&ViaInfo> {
        self.vias.iter().find(|v| v.name == name)
    }

    pub fn append(&mut self, via: ViaInfo) -> Result<usize, RulesError> {
        if self.find(&via.name).is_some() {
            return Err(RulesError::DuplicateName(via.name));
        }
        self.vias.push(via);
        Ok(self.vias.len() - 1)
    }

    pub fn remove(&mut self, name: &str) -> Option<ViaInfo> {
        let pos = self.vias.iter().position(|v| v.name == name)?;
        Some(self.vias.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViaInfo> {
        self.vias.iter()
    }

    /// Mirrors a clearance matrix renumbering into the via records.
    pub fn clearance_class_removed(&mut self, removed: usize) {
        for v in &mut self.vias {
            if v.clearance_class == removed {
                v.clearance_class = crate::clearance::DEFAULT_CLASS;
            } else if v.clearance_class > removed {
                v.clearance_class -= 1;
            }
        }
    }
}

/// An ordered list of via names the autorouter tries when changing layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViaRule {
    pub name: String,
    pub vias: Vec<String>,
}

impl ViaRule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vias: Vec::new(),
        }
    }

    pub fn append_via(&mut self, via_name: &str) {
        if !self.vias.iter().any(|v| v == via_name) {
            self.vias.push(via_name.to_string());
        }
    }

    pub fn contains(&self, via_name: &str) -> bool {
        self.vias.iter().any(|v| v == via_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_via_names() {
        let mut infos = ViaInfos::new();
        infos.append(ViaInfo::new("via-std", "ps-round", 0, true)).unwrap();
        assert!(matches!(
            infos.append(ViaInfo::new("via-std", "ps-other", 0, false)),
            Err(RulesError::DuplicateName(_))
        ));
        assert!(infos.remove("via-std").is_some());
        assert!(infos.remove("via-std").is_none());
    }

    #[test]
    fn test_via_rule_membership() {
        let mut rule = ViaRule::new("default");
        rule.append_via("via-std");
        rule.append_via("via-std");
        assert_eq!(rule.vias.len(), 1);
        assert!(rule.contains("via-std"));
    }

    #[test]
    fn test_clearance_class_renumbering() {
        let mut infos = ViaInfos::new();
        infos.append(ViaInfo::new("a", "ps", 3, true)).unwrap();
        infos.append(ViaInfo::new("b", "ps", 4, true)).unwrap();
        infos.clearance_class_removed(3);
        assert_eq!(infos.find("a").unwrap().clearance_class, 0);
        assert_eq!(infos.find("b").unwrap().clearance_class, 3);
    }
}
