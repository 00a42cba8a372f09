//! Rules-scope files: a named, ordered snapshot of the board rules that can
//! be written to JSON and applied to another board.
//!
//! Scopes reference layers by name, never by index, so a file written against
//! one layer ordering applies correctly to a board whose stack lists the same
//! layers in a different order. Application is transactional: either the
//! whole scope lands as one committed batch, or the board is rolled back to
//! its state before the call.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use coppertrace_board::{BoardError, RoutingBoard};
use coppertrace_geometry::Shape;
use coppertrace_rules::{
    NetClass, Padstack, RulesError, ViaInfo, ViaRule, NULL_CLASS,
};

/// Errors from reading, writing or applying a rules scope.
#[derive(Error, Debug)]
pub enum RulesFileError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed rules file: {0}")]
    Format(#[from] serde_json::Error),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("rules file references unknown clearance class '{0}'")]
    UnknownClassName(String),
}

/// One clearance matrix cell, classes and layer referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceEntry {
    pub class_a: String,
    pub class_b: String,
    pub layer: String,
    pub value: i32,
}

/// A per-layer scalar, the layer referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerValue {
    pub layer: String,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetClassEntry {
    pub name: String,
    pub clearance_class: String,
    pub trace_half_width: Vec<LayerValue>,
    pub via_rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViaEntry {
    pub name: String,
    pub padstack: String,
    pub clearance_class: String,
    pub attach_smd_allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViaRuleEntry {
    pub name: String,
    pub vias: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadstackLayerShape {
    pub layer: String,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadstackEntry {
    pub name: String,
    pub shapes: Vec<PadstackLayerShape>,
    pub attach_allowed: bool,
}

/// A named rules scope: everything the file format persists, in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesScope {
    pub name: String,
    /// Layer names in the order the writing board listed them. Recorded for
    /// diagnostics; application resolves every layer reference by name.
    pub layers: Vec<String>,
    /// All clearance class names, built-ins included, in matrix order.
    pub classes: Vec<String>,
    pub clearances: Vec<ClearanceEntry>,
    pub net_classes: Vec<NetClassEntry>,
    pub padstacks: Vec<PadstackEntry>,
    pub vias: Vec<ViaEntry>,
    pub via_rules: Vec<ViaRuleEntry>,
}

/// Captures the complete rules state of a board as a scope.
pub fn scope_from_board(board: &RoutingBoard, name: &str) -> RulesScope {
    let rules = &board.rules;
    let matrix = &rules.clearance_matrix;
    let layer_name = |layer: usize| {
        rules
            .layer_structure
            .get(layer)
            .map(|l| l.name.clone())
            .unwrap_or_default()
    };
    let class_name = |class: usize| matrix.get_name(class).unwrap_or_default().to_string();

    let mut clearances = Vec::new();
    for i in 0..matrix.get_class_count() {
        for j in i..matrix.get_class_count() {
            // The null class never requires clearance.
            if i == NULL_CLASS || j == NULL_CLASS {
                continue;
            }
            for layer in 0..rules.layer_count() {
                let value = matrix.value(i, j, layer);
                if value != 0 {
                    clearances.push(ClearanceEntry {
                        class_a: class_name(i),
                        class_b: class_name(j),
                        layer: layer_name(layer),
                        value,
                    });
                }
            }
        }
    }

    let net_classes = rules
        .net_classes
        .iter()
        .map(|nc| NetClassEntry {
            name: nc.name.clone(),
            clearance_class: class_name(nc.clearance_class),
            trace_half_width: nc
                .trace_half_width
                .iter()
                .enumerate()
                .map(|(layer, &value)| LayerValue {
                    layer: layer_name(layer),
                    value,
                })
                .collect(),
            via_rule: nc.via_rule.clone(),
        })
        .collect();

    let padstacks = rules
        .padstacks
        .iter()
        .map(|p| PadstackEntry {
            name: p.name.clone(),
            shapes: p
                .shapes
                .iter()
                .enumerate()
                .filter_map(|(layer, shape)| {
                    shape.as_ref().map(|shape| PadstackLayerShape {
                        layer: layer_name(layer),
                        shape: shape.clone(),
                    })
                })
                .collect(),
            attach_allowed: p.attach_allowed,
        })
        .collect();

    let vias = rules
        .via_infos
        .iter()
        .map(|v| ViaEntry {
            name: v.name.clone(),
            padstack: v.padstack.clone(),
            clearance_class: class_name(v.clearance_class),
            attach_smd_allowed: v.attach_smd_allowed,
        })
        .collect();

    let via_rules = rules
        .via_rules
        .iter()
        .map(|vr| ViaRuleEntry {
            name: vr.name.clone(),
            vias: vr.vias.clone(),
        })
        .collect();

    RulesScope {
        name: name.to_string(),
        layers: rules
            .layer_structure
            .layers()
            .iter()
            .map(|l| l.name.clone())
            .collect(),
        classes: (0..matrix.get_class_count()).map(class_name).collect(),
        clearances,
        net_classes,
        padstacks,
        vias,
        via_rules,
    }
}

pub fn read_scope<R: Read>(reader: R) -> Result<RulesScope, RulesFileError> {
    let scope: RulesScope = serde_json::from_reader(reader)?;
    log::info!(
        "read rules scope '{}': {} classes, {} clearance entries",
        scope.name,
        scope.classes.len(),
        scope.clearances.len()
    );
    Ok(scope)
}

pub fn write_scope<W: Write>(writer: W, scope: &RulesScope) -> Result<(), RulesFileError> {
    serde_json::to_writer_pretty(writer, scope)?;
    log::info!("wrote rules scope '{}'", scope.name);
    Ok(())
}

/// Applies a scope to a board as one atomic batch.
///
/// Classes and library records missing from the board are created, existing
/// ones are updated in place; records on the board that the scope does not
/// mention are left alone. On any failure the board is rolled back and the
/// error returned, so a partially applied scope is never observable.
///
/// Fails without touching the board while a change batch is already open.
pub fn apply_scope(board: &mut RoutingBoard, scope: &RulesScope) -> Result<(), RulesFileError> {
    if board.has_pending_changes() {
        return Err(BoardError::PendingChanges.into());
    }
    match try_apply(board, scope) {
        Ok(()) => {
            board.commit();
            log::info!("applied rules scope '{}'", scope.name);
            Ok(())
        }
        Err(e) => {
            board.rollback();
            Err(e)
        }
    }
}

fn try_apply(board: &mut RoutingBoard, scope: &RulesScope) -> Result<(), RulesFileError> {
    // Classes first: every later record may reference them by name.
    for name in &scope.classes {
        if board.rules.clearance_matrix.class_index(name).is_none() {
            board.append_clearance_class(name)?;
        }
    }

    for entry in &scope.clearances {
        let i = resolve_class(board, &entry.class_a)?;
        let j = resolve_class(board, &entry.class_b)?;
        let layer = board.rules.layer_structure.resolve(&entry.layer)?;
        if i == NULL_CLASS || j == NULL_CLASS {
            continue;
        }
        board.set_clearance_value(i, j, layer, entry.value)?;
    }

    // Resolve the library records into index space before entering the rules
    // edit, so name errors surface with their own variants.
    let layer_count = board.layer_count();
    let mut net_classes = Vec::with_capacity(scope.net_classes.len());
    for entry in &scope.net_classes {
        let mut nc = board
            .rules
            .net_classes
            .find(&entry.name)
            .cloned()
            .unwrap_or_else(|| NetClass::new(&entry.name, layer_count));
        nc.clearance_class = resolve_class(board, &entry.clearance_class)?;
        for lv in &entry.trace_half_width {
            let layer = board.rules.layer_structure.resolve(&lv.layer)?;
            nc.trace_half_width[layer] = lv.value;
        }
        nc.via_rule = entry.via_rule.clone();
        net_classes.push(nc);
    }

    let mut padstacks = Vec::with_capacity(scope.padstacks.len());
    for entry in &scope.padstacks {
        let mut shapes = vec![None; layer_count];
        for ls in &entry.shapes {
            let layer = board.rules.layer_structure.resolve(&ls.layer)?;
            shapes[layer] = Some(ls.shape.clone());
        }
        padstacks.push(Padstack::new(&entry.name, shapes, entry.attach_allowed));
    }

    let mut vias = Vec::with_capacity(scope.vias.len());
    for entry in &scope.vias {
        let known = board.rules.padstacks.find(&entry.padstack).is_some()
            || padstacks.iter().any(|p: &Padstack| p.name == entry.padstack);
        if !known {
            return Err(RulesError::UnknownPadstack(entry.padstack.clone()).into());
        }
        vias.push(ViaInfo::new(
            &entry.name,
            &entry.padstack,
            resolve_class(board, &entry.clearance_class)?,
            entry.attach_smd_allowed,
        ));
    }

    let via_rules: Vec<ViaRule> = scope
        .via_rules
        .iter()
        .map(|entry| {
            let mut rule = ViaRule::new(&entry.name);
            for via in &entry.vias {
                rule.append_via(via);
            }
            rule
        })
        .collect();

    board.edit_rules(move |rules| {
        for nc in net_classes {
            match rules.net_classes.index_of(&nc.name) {
                Some(i) => {
                    if let Some(existing) = rules.net_classes.get_mut(i) {
                        *existing = nc;
                    }
                }
                None => {
                    rules.net_classes.append(nc)?;
                }
            }
        }
        for p in padstacks {
            if rules.padstacks.find(&p.name).is_none() {
                rules.padstacks.append(p)?;
            }
        }
        for v in vias {
            rules.via_infos.remove(&v.name);
            rules.via_infos.append(v)?;
        }
        for vr in via_rules {
            match rules.via_rules.iter_mut().find(|r| r.name == vr.name) {
                Some(existing) => *existing = vr,
                None => rules.via_rules.push(vr),
            }
        }
        Ok(())
    })?;
    Ok(())
}

fn resolve_class(board: &RoutingBoard, name: &str) -> Result<usize, RulesFileError> {
    board
        .rules
        .clearance_matrix
        .class_index(name)
        .ok_or_else(|| RulesFileError::UnknownClassName(name.to_string()))
}
