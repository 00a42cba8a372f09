use serde::{Deserialize, Serialize};

use coppertrace_geometry::{Shape, Vector};
use coppertrace_rules::ItemClass;

/// The kind of a placed board object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Trace,
    Via,
    Pin,
    SmdPin,
    /// Routing obstacle without copper of its own.
    Keepout,
}

impl ItemKind {
    pub fn item_class(self) -> ItemClass {
        match self {
            ItemKind::Trace => ItemClass::Trace,
            ItemKind::Via => ItemClass::Via,
            ItemKind::Pin => ItemClass::Pin,
            ItemKind::SmdPin => ItemClass::SmdPin,
            ItemKind::Keepout => ItemClass::Area,
        }
    }
}

/// A placed geometric object: one optional shape per layer, a net, and a
/// clearance class.
///
/// Items never reference the search tree or the rules; they are looked up
/// from the store by handle, and the tree holds handles only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    /// One entry per board layer; `None` on layers the item does not touch.
    pub shapes: Vec<Option<Shape>>,
    /// Net number, `None` for unconnected keepouts.
    pub net: Option<u32>,
    pub clearance_class: usize,
}

impl Item {
    pub fn new(kind: ItemKind, shapes: Vec<Option<Shape>>, net: Option<u32>, clearance_class: usize) -> Self {
        Self {
            kind,
            shapes,
            net,
            clearance_class,
        }
    }

    /// A single-layer item, the common case for traces.
    pub fn on_layer(
        kind: ItemKind,
        layer: usize,
        layer_count: usize,
        shape: Shape,
        net: Option<u32>,
        clearance_class: usize,
    ) -> Self {
        let mut shapes = vec![None; layer_count];
        if layer < layer_count {
            shapes[layer] = Some(shape);
        }
        Self::new(kind, shapes, net, clearance_class)
    }

    pub fn shape_on_layer(&self, layer: usize) -> Option<&Shape> {
        self.shapes.get(layer).and_then(|s| s.as_ref())
    }

    /// Layers this item occupies.
    pub fn layers(&self) -> impl Iterator<Item = usize> + '_ {
        self.shapes
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| i))
    }

    pub fn shares_net(&self, net: Option<u32>) -> bool {
        match (self.net, net) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn translate(&mut self, v: Vector) {
        for shape in self.shapes.iter_mut().flatten() {
            *shape = shape.translate(v);
        }
    }
}
