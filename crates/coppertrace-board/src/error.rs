use thiserror::Error;

use coppertrace_geometry::GeometryError;
use coppertrace_rules::RulesError;

use crate::store::ObjId;

/// Errors from board mutations and queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The handle refers to an object that was removed (or never existed).
    /// Queries against stale handles are programming errors and are reported,
    /// never silently ignored.
    #[error("stale object handle {0:?}")]
    StaleObject(ObjId),

    #[error("item {0:?} is not registered in the search tree")]
    NotInTree(ObjId),

    #[error("clearance class {class} is still referenced by {item_count} items")]
    ClassInUse { class: usize, item_count: usize },

    #[error("layer index {index} out of range (board has {count} layers)")]
    LayerOutOfRange { index: usize, count: usize },

    #[error("item owns no shape on any layer")]
    ShapelessItem,

    #[error("undo/redo requires the open change batch to be committed or rolled back first")]
    PendingChanges,
}
