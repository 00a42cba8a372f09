use thiserror::Error;

/// Errors from rule and clearance-table mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("illegal clearance class name '{0}'")]
    IllegalClassName(String),

    #[error("clearance class '{0}' already exists")]
    DuplicateClassName(String),

    #[error("no clearance class with index {0}")]
    UnknownClass(usize),

    #[error("clearance class {0} is built in and cannot be removed")]
    ImmortalClass(usize),

    #[error("layer index {index} out of range (board has {count} layers)")]
    LayerOutOfRange { index: usize, count: usize },

    #[error("no layer named '{0}'")]
    UnknownLayer(String),

    #[error("negative clearance value {0}")]
    NegativeValue(i32),

    #[error("a rule named '{0}' already exists")]
    DuplicateName(String),

    #[error("no padstack named '{0}'")]
    UnknownPadstack(String),
}
