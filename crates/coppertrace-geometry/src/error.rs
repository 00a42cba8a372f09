use thiserror::Error;

/// Failures of individual geometric operations.
///
/// A degenerate input fails the specific operation instead of producing an
/// undefined result. Callers must treat a failure as "no answer", never as
/// "no overlap".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("line endpoints coincide at ({0}, {1})")]
    DegenerateLine(i32, i32),

    #[error("the zero vector has no direction")]
    ZeroVector,

    #[error("lines are parallel and have no intersection point")]
    ParallelLines,

    #[error("polygon needs at least 3 corners, got {0}")]
    TooFewCorners(usize),

    #[error("circle radius must be positive, got {0}")]
    InvalidRadius(i32),
}
