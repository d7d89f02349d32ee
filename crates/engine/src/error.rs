use std::fmt;

use gridview_core::{CellType, GridRange};

use crate::dep_graph::DependencyId;

#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Row/column outside the current bounds.
    InvalidIndex { row: i32, col: i32 },
    /// Payload variant disagrees with the stored cell's variant.
    TypeMismatch { expected: CellType, found: CellType },
    /// Dependency source overlaps its target, or the target overlaps an existing target.
    OverlapRejected { source: GridRange, target: GridRange },
    /// A collaborator could not allocate a resource (editor control, cell copy).
    AllocationFailure(String),
    /// No dependency edge with this id.
    NoSuchDependency(DependencyId),
    /// Edit refused on a read-only cell.
    ReadOnly { row: i32, col: i32 },
    /// Malformed argument (wrong payload for a header slot, etc.).
    InvalidArgument(String),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndex { row, col } => write!(f, "cell ({row}, {col}) is out of bounds"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: cell is {expected}, payload is {found}")
            }
            Self::OverlapRejected { source, target } => {
                write!(f, "dependency {source} -> {target} overlaps itself or an existing target")
            }
            Self::AllocationFailure(what) => write!(f, "allocation failed: {what}"),
            Self::NoSuchDependency(id) => write!(f, "no dependency with id {}", id.raw()),
            Self::ReadOnly { row, col } => write!(f, "cell ({row}, {col}) is read-only"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for GridError {}

pub type GridResult<T> = Result<T, GridError>;
