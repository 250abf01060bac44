//! Errors raised while building or slicing constrained datasets.

use std::fmt;

/// What an out of range index was pointing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// A row of the point matrix, referenced by a constraint pair.
    Point,
    /// A constraint position, referenced by a selector.
    Position,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point => write!(f, "point"),
            Self::Position => write!(f, "constraint position"),
        }
    }
}

/// Errors that can occur when building, labelling or slicing a dataset.
///
/// All of them are detected before any output is allocated, so a failed
/// operation never leaves a partially built dataset behind and never
/// touches the dataset it was called on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintError {
    /// An index is negative or past the end of what it refers to.
    #[error("{kind} index {index} out of range for length {len}")]
    IndexOutOfRange {
        kind: IndexKind,
        index: i128,
        len: usize,
    },

    /// Two arrays that must agree on a dimension do not.
    #[error("shape mismatch in {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// A constraint label other than 0 or 1.
    #[error("invalid constraint label {0}: labels must be 0 or 1")]
    InvalidLabel(i64),
}

pub type Result<T> = std::result::Result<T, ConstraintError>;

impl ConstraintError {
    pub(crate) fn point(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            kind: IndexKind::Point,
            index: index as i128,
            len,
        }
    }

    pub(crate) fn position(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            kind: IndexKind::Position,
            index: index as i128,
            len,
        }
    }
}

/// Converts a signed index, as it comes from numpy or a Python sequence,
/// checking it against `len`. Negative indices are rejected rather than
/// wrapped around.
pub fn checked_index(index: isize, len: usize, kind: IndexKind) -> Result<usize> {
    match usize::try_from(index) {
        Ok(i) if i < len => Ok(i),
        _ => Err(ConstraintError::IndexOutOfRange {
            kind,
            index: index as i128,
            len,
        }),
    }
}

#[cfg(feature = "pyo3")]
impl From<ConstraintError> for pyo3::PyErr {
    fn from(err: ConstraintError) -> Self {
        use pyo3::exceptions::{PyIndexError, PyValueError};
        match err {
            ConstraintError::IndexOutOfRange { .. } => PyIndexError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}
