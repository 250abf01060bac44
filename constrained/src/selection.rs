//! Selectors over constraint positions.
//!
//! A selector is anything that can enumerate positions in `[0, M)` in the
//! order the caller wants them back: ranges for contiguous folds, explicit
//! index lists for shuffled or permuted ones.

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};

use ndarray::{ArrayBase, Data, Ix1};

use crate::error::{ConstraintError, Result};

pub trait Selection {
    /// Resolves the selector into positions for a table of `len`
    /// constraints. Out of range positions are an error, never clamped.
    fn positions(&self, len: usize) -> Result<Vec<usize>>;
}

fn check_all(positions: &[usize], len: usize) -> Result<()> {
    match positions.iter().find(|&&p| p >= len) {
        Some(&p) => Err(ConstraintError::position(p, len)),
        None => Ok(()),
    }
}

/// Positions `start..end`, empty when `start >= end`.
fn bounded(start: usize, end: usize, len: usize) -> Result<Vec<usize>> {
    if end > len {
        return Err(ConstraintError::position(end - 1, len));
    }
    Ok((start..end).collect())
}

impl Selection for [usize] {
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        check_all(self, len)?;
        Ok(self.to_vec())
    }
}

impl<const N: usize> Selection for [usize; N] {
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        self.as_slice().positions(len)
    }
}

impl Selection for Vec<usize> {
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        self.as_slice().positions(len)
    }
}

impl<S: Data<Elem = usize>> Selection for ArrayBase<S, Ix1> {
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        let positions: Vec<usize> = self.iter().copied().collect();
        check_all(&positions, len)?;
        Ok(positions)
    }
}

impl Selection for Range<usize> {
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        bounded(self.start, self.end, len)
    }
}

impl Selection for RangeInclusive<usize> {
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        if self.start() > self.end() {
            return Ok(Vec::new());
        }
        if *self.end() >= len {
            return Err(ConstraintError::position(*self.end(), len));
        }
        bounded(*self.start(), *self.end() + 1, len)
    }
}

impl Selection for RangeFrom<usize> {
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        if self.start > len {
            return Err(ConstraintError::position(self.start, len));
        }
        Ok((self.start..len).collect())
    }
}

impl Selection for RangeTo<usize> {
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        bounded(0, self.end, len)
    }
}

impl Selection for RangeToInclusive<usize> {
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        if self.end >= len {
            return Err(ConstraintError::position(self.end, len));
        }
        bounded(0, self.end + 1, len)
    }
}

impl Selection for RangeFull {
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        Ok((0..len).collect())
    }
}

impl<T: Selection + ?Sized> Selection for &T {
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        (**self).positions(len)
    }
}
