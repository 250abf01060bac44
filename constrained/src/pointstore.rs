use std::fmt;

use ndarray::{prelude::*, Data, OwnedArcRepr, OwnedRepr, RawDataClone, ViewRepr};

use crate::error::{ConstraintError, Result};

/// Whether a point matrix is owned by a single dataset or aliased by
/// several of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    /// The dataset holds the only handle to its matrix.
    #[default]
    Exclusive,
    /// The matrix is shared with the parent dataset (or with the caller
    /// that built it), and so is its index space.
    Shared,
}

/// The ndarray storages a [`PointStore`] can sit on.
///
/// * `OwnedRepr<f32>`: a matrix owned by one dataset.
/// * `ViewRepr<&f32>`: a borrowed matrix. The borrow checker keeps the
///   owner from writing to it for as long as the view lives.
/// * `OwnedArcRepr<f32>`: a reference counted matrix that can be sent to
///   other threads. Writing to it would copy first, so siblings never see
///   each other's writes.
pub trait PointStorage: Data<Elem = f32> {
    const OWNERSHIP: Ownership;
}

impl PointStorage for OwnedRepr<f32> {
    const OWNERSHIP: Ownership = Ownership::Exclusive;
}

impl<'a> PointStorage for ViewRepr<&'a f32> {
    const OWNERSHIP: Ownership = Ownership::Shared;
}

impl PointStorage for OwnedArcRepr<f32> {
    const OWNERSHIP: Ownership = Ownership::Shared;
}

/// A read-only `N x D` matrix of points.
///
/// There is no way to get mutable access to the rows once the store is
/// built: compaction always gathers into a fresh matrix.
pub struct PointStore<S: PointStorage> {
    points: ArrayBase<S, Ix2>,
}

impl<S: PointStorage> PointStore<S> {
    /// Wraps a matrix. A non-empty store needs at least one feature column.
    pub fn new(points: ArrayBase<S, Ix2>) -> Result<Self> {
        if points.nrows() > 0 && points.ncols() == 0 {
            return Err(ConstraintError::ShapeMismatch {
                what: "point dimensions",
                expected: 1,
                got: 0,
            });
        }
        Ok(Self { points })
    }

    pub fn num_points(&self) -> usize {
        self.points.nrows()
    }

    pub fn dimensions(&self) -> usize {
        self.points.ncols()
    }

    pub fn ownership(&self) -> Ownership {
        S::OWNERSHIP
    }

    pub fn points(&self) -> ArrayView2<f32> {
        self.points.view()
    }

    pub fn row(&self, i: usize) -> ArrayView1<f32> {
        self.points.row(i)
    }

    /// Fails with `IndexOutOfRange` unless `i` is a row of this store.
    pub fn check(&self, i: usize) -> Result<()> {
        if i < self.num_points() {
            Ok(())
        } else {
            Err(ConstraintError::point(i, self.num_points()))
        }
    }

    /// Copies the given rows, in the given order, into a new matrix.
    /// Callers are expected to have checked the indices.
    pub(crate) fn gather(&self, rows: &[usize]) -> Array2<f32> {
        if rows.is_empty() {
            // `select` cannot infer the column count from zero rows
            return Array2::zeros((0, self.dimensions()));
        }
        self.points.select(Axis(0), rows)
    }

    /// Returns true if both stores read from the same buffer.
    pub fn same_storage<T: PointStorage>(&self, other: &PointStore<T>) -> bool {
        self.points.as_ptr() == other.points.as_ptr() && self.num_points() > 0
    }

    pub fn view(&self) -> PointStore<ViewRepr<&f32>> {
        PointStore {
            points: self.points.view(),
        }
    }

    pub fn to_owned_store(&self) -> PointStore<OwnedRepr<f32>> {
        PointStore {
            points: self.points.to_owned(),
        }
    }
}

impl PointStore<OwnedRepr<f32>> {
    pub fn into_shared(self) -> PointStore<OwnedArcRepr<f32>> {
        PointStore {
            points: self.points.into_shared(),
        }
    }
}

impl<S: PointStorage + RawDataClone> Clone for PointStore<S> {
    fn clone(&self) -> Self {
        Self {
            points: self.points.clone(),
        }
    }
}

impl<S: PointStorage> fmt::Debug for PointStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointStore")
            .field("ownership", &self.ownership())
            .field("shape", &self.points.shape())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use ndarray::prelude::*;

    use super::{Ownership, PointStore};
    use crate::error::ConstraintError;

    #[test]
    fn test_ownership_tags() {
        let points = array![[0.0f32, 1.0], [2.0, 3.0]];
        let view = PointStore::new(points.view()).unwrap();
        assert_eq!(view.ownership(), Ownership::Shared);
        assert!(view.same_storage(&view.view()));

        let owned = view.to_owned_store();
        assert_eq!(owned.ownership(), Ownership::Exclusive);
        assert!(!owned.same_storage(&view));

        let shared = owned.into_shared();
        assert_eq!(shared.ownership(), Ownership::Shared);
        assert!(shared.same_storage(&shared.clone()));
    }

    #[test]
    fn test_zero_dimensions() {
        let points = Array2::<f32>::zeros((3, 0));
        assert!(matches!(
            PointStore::new(points),
            Err(ConstraintError::ShapeMismatch { got: 0, .. })
        ));
        // an empty store is fine whatever its width
        assert!(PointStore::new(Array2::<f32>::zeros((0, 0))).is_ok());
    }

    #[test]
    fn test_gather_copies() {
        let points = array![[0.0f32], [1.0], [2.0]];
        let store = PointStore::new(points.view()).unwrap();
        let gathered = store.gather(&[2, 0, 2]);
        assert_eq!(gathered, array![[2.0f32], [0.0], [2.0]]);
        assert_eq!(store.gather(&[]).dim(), (0, 1));
        assert!(store.check(2).is_ok());
        assert_eq!(store.check(3), Err(ConstraintError::point(3, 3)));
    }
}
