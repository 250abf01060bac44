//! Index compaction: gathering the points a set of constraints actually
//! uses into a smaller, densely indexed matrix.

use ndarray::{prelude::*, Data};

use crate::error::Result;
use crate::pointstore::{PointStorage, PointStore};

/// A bijection between the distinct global indices of a compaction and the
/// dense local range `0..K`.
///
/// Local indices follow ascending global index, so the mapping depends
/// only on the *set* of referenced indices, never on their order or
/// multiplicity. Its size is `K`, whatever the size of the parent store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    /// the sorted distinct global indices; position is the local index
    globals: Vec<usize>,
}

impl IndexMap {
    /// Builds the mapping for `referenced`. Duplicates collapse.
    pub fn new(referenced: &[usize]) -> Self {
        let mut globals = referenced.to_vec();
        globals.sort_unstable();
        globals.dedup();
        Self { globals }
    }

    /// Number of distinct points, `K`.
    pub fn len(&self) -> usize {
        self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }

    pub fn local(&self, global: usize) -> Option<usize> {
        self.globals.binary_search(&global).ok()
    }

    pub fn global(&self, local: usize) -> Option<usize> {
        self.globals.get(local).copied()
    }

    /// The global indices in local order.
    pub fn globals(&self) -> &[usize] {
        &self.globals
    }

    /// Maps local indices back to global ones.
    pub fn invert_index<S: Data<Elem = usize>>(&self, indices: &ArrayBase<S, Ix1>) -> Array1<usize> {
        indices.map(|i| self.globals[*i])
    }
}

/// The result of compacting a point store.
#[derive(Debug)]
pub struct Compaction {
    pub points: PointStore<ndarray::OwnedRepr<f32>>,
    pub mapping: IndexMap,
}

/// Gathers every point referenced in `referenced` out of `store` into a
/// freshly allocated matrix, one row per distinct index, in ascending
/// global order.
///
/// Fails with `IndexOutOfRange` before allocating anything if an index is
/// not a row of `store`. An empty `referenced` gives an empty store with
/// the same number of columns.
pub fn compact<S: PointStorage>(referenced: &[usize], store: &PointStore<S>) -> Result<Compaction> {
    for &i in referenced {
        store.check(i)?;
    }
    let mapping = IndexMap::new(referenced);
    let points = PointStore::new(store.gather(mapping.globals()))?;
    log::trace!(
        "compacted {} references into {} of {} points",
        referenced.len(),
        mapping.len(),
        store.num_points()
    );
    Ok(Compaction { points, mapping })
}

#[cfg(test)]
mod test {
    use ndarray::prelude::*;

    use super::{compact, IndexMap};
    use crate::error::ConstraintError;
    use crate::pointstore::{Ownership, PointStore};

    #[test]
    fn test_mapping_is_sorted_and_dense() {
        let mapping = IndexMap::new(&[3, 0, 2, 3, 0, 0]);
        assert_eq!(mapping.globals(), &[0, 2, 3]);
        assert_eq!(mapping.local(0), Some(0));
        assert_eq!(mapping.local(2), Some(1));
        assert_eq!(mapping.local(3), Some(2));
        assert_eq!(mapping.local(1), None);
        assert_eq!(mapping.local(100), None);
        assert_eq!(mapping.local(usize::MAX), None);
        assert_eq!(mapping.global(2), Some(3));
        assert_eq!(mapping.invert_index(&array![2usize, 0, 1]), array![3usize, 0, 2]);
    }

    #[test]
    fn test_mapping_ignores_order_and_multiplicity() {
        assert_eq!(IndexMap::new(&[5, 1, 1, 4]), IndexMap::new(&[1, 4, 5]));
        assert!(IndexMap::new(&[]).is_empty());
    }

    #[test]
    fn test_compact() {
        let points = array![[0.0f32], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let store = PointStore::new(points.view()).unwrap();
        let compaction = compact(&[2, 3, 0, 0], &store).unwrap();
        assert_eq!(compaction.points.points(), array![[0.0f32], [2.0], [3.0]]);
        assert_eq!(compaction.points.ownership(), Ownership::Exclusive);
        assert!(!compaction.points.same_storage(&store));
        assert_eq!(compaction.mapping.len(), 3);
    }

    #[test]
    fn test_mapping_size_follows_distinct_points() {
        // a far index must not make the mapping grow with it
        let mapping = IndexMap::new(&[usize::MAX - 1, 3, usize::MAX - 1]);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.globals(), &[3, usize::MAX - 1]);
        assert_eq!(mapping.local(usize::MAX - 1), Some(1));
        assert_eq!(mapping.local(3), Some(0));
    }

    #[test]
    fn test_compact_empty() {
        let points = array![[0.0f32, 1.0], [2.0, 3.0]];
        let store = PointStore::new(points).unwrap();
        let compaction = compact(&[], &store).unwrap();
        assert_eq!(compaction.points.points().dim(), (0, 2));
        assert!(compaction.mapping.is_empty());
    }

    #[test]
    fn test_compact_out_of_range() {
        let points = array![[0.0f32], [1.0]];
        let store = PointStore::new(points).unwrap();
        assert_eq!(
            compact(&[0, 2], &store).unwrap_err(),
            ConstraintError::point(2, 2)
        );
    }
}
