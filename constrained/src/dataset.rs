use std::fmt;

use ndarray::{prelude::*, Data, OwnedArcRepr, OwnedRepr, RawDataClone, ViewRepr};

use crate::compact::{compact, Compaction};
use crate::constraints::ConstraintTable;
use crate::distance;
use crate::error::Result;
use crate::pointstore::{Ownership, PointStorage, PointStore};
use crate::selection::Selection;

/// The read-only surface estimators work against: a list of `M`
/// constraints over `D`-dimensional points.
pub trait ConstraintData {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dimensions(&self) -> usize;

    /// `(M, D)`
    fn shape(&self) -> (usize, usize) {
        (self.len(), self.dimensions())
    }

    /// The two point index columns of the pairs.
    fn pair_columns(&self) -> (ArrayView1<usize>, ArrayView1<usize>);

    /// Materializes the constraints as an `M x 2 x D` tensor, stacking the
    /// two points of every pair.
    fn asarray(&self) -> Array3<f32>;
}

/// How [`ConstrainedDataset::slice_with`] should treat the point matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlicePolicy {
    /// Copy the referenced points into a new, compacted matrix.
    #[default]
    Exclusive,
    /// Reuse the parent matrix and its index space. The slice aliases the
    /// parent: only sound for as long as nobody writes to the matrix.
    Shared,
}

/// A set of pairwise constraints together with the points they refer to.
///
/// The storage `S` of the point matrix decides the ownership of a dataset,
/// see [`PointStorage`]. Slicing never modifies `self`: every slice is a
/// new dataset, either owning a compacted copy of the points it uses
/// ([`slice`](Self::slice)) or borrowing the whole matrix
/// ([`slice_shared`](Self::slice_shared)).
pub struct ConstrainedDataset<S: PointStorage> {
    store: PointStore<S>,
    constraints: ConstraintTable,
    /// row of each point in the dataset this one was first compacted from
    origin: Option<Array1<usize>>,
}

pub type OwnedDataset = ConstrainedDataset<OwnedRepr<f32>>;
pub type DatasetView<'a> = ConstrainedDataset<ViewRepr<&'a f32>>;
pub type SharedDataset = ConstrainedDataset<OwnedArcRepr<f32>>;

impl<S: PointStorage> ConstrainedDataset<S> {
    /// Pairs `points` with `constraints`, checking that every pair refers
    /// to a row of `points`.
    pub fn new(points: ArrayBase<S, Ix2>, constraints: ConstraintTable) -> Result<Self> {
        let store = PointStore::new(points)?;
        constraints.check_bounds(store.num_points())?;
        Ok(Self {
            store,
            constraints,
            origin: None,
        })
    }

    /// Same as [`new`](Self::new), with the pairs given as an `M x 2` matrix.
    pub fn from_pairs<P: Data<Elem = usize>>(
        points: ArrayBase<S, Ix2>,
        pairs: ArrayBase<P, Ix2>,
    ) -> Result<Self> {
        Self::new(points, ConstraintTable::new(pairs)?)
    }

    /// Attaches a 0/1 label to every constraint.
    pub fn with_labels<L: Data<Elem = u8>>(self, labels: ArrayBase<L, Ix1>) -> Result<Self> {
        Ok(Self {
            constraints: self.constraints.with_labels(labels)?,
            ..self
        })
    }

    pub fn store(&self) -> &PointStore<S> {
        &self.store
    }

    pub fn constraints(&self) -> &ConstraintTable {
        &self.constraints
    }

    pub fn points(&self) -> ArrayView2<f32> {
        self.store.points()
    }

    pub fn num_points(&self) -> usize {
        self.store.num_points()
    }

    /// The `M x 2` matrix of point indices.
    pub fn pairs(&self) -> ArrayView2<usize> {
        self.constraints.pairs()
    }

    pub fn labels(&self) -> Option<ArrayView1<u8>> {
        self.constraints.labels()
    }

    pub fn ownership(&self) -> Ownership {
        self.store.ownership()
    }

    /// The two points of constraint `m`.
    pub fn pair(&self, m: usize) -> Option<(ArrayView1<f32>, ArrayView1<f32>)> {
        self.constraints
            .pair(m)
            .map(|(i, j)| (self.store.row(i), self.store.row(j)))
    }

    pub fn positions_with_label(&self, label: u8) -> Vec<usize> {
        self.constraints.positions_with_label(label)
    }

    /// For every point of this dataset, its row in the dataset the slicing
    /// chain started from.
    pub fn origin_indices(&self) -> Array1<usize> {
        match &self.origin {
            Some(origin) => origin.clone(),
            None => Array1::from_iter(0..self.num_points()),
        }
    }

    /// Maps a local point index back to the dataset the slicing chain
    /// started from.
    pub fn invert_index(&self, local: usize) -> Option<usize> {
        if local >= self.num_points() {
            return None;
        }
        Some(self.origin.as_ref().map_or(local, |origin| origin[local]))
    }

    /// `x_i - x_j` for every constraint, as an `M x D` matrix.
    pub fn pair_differences(&self) -> Array2<f32> {
        distance::pair_differences(&self.store.points(), &self.constraints.pairs())
    }

    /// The Euclidean distance between the two points of every constraint.
    pub fn pair_distances(&self) -> Array1<f32> {
        distance::pair_distances(&self.store.points(), &self.constraints.pairs())
    }

    /// Selects constraints into a new dataset that owns a compacted copy of
    /// exactly the points they use, re-indexed densely in ascending order of
    /// their index here. The result shares nothing with `self`.
    pub fn slice<Sel: Selection + ?Sized>(&self, selector: &Sel) -> Result<OwnedDataset> {
        let constraints = self.constraints.slice(selector)?;
        let Compaction { points, mapping } = compact(&constraints.referenced(), &self.store)?;
        log::debug!(
            "exclusive slice: {} of {} constraints, {} of {} points",
            constraints.len(),
            self.len(),
            mapping.len(),
            self.num_points()
        );
        let origin = match &self.origin {
            Some(origin) => mapping.globals().iter().map(|&g| origin[g]).collect(),
            None => Array1::from_vec(mapping.globals().to_vec()),
        };
        Ok(ConstrainedDataset {
            store: points,
            constraints: constraints.remap(&mapping),
            origin: Some(origin),
        })
    }

    /// Selects constraints without touching the points: the result borrows
    /// the whole matrix of `self` and keeps its index space.
    pub fn slice_shared<Sel: Selection + ?Sized>(&self, selector: &Sel) -> Result<DatasetView<'_>> {
        let constraints = self.constraints.slice(selector)?;
        log::debug!(
            "shared slice: {} of {} constraints over {} points",
            constraints.len(),
            self.len(),
            self.num_points()
        );
        Ok(ConstrainedDataset {
            store: self.store.view(),
            constraints,
            origin: self.origin.clone(),
        })
    }

    /// Slices according to `policy`.
    pub fn slice_with<Sel: Selection + ?Sized>(
        &self,
        selector: &Sel,
        policy: SlicePolicy,
    ) -> Result<Sliced<'_>> {
        match policy {
            SlicePolicy::Exclusive => self.slice(selector).map(Sliced::Exclusive),
            SlicePolicy::Shared => self.slice_shared(selector).map(Sliced::Shared),
        }
    }

    pub fn view(&self) -> DatasetView<'_> {
        ConstrainedDataset {
            store: self.store.view(),
            constraints: self.constraints.clone(),
            origin: self.origin.clone(),
        }
    }

    /// Copies the whole point matrix, without compaction.
    pub fn to_owned_dataset(&self) -> OwnedDataset {
        ConstrainedDataset {
            store: self.store.to_owned_store(),
            constraints: self.constraints.clone(),
            origin: self.origin.clone(),
        }
    }
}

impl OwnedDataset {
    /// Moves the points behind a reference count, so that shared slices
    /// can outlive `self` and cross thread boundaries.
    pub fn into_shared(self) -> SharedDataset {
        ConstrainedDataset {
            store: self.store.into_shared(),
            constraints: self.constraints,
            origin: self.origin,
        }
    }
}

impl SharedDataset {
    /// Shared slicing for reference counted datasets: the result holds
    /// another handle on the same matrix instead of a borrow.
    pub fn share<Sel: Selection + ?Sized>(&self, selector: &Sel) -> Result<SharedDataset> {
        let constraints = self.constraints.slice(selector)?;
        log::debug!(
            "shared slice: {} of {} constraints over {} points",
            constraints.len(),
            self.len(),
            self.num_points()
        );
        Ok(ConstrainedDataset {
            store: self.store.clone(),
            constraints,
            origin: self.origin.clone(),
        })
    }
}

impl<S: PointStorage> ConstraintData for ConstrainedDataset<S> {
    fn len(&self) -> usize {
        self.constraints.len()
    }

    fn dimensions(&self) -> usize {
        self.store.dimensions()
    }

    fn pair_columns(&self) -> (ArrayView1<usize>, ArrayView1<usize>) {
        self.constraints.columns()
    }

    fn asarray(&self) -> Array3<f32> {
        let mut out = Array3::zeros((self.len(), 2, self.dimensions()));
        for (mut slot, pair) in out.outer_iter_mut().zip(self.constraints.pairs().rows()) {
            slot.row_mut(0).assign(&self.store.row(pair[0]));
            slot.row_mut(1).assign(&self.store.row(pair[1]));
        }
        out
    }
}

impl<S: PointStorage + RawDataClone> Clone for ConstrainedDataset<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            constraints: self.constraints.clone(),
            origin: self.origin.clone(),
        }
    }
}

impl<S: PointStorage> fmt::Debug for ConstrainedDataset<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstrainedDataset")
            .field("store", &self.store)
            .field("constraints", &self.constraints)
            .finish()
    }
}

impl<S: PointStorage> fmt::Display for ConstrainedDataset<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.asarray())
    }
}

/// A slice taken under a policy chosen at runtime.
#[derive(Debug)]
pub enum Sliced<'a> {
    Exclusive(OwnedDataset),
    Shared(DatasetView<'a>),
}

impl Sliced<'_> {
    pub fn ownership(&self) -> Ownership {
        match self {
            Self::Exclusive(d) => d.ownership(),
            Self::Shared(d) => d.ownership(),
        }
    }

    /// Detaches the slice from its parent. A shared slice is copied
    /// whole, keeping the parent's index space.
    pub fn into_owned(self) -> OwnedDataset {
        match self {
            Self::Exclusive(d) => d,
            Self::Shared(d) => d.to_owned_dataset(),
        }
    }
}

impl ConstraintData for Sliced<'_> {
    fn len(&self) -> usize {
        match self {
            Self::Exclusive(d) => d.len(),
            Self::Shared(d) => d.len(),
        }
    }

    fn dimensions(&self) -> usize {
        match self {
            Self::Exclusive(d) => d.dimensions(),
            Self::Shared(d) => d.dimensions(),
        }
    }

    fn pair_columns(&self) -> (ArrayView1<usize>, ArrayView1<usize>) {
        match self {
            Self::Exclusive(d) => d.pair_columns(),
            Self::Shared(d) => d.pair_columns(),
        }
    }

    fn asarray(&self) -> Array3<f32> {
        match self {
            Self::Exclusive(d) => d.asarray(),
            Self::Shared(d) => d.asarray(),
        }
    }
}
