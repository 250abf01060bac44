use ndarray::{prelude::*, Data};

use crate::compact::IndexMap;
use crate::error::{ConstraintError, Result};
use crate::selection::Selection;

/// An ordered list of `M` index pairs, stored as an `M x 2` matrix, with an
/// optional label per pair.
///
/// The table itself does not know how many points there are; the dataset
/// owning it checks the indices against its point store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintTable {
    pairs: Array2<usize>,
    labels: Option<Array1<u8>>,
}

impl ConstraintTable {
    pub fn new<S: Data<Elem = usize>>(pairs: ArrayBase<S, Ix2>) -> Result<Self> {
        if pairs.ncols() != 2 && pairs.nrows() > 0 {
            return Err(ConstraintError::ShapeMismatch {
                what: "constraint pairs",
                expected: 2,
                got: pairs.ncols(),
            });
        }
        let pairs = if pairs.ncols() == 2 {
            pairs.to_owned()
        } else {
            Array2::zeros((0, 2))
        };
        Ok(Self {
            pairs,
            labels: None,
        })
    }

    pub fn from_pairs(pairs: &[(usize, usize)]) -> Self {
        let pairs = Array2::from_shape_fn((pairs.len(), 2), |(r, c)| {
            if c == 0 {
                pairs[r].0
            } else {
                pairs[r].1
            }
        });
        Self {
            pairs,
            labels: None,
        }
    }

    /// Attaches one label per pair. The labels must line up with the pairs
    /// and be either 0 or 1.
    pub fn with_labels<S: Data<Elem = u8>>(self, labels: ArrayBase<S, Ix1>) -> Result<Self> {
        if labels.len() != self.len() {
            return Err(ConstraintError::ShapeMismatch {
                what: "labels",
                expected: self.len(),
                got: labels.len(),
            });
        }
        if let Some(&bad) = labels.iter().find(|&&l| l > 1) {
            return Err(ConstraintError::InvalidLabel(bad as i64));
        }
        Ok(Self {
            labels: Some(labels.to_owned()),
            ..self
        })
    }

    pub fn len(&self) -> usize {
        self.pairs.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pairs(&self) -> ArrayView2<usize> {
        self.pairs.view()
    }

    /// The two index columns, `i` and `j`.
    pub fn columns(&self) -> (ArrayView1<usize>, ArrayView1<usize>) {
        (self.pairs.column(0), self.pairs.column(1))
    }

    pub fn pair(&self, m: usize) -> Option<(usize, usize)> {
        (m < self.len()).then(|| (self.pairs[[m, 0]], self.pairs[[m, 1]]))
    }

    pub fn labels(&self) -> Option<ArrayView1<u8>> {
        self.labels.as_ref().map(|l| l.view())
    }

    /// Positions of the pairs carrying `label`, in table order. Empty when
    /// the table is unlabelled.
    pub fn positions_with_label(&self, label: u8) -> Vec<usize> {
        match &self.labels {
            Some(labels) => labels
                .iter()
                .enumerate()
                .filter(|(_, &l)| l == label)
                .map(|(m, _)| m)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Fails on the first pair referencing a point `>= num_points`.
    pub fn check_bounds(&self, num_points: usize) -> Result<()> {
        match self.pairs.iter().find(|&&i| i >= num_points) {
            Some(&i) => Err(ConstraintError::point(i, num_points)),
            None => Ok(()),
        }
    }

    /// Every point index of every pair, both columns, duplicates included.
    pub fn referenced(&self) -> Vec<usize> {
        self.pairs.iter().copied().collect()
    }

    /// Selects the pairs (and labels) at the selector's positions, in the
    /// selector's order.
    pub fn slice<Sel: Selection + ?Sized>(&self, selector: &Sel) -> Result<Self> {
        let positions = selector.positions(self.len())?;
        Ok(self.take(&positions))
    }

    /// Like [`slice`](Self::slice) on positions already known to be valid.
    pub(crate) fn take(&self, positions: &[usize]) -> Self {
        let pairs = Array2::from_shape_fn((positions.len(), 2), |(r, c)| {
            self.pairs[[positions[r], c]]
        });
        let labels = self
            .labels
            .as_ref()
            .map(|labels| positions.iter().map(|&p| labels[p]).collect());
        Self { pairs, labels }
    }

    /// Rewrites every index through `mapping`. Panics if a pair references a
    /// point the mapping was not built from.
    pub(crate) fn remap(&self, mapping: &IndexMap) -> Self {
        Self {
            pairs: self.pairs.mapv(|i| mapping.local(i).expect("index missing from mapping")),
            labels: self.labels.clone(),
        }
    }
}
