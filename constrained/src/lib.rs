pub mod compact;
pub mod constraints;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod pointstore;
pub mod selection;

pub use self::constraints::ConstraintTable;
pub use self::dataset::{
    ConstrainedDataset, ConstraintData, DatasetView, OwnedDataset, SharedDataset, SlicePolicy,
    Sliced,
};
pub use self::error::{ConstraintError, IndexKind, Result};
pub use self::pointstore::{Ownership, PointStorage, PointStore};
pub use self::selection::Selection;

#[cfg(test)]
mod test {
    use ndarray::prelude::*;
    use ndarray_rand::rand::prelude::*;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;

    /// `n` random points in `dims` dimensions and `m` random pairs over them,
    /// self pairs and repeated points included.
    pub(crate) fn random_dataset(
        rng: &mut StdRng,
        n: usize,
        dims: usize,
        m: usize,
    ) -> (Array2<f32>, Array2<usize>) {
        let points = Array2::random_using((n, dims), Uniform::new(-10.0f32, 10.0), rng);
        let pairs = Array2::random_using((m, 2), Uniform::new(0, n), rng);
        (points, pairs)
    }
}
