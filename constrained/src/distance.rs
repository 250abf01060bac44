use ndarray::{prelude::*, Data};

/// For every pair `(i, j)`, the row `points[i] - points[j]`.
pub fn pair_differences<S: Data<Elem = f32>, P: Data<Elem = usize>>(
    points: &ArrayBase<S, Ix2>,
    pairs: &ArrayBase<P, Ix2>,
) -> Array2<f32> {
    let mut out = Array2::zeros((pairs.nrows(), points.ncols()));
    for (mut diff, pair) in out.rows_mut().into_iter().zip(pairs.rows()) {
        diff.assign(&points.row(pair[0]));
        diff -= &points.row(pair[1]);
    }
    out
}

/// For every pair `(i, j)`, the Euclidean distance between the two points.
/// Self pairs are exactly zero.
pub fn pair_distances<S: Data<Elem = f32>, P: Data<Elem = usize>>(
    points: &ArrayBase<S, Ix2>,
    pairs: &ArrayBase<P, Ix2>,
) -> Array1<f32> {
    // taken from the difference vector: expanding |a|^2 + |b|^2 - 2ab
    // cancels to zero in f32 for close points far from the origin
    pairs
        .rows()
        .into_iter()
        .map(|pair| {
            let diff = &points.row(pair[0]) - &points.row(pair[1]);
            diff.dot(&diff).sqrt()
        })
        .collect()
}
