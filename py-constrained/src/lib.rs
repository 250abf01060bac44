use constrained::error::checked_index;
use constrained::{
    ConstrainedDataset, ConstraintData, ConstraintError, ConstraintTable, IndexKind, Ownership,
    SharedDataset,
};
use numpy::ndarray::Array2;
use numpy::*;
use pyo3::{
    exceptions::PyTypeError,
    prelude::*,
    types::{PySlice, PySliceMethods},
};

/// Resolves a Python selector into constraint positions. Slices follow
/// Python semantics (steps, negative bounds); explicit indices must be in
/// `[0, len)`.
fn resolve_selector(selector: &Bound<'_, PyAny>, len: usize) -> PyResult<Vec<usize>> {
    if let Ok(slice) = selector.downcast::<PySlice>() {
        let idx = slice.indices(len as _)?;
        return Ok((0..idx.slicelength as usize)
            .map(|k| (idx.start + k as isize * idx.step) as usize)
            .collect());
    }
    let raw: Vec<isize> = if let Ok(array) = selector.extract::<PyReadonlyArray1<isize>>() {
        array.as_array().to_vec()
    } else {
        selector
            .extract()
            .map_err(|_| PyTypeError::new_err("selector must be a slice or a sequence of ints"))?
    };
    let positions = raw
        .into_iter()
        .map(|i| checked_index(i, len, IndexKind::Position))
        .collect::<Result<Vec<usize>, _>>()?;
    Ok(positions)
}

#[pyclass(name = "ConstrainedDataset")]
pub struct PyConstrainedDataset {
    inner: SharedDataset,
    ownership: Ownership,
}

#[pymethods]
impl PyConstrainedDataset {
    #[new]
    #[pyo3(signature = (points, pairs, labels=None))]
    fn new<'py>(
        points: PyReadonlyArray2<'py, f32>,
        pairs: PyReadonlyArray2<'py, isize>,
        labels: Option<PyReadonlyArray1<'py, i64>>,
    ) -> PyResult<Self> {
        let points = points.as_array().to_owned();
        let raw = pairs.as_array();
        let mut converted = Array2::<usize>::zeros(raw.raw_dim());
        for (out, &i) in converted.iter_mut().zip(raw.iter()) {
            *out = checked_index(i, points.nrows(), IndexKind::Point)?;
        }
        let mut dataset = ConstrainedDataset::new(points, ConstraintTable::new(converted)?)?;
        if let Some(labels) = labels {
            let labels = labels
                .as_array()
                .iter()
                .map(|&l| match l {
                    0 | 1 => Ok(l as u8),
                    _ => Err(ConstraintError::InvalidLabel(l)),
                })
                .collect::<Result<Vec<u8>, _>>()?;
            dataset = dataset.with_labels(numpy::ndarray::Array1::from_vec(labels))?;
        }
        Ok(Self {
            inner: dataset.into_shared(),
            ownership: Ownership::Exclusive,
        })
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    #[getter]
    fn shape(&self) -> (usize, usize) {
        self.inner.shape()
    }

    #[getter]
    fn points<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f32>> {
        self.inner.points().to_pyarray_bound(py)
    }

    #[getter]
    fn pairs<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<usize>> {
        self.inner.pairs().to_pyarray_bound(py)
    }

    #[getter]
    fn labels<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray1<u8>>> {
        self.inner.labels().map(|l| l.to_pyarray_bound(py))
    }

    /// Whether this dataset aliases the point matrix of its parent.
    #[getter]
    fn shared(&self) -> bool {
        self.ownership == Ownership::Shared
    }

    fn asarray<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray3<f32>> {
        self.inner.asarray().into_pyarray_bound(py)
    }

    fn origin_indices<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<usize>> {
        self.inner.origin_indices().into_pyarray_bound(py)
    }

    fn pair_differences<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f32>> {
        self.inner.pair_differences().into_pyarray_bound(py)
    }

    fn pair_distances<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f32>> {
        self.inner.pair_distances().into_pyarray_bound(py)
    }

    fn __getitem__(&self, selector: &Bound<'_, PyAny>) -> PyResult<Self> {
        self.slice(selector, false)
    }

    /// Exclusive slices get a compacted copy of the points they use. Shared
    /// ones keep a handle on the parent matrix and its indices; nothing in
    /// this module writes to a matrix, but numpy arrays handed out by
    /// `points` are copies, so writing to them never reaches either side.
    #[pyo3(signature = (selector, shared=false))]
    fn slice(&self, selector: &Bound<'_, PyAny>, shared: bool) -> PyResult<Self> {
        let positions = resolve_selector(selector, self.inner.len())?;
        if shared {
            Ok(Self {
                inner: self.inner.share(&positions)?,
                ownership: Ownership::Shared,
            })
        } else {
            Ok(Self {
                inner: self.inner.slice(&positions)?.into_shared(),
                ownership: Ownership::Exclusive,
            })
        }
    }

    fn __repr__(&self) -> String {
        self.inner.to_string()
    }
}

#[pymodule]
#[pyo3(name = "pyconstrained")]
fn py_constrained(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();
    m.add_class::<PyConstrainedDataset>()?;
    Ok(())
}
