//! N-dimensional `f32` arrays passed into and out of neural networks.
//!
//! Data is stored contiguously in row-major order, so indexing any prefix of the dimensions yields
//! another contiguous block. [`TensorView`] borrows such a block along with the remaining suffix of
//! the shape.

use std::fmt;

use tinyvec::TinyVec;

use crate::iter::zip_exact;

/// An owned tensor.
#[derive(Clone)]
pub struct Tensor {
    shape: TinyVec<[usize; 4]>,
    data: Box<[f32]>,
}

/// A borrowed sub-tensor, created by [`Tensor::index`] or [`Tensor::iter`].
#[derive(Clone, Copy)]
pub struct TensorView<'a> {
    shape: &'a [usize],
    data: &'a [f32],
}

/// Advances `index` to the next position in row-major order. Returns `false` once exhausted.
fn advance(index: &mut [usize], shape: &[usize]) -> bool {
    for (i, &len) in zip_exact(index.iter_mut(), shape).rev() {
        *i += 1;
        if *i < len {
            return true;
        }
        *i = 0;
    }
    false
}

impl Tensor {
    /// Creates a tensor by calling `f` with the index of every element, in row-major order.
    pub fn from_array_shape_fn<const N: usize, F>(shape: [usize; N], mut f: F) -> Self
    where
        F: FnMut([usize; N]) -> f32,
    {
        let len = shape.iter().product();
        let mut data = Vec::with_capacity(len);
        if len > 0 {
            let mut index = [0; N];
            loop {
                data.push(f(index));
                if !advance(&mut index, &shape) {
                    break;
                }
            }
        }
        Self {
            shape: TinyVec::from(&shape[..]),
            data: data.into_boxed_slice(),
        }
    }

    /// Creates a tensor of the given shape from row-major data.
    ///
    /// # Panics
    ///
    /// Panics if `iter` does not yield exactly as many elements as `shape` requires.
    #[track_caller]
    pub fn from_iter<I: IntoIterator<Item = f32>>(shape: &[usize], iter: I) -> Self {
        let data: Box<[f32]> = iter.into_iter().collect();
        assert_eq!(
            data.len(),
            shape.iter().product::<usize>(),
            "element count does not match shape {shape:?}"
        );
        Self {
            shape: TinyVec::from(shape),
            data,
        }
    }

    pub(super) fn from_tract(tract: &tract_onnx::prelude::Tensor) -> anyhow::Result<Self> {
        let data = tract.as_slice::<f32>()?;
        Ok(Self::from_iter(tract.shape(), data.iter().copied()))
    }

    pub(super) fn to_tract(&self) -> anyhow::Result<tract_onnx::prelude::Tensor> {
        tract_onnx::prelude::Tensor::from_shape(&self.shape, &self.data)
    }

    /// Number of entries in each dimension.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Borrows the whole tensor as a [`TensorView`].
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            shape: &self.shape,
            data: &self.data,
        }
    }

    /// Indexes the leading `N` dimensions.
    ///
    /// Indexing a `[2, 3, 4]` tensor with `[a, b]` gives a view of shape `[4]`; indexing with
    /// `[a, b, c]` gives a single value (shape `[]`).
    ///
    /// # Panics
    ///
    /// Panics if `N` exceeds the rank or any index is out of bounds.
    #[track_caller]
    pub fn index<const N: usize>(&self, indices: [usize; N]) -> TensorView<'_> {
        self.view().index(indices)
    }

    /// Iterates over the outermost dimension.
    #[track_caller]
    pub fn iter(&self) -> impl Iterator<Item = TensorView<'_>> {
        self.view().iter()
    }

    /// Returns the data of a 1-dimensional tensor.
    #[track_caller]
    pub fn as_slice(&self) -> &[f32] {
        self.view().as_slice()
    }

    /// Returns the value of a 0-dimensional tensor.
    #[track_caller]
    pub fn as_singular(&self) -> f32 {
        self.view().as_singular()
    }
}

impl<'a> TensorView<'a> {
    pub fn shape(&self) -> &'a [usize] {
        self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// See [`Tensor::index`].
    #[track_caller]
    pub fn index<const N: usize>(&self, indices: [usize; N]) -> TensorView<'a> {
        assert!(
            N <= self.rank(),
            "index {indices:?} has more entries than tensor shape {:?}",
            self.shape
        );
        let mut view = *self;
        for index in indices {
            let len = view.shape[0];
            assert!(
                index < len,
                "index {indices:?} out of bounds for tensor shape {:?}",
                self.shape
            );
            let stride = view.data.len() / len;
            view = TensorView {
                shape: &view.shape[1..],
                data: &view.data[index * stride..(index + 1) * stride],
            };
        }
        view
    }

    #[track_caller]
    pub fn iter(&self) -> impl Iterator<Item = TensorView<'a>> {
        assert!(self.rank() > 0, "cannot iterate over a 0-dimensional tensor");
        let this = *self;
        (0..self.shape[0]).map(move |i| this.index([i]))
    }

    #[track_caller]
    pub fn as_slice(&self) -> &'a [f32] {
        assert_eq!(
            self.rank(),
            1,
            "tensor of shape {:?} is not 1-dimensional",
            self.shape
        );
        self.data
    }

    #[track_caller]
    pub fn as_singular(&self) -> f32 {
        assert_eq!(
            self.rank(),
            0,
            "tensor of shape {:?} is not a single value",
            self.shape
        );
        self.data[0]
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.view().fmt(f)
    }
}

impl fmt::Debug for TensorView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rank() == 0 {
            write!(f, "{:?}", self.as_singular())
        } else {
            f.debug_list().entries(self.iter()).finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_fn_visits_row_major() {
        let mut visited = Vec::new();
        let t = Tensor::from_array_shape_fn([2, 3], |[y, x]| {
            visited.push([y, x]);
            (y * 10 + x) as f32
        });
        assert_eq!(visited[..4], [[0, 0], [0, 1], [0, 2], [1, 0]]);
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.index([1]).as_slice(), &[10.0, 11.0, 12.0]);
        assert_eq!(t.index([0, 2]).as_singular(), 2.0);
    }

    #[test]
    fn zero_sized_dimension() {
        let t = Tensor::from_array_shape_fn([3, 0], |_| unreachable!());
        assert_eq!(t.shape(), &[3, 0]);
        assert_eq!(t.index([2]).as_slice(), &[] as &[f32]);
    }

    #[test]
    fn scalar_tensor() {
        let t = Tensor::from_array_shape_fn([], |[]| 4.5);
        assert_eq!(t.rank(), 0);
        assert_eq!(t.as_singular(), 4.5);
        assert_eq!(t.index([]).as_singular(), 4.5);
    }

    #[test]
    fn nested_index_and_iter() {
        let t = Tensor::from_iter(&[2, 2, 2], (0..8).map(|i| i as f32));
        let rows: Vec<_> = t.index([1]).iter().map(|v| v.as_slice().to_vec()).collect();
        assert_eq!(rows, [[4.0, 5.0], [6.0, 7.0]]);
        assert_eq!(t.index([1]).index([0, 1]).as_singular(), 5.0);
        assert_eq!(t.iter().count(), 2);
        assert_eq!(format!("{:?}", t.index([0])), "[[0.0, 1.0], [2.0, 3.0]]");
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_out_of_bounds() {
        Tensor::from_iter(&[1, 3], [0.0; 3]).index([0, 3]);
    }

    #[test]
    #[should_panic]
    fn from_iter_checks_length() {
        Tensor::from_iter(&[2, 2], [1.0; 3]);
    }
}
