//! In-memory tensor for tests and embedding.
//!
//! Owns its buffer and records the layout the buffer is stored in.
//! [`TensorView::to_flat`] always yields logical row-major order, so a
//! column-major tensor and its row-major twin flatten identically.

use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use super::{Dims, Layout, TensorView};
use crate::model::FloatBits;
use crate::{Error, Result};

/// Owned dense tensor.
///
/// Deserialization goes through [`Tensor::with_layout`], so a decoded tensor
/// is always consistent with its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawTensor<T>",
    bound(deserialize = "T: FloatBits + Deserialize<'de>")
)]
pub struct Tensor<T> {
    shape: Dims,
    layout: Layout,
    data: Vec<T>,
}

/// Unchecked wire form of [`Tensor`].
#[derive(Deserialize)]
struct RawTensor<T> {
    shape: Dims,
    layout: Layout,
    data: Vec<T>,
}

impl<T: FloatBits> TryFrom<RawTensor<T>> for Tensor<T> {
    type Error = Error;

    fn try_from(raw: RawTensor<T>) -> Result<Self> {
        Self::with_layout(&raw.shape, raw.layout, raw.data)
    }
}

fn overflow(shape: &[usize]) -> Error {
    Error::InvalidTensor(format!("shape {shape:?} overflows the address space"))
}

impl<T: FloatBits> Tensor<T> {
    /// Row-major tensor over `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTensor`] if `data` does not hold exactly the
    /// number of elements the shape implies.
    pub fn from_vec(shape: &[usize], data: Vec<T>) -> Result<Self> {
        Self::with_layout(shape, Layout::RowMajor, data)
    }

    /// Tensor whose buffer is stored in `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTensor`] if the buffer is too small for the
    /// shape, if strides do not match the rank, or if the element count or
    /// any stride offset overflows `usize`.
    pub fn with_layout(shape: &[usize], layout: Layout, data: Vec<T>) -> Result<Self> {
        let count = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| overflow(shape))?;
        match &layout {
            Layout::RowMajor | Layout::ColumnMajor => {
                if data.len() != count {
                    return Err(Error::InvalidTensor(format!(
                        "shape {shape:?} needs {count} elements, got {}",
                        data.len()
                    )));
                }
            }
            Layout::Strided(strides) => {
                if strides.len() != shape.len() {
                    return Err(Error::InvalidTensor(format!(
                        "{} strides for a rank-{} shape",
                        strides.len(),
                        shape.len()
                    )));
                }
                if count > 0 {
                    let last = shape
                        .iter()
                        .zip(strides)
                        .try_fold(0usize, |acc, (&d, &s)| {
                            (d - 1).checked_mul(s).and_then(|step| acc.checked_add(step))
                        })
                        .ok_or_else(|| overflow(shape))?;
                    if last >= data.len() {
                        return Err(Error::InvalidTensor(format!(
                            "strides {:?} reach offset {last}, buffer holds {}",
                            strides.as_slice(),
                            data.len()
                        )));
                    }
                }
            }
        }
        Ok(Self {
            shape: Dims::from_slice(shape),
            layout,
            data,
        })
    }

    /// Raw buffer in storage order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    fn strides(&self) -> Dims {
        let rank = self.shape.len();
        match &self.layout {
            Layout::Strided(strides) => strides.clone(),
            Layout::RowMajor => {
                let mut strides: Dims = smallvec![1; rank];
                for d in (0..rank.saturating_sub(1)).rev() {
                    strides[d] = strides[d + 1] * self.shape[d + 1];
                }
                strides
            }
            Layout::ColumnMajor => {
                let mut strides: Dims = smallvec![1; rank];
                for d in 1..rank {
                    strides[d] = strides[d - 1] * self.shape[d - 1];
                }
                strides
            }
        }
    }
}

impl<T: FloatBits> TensorView<T> for Tensor<T> {
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> &Layout {
        &self.layout
    }

    fn to_flat(&self) -> Vec<T> {
        if self.layout == Layout::RowMajor {
            return self.data.clone();
        }

        let count = self.element_count();
        if count == 0 {
            return Vec::new();
        }
        // count > 0 bounds every partial product below
        let strides = self.strides();
        let mut index: Dims = smallvec![0; self.shape.len()];
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let offset: usize = index.iter().zip(&strides).map(|(&i, &s)| i * s).sum();
            out.push(self.data[offset]);
            // odometer increment, last dim fastest
            for d in (0..index.len()).rev() {
                index[d] += 1;
                if index[d] < self.shape[d] {
                    break;
                }
                index[d] = 0;
            }
        }
        out
    }
}
