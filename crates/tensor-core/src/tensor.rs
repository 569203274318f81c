// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type.

use crate::{DType, Shape, TensorError};

/// Typed element storage. One variant per [`DType`].
#[derive(Debug, Clone, PartialEq)]
enum TensorData {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    I8(Vec<i8>),
    U8(Vec<u8>),
}

/// Runs `$body` with `$v` bound to the typed vector inside `$data`.
macro_rules! with_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            TensorData::F32($v) => $body,
            TensorData::F64($v) => $body,
            TensorData::I32($v) => $body,
            TensorData::I8($v) => $body,
            TensorData::U8($v) => $body,
        }
    };
}

/// An owned, n-dimensional tensor stored in contiguous memory.
///
/// `Tensor` is the buffer abstraction the inference layer reads and writes:
/// it exposes its dimensions and strides, and typed element access by
/// multi-index. Element values cross that interface as `f64` and are
/// converted to the storage type on write (integer storage truncates
/// toward zero and saturates).
///
/// # Memory Layout
/// Data is stored in row-major (C) order; `strides()` describes the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    strides: Vec<usize>,
    data: TensorData,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape, DType};
    /// let t = Tensor::zeros(Shape::matrix(2, 3), DType::F32);
    /// assert_eq!(t.size_bytes(), 24); // 2 * 3 * 4 bytes
    /// ```
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        let n = shape.num_elements();
        let data = match dtype {
            DType::F32 => TensorData::F32(vec![0.0; n]),
            DType::F64 => TensorData::F64(vec![0.0; n]),
            DType::I32 => TensorData::I32(vec![0; n]),
            DType::I8 => TensorData::I8(vec![0; n]),
            DType::U8 => TensorData::U8(vec![0; n]),
        };
        Self::from_parts(shape, data)
    }

    /// Creates a tensor from a slice of `f32` values.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::from_f32(Shape::vector(3), &[1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.as_f32_slice(), Some(&[1.0, 2.0, 3.0][..]));
    /// ```
    pub fn from_f32(shape: Shape, values: &[f32]) -> Result<Self, TensorError> {
        check_len(&shape, values.len())?;
        Ok(Self::from_parts(shape, TensorData::F32(values.to_vec())))
    }

    /// Creates a tensor from a slice of `f64` values.
    pub fn from_f64(shape: Shape, values: &[f64]) -> Result<Self, TensorError> {
        check_len(&shape, values.len())?;
        Ok(Self::from_parts(shape, TensorData::F64(values.to_vec())))
    }

    /// Creates a tensor from a slice of `i32` values.
    pub fn from_i32(shape: Shape, values: &[i32]) -> Result<Self, TensorError> {
        check_len(&shape, values.len())?;
        Ok(Self::from_parts(shape, TensorData::I32(values.to_vec())))
    }

    fn from_parts(shape: Shape, data: TensorData) -> Self {
        let strides = shape.strides();
        Self {
            shape,
            strides,
            data,
        }
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's dimensions.
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    /// Returns the row-major strides of the tensor.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        match self.data {
            TensorData::F32(_) => DType::F32,
            TensorData::F64(_) => DType::F64,
            TensorData::I32(_) => DType::I32,
            TensorData::I8(_) => DType::I8,
            TensorData::U8(_) => DType::U8,
        }
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        with_data!(&self.data, v => v.len())
    }

    /// Returns `true` if the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the memory footprint of this tensor in bytes.
    pub fn size_bytes(&self) -> usize {
        self.shape.size_bytes(self.dtype())
    }

    /// Converts a multi-index into a flat offset.
    ///
    /// The index must have the same rank as the tensor and every coordinate
    /// must lie inside its dimension. A scalar tensor takes an empty index.
    pub fn offset_of(&self, indices: &[usize]) -> Result<usize, TensorError> {
        let dims = self.shape.dims();
        if indices.len() != dims.len() || indices.iter().zip(dims).any(|(&i, &d)| i >= d) {
            return Err(TensorError::IndexOutOfBounds {
                index: indices.to_vec(),
                shape: self.shape.clone(),
            });
        }
        Ok(indices
            .iter()
            .zip(&self.strides)
            .map(|(&i, &s)| i * s)
            .sum())
    }

    /// Reads the element at `indices`.
    pub fn get(&self, indices: &[usize]) -> Result<f64, TensorError> {
        let offset = self.offset_of(indices)?;
        self.get_flat(offset)
    }

    /// Writes `value` at `indices`.
    pub fn set(&mut self, indices: &[usize], value: f64) -> Result<(), TensorError> {
        let offset = self.offset_of(indices)?;
        self.set_flat(offset, value)
    }

    /// Reads the element at a flat row-major offset.
    pub fn get_flat(&self, offset: usize) -> Result<f64, TensorError> {
        let len = self.len();
        with_data!(&self.data, v => v
            .get(offset)
            .map(|&x| x as f64)
            .ok_or(TensorError::OffsetOutOfBounds { offset, len }))
    }

    /// Writes `value` at a flat row-major offset.
    pub fn set_flat(&mut self, offset: usize, value: f64) -> Result<(), TensorError> {
        let len = self.len();
        let oob = TensorError::OffsetOutOfBounds { offset, len };
        match &mut self.data {
            TensorData::F32(v) => *v.get_mut(offset).ok_or(oob)? = value as f32,
            TensorData::F64(v) => *v.get_mut(offset).ok_or(oob)? = value,
            TensorData::I32(v) => *v.get_mut(offset).ok_or(oob)? = value as i32,
            TensorData::I8(v) => *v.get_mut(offset).ok_or(oob)? = value as i8,
            TensorData::U8(v) => *v.get_mut(offset).ok_or(oob)? = value as u8,
        }
        Ok(())
    }

    /// Returns the buffer as `f32`s, or `None` for any other dtype.
    pub fn as_f32_slice(&self) -> Option<&[f32]> {
        match &self.data {
            TensorData::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the buffer as mutable `f32`s, or `None` for any other dtype.
    pub fn as_f32_slice_mut(&mut self) -> Option<&mut [f32]> {
        match &mut self.data {
            TensorData::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the buffer as `f64`s, or `None` for any other dtype.
    pub fn as_f64_slice(&self) -> Option<&[f64]> {
        match &self.data {
            TensorData::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the buffer as mutable `f64`s, or `None` for any other dtype.
    pub fn as_f64_slice_mut(&mut self) -> Option<&mut [f64]> {
        match &mut self.data {
            TensorData::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns every element converted to `f64`, in row-major order.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_data!(&self.data, v => v.iter().map(|&x| x as f64).collect())
    }
}

fn check_len(shape: &Shape, actual: usize) -> Result<(), TensorError> {
    let expected = shape.num_elements();
    if actual != expected {
        return Err(TensorError::BufferSizeMismatch {
            shape: shape.clone(),
            expected,
            actual,
        });
    }
    Ok(())
}
