//! Element trait and host-side buffers
//!
//! Backends are written once against [`Element`] and instantiated for the two
//! floating dtypes. Aggregates (sums, means, variances) are always carried in
//! `f64` so that `float32` reductions do not lose precision before the final
//! narrowing.

use crate::device::DType;
use bytemuck::Pod;
use num_traits::Float;
use std::fmt::Debug;

/// Floating element type storable in an array
pub trait Element: Pod + Float + Debug + Default + Send + Sync + 'static {
    /// The dtype tag for this element type
    const DTYPE: DType;

    /// Narrow an `f64` literal to this type
    fn cast(value: f64) -> Self;

    /// Widen to `f64` for aggregation
    fn widen(self) -> f64;
}

impl Element for f64 {
    const DTYPE: DType = DType::Float64;

    fn cast(value: f64) -> Self {
        value
    }

    fn widen(self) -> f64 {
        self
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::Float32;

    fn cast(value: f64) -> Self {
        value as f32
    }

    fn widen(self) -> f64 {
        self as f64
    }
}

/// Host memory for one array, tagged by dtype
#[derive(Debug, Clone, PartialEq)]
pub enum HostBuffer {
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl HostBuffer {
    /// Build a buffer of `dtype` from `f64` literals
    pub fn from_f64s(values: &[f64], dtype: DType) -> Self {
        match dtype {
            DType::Float32 => HostBuffer::F32(values.iter().map(|&v| f32::cast(v)).collect()),
            DType::Float64 => HostBuffer::F64(values.to_vec()),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            HostBuffer::F32(_) => DType::Float32,
            HostBuffer::F64(_) => DType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            HostBuffer::F32(v) => v.len(),
            HostBuffer::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out as `f64`
    pub fn to_f64s(&self) -> Vec<f64> {
        match self {
            HostBuffer::F32(v) => v.iter().map(|&x| x.widen()).collect(),
            HostBuffer::F64(v) => v.clone(),
        }
    }

    /// Convert to another dtype, copying
    pub fn astype(&self, dtype: DType) -> HostBuffer {
        if self.dtype() == dtype {
            return self.clone();
        }
        HostBuffer::from_f64s(&self.to_f64s(), dtype)
    }
}
