//! Backend-owned arrays
//!
//! An [`Array`] is always 0-d or 1-d and remembers the [`ArrayModule`] that
//! produced it, which is how [`get_namespace`](crate::get_namespace) finds the
//! namespace adapter for it.

use crate::backends::nd::NdStorage;
use crate::backends::ArrayModule;
use crate::device::{DType, Device};
use crate::error::{Error, Result};
use crate::numeric::HostBuffer;

/// Backend-specific storage
#[derive(Debug, Clone)]
pub(crate) enum Storage {
    /// ndarray-owned memory
    Nd(NdStorage),
    /// Plain host vectors (strict and simd backends)
    Host(HostBuffer),
    /// Device memory, always f32
    #[cfg(feature = "gpu")]
    Gpu(crate::gpu::GpuBuffer),
}

impl Storage {
    fn dtype(&self) -> DType {
        match self {
            Storage::Nd(s) => s.dtype(),
            Storage::Host(b) => b.dtype(),
            #[cfg(feature = "gpu")]
            Storage::Gpu(_) => DType::Float32,
        }
    }

    fn len(&self) -> usize {
        match self {
            Storage::Nd(s) => s.len(),
            Storage::Host(b) => b.len(),
            #[cfg(feature = "gpu")]
            Storage::Gpu(g) => g.len(),
        }
    }
}

/// A 0-d or 1-d array owned by one backend
#[derive(Debug, Clone)]
pub struct Array {
    module: ArrayModule,
    device: Device,
    dtype: DType,
    shape: Vec<usize>,
    storage: Storage,
}

impl Array {
    pub(crate) fn new(
        module: ArrayModule,
        device: Device,
        shape: Vec<usize>,
        storage: Storage,
    ) -> Result<Self> {
        if shape.len() > 1 {
            return Err(Error::InvalidInput(format!(
                "only 0-d and 1-d arrays are supported, got shape {shape:?}"
            )));
        }
        let expected: usize = shape.iter().product();
        if storage.len() != expected {
            return Err(Error::InvalidInput(format!(
                "storage holds {} elements but shape {shape:?} needs {expected}",
                storage.len()
            )));
        }
        Ok(Self {
            module,
            device,
            dtype: storage.dtype(),
            shape,
            storage,
        })
    }

    /// The module that produced this array
    pub fn module(&self) -> &ArrayModule {
        &self.module
    }

    /// Name of the owning namespace
    pub fn namespace_name(&self) -> &'static str {
        self.module.name()
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// True for 0-d arrays
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Host buffer, or `ForeignArray` naming `expected` for other storage
    pub(crate) fn host(&self, expected: &'static str) -> Result<&HostBuffer> {
        match &self.storage {
            Storage::Host(buf) => Ok(buf),
            _ => Err(Error::ForeignArray {
                expected,
                actual: self.namespace_name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_metadata() {
        let storage = Storage::Host(HostBuffer::from_f64s(&[1.0, 2.0], DType::Float32));
        let arr = Array::new(ArrayModule::Strict, Device::Cpu, vec![2], storage).unwrap();
        assert_eq!(arr.namespace_name(), "strict");
        assert_eq!(arr.dtype(), DType::Float32);
        assert_eq!(arr.shape(), &[2]);
        assert_eq!(arr.ndim(), 1);
        assert_eq!(arr.size(), 2);
        assert!(!arr.is_scalar());
        assert!(arr.host("strict").is_ok());
    }

    #[test]
    fn test_array_rejects_inconsistent_shape() {
        let storage = Storage::Host(HostBuffer::from_f64s(&[1.0, 2.0], DType::Float64));
        let err = Array::new(ArrayModule::Strict, Device::Cpu, vec![3], storage).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let storage = Storage::Host(HostBuffer::from_f64s(&[1.0], DType::Float64));
        let err = Array::new(ArrayModule::Strict, Device::Cpu, vec![1, 1], storage).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
