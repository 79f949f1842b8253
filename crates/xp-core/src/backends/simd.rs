//! Accelerated backend: AVX2 host kernels plus an optional GPU device
//!
//! On `cpu` it keeps arrays in host buffers and runs the AVX2 kernels;
//! mixed float dtypes promote to the wider one. On `cuda` it places float32
//! arrays on the shared GPU runtime, so one namespace spans both devices.

use crate::array::{Array, Storage};
use crate::backends::{host, ArrayModule};
use crate::device::{DType, Device};
use crate::error::{Error, Result};
use crate::namespace::{broadcast_shapes, owned_by, same_device, ArrayNamespace};
use crate::numeric::HostBuffer;
use crate::primitives::{Avx2Backend, BinaryOp};

#[cfg(feature = "gpu")]
use crate::gpu::GpuRuntime;
#[cfg(feature = "gpu")]
use std::sync::Arc;

pub(crate) const NAME: &str = "simd";

/// Raw module handle for the accelerated backend
#[derive(Debug, Clone)]
pub struct SimdModule {
    primitives: Avx2Backend,
    #[cfg(feature = "gpu")]
    gpu: Option<Arc<GpuRuntime>>,
}

impl SimdModule {
    /// CPU-only module; fails when the processor lacks AVX2
    pub fn try_new() -> Result<Self> {
        let primitives = Avx2Backend::try_new()
            .map_err(|e| Error::unavailable(NAME, e.to_string()))?;
        Ok(Self {
            primitives,
            #[cfg(feature = "gpu")]
            gpu: None,
        })
    }

    /// Attach a GPU runtime, enabling the `cuda` device
    #[cfg(feature = "gpu")]
    pub fn with_gpu(mut self, runtime: Arc<GpuRuntime>) -> Self {
        self.gpu = Some(runtime);
        self
    }

    /// Whether arrays can be placed on `cuda`
    pub fn has_accelerator(&self) -> bool {
        #[cfg(feature = "gpu")]
        {
            self.gpu.is_some()
        }
        #[cfg(not(feature = "gpu"))]
        {
            false
        }
    }
}

/// Namespace adapter for the accelerated backend
#[derive(Debug, Clone)]
pub struct SimdNamespace {
    module: SimdModule,
}

impl SimdNamespace {
    pub fn new(module: SimdModule) -> Self {
        Self { module }
    }

    fn check_placement(&self, device: Device, dtype: DType) -> Result<()> {
        match device {
            Device::Cpu => Ok(()),
            Device::Cuda if !self.module.has_accelerator() => {
                Err(Error::UnsupportedDevice { backend: NAME, device })
            }
            Device::Cuda if dtype != DType::Float32 => {
                Err(Error::UnsupportedDType { backend: NAME, dtype })
            }
            Device::Cuda => Ok(()),
        }
    }

    #[cfg(feature = "gpu")]
    fn runtime(&self) -> Result<&Arc<GpuRuntime>> {
        self.module.gpu.as_ref().ok_or(Error::UnsupportedDevice {
            backend: NAME,
            device: Device::Cuda,
        })
    }

    fn wrap(&self, device: Device, shape: Vec<usize>, storage: Storage) -> Result<Array> {
        Array::new(ArrayModule::Simd(self.module.clone()), device, shape, storage)
    }

    fn build(&self, values: &[f64], shape: Vec<usize>, device: Device, dtype: DType) -> Result<Array> {
        self.check_placement(device, dtype)?;
        match device {
            Device::Cpu => self.wrap(device, shape, Storage::Host(HostBuffer::from_f64s(values, dtype))),
            #[cfg(feature = "gpu")]
            Device::Cuda => {
                let data: Vec<f32> = values.iter().map(|&v| v as f32).collect();
                let buffer = self.runtime()?.upload(&data)?;
                self.wrap(device, shape, Storage::Gpu(buffer))
            }
            #[cfg(not(feature = "gpu"))]
            Device::Cuda => Err(Error::UnsupportedDevice { backend: NAME, device }),
        }
    }

    fn binary(&self, op: BinaryOp, a: &Array, b: &Array) -> Result<Array> {
        owned_by(NAME, &[a, b])?;
        let device = same_device(a, b)?;
        let shape = broadcast_shapes(a.shape(), b.shape())?;
        match (a.storage(), b.storage()) {
            (Storage::Host(x), Storage::Host(y)) => {
                let dtype = x.dtype().promote(y.dtype());
                let out = if x.dtype() == y.dtype() {
                    host::binary(&self.module.primitives, op, x, a.shape(), y, b.shape())?
                } else {
                    host::binary(
                        &self.module.primitives,
                        op,
                        &x.astype(dtype),
                        a.shape(),
                        &y.astype(dtype),
                        b.shape(),
                    )?
                };
                self.wrap(device, shape, Storage::Host(out))
            }
            #[cfg(feature = "gpu")]
            (Storage::Gpu(x), Storage::Gpu(y)) => {
                let len = shape.iter().product();
                let out = self
                    .runtime()?
                    .binary(op, x, a.is_scalar(), y, b.is_scalar(), len)?;
                self.wrap(device, shape, Storage::Gpu(out))
            }
            _ => Err(Error::InvalidInput(format!(
                "simd {} got operands with inconsistent storage",
                op.name()
            ))),
        }
    }

    /// Mean and variance accumulated in f64
    fn moments(&self, a: &Array, correction: f64) -> Result<(f64, f64)> {
        owned_by(NAME, &[a])?;
        match a.storage() {
            Storage::Host(buffer) => Ok((
                host::mean(&self.module.primitives, buffer),
                host::variance(&self.module.primitives, buffer, correction),
            )),
            #[cfg(feature = "gpu")]
            Storage::Gpu(buffer) => self.runtime()?.moments(buffer, correction),
            _ => Err(Error::ForeignArray {
                expected: NAME,
                actual: a.namespace_name(),
            }),
        }
    }
}

impl ArrayNamespace for SimdNamespace {
    fn name(&self) -> &'static str {
        NAME
    }

    fn supports(&self, device: Device, dtype: DType) -> bool {
        self.check_placement(device, dtype).is_ok()
    }

    fn default_dtype(&self) -> DType {
        DType::Float32
    }

    fn asarray(&self, values: &[f64], device: Device, dtype: DType) -> Result<Array> {
        self.build(values, vec![values.len()], device, dtype)
    }

    fn scalar(&self, value: f64, device: Device, dtype: DType) -> Result<Array> {
        self.build(&[value], Vec::new(), device, dtype)
    }

    fn subtract(&self, a: &Array, b: &Array) -> Result<Array> {
        self.binary(BinaryOp::Subtract, a, b)
    }

    fn divide(&self, a: &Array, b: &Array) -> Result<Array> {
        self.binary(BinaryOp::Divide, a, b)
    }

    fn mean(&self, a: &Array) -> Result<Array> {
        let (mean, _) = self.moments(a, 0.0)?;
        self.build(&[mean], Vec::new(), a.device(), a.dtype())
    }

    fn std(&self, a: &Array, correction: f64) -> Result<Array> {
        if correction < 0.0 {
            return Err(Error::InvalidInput(format!(
                "correction must be non-negative, got {correction}"
            )));
        }
        let (_, variance) = self.moments(a, correction)?;
        self.build(&[variance.sqrt()], Vec::new(), a.device(), a.dtype())
    }

    fn to_vec(&self, a: &Array) -> Result<Vec<f64>> {
        owned_by(NAME, &[a])?;
        match a.storage() {
            Storage::Host(buffer) => Ok(buffer.to_f64s()),
            #[cfg(feature = "gpu")]
            Storage::Gpu(buffer) => Ok(self
                .runtime()?
                .download(buffer)?
                .into_iter()
                .map(f64::from)
                .collect()),
            _ => Err(Error::ForeignArray {
                expected: NAME,
                actual: a.namespace_name(),
            }),
        }
    }
}
