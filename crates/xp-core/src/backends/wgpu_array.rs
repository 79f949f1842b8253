//! GPU-only backend on wgpu
//!
//! Arrays live exclusively on the `cuda` device and are always float32.
//! There is no host placement; reading values back goes through
//! [`ArrayNamespace::to_vec`].

use crate::array::{Array, Storage};
use crate::backends::ArrayModule;
use crate::device::{DType, Device};
use crate::error::{Error, Result};
use crate::gpu::{GpuBuffer, GpuRuntime};
use crate::namespace::{broadcast_shapes, owned_by, same_device, ArrayNamespace};
use crate::primitives::BinaryOp;
use std::sync::Arc;

pub(crate) const NAME: &str = "wgpu";

/// Namespace adapter for GPU-resident arrays
#[derive(Debug, Clone)]
pub struct WgpuNamespace {
    runtime: Arc<GpuRuntime>,
}

impl WgpuNamespace {
    pub fn new(runtime: Arc<GpuRuntime>) -> Self {
        Self { runtime }
    }

    fn check_placement(&self, device: Device, dtype: DType) -> Result<()> {
        if device != Device::Cuda {
            return Err(Error::UnsupportedDevice { backend: NAME, device });
        }
        if dtype != DType::Float32 {
            return Err(Error::UnsupportedDType { backend: NAME, dtype });
        }
        Ok(())
    }

    fn buffer<'a>(&self, a: &'a Array) -> Result<&'a GpuBuffer> {
        match a.storage() {
            Storage::Gpu(buffer) => Ok(buffer),
            _ => Err(Error::ForeignArray {
                expected: NAME,
                actual: a.namespace_name(),
            }),
        }
    }

    fn build(&self, values: &[f64], shape: Vec<usize>, device: Device, dtype: DType) -> Result<Array> {
        self.check_placement(device, dtype)?;
        let data: Vec<f32> = values.iter().map(|&v| v as f32).collect();
        let buffer = self.runtime.upload(&data)?;
        Array::new(
            ArrayModule::Wgpu(Arc::clone(&self.runtime)),
            Device::Cuda,
            shape,
            Storage::Gpu(buffer),
        )
    }

    fn binary(&self, op: BinaryOp, a: &Array, b: &Array) -> Result<Array> {
        owned_by(NAME, &[a, b])?;
        same_device(a, b)?;
        let shape = broadcast_shapes(a.shape(), b.shape())?;
        let len = shape.iter().product();
        let out = self.runtime.binary(
            op,
            self.buffer(a)?,
            a.is_scalar(),
            self.buffer(b)?,
            b.is_scalar(),
            len,
        )?;
        log::trace!("wgpu {} dispatched over {len} elements", op.name());
        Array::new(
            ArrayModule::Wgpu(Arc::clone(&self.runtime)),
            Device::Cuda,
            shape,
            Storage::Gpu(out),
        )
    }
}

impl ArrayNamespace for WgpuNamespace {
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
        owned_by(NAME, &[a])?;
        let (mean, _) = self.runtime.moments(self.buffer(a)?, 0.0)?;
        self.build(&[mean], Vec::new(), Device::Cuda, DType::Float32)
    }

    fn std(&self, a: &Array, correction: f64) -> Result<Array> {
        owned_by(NAME, &[a])?;
        if correction < 0.0 {
            return Err(Error::InvalidInput(format!(
                "correction must be non-negative, got {correction}"
            )));
        }
        let (_, variance) = self.runtime.moments(self.buffer(a)?, correction)?;
        self.build(&[variance.sqrt()], Vec::new(), Device::Cuda, DType::Float32)
    }

    fn to_vec(&self, a: &Array) -> Result<Vec<f64>> {
        owned_by(NAME, &[a])?;
        let values = self.runtime.download(self.buffer(a)?)?;
        Ok(values.into_iter().map(f64::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn xp() -> Option<WgpuNamespace> {
        match GpuRuntime::shared() {
            Ok(runtime) => Some(WgpuNamespace::new(runtime)),
            Err(e) => {
                println!("Skipping: {e}");
                None
            }
        }
    }

    #[test]
    fn test_placement_rules() {
        let Some(xp) = xp() else { return };
        assert!(xp.supports(Device::Cuda, DType::Float32));
        assert!(!xp.supports(Device::Cuda, DType::Float64));
        assert!(!xp.supports(Device::Cpu, DType::Float32));
        assert!(matches!(
            xp.asarray(&[1.0], Device::Cpu, DType::Float32),
            Err(Error::UnsupportedDevice { backend: "wgpu", device: Device::Cpu })
        ));
    }

    #[test]
    fn test_reductions_on_device() {
        let Some(xp) = xp() else { return };
        let a = xp
            .asarray(&[1.0, 2.0, 3.0, 4.0], Device::Cuda, DType::Float32)
            .unwrap();
        let mean = xp.mean(&a).unwrap();
        assert_eq!(mean.device(), Device::Cuda);
        assert_relative_eq!(xp.item(&mean).unwrap(), 2.5);
        let std = xp.std(&a, 0.0).unwrap();
        assert_relative_eq!(xp.item(&std).unwrap(), 1.25f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_elementwise_broadcast() {
        let Some(xp) = xp() else { return };
        let a = xp.asarray(&[3.0, 6.0], Device::Cuda, DType::Float32).unwrap();
        let s = xp.scalar(3.0, Device::Cuda, DType::Float32).unwrap();
        assert_eq!(xp.to_vec(&xp.divide(&a, &s).unwrap()).unwrap(), vec![1.0, 2.0]);
        assert_eq!(xp.to_vec(&xp.subtract(&s, &a).unwrap()).unwrap(), vec![0.0, -3.0]);
    }
}
