//! Strict-compliance reference backend
//!
//! Implements only what the namespace contract guarantees and rejects
//! everything else: no dtype promotion, no empty reductions, no degrees of
//! freedom at or below zero. Code that passes here relies on nothing
//! backend-specific.

use crate::array::{Array, Storage};
use crate::backends::{host, ArrayModule};
use crate::device::{DType, Device};
use crate::error::{Error, Result};
use crate::namespace::{broadcast_shapes, owned_by, same_device, ArrayNamespace};
use crate::numeric::HostBuffer;
use crate::primitives::{BinaryOp, ScalarBackend};

pub(crate) const NAME: &str = "strict";

/// Namespace adapter for the strict backend
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictNamespace;

impl StrictNamespace {
    fn check_device(&self, device: Device) -> Result<()> {
        if device != Device::Cpu {
            return Err(Error::UnsupportedDevice {
                backend: NAME,
                device,
            });
        }
        Ok(())
    }

    fn wrap(&self, shape: Vec<usize>, buffer: HostBuffer) -> Result<Array> {
        Array::new(ArrayModule::Strict, Device::Cpu, shape, Storage::Host(buffer))
    }

    fn binary(&self, op: BinaryOp, a: &Array, b: &Array) -> Result<Array> {
        owned_by(NAME, &[a, b])?;
        same_device(a, b)?;
        if a.dtype() != b.dtype() {
            return Err(Error::DTypeMismatch {
                left: a.dtype(),
                right: b.dtype(),
            });
        }
        let shape = broadcast_shapes(a.shape(), b.shape())?;
        let out = host::binary(
            &ScalarBackend,
            op,
            a.host(NAME)?,
            a.shape(),
            b.host(NAME)?,
            b.shape(),
        )?;
        log::trace!("strict {} -> shape {:?}", op.name(), shape);
        self.wrap(shape, out)
    }

    fn nonempty<'a>(&self, a: &'a Array, op: &'static str) -> Result<&'a HostBuffer> {
        owned_by(NAME, &[a])?;
        let buffer = a.host(NAME)?;
        if buffer.is_empty() {
            return Err(Error::EmptyReduction(op));
        }
        Ok(buffer)
    }
}

impl ArrayNamespace for StrictNamespace {
    fn name(&self) -> &'static str {
        NAME
    }

    fn supports(&self, device: Device, _dtype: DType) -> bool {
        device == Device::Cpu
    }

    fn asarray(&self, values: &[f64], device: Device, dtype: DType) -> Result<Array> {
        self.check_device(device)?;
        self.wrap(vec![values.len()], HostBuffer::from_f64s(values, dtype))
    }

    fn scalar(&self, value: f64, device: Device, dtype: DType) -> Result<Array> {
        self.check_device(device)?;
        self.wrap(Vec::new(), HostBuffer::from_f64s(&[value], dtype))
    }

    fn subtract(&self, a: &Array, b: &Array) -> Result<Array> {
        self.binary(BinaryOp::Subtract, a, b)
    }

    fn divide(&self, a: &Array, b: &Array) -> Result<Array> {
        self.binary(BinaryOp::Divide, a, b)
    }

    fn mean(&self, a: &Array) -> Result<Array> {
        let buffer = self.nonempty(a, "mean")?;
        let mean = host::mean(&ScalarBackend, buffer);
        self.wrap(Vec::new(), HostBuffer::from_f64s(&[mean], a.dtype()))
    }

    fn std(&self, a: &Array, correction: f64) -> Result<Array> {
        let buffer = self.nonempty(a, "std")?;
        let dof = buffer.len() as f64 - correction;
        if correction < 0.0 || dof <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "correction {correction} leaves {dof} degrees of freedom for {} elements",
                buffer.len()
            )));
        }
        let std = host::variance(&ScalarBackend, buffer, correction).sqrt();
        self.wrap(Vec::new(), HostBuffer::from_f64s(&[std], a.dtype()))
    }

    fn to_vec(&self, a: &Array) -> Result<Vec<f64>> {
        owned_by(NAME, &[a])?;
        Ok(a.host(NAME)?.to_f64s())
    }
}
