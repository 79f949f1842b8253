//! Baseline backend on `ndarray`
//!
//! Behaves like a conventional numerics library: mixed float dtypes promote
//! to float64 and reducing an empty array yields NaN instead of an error.

use crate::array::{Array, Storage};
use crate::backends::ArrayModule;
use crate::device::{DType, Device};
use crate::error::{Error, Result};
use crate::namespace::{broadcast_shapes, owned_by, same_device, ArrayNamespace};
use crate::numeric::Element;
use crate::primitives::BinaryOp;
use ndarray::{ArrayD, IxDyn};

pub(crate) const NAME: &str = "ndarray";

/// ndarray storage tagged by dtype
#[derive(Debug, Clone)]
pub enum NdStorage {
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl NdStorage {
    fn from_f64s(values: &[f64], shape: &[usize], dtype: DType) -> Result<Self> {
        let storage = match dtype {
            DType::Float32 => NdStorage::F32(build(values, shape)?),
            DType::Float64 => NdStorage::F64(build(values, shape)?),
        };
        Ok(storage)
    }

    pub fn dtype(&self) -> DType {
        match self {
            NdStorage::F32(_) => DType::Float32,
            NdStorage::F64(_) => DType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NdStorage::F32(a) => a.len(),
            NdStorage::F64(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn widened(&self) -> ArrayD<f64> {
        match self {
            NdStorage::F32(a) => a.mapv(|x| x.widen()),
            NdStorage::F64(a) => a.clone(),
        }
    }
}

fn build<E: Element>(values: &[f64], shape: &[usize]) -> Result<ArrayD<E>> {
    let data: Vec<E> = values.iter().map(|&v| E::cast(v)).collect();
    ArrayD::from_shape_vec(IxDyn(shape), data)
        .map_err(|e| Error::InvalidInput(format!("ndarray shape error: {e}")))
}

fn apply<E: Element>(op: BinaryOp, a: &ArrayD<E>, b: &ArrayD<E>) -> ArrayD<E> {
    match op {
        BinaryOp::Subtract => a - b,
        BinaryOp::Divide => a / b,
    }
}

fn std_of(values: &ArrayD<f64>, correction: f64) -> f64 {
    let n = values.len() as f64;
    if values.is_empty() || correction >= n {
        // ndarray panics past n; fall through to the raw quotient like numpy
        let mean = values.mean().unwrap_or(f64::NAN);
        let ss: f64 = values.iter().map(|x| (x - mean) * (x - mean)).sum();
        return (ss / (n - correction).max(0.0)).sqrt();
    }
    values.std(correction)
}

/// Namespace adapter for the ndarray backend
#[derive(Debug, Clone, Copy, Default)]
pub struct NdarrayNamespace;

impl NdarrayNamespace {
    fn storage<'a>(&self, a: &'a Array) -> Result<&'a NdStorage> {
        match a.storage() {
            Storage::Nd(s) => Ok(s),
            _ => Err(Error::ForeignArray {
                expected: NAME,
                actual: a.namespace_name(),
            }),
        }
    }

    fn check_device(&self, device: Device) -> Result<()> {
        if device != Device::Cpu {
            return Err(Error::UnsupportedDevice {
                backend: NAME,
                device,
            });
        }
        Ok(())
    }

    fn wrap(&self, shape: Vec<usize>, storage: NdStorage) -> Result<Array> {
        Array::new(ArrayModule::Ndarray, Device::Cpu, shape, Storage::Nd(storage))
    }

    fn scalar_like(&self, value: f64, dtype: DType) -> Result<Array> {
        self.wrap(Vec::new(), NdStorage::from_f64s(&[value], &[], dtype)?)
    }

    fn binary(&self, op: BinaryOp, a: &Array, b: &Array) -> Result<Array> {
        owned_by(NAME, &[a, b])?;
        same_device(a, b)?;
        let shape = broadcast_shapes(a.shape(), b.shape())?;
        let out = match (self.storage(a)?, self.storage(b)?) {
            (NdStorage::F32(x), NdStorage::F32(y)) => NdStorage::F32(apply(op, x, y)),
            (NdStorage::F64(x), NdStorage::F64(y)) => NdStorage::F64(apply(op, x, y)),
            (x, y) => NdStorage::F64(apply(op, &x.widened(), &y.widened())),
        };
        self.wrap(shape, out)
    }
}

impl ArrayNamespace for NdarrayNamespace {
    fn name(&self) -> &'static str {
        NAME
    }

    fn supports(&self, device: Device, _dtype: DType) -> bool {
        device == Device::Cpu
    }

    fn asarray(&self, values: &[f64], device: Device, dtype: DType) -> Result<Array> {
        self.check_device(device)?;
        let shape = vec![values.len()];
        let storage = NdStorage::from_f64s(values, &shape, dtype)?;
        self.wrap(shape, storage)
    }

    fn scalar(&self, value: f64, device: Device, dtype: DType) -> Result<Array> {
        self.check_device(device)?;
        self.scalar_like(value, dtype)
    }

    fn subtract(&self, a: &Array, b: &Array) -> Result<Array> {
        self.binary(BinaryOp::Subtract, a, b)
    }

    fn divide(&self, a: &Array, b: &Array) -> Result<Array> {
        self.binary(BinaryOp::Divide, a, b)
    }

    fn mean(&self, a: &Array) -> Result<Array> {
        owned_by(NAME, &[a])?;
        let storage = self.storage(a)?;
        let mean = storage.widened().mean().unwrap_or(f64::NAN);
        self.scalar_like(mean, storage.dtype())
    }

    fn std(&self, a: &Array, correction: f64) -> Result<Array> {
        owned_by(NAME, &[a])?;
        if correction < 0.0 {
            return Err(Error::InvalidInput(format!(
                "correction must be non-negative, got {correction}"
            )));
        }
        let storage = self.storage(a)?;
        let std = std_of(&storage.widened(), correction);
        self.scalar_like(std, storage.dtype())
    }

    fn to_vec(&self, a: &Array) -> Result<Vec<f64>> {
        owned_by(NAME, &[a])?;
        Ok(self.storage(a)?.widened().iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn xp() -> NdarrayNamespace {
        NdarrayNamespace
    }

    #[test]
    fn test_asarray_and_to_vec() {
        let a = xp().asarray(&[1.0, 2.0, 3.0], Device::Cpu, DType::Float32).unwrap();
        assert_eq!(a.shape(), &[3]);
        assert_eq!(a.dtype(), DType::Float32);
        assert_eq!(xp().to_vec(&a).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mixed_dtypes_promote() {
        let a = xp().asarray(&[1.0, 2.0], Device::Cpu, DType::Float32).unwrap();
        let b = xp().scalar(0.5, Device::Cpu, DType::Float64).unwrap();
        let c = xp().subtract(&a, &b).unwrap();
        assert_eq!(c.dtype(), DType::Float64);
        assert_eq!(xp().to_vec(&c).unwrap(), vec![0.5, 1.5]);
    }

    #[test]
    fn test_scalar_broadcast_on_either_side() {
        let a = xp().asarray(&[2.0, 4.0], Device::Cpu, DType::Float64).unwrap();
        let s = xp().scalar(8.0, Device::Cpu, DType::Float64).unwrap();
        let left = xp().divide(&s, &a).unwrap();
        assert_eq!(xp().to_vec(&left).unwrap(), vec![4.0, 2.0]);
        let right = xp().divide(&a, &s).unwrap();
        assert_eq!(xp().to_vec(&right).unwrap(), vec![0.25, 0.5]);
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let a = xp().asarray(&[1.0, 2.0], Device::Cpu, DType::Float64).unwrap();
        let b = xp().asarray(&[1.0, 2.0, 3.0], Device::Cpu, DType::Float64).unwrap();
        assert!(matches!(
            xp().subtract(&a, &b),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_reductions() {
        let a = xp()
            .asarray(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Device::Cpu, DType::Float64)
            .unwrap();
        let mean = xp().mean(&a).unwrap();
        assert!(mean.is_scalar());
        assert_relative_eq!(xp().item(&mean).unwrap(), 3.5);
        let std = xp().std(&a, 0.0).unwrap();
        assert_relative_eq!(xp().item(&std).unwrap(), (35.0f64 / 12.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_reductions_are_nan() {
        let a = xp().asarray(&[], Device::Cpu, DType::Float64).unwrap();
        assert!(xp().item(&xp().mean(&a).unwrap()).unwrap().is_nan());
        assert!(xp().item(&xp().std(&a, 0.0).unwrap()).unwrap().is_nan());
    }

    #[test]
    fn test_correction_past_n_does_not_panic() {
        let a = xp().asarray(&[1.0, 3.0], Device::Cpu, DType::Float64).unwrap();
        let std = xp().std(&a, 3.0).unwrap();
        assert!(xp().item(&std).unwrap().is_infinite());
        assert!(xp().std(&a, -1.0).is_err());
    }

    #[test]
    fn test_rejects_foreign_arrays() {
        let strict = ArrayModule::Strict
            .asarray(&[1.0], Device::Cpu, DType::Float64)
            .unwrap();
        assert!(matches!(
            xp().mean(&strict),
            Err(Error::ForeignArray { expected: "ndarray", actual: "strict" })
        ));
    }
}
