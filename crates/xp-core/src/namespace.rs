//! The standardized namespace interface
//!
//! Numerical code is written once against [`ArrayNamespace`]; every backend
//! provides one adapter. [`get_namespace`] resolves the adapter from the arrays
//! themselves, so callers never name a backend.

use crate::array::Array;
use crate::device::{DType, Device};
use crate::error::{Error, Result};
use std::fmt::Debug;
use std::sync::Arc;

/// Shared handle to a namespace adapter
pub type Namespace = Arc<dyn ArrayNamespace>;

/// Array operations every backend must provide
///
/// Binary operations broadcast a 0-d operand against a 1-d one; any other
/// shape combination must match exactly. Reductions return 0-d arrays of the
/// input dtype on the input device.
pub trait ArrayNamespace: Send + Sync + Debug {
    /// Backend family name, e.g. `"ndarray"`
    fn name(&self) -> &'static str;

    /// Whether arrays of `dtype` can live on `device`
    fn supports(&self, device: Device, dtype: DType) -> bool;

    /// Dtype used when the caller does not care
    fn default_dtype(&self) -> DType {
        DType::Float64
    }

    /// Build a 1-d array from literal values
    fn asarray(&self, values: &[f64], device: Device, dtype: DType) -> Result<Array>;

    /// Build a 0-d array
    fn scalar(&self, value: f64, device: Device, dtype: DType) -> Result<Array>;

    fn subtract(&self, a: &Array, b: &Array) -> Result<Array>;

    fn divide(&self, a: &Array, b: &Array) -> Result<Array>;

    /// Arithmetic mean over all elements
    fn mean(&self, a: &Array) -> Result<Array>;

    /// Standard deviation with `correction` degrees of freedom removed
    fn std(&self, a: &Array, correction: f64) -> Result<Array>;

    /// Copy the elements to host memory as f64
    fn to_vec(&self, a: &Array) -> Result<Vec<f64>>;

    /// Value of a 0-d (or single-element) array
    fn item(&self, a: &Array) -> Result<f64> {
        let values = self.to_vec(a)?;
        match values.as_slice() {
            [v] => Ok(*v),
            _ => Err(Error::InvalidInput(format!(
                "item() needs exactly one element, array has {}",
                values.len()
            ))),
        }
    }
}

/// Resolve the namespace shared by `arrays`
///
/// Fails on empty input and when the arrays come from different namespaces.
pub fn get_namespace(arrays: &[&Array]) -> Result<Namespace> {
    let first = arrays.first().ok_or_else(|| {
        Error::InvalidInput("get_namespace needs at least one array".to_string())
    })?;

    let mut names = vec![first.namespace_name()];
    for array in &arrays[1..] {
        let name = array.namespace_name();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    if names.len() > 1 {
        return Err(Error::MixedNamespaces(names));
    }

    Ok(first.module().namespace())
}

/// Result shape of a binary operation
pub(crate) fn broadcast_shapes(a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    if a == b {
        return Ok(a.to_vec());
    }
    if a.is_empty() {
        return Ok(b.to_vec());
    }
    if b.is_empty() {
        return Ok(a.to_vec());
    }
    Err(Error::shape_mismatch(a, b))
}

/// Both operands must sit on the same device
pub(crate) fn same_device(a: &Array, b: &Array) -> Result<Device> {
    if a.device() != b.device() {
        return Err(Error::DeviceMismatch {
            left: a.device(),
            right: b.device(),
        });
    }
    Ok(a.device())
}

/// Reject arrays produced by another namespace
pub(crate) fn owned_by(expected: &'static str, arrays: &[&Array]) -> Result<()> {
    for array in arrays {
        let actual = array.namespace_name();
        if actual != expected {
            return Err(Error::ForeignArray { expected, actual });
        }
    }
    Ok(())
}
