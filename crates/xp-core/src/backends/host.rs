//! Host-buffer helpers shared by the strict and simd backends

use crate::error::{Error, Result};
use crate::numeric::{Element, HostBuffer};
use crate::primitives::{BinaryOp, ComputePrimitives};

/// a op b with 0-d broadcasting; shapes already validated
fn binary_slices<E, P>(
    primitives: &P,
    op: BinaryOp,
    a: &[E],
    a_shape: &[usize],
    b: &[E],
    b_shape: &[usize],
) -> Vec<E>
where
    E: Element,
    P: ComputePrimitives<E>,
{
    match (a_shape.is_empty(), b_shape.is_empty()) {
        (true, false) => primitives.binary_scalar_lhs(op, a[0], b),
        (false, true) => primitives.binary_scalar_rhs(op, a, b[0]),
        _ => primitives.binary(op, a, b),
    }
}

/// Binary op over two host buffers of the same dtype
pub(crate) fn binary<P>(
    primitives: &P,
    op: BinaryOp,
    a: &HostBuffer,
    a_shape: &[usize],
    b: &HostBuffer,
    b_shape: &[usize],
) -> Result<HostBuffer>
where
    P: ComputePrimitives<f32> + ComputePrimitives<f64>,
{
    match (a, b) {
        (HostBuffer::F32(x), HostBuffer::F32(y)) => Ok(HostBuffer::F32(
            binary_slices::<f32, P>(primitives, op, x.as_slice(), a_shape, y.as_slice(), b_shape),
        )),
        (HostBuffer::F64(x), HostBuffer::F64(y)) => Ok(HostBuffer::F64(
            binary_slices::<f64, P>(primitives, op, x.as_slice(), a_shape, y.as_slice(), b_shape),
        )),
        (x, y) => Err(Error::DTypeMismatch {
            left: x.dtype(),
            right: y.dtype(),
        }),
    }
}

pub(crate) fn mean<P>(primitives: &P, a: &HostBuffer) -> f64
where
    P: ComputePrimitives<f32> + ComputePrimitives<f64>,
{
    match a {
        HostBuffer::F32(x) => ComputePrimitives::<f32>::mean(primitives, x),
        HostBuffer::F64(x) => ComputePrimitives::<f64>::mean(primitives, x),
    }
}

pub(crate) fn variance<P>(primitives: &P, a: &HostBuffer, correction: f64) -> f64
where
    P: ComputePrimitives<f32> + ComputePrimitives<f64>,
{
    match a {
        HostBuffer::F32(x) => ComputePrimitives::<f32>::variance(primitives, x, correction),
        HostBuffer::F64(x) => ComputePrimitives::<f64>::variance(primitives, x, correction),
    }
}
