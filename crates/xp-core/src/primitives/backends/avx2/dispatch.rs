//! Compile-time dispatch for AVX2 type-specific implementations

use crate::numeric::Element;
use crate::primitives::BinaryOp;

/// Trait for type-specific AVX2 dispatch
///
/// # Safety
/// Every `*_impl` requires a CPU with AVX2.
pub trait Avx2TypeDispatch: Element {
    unsafe fn sum_impl(data: &[Self]) -> f64;

    unsafe fn sum_sq_dev_impl(data: &[Self], center: f64) -> f64;

    unsafe fn binary_impl(op: BinaryOp, a: &[Self], b: &[Self]) -> Vec<Self>;

    unsafe fn binary_scalar_rhs_impl(op: BinaryOp, a: &[Self], s: Self) -> Vec<Self>;
}

impl Avx2TypeDispatch for f32 {
    unsafe fn sum_impl(data: &[f32]) -> f64 {
        super::kernels_f32::sum_f32(data)
    }

    unsafe fn sum_sq_dev_impl(data: &[f32], center: f64) -> f64 {
        super::kernels_f32::sum_sq_dev_f32(data, center)
    }

    unsafe fn binary_impl(op: BinaryOp, a: &[f32], b: &[f32]) -> Vec<f32> {
        super::kernels_f32::binary_f32(op, a, b)
    }

    unsafe fn binary_scalar_rhs_impl(op: BinaryOp, a: &[f32], s: f32) -> Vec<f32> {
        super::kernels_f32::binary_scalar_rhs_f32(op, a, s)
    }
}

impl Avx2TypeDispatch for f64 {
    unsafe fn sum_impl(data: &[f64]) -> f64 {
        super::kernels_f64::sum_f64(data)
    }

    unsafe fn sum_sq_dev_impl(data: &[f64], center: f64) -> f64 {
        super::kernels_f64::sum_sq_dev_f64(data, center)
    }

    unsafe fn binary_impl(op: BinaryOp, a: &[f64], b: &[f64]) -> Vec<f64> {
        super::kernels_f64::binary_f64(op, a, b)
    }

    unsafe fn binary_scalar_rhs_impl(op: BinaryOp, a: &[f64], s: f64) -> Vec<f64> {
        super::kernels_f64::binary_scalar_rhs_f64(op, a, s)
    }
}
