//! AVX2 backend implementation
//!
//! Type-specific kernels live in `f32`/`f64`; `utils` holds shared lane reductions and `dispatch` routes the generic
//! trait methods to them at compile time.

#[cfg(all(target_arch = "x86_64", feature = "avx2"))]
mod dispatch;
#[cfg(all(target_arch = "x86_64", feature = "avx2"))]
mod kernels_f32;
#[cfg(all(target_arch = "x86_64", feature = "avx2"))]
mod kernels_f64;
#[cfg(all(target_arch = "x86_64", feature = "avx2"))]
mod utils;

use crate::error::{Error, Result};
use crate::primitives::ComputePrimitives;

/// AVX2 backend for x86_64 processors
#[derive(Clone, Copy, Debug)]
pub struct Avx2Backend {
    _private: (),
}

impl Avx2Backend {
    /// Create a new AVX2 backend, checking CPU support first
    pub fn try_new() -> Result<Self> {
        #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
        {
            if !is_x86_feature_detected!("avx2") {
                return Err(Error::unavailable(
                    "avx2",
                    "CPU doesn't support AVX2 instructions",
                ));
            }
            Ok(Self { _private: () })
        }
        #[cfg(not(all(target_arch = "x86_64", feature = "avx2")))]
        {
            Err(Error::unavailable(
                "avx2",
                "not compiled with AVX2 support",
            ))
        }
    }
}

// AVX2 implementations delegate to type-specific modules via compile-time dispatch
#[cfg(all(target_arch = "x86_64", feature = "avx2"))]
impl<E> ComputePrimitives<E> for Avx2Backend
where
    E: self::dispatch::Avx2TypeDispatch,
{
    fn backend_name(&self) -> &'static str {
        "avx2"
    }

    fn sum(&self, data: &[E]) -> f64 {
        // Safety: CPU support checked in try_new()
        unsafe { E::sum_impl(data) }
    }

    fn sum_sq_dev(&self, data: &[E], center: f64) -> f64 {
        // Safety: CPU support checked in try_new()
        unsafe { E::sum_sq_dev_impl(data, center) }
    }

    fn binary(&self, op: crate::primitives::BinaryOp, a: &[E], b: &[E]) -> Vec<E> {
        debug_assert_eq!(a.len(), b.len(), "Operands must have same length");
        // Safety: CPU support checked in try_new()
        unsafe { E::binary_impl(op, a, b) }
    }

    fn binary_scalar_rhs(&self, op: crate::primitives::BinaryOp, a: &[E], s: E) -> Vec<E> {
        // Safety: CPU support checked in try_new()
        unsafe { E::binary_scalar_rhs_impl(op, a, s) }
    }
}

// Fallback for non-AVX2 builds; try_new() never succeeds there
#[cfg(not(all(target_arch = "x86_64", feature = "avx2")))]
impl<E: crate::numeric::Element> ComputePrimitives<E> for Avx2Backend {
    fn backend_name(&self) -> &'static str {
        "avx2 (unavailable)"
    }
}
