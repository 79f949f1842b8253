//! Host compute primitives shared by the CPU backends
//!
//! Every operation has a scalar default; accelerated backends override the
//! hot ones. Reductions widen to `f64` before accumulating.

use crate::numeric::Element;

/// Elementwise binary operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Subtract,
    Divide,
}

impl BinaryOp {
    #[inline]
    pub fn apply<E: Element>(self, a: E, b: E) -> E {
        match self {
            BinaryOp::Subtract => a - b,
            BinaryOp::Divide => a / b,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Subtract => "subtract",
            BinaryOp::Divide => "divide",
        }
    }
}

/// Unified trait for host computational primitives
///
/// Implemented by the scalar backend for every element type and by the AVX2
/// backend for `f32`/`f64` when compiled with the `avx2` feature.
pub trait ComputePrimitives<E: Element>: Clone + Send + Sync {
    /// Get the name of this backend
    fn backend_name(&self) -> &'static str;

    /// Sum all elements, accumulated in f64
    fn sum(&self, data: &[E]) -> f64 {
        data.iter().fold(0.0, |acc, &x| acc + x.widen())
    }

    /// Σ (x - center)²
    fn sum_sq_dev(&self, data: &[E], center: f64) -> f64 {
        data.iter().fold(0.0, |acc, &x| {
            let d = x.widen() - center;
            acc + d * d
        })
    }

    /// Arithmetic mean; NaN for an empty slice
    fn mean(&self, data: &[E]) -> f64 {
        if data.is_empty() {
            return f64::NAN;
        }
        self.sum(data) / data.len() as f64
    }

    /// Variance with `correction` degrees of freedom removed
    ///
    /// No guard on `n - correction`: a non-positive divisor yields inf or NaN
    /// and the caller decides whether that is an error.
    fn variance(&self, data: &[E], correction: f64) -> f64 {
        let mean = self.mean(data);
        self.sum_sq_dev(data, mean) / (data.len() as f64 - correction)
    }

    /// a[i] op b[i]
    fn binary(&self, op: BinaryOp, a: &[E], b: &[E]) -> Vec<E> {
        debug_assert_eq!(a.len(), b.len(), "Operands must have same length");
        a.iter().zip(b.iter()).map(|(&x, &y)| op.apply(x, y)).collect()
    }

    /// a[i] op s
    fn binary_scalar_rhs(&self, op: BinaryOp, a: &[E], s: E) -> Vec<E> {
        a.iter().map(|&x| op.apply(x, s)).collect()
    }

    /// s op b[i]
    fn binary_scalar_lhs(&self, op: BinaryOp, s: E, b: &[E]) -> Vec<E> {
        b.iter().map(|&y| op.apply(s, y)).collect()
    }
}
