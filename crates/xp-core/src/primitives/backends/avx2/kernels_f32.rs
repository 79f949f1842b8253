//! AVX2 kernels for f32
//!
//! Reductions widen each 4-lane group to f64 before accumulating.

use super::utils::horizontal_sum_pd;
use crate::primitives::BinaryOp;
use std::arch::x86_64::*;

/// AVX2 sum for f32, accumulated in f64
#[target_feature(enable = "avx2")]
pub unsafe fn sum_f32(data: &[f32]) -> f64 {
    let n = data.len();
    let chunks = n / 4;

    let mut acc = _mm256_setzero_pd();
    for i in 0..chunks {
        let v = _mm256_cvtps_pd(_mm_loadu_ps(data.as_ptr().add(i * 4)));
        acc = _mm256_add_pd(acc, v);
    }

    let mut sum = horizontal_sum_pd(acc);
    for &x in &data[chunks * 4..] {
        sum += x as f64;
    }
    sum
}

/// AVX2 Σ (x - center)² for f32, accumulated in f64
#[target_feature(enable = "avx2")]
pub unsafe fn sum_sq_dev_f32(data: &[f32], center: f64) -> f64 {
    let n = data.len();
    let chunks = n / 4;
    let c = _mm256_set1_pd(center);

    let mut acc = _mm256_setzero_pd();
    for i in 0..chunks {
        let v = _mm256_cvtps_pd(_mm_loadu_ps(data.as_ptr().add(i * 4)));
        let d = _mm256_sub_pd(v, c);
        acc = _mm256_add_pd(acc, _mm256_mul_pd(d, d));
    }

    let mut sum = horizontal_sum_pd(acc);
    for &x in &data[chunks * 4..] {
        let d = x as f64 - center;
        sum += d * d;
    }
    sum
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn apply_ps(op: BinaryOp, a: __m256, b: __m256) -> __m256 {
    match op {
        BinaryOp::Subtract => _mm256_sub_ps(a, b),
        BinaryOp::Divide => _mm256_div_ps(a, b),
    }
}

/// AVX2 elementwise a op b for f32
#[target_feature(enable = "avx2")]
pub unsafe fn binary_f32(op: BinaryOp, a: &[f32], b: &[f32]) -> Vec<f32> {
    let n = a.len().min(b.len());
    let chunks = n / 8;
    let mut out = vec![0.0f32; n];

    for i in 0..chunks {
        let off = i * 8;
        let va = _mm256_loadu_ps(a.as_ptr().add(off));
        let vb = _mm256_loadu_ps(b.as_ptr().add(off));
        _mm256_storeu_ps(out.as_mut_ptr().add(off), apply_ps(op, va, vb));
    }
    for i in chunks * 8..n {
        out[i] = op.apply(a[i], b[i]);
    }
    out
}

/// AVX2 elementwise a op s for f32
#[target_feature(enable = "avx2")]
pub unsafe fn binary_scalar_rhs_f32(op: BinaryOp, a: &[f32], s: f32) -> Vec<f32> {
    let n = a.len();
    let chunks = n / 8;
    let vs = _mm256_set1_ps(s);
    let mut out = vec![0.0f32; n];

    for i in 0..chunks {
        let off = i * 8;
        let va = _mm256_loadu_ps(a.as_ptr().add(off));
        _mm256_storeu_ps(out.as_mut_ptr().add(off), apply_ps(op, va, vs));
    }
    for i in chunks * 8..n {
        out[i] = op.apply(a[i], s);
    }
    out
}
