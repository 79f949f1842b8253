//! AVX2 kernels for f64

use super::utils::horizontal_sum_pd;
use crate::primitives::BinaryOp;
use std::arch::x86_64::*;

/// AVX2 sum for f64
#[target_feature(enable = "avx2")]
pub unsafe fn sum_f64(data: &[f64]) -> f64 {
    let n = data.len();
    let chunks = n / 4;

    let mut acc = _mm256_setzero_pd();
    for i in 0..chunks {
        let v = _mm256_loadu_pd(data.as_ptr().add(i * 4));
        acc = _mm256_add_pd(acc, v);
    }

    let mut sum = horizontal_sum_pd(acc);
    for &x in &data[chunks * 4..] {
        sum += x;
    }
    sum
}

/// AVX2 Σ (x - center)² for f64
#[target_feature(enable = "avx2")]
pub unsafe fn sum_sq_dev_f64(data: &[f64], center: f64) -> f64 {
    let n = data.len();
    let chunks = n / 4;
    let c = _mm256_set1_pd(center);

    let mut acc = _mm256_setzero_pd();
    for i in 0..chunks {
        let v = _mm256_loadu_pd(data.as_ptr().add(i * 4));
        let d = _mm256_sub_pd(v, c);
        acc = _mm256_add_pd(acc, _mm256_mul_pd(d, d));
    }

    let mut sum = horizontal_sum_pd(acc);
    for &x in &data[chunks * 4..] {
        let d = x - center;
        sum += d * d;
    }
    sum
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn apply_pd(op: BinaryOp, a: __m256d, b: __m256d) -> __m256d {
    match op {
        BinaryOp::Subtract => _mm256_sub_pd(a, b),
        BinaryOp::Divide => _mm256_div_pd(a, b),
    }
}

/// AVX2 elementwise a op b for f64
#[target_feature(enable = "avx2")]
pub unsafe fn binary_f64(op: BinaryOp, a: &[f64], b: &[f64]) -> Vec<f64> {
    let n = a.len().min(b.len());
    let chunks = n / 4;
    let mut out = vec![0.0f64; n];

    for i in 0..chunks {
        let off = i * 4;
        let va = _mm256_loadu_pd(a.as_ptr().add(off));
        let vb = _mm256_loadu_pd(b.as_ptr().add(off));
        _mm256_storeu_pd(out.as_mut_ptr().add(off), apply_pd(op, va, vb));
    }
    for i in chunks * 4..n {
        out[i] = op.apply(a[i], b[i]);
    }
    out
}

/// AVX2 elementwise a op s for f64
#[target_feature(enable = "avx2")]
pub unsafe fn binary_scalar_rhs_f64(op: BinaryOp, a: &[f64], s: f64) -> Vec<f64> {
    let n = a.len();
    let chunks = n / 4;
    let vs = _mm256_set1_pd(s);
    let mut out = vec![0.0f64; n];

    for i in 0..chunks {
        let off = i * 4;
        let va = _mm256_loadu_pd(a.as_ptr().add(off));
        _mm256_storeu_pd(out.as_mut_ptr().add(off), apply_pd(op, va, vs));
    }
    for i in chunks * 4..n {
        out[i] = op.apply(a[i], s);
    }
    out
}
