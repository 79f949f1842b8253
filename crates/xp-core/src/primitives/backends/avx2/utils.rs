//! Lane reductions shared by the AVX2 kernels

use std::arch::x86_64::*;

/// Horizontal sum of a __m256d (4 f64s)
#[inline]
#[target_feature(enable = "avx2")]
pub unsafe fn horizontal_sum_pd(v: __m256d) -> f64 {
    let high = _mm256_extractf128_pd(v, 1);
    let low = _mm256_castpd256_pd128(v);
    let sum128 = _mm_add_pd(high, low);
    let sum = _mm_hadd_pd(sum128, sum128);
    _mm_cvtsd_f64(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_sum_pd() {
        if !is_x86_feature_detected!("avx2") {
            return;
        }
        let sum = unsafe { horizontal_sum_pd(_mm256_setr_pd(1.0, 2.0, 3.0, 4.5)) };
        assert_eq!(sum, 10.5);
    }
}
