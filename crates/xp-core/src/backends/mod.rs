//! Concrete array backends
//!
//! [`ArrayModule`] is the raw handle a capability probe hands back: it can
//! build arrays, and every array it builds points back at it. The
//! standardized adapter is obtained from an array through
//! [`get_namespace`](crate::get_namespace).

mod host;
pub mod nd;
pub mod strict;

#[cfg(feature = "avx2")]
pub mod simd;
#[cfg(feature = "gpu")]
pub mod wgpu_array;

use crate::array::Array;
use crate::device::{DType, Device};
use crate::error::Result;
use crate::namespace::Namespace;
use std::sync::Arc;

pub use nd::NdarrayNamespace;
pub use strict::StrictNamespace;

#[cfg(feature = "avx2")]
pub use simd::{SimdModule, SimdNamespace};
#[cfg(feature = "gpu")]
pub use wgpu_array::WgpuNamespace;

/// Raw handle to one backend family
#[derive(Debug, Clone)]
pub enum ArrayModule {
    /// Baseline numerics on `ndarray`
    Ndarray,
    /// Strict-compliance reference implementation
    Strict,
    /// AVX2 host kernels, optionally with a GPU runtime for `cuda`
    #[cfg(feature = "avx2")]
    Simd(SimdModule),
    /// GPU-only arrays on a wgpu device
    #[cfg(feature = "gpu")]
    Wgpu(Arc<crate::gpu::GpuRuntime>),
}

impl ArrayModule {
    /// Backend family name
    pub fn name(&self) -> &'static str {
        match self {
            ArrayModule::Ndarray => nd::NAME,
            ArrayModule::Strict => strict::NAME,
            #[cfg(feature = "avx2")]
            ArrayModule::Simd(_) => simd::NAME,
            #[cfg(feature = "gpu")]
            ArrayModule::Wgpu(_) => wgpu_array::NAME,
        }
    }

    /// The namespace adapter for arrays of this module
    pub fn namespace(&self) -> Namespace {
        match self {
            ArrayModule::Ndarray => Arc::new(NdarrayNamespace),
            ArrayModule::Strict => Arc::new(StrictNamespace),
            #[cfg(feature = "avx2")]
            ArrayModule::Simd(module) => Arc::new(SimdNamespace::new(module.clone())),
            #[cfg(feature = "gpu")]
            ArrayModule::Wgpu(runtime) => Arc::new(WgpuNamespace::new(Arc::clone(runtime))),
        }
    }

    /// Build a 1-d array with this module
    pub fn asarray(&self, values: &[f64], device: Device, dtype: DType) -> Result<Array> {
        self.namespace().asarray(values, device, dtype)
    }

    /// A 0-d sample array on `device` in the module's default dtype
    pub fn sample(&self, device: Device) -> Result<Array> {
        let xp = self.namespace();
        xp.scalar(1.0, device, xp.default_dtype())
    }
}
