//! Array namespaces and the backends behind them
//!
//! Numerical code in this workspace never names an array library. It asks an
//! [`Array`] for its namespace with [`get_namespace`] and calls operations
//! through the [`ArrayNamespace`] trait, so the same function runs unchanged
//! on every backend.
//!
//! # Architecture Overview
//!
//! 1. **Primitives** - host kernels behind `ComputePrimitives<E>` (scalar and
//!    AVX2), dispatched at compile time
//! 2. **Backends** - concrete array families (`ndarray`, `strict`, `simd`,
//!    `wgpu`) and their namespace adapters
//! 3. **Probes** - one capability probe per family, reporting which backends
//!    and devices exist in this process
//!
//! # Features
//!
//! - `avx2` (alias `simd`): the accelerated host backend, runtime-detected
//! - `gpu`: the wgpu runtime, the `wgpu` backend and `simd[cuda]`
//!
//! # Example
//!
//! ```rust
//! use xp_core::{get_namespace, ArrayModule, ArrayNamespace, DType, Device};
//!
//! let x = ArrayModule::Strict
//!     .asarray(&[1.0, 2.0, 3.0], Device::Cpu, DType::Float64)
//!     .unwrap();
//! let xp = get_namespace(&[&x]).unwrap();
//! let mean = xp.mean(&x).unwrap();
//! assert_eq!(xp.item(&mean).unwrap(), 2.0);
//! ```

pub mod array;
pub mod backends;
pub mod device;
pub mod error;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod namespace;
pub mod numeric;
pub mod primitives;
pub mod probe;

// Re-export core types
pub use array::Array;
pub use backends::{ArrayModule, NdarrayNamespace, StrictNamespace};
pub use device::{DType, Device};
pub use error::{Error, Result};
pub use namespace::{get_namespace, ArrayNamespace, Namespace};
pub use numeric::{Element, HostBuffer};
pub use primitives::{Avx2Backend, BinaryOp, ComputePrimitives, ScalarBackend};
pub use probe::{
    builtin_probes, CapabilityProbe, Detection, NdarrayProbe, Placement, ProbeOptions,
    SimdProbe, StrictProbe, WgpuProbe,
};

#[cfg(feature = "avx2")]
pub use backends::{SimdModule, SimdNamespace};
#[cfg(feature = "gpu")]
pub use backends::WgpuNamespace;
#[cfg(feature = "gpu")]
pub use gpu::{GpuBuffer, GpuRuntime};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        get_namespace,
        Array,
        ArrayModule,
        ArrayNamespace,
        // Device placement
        DType,
        Device,
        Namespace,
        Result,
    };

    pub use crate::error::Error;
}
