//! Backend-agnostic numerical code and the harness that tests it everywhere
//!
//! This umbrella crate re-exports the workspace crates:
//!
//! - [`xp_core`]: dtypes, devices, arrays, the `ArrayNamespace`
//!   trait and the concrete backends
//! - [`xp_testing`]: backend registry, enumerator and the
//!   `array_api_compatible!` marker
//!
//! plus [`normalize`], the example function written once against the
//! namespace interface.
//!
//! # Example
//!
//! ```rust
//! use xp_harness::prelude::*;
//!
//! let x = ArrayModule::Ndarray
//!     .asarray(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Device::Cpu, DType::Float64)
//!     .unwrap();
//! let z = normalize(&x).unwrap();
//! let xp = get_namespace(&[&z]).unwrap();
//! assert!(xp.item(&xp.mean(&z).unwrap()).unwrap().abs() < 1e-12);
//! ```

pub mod normalize;

pub use xp_core;
pub use xp_testing;

pub use normalize::normalize;
pub use xp_core::{get_namespace, Array, ArrayModule, ArrayNamespace, DType, Device, Error, Result};
pub use xp_testing::{array_api_compatible, available_backends, Registry};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::normalize;
    pub use xp_core::prelude::*;
    pub use xp_testing::{array_api_compatible, available_backends, Registry};
}
