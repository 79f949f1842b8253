//! Backend discovery and per-backend test parametrization
//!
//! - [`Registry`]: the ordered set of backends found by the capability probes
//! - [`available_backends`]: registry entries resolved into namespaces
//! - [`array_api_compatible!`]: declares a test that runs on every backend
//!
//! # Example
//!
//! ```rust,ignore
//! use xp_testing::array_api_compatible;
//!
//! array_api_compatible! {
//!     fn std_of_constant_is_zero(xp, device, to_reference) {
//!         let x = xp.asarray(&[3.0; 4], device, xp.default_dtype())?;
//!         let s = to_reference(&xp.std(&x, 0.0)?)?;
//!         anyhow::ensure!(s[0] == 0.0);
//!         Ok(())
//!     }
//! }
//! ```

pub mod config;
pub mod enumerate;
pub mod logging;
pub mod marker;
pub mod registry;

pub use config::HarnessConfig;
pub use enumerate::{available_backends, resolve, BackendParam};
pub use logging::init_test_logging;
pub use marker::{
    run_per_backend, to_reference, BackendFailure, CompatibilityFailures, ToReference,
};
pub use registry::{BackendEntry, BackendInfo, Registry};

// Used by the marker macro
pub use anyhow;
pub use xp_core::{Device, Namespace};
