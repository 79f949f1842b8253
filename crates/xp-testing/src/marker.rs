//! Run one test body against every available backend
//!
//! [`array_api_compatible!`](crate::array_api_compatible) declares a
//! `#[test]` whose body runs once per registry entry. Each run receives the
//! resolved namespace, the device, and [`to_reference`] for comparing results
//! against plain `ndarray` values. A failing backend does not stop the
//! others; all failures are reported together when the test ends.

use crate::enumerate::available_backends;
use crate::registry::Registry;
use ndarray::Array1;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use xp_core::{get_namespace, Array, Device, Namespace, Result};

/// Signature of the reference conversion handed to every test body
pub type ToReference = fn(&Array) -> Result<Array1<f64>>;

/// Copy any backend's array into a baseline `ndarray` vector
///
/// 0-d arrays become a one-element vector.
pub fn to_reference(array: &Array) -> Result<Array1<f64>> {
    let xp = get_namespace(&[array])?;
    Ok(Array1::from_vec(xp.to_vec(array)?))
}

/// One backend that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFailure {
    pub name: String,
    /// `None` when the backend could not even be resolved
    pub device: Option<Device>,
    pub message: String,
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.device {
            Some(device) => write!(f, "[{} on {}] {}", self.name, device, self.message),
            None => write!(f, "[{}] {}", self.name, self.message),
        }
    }
}

/// Failures collected across a per-backend run
#[derive(Debug, Error)]
#[error("{}:{}", summary(*.total, .failures), render(.failures))]
pub struct CompatibilityFailures {
    pub total: usize,
    pub failures: Vec<BackendFailure>,
}

fn summary(total: usize, failures: &[BackendFailure]) -> String {
    if total == 0 {
        "no backends ran".to_string()
    } else {
        format!("{} of {total} backends failed", failures.len())
    }
}

fn render(failures: &[BackendFailure]) -> String {
    failures.iter().map(|f| format!("\n  {f}")).collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "test body panicked".to_string()
    }
}

/// Run `body` once per registry entry
///
/// Returns the names of the backends that passed, or every failure labelled
/// with its backend and device. Panics inside `body` count as failures, and
/// an empty registry fails outright since nothing would run.
pub fn run_per_backend<F>(
    registry: &Registry,
    body: F,
) -> std::result::Result<Vec<String>, CompatibilityFailures>
where
    F: Fn(&Namespace, Device, ToReference) -> anyhow::Result<()>,
{
    if registry.is_empty() {
        return Err(CompatibilityFailures {
            total: 0,
            failures: vec![BackendFailure {
                name: "<none>".to_string(),
                device: None,
                message: "no backends registered; check XP_BACKENDS and XP_SKIP_BACKENDS"
                    .to_string(),
            }],
        });
    }

    let mut passed = Vec::new();
    let mut failures = Vec::new();

    for (entry, param) in registry.iter().zip(available_backends(registry)) {
        let param = match param {
            Ok(param) => param,
            Err(e) => {
                failures.push(BackendFailure {
                    name: entry.name().to_string(),
                    device: None,
                    message: format!("{e:#}"),
                });
                continue;
            }
        };

        let span = tracing::info_span!("backend", name = %param.name, device = %param.device);
        let _guard = span.enter();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            body(&param.namespace, param.device, to_reference)
        }));
        let message = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(format!("{e:#}")),
            Err(payload) => Some(format!("panicked: {}", panic_message(payload.as_ref()))),
        };

        match message {
            None => {
                tracing::debug!("passed");
                passed.push(param.name);
            }
            Some(message) => {
                tracing::warn!(%message, "failed");
                failures.push(BackendFailure {
                    name: param.name,
                    device: Some(param.device),
                    message,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(passed)
    } else {
        Err(CompatibilityFailures {
            total: registry.len(),
            failures,
        })
    }
}

/// Declare tests that run once per available backend
///
/// Each function receives the namespace, the device, and the reference
/// conversion, and returns `anyhow::Result<()>`:
///
/// ```rust,ignore
/// use xp_testing::array_api_compatible;
///
/// array_api_compatible! {
///     fn mean_of_constant(xp, device, to_reference) {
///         let x = xp.asarray(&[2.0, 2.0], device, xp.default_dtype())?;
///         let m = to_reference(&xp.mean(&x)?)?;
///         anyhow::ensure!(m[0] == 2.0);
///         Ok(())
///     }
/// }
/// ```
///
/// Tests use [`Registry::shared`] unless a leading `registry = <expr>;`
/// supplies one. The expression is evaluated inside every test and may be a
/// `Registry` or a `&Registry`:
///
/// ```rust,ignore
/// array_api_compatible! {
///     registry = Registry::detect_with(&strict_only_config()).unwrap();
///
///     fn runs_on_strict(xp, device, _to_reference) { /* ... */ Ok(()) }
/// }
/// ```
#[macro_export]
macro_rules! array_api_compatible {
    (
        registry = $registry:expr;
        $(
            $(#[$meta:meta])*
            fn $name:ident($xp:ident, $device:ident, $to_reference:ident) $body:block
        )*
    ) => {
        $(
            $(#[$meta])*
            #[test]
            fn $name() {
                $crate::init_test_logging();
                let registry = $registry;
                $crate::array_api_compatible!(@run &registry, $xp, $device, $to_reference, $body);
            }
        )*
    };
    ($(
        $(#[$meta:meta])*
        fn $name:ident($xp:ident, $device:ident, $to_reference:ident) $body:block
    )*) => {
        $(
            $(#[$meta])*
            #[test]
            fn $name() {
                $crate::init_test_logging();
                let registry = match $crate::Registry::shared() {
                    Ok(registry) => registry,
                    Err(e) => panic!("backend registry unavailable: {e}"),
                };
                $crate::array_api_compatible!(@run registry, $xp, $device, $to_reference, $body);
            }
        )*
    };
    (@run $registry:expr, $xp:ident, $device:ident, $to_reference:ident, $body:block) => {
        let outcome = $crate::run_per_backend(
            $registry,
            |$xp: &$crate::Namespace,
             $device: $crate::Device,
             $to_reference: $crate::ToReference|
             -> $crate::anyhow::Result<()> { $body },
        );
        if let Err(failures) = outcome {
            panic!("{failures}");
        }
    };
}
