//! Error types for array namespaces and backends
//!
//! Provides a unified error type for all xp crates.

use crate::device::{DType, Device};
use thiserror::Error;

/// Core error type for array operations and backend discovery
#[derive(Error, Debug)]
pub enum Error {
    /// The backend cannot place arrays on the requested device
    #[error("Unsupported device: backend '{backend}' cannot allocate on {device}")]
    UnsupportedDevice {
        backend: &'static str,
        device: Device,
    },

    /// The backend has no storage for the requested dtype
    #[error("Unsupported dtype: backend '{backend}' has no {dtype} storage")]
    UnsupportedDType {
        backend: &'static str,
        dtype: DType,
    },

    /// Operands carry different dtypes and the backend refuses to promote
    #[error("DType mismatch: {left} and {right}")]
    DTypeMismatch { left: DType, right: DType },

    /// Operands cannot be broadcast together
    #[error("Shape mismatch: {left:?} and {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    /// Operands live on different devices
    #[error("Device mismatch: {left} and {right}")]
    DeviceMismatch { left: Device, right: Device },

    /// Reduction over zero elements
    #[error("Empty reduction: {0} of an empty array")]
    EmptyReduction(&'static str),

    /// The array was produced by a different namespace
    #[error("Foreign array: '{expected}' namespace received an array from '{actual}'")]
    ForeignArray {
        expected: &'static str,
        actual: &'static str,
    },

    /// `get_namespace` was given arrays from more than one namespace
    #[error("Multiple namespaces for array inputs: {0:?}")]
    MixedNamespaces(Vec<&'static str>),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Optional backend not compiled in or not usable on this machine
    #[error("Backend unavailable: {backend}: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },

    /// Registry already holds a backend with this name
    #[error("Duplicate backend: '{0}' is already registered")]
    DuplicateBackend(String),

    /// Accelerator device error (adapter, buffer mapping, submission)
    #[error("Device error: {0}")]
    Device(String),

    /// Harness configuration could not be read
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for a backend that failed its capability probe
    pub fn unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// Create an error for operands that cannot be broadcast
    pub fn shape_mismatch(left: &[usize], right: &[usize]) -> Self {
        Self::ShapeMismatch {
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }

    /// True when the error only says a backend is absent
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedDevice {
            backend: "strict",
            device: Device::Cuda,
        };
        assert_eq!(
            err.to_string(),
            "Unsupported device: backend 'strict' cannot allocate on cuda"
        );

        let err = Error::UnsupportedDType {
            backend: "wgpu",
            dtype: DType::Float64,
        };
        assert_eq!(
            err.to_string(),
            "Unsupported dtype: backend 'wgpu' has no float64 storage"
        );

        let err = Error::DTypeMismatch {
            left: DType::Float32,
            right: DType::Float64,
        };
        assert_eq!(err.to_string(), "DType mismatch: float32 and float64");

        let err = Error::EmptyReduction("mean");
        assert_eq!(err.to_string(), "Empty reduction: mean of an empty array");

        let err = Error::DuplicateBackend("ndarray".to_string());
        assert_eq!(
            err.to_string(),
            "Duplicate backend: 'ndarray' is already registered"
        );
    }

    #[test]
    fn test_error_helper_functions() {
        let err = Error::unavailable("simd", "not compiled with AVX2 support");
        assert!(err.is_unavailable());
        assert_eq!(
            err.to_string(),
            "Backend unavailable: simd: not compiled with AVX2 support"
        );

        let err = Error::shape_mismatch(&[3], &[4]);
        assert!(!err.is_unavailable());
        assert_eq!(err.to_string(), "Shape mismatch: [3] and [4]");
    }

    #[test]
    fn test_error_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("custom error message");
        let err: Error = anyhow_err.into();

        match err {
            Error::Other(_) => {
                assert!(err.to_string().contains("custom error message"));
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_mixed_namespaces_lists_names() {
        let err = Error::MixedNamespaces(vec!["ndarray", "strict"]);
        let msg = err.to_string();
        assert!(msg.contains("ndarray"));
        assert!(msg.contains("strict"));
    }
}
