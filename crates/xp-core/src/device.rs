//! Device tags and element dtypes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an array's storage lives
///
/// `Cuda` is the accelerator tag used by every GPU backend, whatever API
/// actually drives the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cpu,
    Cuda,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element type of an array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Float32,
    #[default]
    Float64,
}

impl DType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }

    /// Machine epsilon for this dtype, widened to f64
    pub fn eps(&self) -> f64 {
        match self {
            DType::Float32 => f32::EPSILON as f64,
            DType::Float64 => f64::EPSILON,
        }
    }

    /// Result dtype of a binary operation under float promotion
    pub fn promote(self, other: DType) -> DType {
        if self == DType::Float64 || other == DType::Float64 {
            DType::Float64
        } else {
            DType::Float32
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_promotion() {
        assert_eq!(DType::Float32.promote(DType::Float32), DType::Float32);
        assert_eq!(DType::Float32.promote(DType::Float64), DType::Float64);
        assert_eq!(DType::Float64.promote(DType::Float32), DType::Float64);
        assert_eq!(DType::default(), DType::Float64);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Device::Cuda).unwrap(), "\"cuda\"");
        assert_eq!(serde_json::to_string(&DType::Float32).unwrap(), "\"float32\"");
    }
}
