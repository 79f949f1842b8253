//! Capability probes for array backends
//!
//! Each backend family has one probe. A probe either hands back the raw
//! [`ArrayModule`] together with the (name, device) placements it can serve,
//! or an error explaining why the family is absent. Absence is an expected
//! configuration difference; callers log it and move on.

use crate::backends::ArrayModule;
use crate::device::Device;
use crate::error::Result;
use std::fmt::Debug;

#[cfg(any(not(feature = "avx2"), not(feature = "gpu")))]
use crate::error::Error;
#[cfg(feature = "gpu")]
use crate::gpu::GpuRuntime;
#[cfg(feature = "gpu")]
use std::sync::Arc;

/// A display name bound to a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub name: String,
    pub device: Device,
}

impl Placement {
    pub fn new(name: impl Into<String>, device: Device) -> Self {
        Self {
            name: name.into(),
            device,
        }
    }
}

/// What a successful probe found
#[derive(Debug, Clone)]
pub struct Detection {
    pub module: ArrayModule,
    /// In registration order
    pub placements: Vec<Placement>,
}

impl Detection {
    /// A module served under one name on one device
    pub fn single(module: ArrayModule, name: impl Into<String>, device: Device) -> Self {
        Self {
            module,
            placements: vec![Placement::new(name, device)],
        }
    }
}

/// Knobs that apply to every probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Allow probes to open a GPU device
    pub allow_gpu: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self { allow_gpu: true }
    }
}

/// Detects one backend family
pub trait CapabilityProbe: Send + Sync + Debug {
    /// Family name, e.g. `"simd"`
    fn family(&self) -> &'static str;

    /// Locate the backend, or explain why it is missing
    fn probe(&self, options: &ProbeOptions) -> Result<Detection>;
}

/// Baseline numerics on `ndarray`; always present
#[derive(Debug, Clone, Copy, Default)]
pub struct NdarrayProbe;

impl CapabilityProbe for NdarrayProbe {
    fn family(&self) -> &'static str {
        crate::backends::nd::NAME
    }

    fn probe(&self, _options: &ProbeOptions) -> Result<Detection> {
        Ok(Detection::single(ArrayModule::Ndarray, self.family(), Device::Cpu))
    }
}

/// Strict-compliance reference backend; always present
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictProbe;

impl CapabilityProbe for StrictProbe {
    fn family(&self) -> &'static str {
        crate::backends::strict::NAME
    }

    fn probe(&self, _options: &ProbeOptions) -> Result<Detection> {
        Ok(Detection::single(ArrayModule::Strict, self.family(), Device::Cpu))
    }
}

/// Accelerated backend: `simd[cpu]`, plus `simd[cuda]` when a GPU answers
#[derive(Debug, Clone, Copy, Default)]
pub struct SimdProbe;

impl CapabilityProbe for SimdProbe {
    fn family(&self) -> &'static str {
        "simd"
    }

    #[cfg(feature = "avx2")]
    fn probe(&self, options: &ProbeOptions) -> Result<Detection> {
        let module = crate::backends::SimdModule::try_new()?;
        let mut placements = vec![Placement::new("simd[cpu]", Device::Cpu)];

        #[cfg(feature = "gpu")]
        let module = match gpu_runtime(options) {
            Ok(runtime) => {
                placements.push(Placement::new("simd[cuda]", Device::Cuda));
                module.with_gpu(runtime)
            }
            Err(e) => {
                log::debug!("simd: no cuda placement: {e}");
                module
            }
        };
        #[cfg(not(feature = "gpu"))]
        log::debug!(
            "simd: no cuda placement: built without gpu support (allow_gpu = {})",
            options.allow_gpu
        );

        Ok(Detection {
            module: ArrayModule::Simd(module),
            placements,
        })
    }

    #[cfg(not(feature = "avx2"))]
    fn probe(&self, _options: &ProbeOptions) -> Result<Detection> {
        Err(Error::unavailable("simd", "built without the avx2 feature"))
    }
}

/// GPU-only array backend under `cuda`
#[derive(Debug, Clone, Copy, Default)]
pub struct WgpuProbe;

impl CapabilityProbe for WgpuProbe {
    fn family(&self) -> &'static str {
        "wgpu"
    }

    #[cfg(feature = "gpu")]
    fn probe(&self, options: &ProbeOptions) -> Result<Detection> {
        let runtime = gpu_runtime(options)?;
        log::debug!("wgpu: using adapter '{}'", runtime.adapter_name());
        Ok(Detection::single(ArrayModule::Wgpu(runtime), "wgpu", Device::Cuda))
    }

    #[cfg(not(feature = "gpu"))]
    fn probe(&self, _options: &ProbeOptions) -> Result<Detection> {
        Err(Error::unavailable("wgpu", "built without the gpu feature"))
    }
}

#[cfg(feature = "gpu")]
fn gpu_runtime(options: &ProbeOptions) -> Result<Arc<GpuRuntime>> {
    if !options.allow_gpu {
        return Err(crate::error::Error::unavailable(
            "gpu",
            "GPU probing disabled by configuration",
        ));
    }
    GpuRuntime::shared()
}

/// Probes for every backend family, always-available ones first
pub fn builtin_probes() -> Vec<Box<dyn CapabilityProbe>> {
    vec![
        Box::new(NdarrayProbe),
        Box::new(StrictProbe),
        Box::new(SimdProbe),
        Box::new(WgpuProbe),
    ]
}
