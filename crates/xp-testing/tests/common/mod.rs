//! Shared probes for registry and enumerator tests

#![allow(dead_code)]

use xp_core::{ArrayModule, CapabilityProbe, Detection, Device, Error, Placement, ProbeOptions, Result};

/// A probe whose outcome is fixed up front
#[derive(Debug, Clone)]
pub struct FakeProbe {
    family: &'static str,
    outcome: Option<Detection>,
}

impl FakeProbe {
    pub fn present(family: &'static str, module: ArrayModule, placements: &[(&str, Device)]) -> Self {
        Self {
            family,
            outcome: Some(Detection {
                module,
                placements: placements
                    .iter()
                    .map(|&(name, device)| Placement::new(name, device))
                    .collect(),
            }),
        }
    }

    pub fn absent(family: &'static str) -> Self {
        Self {
            family,
            outcome: None,
        }
    }
}

impl CapabilityProbe for FakeProbe {
    fn family(&self) -> &'static str {
        self.family
    }

    fn probe(&self, _options: &ProbeOptions) -> Result<Detection> {
        self.outcome
            .clone()
            .ok_or_else(|| Error::unavailable(self.family, "not installed"))
    }
}

/// Tensor-style probe: a cpu placement, plus cuda when a GPU is present and allowed
#[derive(Debug, Clone, Copy)]
pub struct TensorProbe {
    pub gpu_present: bool,
}

impl CapabilityProbe for TensorProbe {
    fn family(&self) -> &'static str {
        "tensor"
    }

    fn probe(&self, options: &ProbeOptions) -> Result<Detection> {
        let mut placements = vec![Placement::new("tensor[cpu]", Device::Cpu)];
        if self.gpu_present && options.allow_gpu {
            placements.push(Placement::new("tensor[cuda]", Device::Cuda));
        }
        Ok(Detection {
            module: ArrayModule::Ndarray,
            placements,
        })
    }
}

pub fn boxed<P: CapabilityProbe + 'static>(probe: P) -> Box<dyn CapabilityProbe> {
    Box::new(probe)
}
