//! Registry construction from capability probes

mod common;

use common::{boxed, FakeProbe, TensorProbe};
use proptest::prelude::*;
use xp_core::{builtin_probes, ArrayModule, Device, Error, NdarrayProbe, StrictProbe};
use xp_testing::{HarnessConfig, Registry};

#[test]
fn test_only_baseline_backend() {
    let probes = vec![
        boxed(NdarrayProbe),
        boxed(FakeProbe::absent("strict")),
        boxed(FakeProbe::absent("tensor")),
        boxed(FakeProbe::absent("gpu-array")),
    ];
    let registry = Registry::from_probes(&probes).unwrap();

    assert_eq!(registry.len(), 1);
    let entry = &registry.entries()[0];
    assert_eq!(entry.name(), "ndarray");
    assert_eq!(entry.device(), Device::Cpu);
}

#[test]
fn test_tensor_backend_without_gpu() {
    let probes = vec![
        boxed(NdarrayProbe),
        boxed(StrictProbe),
        boxed(TensorProbe { gpu_present: false }),
    ];
    let registry = Registry::from_probes(&probes).unwrap();

    assert_eq!(registry.names(), vec!["ndarray", "strict", "tensor[cpu]"]);
    assert!(registry.iter().all(|e| e.device() == Device::Cpu));
}

#[test]
fn test_tensor_backend_with_gpu() {
    let probes = vec![boxed(NdarrayProbe), boxed(TensorProbe { gpu_present: true })];
    let registry = Registry::from_probes(&probes).unwrap();
    assert_eq!(registry.names(), vec!["ndarray", "tensor[cpu]", "tensor[cuda]"]);
    assert_eq!(registry.get("tensor[cuda]").unwrap().device(), Device::Cuda);
}

#[test]
fn test_disabled_gpu_drops_cuda_placement() {
    let probes = vec![boxed(TensorProbe { gpu_present: true })];
    let config = HarnessConfig {
        allow_gpu: false,
        ..HarnessConfig::default()
    };
    let registry = Registry::from_probes_with(&probes, &config).unwrap();
    assert_eq!(registry.names(), vec!["tensor[cpu]"]);
}

#[test]
fn test_allowlist_by_family() {
    let probes = vec![
        boxed(NdarrayProbe),
        boxed(StrictProbe),
        boxed(TensorProbe { gpu_present: true }),
    ];
    let config = HarnessConfig {
        include: Some(vec!["tensor".into()]),
        ..HarnessConfig::default()
    };
    let registry = Registry::from_probes_with(&probes, &config).unwrap();
    assert_eq!(registry.names(), vec!["tensor[cpu]", "tensor[cuda]"]);
}

#[test]
fn test_misspelled_allowlist_is_a_config_error() {
    let config = HarnessConfig {
        include: Some(vec!["ndaray".into()]),
        ..HarnessConfig::default()
    };
    match Registry::from_probes_with(&builtin_probes(), &config) {
        Err(Error::Config(message)) => assert!(message.contains("ndaray"), "{message}"),
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn test_allowlist_accepts_known_but_absent_backends() {
    let probes = vec![
        boxed(NdarrayProbe),
        boxed(FakeProbe::absent("gpu-array")),
        boxed(TensorProbe { gpu_present: false }),
    ];
    let config = HarnessConfig {
        include: Some(vec!["ndarray".into(), "gpu-array".into(), "tensor[cuda]".into()]),
        ..HarnessConfig::default()
    };
    let registry = Registry::from_probes_with(&probes, &config).unwrap();
    assert_eq!(registry.names(), vec!["ndarray"]);
}

#[test]
fn test_all_probes_absent_is_not_an_error() {
    let probes = vec![boxed(FakeProbe::absent("a")), boxed(FakeProbe::absent("b"))];
    let registry = Registry::from_probes(&probes).unwrap();
    assert!(registry.is_empty());
    assert_eq!(registry.to_json().unwrap(), "[]");
}

#[test]
fn test_detect_is_deterministic() {
    let first = Registry::detect().unwrap();
    let second = Registry::detect().unwrap();
    assert_eq!(first.names(), second.names());
    assert_eq!(first.report(), second.report());
}

#[test]
fn test_shared_registry_is_built_once() {
    let a = Registry::shared().unwrap();
    let b = Registry::shared().unwrap();
    assert!(std::ptr::eq(a, b));
}

proptest! {
    // Every present probe shows up exactly once, absent ones never do,
    // and the order is the probe order.
    #[test]
    fn prop_registry_completeness(present in proptest::collection::vec(any::<bool>(), 0..8)) {
        const NAMES: [&str; 8] = ["b0", "b1", "b2", "b3", "b4", "b5", "b6", "b7"];
        let probes: Vec<_> = present
            .iter()
            .zip(NAMES)
            .map(|(&ok, name)| {
                if ok {
                    boxed(FakeProbe::present(name, ArrayModule::Strict, &[(name, Device::Cpu)]))
                } else {
                    boxed(FakeProbe::absent(name))
                }
            })
            .collect();

        let registry = Registry::from_probes(&probes).unwrap();
        let expected: Vec<&str> = present
            .iter()
            .zip(NAMES)
            .filter(|&(&ok, _)| ok)
            .map(|(_, name)| name)
            .collect();
        prop_assert_eq!(registry.names(), expected);
    }
}
