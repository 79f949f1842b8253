//! Enumerator and per-backend runner over hand-built registries

mod common;

use common::{boxed, FakeProbe, TensorProbe};
use xp_core::{ArrayModule, DType, Device, NdarrayProbe, StrictProbe};
use xp_testing::{available_backends, run_per_backend, Registry};

#[test]
fn test_single_backend_yields_one_record() {
    let registry = Registry::from_probes(&[boxed(NdarrayProbe)]).unwrap();
    let params = available_backends(&registry)
        .collect::<xp_core::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name, "ndarray");
    assert_eq!(params[0].device, Device::Cpu);
    assert_eq!(params[0].namespace.name(), "ndarray");
}

#[test]
fn test_order_follows_insertion() {
    let probes = vec![
        boxed(StrictProbe),
        boxed(FakeProbe::present("nd-alias", ArrayModule::Ndarray, &[("nd-alias", Device::Cpu)])),
        boxed(NdarrayProbe),
    ];
    let registry = Registry::from_probes(&probes).unwrap();
    for _ in 0..3 {
        let names: Vec<String> = available_backends(&registry)
            .map(|p| p.unwrap().name)
            .collect();
        assert_eq!(names, vec!["strict", "nd-alias", "ndarray"]);
    }
}

#[test]
fn test_enumerator_is_lazy() {
    let registry = Registry::from_probes(&[boxed(NdarrayProbe), boxed(StrictProbe)]).unwrap();
    let mut params = available_backends(&registry);
    assert_eq!(params.next().unwrap().unwrap().name, "ndarray");
    assert_eq!(params.next().unwrap().unwrap().name, "strict");
    assert!(params.next().is_none());
}

#[test]
fn test_unresolvable_entry_yields_error_and_others_continue() {
    // The cuda placement is served by a cpu-only module
    let probes = vec![boxed(TensorProbe { gpu_present: true }), boxed(StrictProbe)];
    let registry = Registry::from_probes(&probes).unwrap();
    let results: Vec<_> = available_backends(&registry).collect();

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    let err = results[1].as_ref().unwrap_err().to_string();
    assert!(err.contains("tensor[cuda]"), "error should name the backend: {err}");
    assert!(results[2].is_ok());
}

#[test]
fn test_runner_reports_unresolvable_backend() {
    let probes = vec![boxed(TensorProbe { gpu_present: true })];
    let registry = Registry::from_probes(&probes).unwrap();
    let err = run_per_backend(&registry, |xp, device, _| {
        xp.scalar(1.0, device, DType::Float64)?;
        Ok(())
    })
    .unwrap_err();

    assert_eq!(err.total, 2);
    assert_eq!(err.failures.len(), 1);
    assert_eq!(err.failures[0].name, "tensor[cuda]");
    assert_eq!(err.failures[0].device, None);
}
