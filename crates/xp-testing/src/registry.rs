//! Backend registry
//!
//! The registry is the ordered set of (name, module, device) entries that
//! parametrized tests run against. It is built once from capability probes
//! and never mutated afterwards. Always-available backends come first, in
//! probe order; optional ones follow when their probe succeeds.
//!
//! A probe that fails is not an error. The backend is simply absent, and the
//! reason is logged at debug level.

use crate::config::HarnessConfig;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use xp_core::{builtin_probes, ArrayModule, CapabilityProbe, Device, Error, Result};

/// One backend placement
#[derive(Debug, Clone)]
pub struct BackendEntry {
    name: String,
    family: &'static str,
    module: ArrayModule,
    device: Device,
}

impl BackendEntry {
    pub fn new(name: impl Into<String>, module: ArrayModule, device: Device) -> Self {
        Self {
            name: name.into(),
            family: module.name(),
            module,
            device,
        }
    }

    /// Display name, e.g. `simd[cuda]`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend family of the module
    pub fn family(&self) -> &'static str {
        self.family
    }

    pub fn module(&self) -> &ArrayModule {
        &self.module
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn info(&self) -> BackendInfo {
        BackendInfo {
            name: self.name.clone(),
            family: self.family.to_string(),
            device: self.device,
        }
    }
}

/// Serializable summary of a registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    pub name: String,
    pub family: String,
    pub device: Device,
}

/// Ordered, immutable set of backend entries with unique names
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<BackendEntry>,
}

static SHARED: OnceLock<std::result::Result<Registry, String>> = OnceLock::new();

impl Registry {
    /// Build from explicit probes with the default configuration
    pub fn from_probes(probes: &[Box<dyn CapabilityProbe>]) -> Result<Self> {
        Self::from_probes_with(probes, &HarnessConfig::default())
    }

    /// Build from explicit probes, filtering placements through `config`
    ///
    /// Fails when two placements share a name, or when an allowlist item
    /// names no backend any probe knows about.
    pub fn from_probes_with(
        probes: &[Box<dyn CapabilityProbe>],
        config: &HarnessConfig,
    ) -> Result<Self> {
        let options = config.probe_options();
        let mut registry = Registry::default();
        let mut detected = Vec::new();

        for probe in probes {
            let detection = match probe.probe(&options) {
                Ok(detection) => detection,
                Err(e) => {
                    log::debug!("backend '{}' skipped: {e}", probe.family());
                    continue;
                }
            };

            for placement in detection.placements {
                detected.push(placement.name.clone());
                if !config.admits(&placement.name, probe.family()) {
                    log::debug!("backend '{}' filtered out by configuration", placement.name);
                    continue;
                }
                registry.insert(BackendEntry::new(
                    placement.name,
                    detection.module.clone(),
                    placement.device,
                ))?;
            }
        }

        check_allowlist(probes, &detected, config)?;
        log::debug!("backend registry: {:?}", registry.names());
        Ok(registry)
    }

    /// Probe every builtin backend
    pub fn detect() -> Result<Self> {
        Self::from_probes(&builtin_probes())
    }

    /// Probe every builtin backend under `config`
    pub fn detect_with(config: &HarnessConfig) -> Result<Self> {
        Self::from_probes_with(&builtin_probes(), config)
    }

    /// Process-wide registry, built from the environment on first use
    pub fn shared() -> Result<&'static Registry> {
        SHARED
            .get_or_init(|| {
                HarnessConfig::from_env()
                    .and_then(|config| Self::detect_with(&config))
                    .map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(|reason| Error::Config(reason.clone()))
    }

    fn insert(&mut self, entry: BackendEntry) -> Result<()> {
        if self.get(entry.name()).is_some() {
            return Err(Error::DuplicateBackend(entry.name));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[BackendEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BackendEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&BackendEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name()).collect()
    }

    pub fn report(&self) -> Vec<BackendInfo> {
        self.entries.iter().map(BackendEntry::info).collect()
    }

    /// The report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.report()).map_err(|e| Error::Other(e.into()))
    }
}

/// Every allowlist item must name a probe family, a detected placement, or
/// a placement of a known family such as `simd[cuda]`
fn check_allowlist(
    probes: &[Box<dyn CapabilityProbe>],
    detected: &[String],
    config: &HarnessConfig,
) -> Result<()> {
    let Some(include) = &config.include else {
        return Ok(());
    };
    let known = |item: &str| {
        detected.iter().any(|name| name == item)
            || probes.iter().any(|probe| {
                let family = probe.family();
                item == family
                    || item
                        .strip_prefix(family)
                        .is_some_and(|rest| rest.starts_with('[') && rest.ends_with(']'))
            })
    };
    let unknown: Vec<&str> = include
        .iter()
        .map(String::as_str)
        .filter(|item| !known(item))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} names unknown backends: {}",
            crate::config::BACKENDS_ENV,
            unknown.join(", ")
        )))
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a BackendEntry;
    type IntoIter = std::slice::Iter<'a, BackendEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xp_core::{NdarrayProbe, StrictProbe};

    #[test]
    fn test_baseline_backends_come_first() {
        let registry = Registry::detect().unwrap();
        assert!(registry.len() >= 2);
        assert_eq!(&registry.names()[..2], &["ndarray", "strict"]);
        for entry in &registry.entries()[..2] {
            assert_eq!(entry.device(), Device::Cpu);
        }
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let probes: Vec<Box<dyn CapabilityProbe>> =
            vec![Box::new(NdarrayProbe), Box::new(StrictProbe), Box::new(NdarrayProbe)];
        match Registry::from_probes(&probes) {
            Err(Error::DuplicateBackend(name)) => assert_eq!(name, "ndarray"),
            other => panic!("expected DuplicateBackend, got {other:?}"),
        }
    }

    #[test]
    fn test_report_serializes() {
        let probes: Vec<Box<dyn CapabilityProbe>> = vec![Box::new(StrictProbe)];
        let registry = Registry::from_probes(&probes).unwrap();
        assert_eq!(
            registry.report(),
            vec![BackendInfo {
                name: "strict".into(),
                family: "strict".into(),
                device: Device::Cpu,
            }]
        );
        let json = registry.to_json().unwrap();
        assert!(json.contains("\"device\": \"cpu\""));
        let parsed: Vec<BackendInfo> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, registry.report());
    }

    #[test]
    fn test_config_filters_placements() {
        let config = HarnessConfig {
            exclude: vec!["ndarray".into()],
            ..HarnessConfig::default()
        };
        let registry = Registry::detect_with(&config).unwrap();
        assert!(!registry.contains("ndarray"));
        assert!(registry.contains("strict"));
    }
}
