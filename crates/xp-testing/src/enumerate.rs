//! Registry entries as test parameters
//!
//! For every entry the enumerator builds a sample array with the raw module
//! on the entry's device and resolves the namespace from that array. The
//! namespace a test receives is therefore the one `get_namespace` would pick
//! for arrays created on that backend.

use crate::registry::{BackendEntry, Registry};
use xp_core::{get_namespace, Device, Error, Namespace, Result};

/// Everything a parametrized test needs for one backend
#[derive(Debug, Clone)]
pub struct BackendParam {
    pub namespace: Namespace,
    pub device: Device,
    pub name: String,
}

/// Resolve the namespace adapter for one entry
pub fn resolve(entry: &BackendEntry) -> Result<BackendParam> {
    let sample = entry.module().sample(entry.device())?;
    let namespace = get_namespace(&[&sample])?;
    Ok(BackendParam {
        namespace,
        device: entry.device(),
        name: entry.name().to_string(),
    })
}

/// Lazily yield one parameter per registry entry, in insertion order
///
/// An entry whose namespace cannot be resolved yields an `Err` naming the
/// backend and device; the remaining entries are unaffected.
pub fn available_backends(registry: &Registry) -> impl Iterator<Item = Result<BackendParam>> + '_ {
    registry.iter().map(|entry| {
        resolve(entry).map_err(|e| {
            log::debug!("backend '{}' failed to resolve: {e}", entry.name());
            Error::Other(anyhow::Error::new(e).context(format!(
                "resolving namespace for backend '{}' on {}",
                entry.name(),
                entry.device()
            )))
        })
    })
}
