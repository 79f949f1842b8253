//! Harness configuration from the environment
//!
//! | variable | meaning |
//! |----------|---------|
//! | `XP_BACKENDS` | comma-separated allowlist of backend names or families |
//! | `XP_SKIP_BACKENDS` | comma-separated denylist, applied after the allowlist |
//! | `XP_DISABLE_GPU` | truthy value stops probes from opening a GPU |
//! | `XP_LOG` | filter directives for [`init_test_logging`](crate::init_test_logging) |

use xp_core::{Error, ProbeOptions, Result};

pub const BACKENDS_ENV: &str = "XP_BACKENDS";
pub const SKIP_BACKENDS_ENV: &str = "XP_SKIP_BACKENDS";
pub const DISABLE_GPU_ENV: &str = "XP_DISABLE_GPU";
pub const LOG_ENV: &str = "XP_LOG";

/// Which backends a run may use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// `None` admits everything
    pub include: Option<Vec<String>>,
    pub exclude: Vec<String>,
    pub allow_gpu: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            include: None,
            exclude: Vec::new(),
            allow_gpu: true,
        }
    }
}

impl HarnessConfig {
    /// Read the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup` instead of the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let include = lookup(BACKENDS_ENV)
            .map(|v| split_list(&v))
            .filter(|names| !names.is_empty());
        let exclude = lookup(SKIP_BACKENDS_ENV)
            .map(|v| split_list(&v))
            .unwrap_or_default();
        let disable_gpu = match lookup(DISABLE_GPU_ENV) {
            Some(v) => parse_flag(DISABLE_GPU_ENV, &v)?,
            None => false,
        };
        Ok(Self {
            include,
            exclude,
            allow_gpu: !disable_gpu,
        })
    }

    /// Whether a placement called `name` of backend `family` may run
    ///
    /// Lists match either the full placement name (`simd[cuda]`) or the
    /// family (`simd`).
    pub fn admits(&self, name: &str, family: &str) -> bool {
        let listed = |list: &[String]| list.iter().any(|item| item == name || item == family);
        if let Some(include) = &self.include {
            if !listed(include) {
                return false;
            }
        }
        !listed(&self.exclude)
    }

    /// Options passed to every capability probe
    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            allow_gpu: self.allow_gpu,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "{key} must be a boolean flag, got '{other}'"
        ))),
    }
}
