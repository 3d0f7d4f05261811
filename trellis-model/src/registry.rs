//! Plugin registry
//!
//! Maps version strings to plugin modules. The registry is filled at process
//! start (built-ins via [`register_builtins`], embedders via [`register`]);
//! resolution is a plain lookup with no caching beyond the table itself,
//! which is bounded to one call per pipeline run.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use tracing::debug;

use trellis_core::{Error, Result};

use crate::plugin::PluginModule;

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<dyn PluginModule>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers a plugin module under a version string
///
/// A later registration for the same version replaces the earlier one.
pub fn register(version: impl Into<String>, module: Arc<dyn PluginModule>) {
    let version = version.into();
    debug!(version, "registering plugin module");
    REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(version, module);
}

/// Registers every built-in plugin; call once at process start
pub fn register_builtins() {
    register(crate::demo::v1::VERSION, Arc::new(crate::demo::v1::DemoV1));
}

/// Resolves a version string into its plugin module
pub fn resolve(version: &str) -> Result<Arc<dyn PluginModule>> {
    REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(version)
        .cloned()
        .ok_or_else(|| {
            Error::ModelDefinition(format!("no plugin registered for version `{version}`"))
        })
}

/// Version strings currently registered, sorted
pub fn registered() -> Vec<String> {
    let mut versions: Vec<String> = REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .keys()
        .cloned()
        .collect();
    versions.sort();
    versions
}
