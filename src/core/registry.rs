//! Backend registration and resolution
//!
//! A [`RegistryContext`] is the process-wide mapping from backend name to
//! the factories able to produce that backend, plus the currently active
//! backend name. It replaces the module-level globals and entry-point
//! discovery of older designs: bootstrap code constructs one context,
//! registers every known factory into it, and hands it (behind an `Arc`)
//! to each [`ReporterProxy`](super::proxy::ReporterProxy).

use super::backend::Backend;
use super::config::{BackendConfig, ReporterConfig};
use super::error::{ReporterError, Result};
use parking_lot::RwLock;
use std::sync::Arc;

/// Name resolved when no backend was explicitly selected
pub const DEFAULT_BACKEND_NAME: &str = "default";

/// Produces a backend for `(process_name, config_section)`
///
/// Returning `Ok(None)` declines the request and lets resolution try the
/// next factory registered under the same name. Errors are construction
/// failures and propagate immediately.
pub type BackendFactory =
    Arc<dyn Fn(&str, &BackendConfig) -> Result<Option<Box<dyn Backend>>> + Send + Sync>;

struct Registration {
    name: String,
    factory: BackendFactory,
}

pub struct RegistryContext {
    registrations: RwLock<Vec<Registration>>,
    active_backend: RwLock<String>,
    config: ReporterConfig,
}

impl RegistryContext {
    pub fn new() -> Self {
        Self::with_config(ReporterConfig::default())
    }

    /// Create a context whose initial active backend comes from `config`
    pub fn with_config(config: ReporterConfig) -> Self {
        let active = config
            .initial_backend()
            .unwrap_or(DEFAULT_BACKEND_NAME)
            .to_string();
        Self {
            registrations: RwLock::new(Vec::new()),
            active_backend: RwLock::new(active),
            config,
        }
    }

    /// Append a factory under `name`
    ///
    /// Never fails and never overwrites: multiple factories may share a
    /// name, and resolution tries them in registration order.
    pub fn register(&self, name: impl Into<String>, factory: BackendFactory) {
        self.registrations.write().push(Registration {
            name: name.into(),
            factory,
        });
    }

    /// [`register`](Self::register) with a plain closure
    ///
    /// ```
    /// use process_reporter::backends::ConsoleBackend;
    /// use process_reporter::core::backend::Backend;
    /// use process_reporter::core::registry::RegistryContext;
    ///
    /// let registry = RegistryContext::new();
    /// registry.register_fn("console", |process, config| {
    ///     let backend: Box<dyn Backend> = Box::new(ConsoleBackend::from_config(process, config));
    ///     Ok(Some(backend))
    /// });
    /// ```
    pub fn register_fn<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&str, &BackendConfig) -> Result<Option<Box<dyn Backend>>> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(factory));
    }

    /// Switch the active backend name
    ///
    /// Read by proxies at resolution time only; proxies already resolved
    /// keep their backend.
    pub fn set_active_backend(&self, name: impl Into<String>) {
        *self.active_backend.write() = name.into();
    }

    pub fn active_backend(&self) -> String {
        self.active_backend.read().clone()
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// The configuration section for `name`, empty when absent
    pub fn config_section(&self, name: &str) -> BackendConfig {
        self.config.section(name).cloned().unwrap_or_default()
    }

    /// Resolve `name` to a concrete backend
    ///
    /// Tries every factory registered under `name` in registration order
    /// and returns the first backend produced. A factory error propagates
    /// as-is; exhausting the factories yields
    /// [`ReporterError::NoBackendAvailable`].
    pub fn resolve(
        &self,
        name: &str,
        process_name: &str,
        config: &BackendConfig,
    ) -> Result<Box<dyn Backend>> {
        // Snapshot the matching factories so none run under the lock;
        // factories may open sockets or register further backends.
        let factories: Vec<BackendFactory> = self
            .registrations
            .read()
            .iter()
            .filter(|r| r.name == name)
            .map(|r| Arc::clone(&r.factory))
            .collect();

        for factory in factories {
            if let Some(backend) = factory(process_name, config)? {
                return Ok(backend);
            }
        }

        Err(ReporterError::no_backend(name))
    }
}

impl Default for RegistryContext {
    fn default() -> Self {
        Self::new()
    }
}
