//! Backend implementations

pub mod console;
pub mod graphite;
pub mod memory;
pub mod remote_api;

pub use console::ConsoleBackend;
pub use graphite::GraphiteBackend;
pub use memory::{MemoryBackend, ReportRecord};
pub use remote_api::{AlertType, ApiEvent, ApiMetric, ApiSink, RemoteApiBackend};

use crate::core::{Backend, RegistryContext, DEFAULT_BACKEND_NAME};

/// Register the backends constructible from configuration alone
///
/// Bootstrap code calls this once before the first `start_process`. The
/// console backend answers to `"default"` and `"console"`, the Graphite
/// backend to `"graphite"`. The remote API backend needs a concrete
/// [`ApiSink`], so the application registers it itself with a closure
/// closing over the sink constructor.
pub fn register_builtin(registry: &RegistryContext) {
    registry.register_fn(DEFAULT_BACKEND_NAME, |process, config| {
        let backend: Box<dyn Backend> = Box::new(ConsoleBackend::from_config(process, config));
        Ok(Some(backend))
    });
    registry.register_fn("console", |process, config| {
        let backend: Box<dyn Backend> = Box::new(ConsoleBackend::from_config(process, config));
        Ok(Some(backend))
    });
    registry.register_fn("graphite", |process, config| {
        let backend: Box<dyn Backend> = Box::new(GraphiteBackend::new(process, config)?);
        Ok(Some(backend))
    });
}
