//! Lazy-initializing reporter proxy
//!
//! Application code holds a [`ReporterProxy`] for the life of the process.
//! The concrete backend is not constructed until the first lifecycle call:
//! `start_process` reads the active backend name, resolves it through the
//! registry with that backend's configuration section, stores the result,
//! and from then on every call is pure forwarding. The proxy never buffers
//! or transforms report data.

use super::backend::Backend;
use super::error::{ReporterError, Result};
use super::exit_code::ExitCode;
use super::labels::Labels;
use super::metric_batch::MetricBatch;
use super::registry::RegistryContext;
use super::severity::Severity;
use std::error::Error;
use std::sync::Arc;

pub struct ReporterProxy {
    registry: Arc<RegistryContext>,
    backend: Option<Box<dyn Backend>>,
    process_name: Option<String>,
}

impl ReporterProxy {
    pub fn new(registry: Arc<RegistryContext>) -> Self {
        Self {
            registry,
            backend: None,
            process_name: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    /// Name of the resolved backend, once initialized
    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|backend| backend.name())
    }

    /// Report the start of a process, resolving the backend on the way
    ///
    /// Fails with [`ReporterError::DoubleInitialization`] on a second call
    /// and with [`ReporterError::NoBackendAvailable`] when the active
    /// backend name resolves to nothing.
    pub fn start_process(&mut self, name: &str, msg: &str, args: Option<&Labels>) -> Result<()> {
        self.start(name, msg, args, false)
    }

    /// [`start_process`](Self::start_process) plus a one-time snapshot of
    /// the process id and environment variables, reported as events
    pub fn start_process_with_environment(
        &mut self,
        name: &str,
        msg: &str,
        args: Option<&Labels>,
    ) -> Result<()> {
        self.start(name, msg, args, true)
    }

    fn start(
        &mut self,
        name: &str,
        msg: &str,
        args: Option<&Labels>,
        log_environment: bool,
    ) -> Result<()> {
        if self.backend.is_some() {
            return Err(ReporterError::DoubleInitialization {
                process: self.process_name.clone().unwrap_or_else(|| name.to_string()),
            });
        }

        let backend_name = self.registry.active_backend();
        let section = self.registry.config_section(&backend_name);
        let resolved = self.registry.resolve(&backend_name, name, &section)?;

        // The backend is stored before the start event is forwarded: a
        // failing start report still counts as initialized, retrying
        // would double-report.
        let backend = self.backend.insert(resolved);
        self.process_name = Some(name.to_string());

        backend.start_process(name, msg, args)?;
        if log_environment {
            report_environment(backend.as_mut())?;
        }
        Ok(())
    }

    pub fn end_process(&mut self, msg: &str, exit_code: ExitCode) -> Result<()> {
        self.backend_mut()?.end_process(msg, exit_code)
    }

    pub fn report_metric(&mut self, name: &str, value: f64, context: Option<&Labels>) -> Result<()> {
        self.backend_mut()?.report_metric(name, value, context)
    }

    pub fn report_metrics(
        &mut self,
        name: &str,
        batch: &MetricBatch,
        context: Option<&Labels>,
    ) -> Result<()> {
        self.backend_mut()?.report_metrics(name, batch, context)
    }

    pub fn report_event(
        &mut self,
        event: &str,
        context: Option<&Labels>,
        severity: Option<Severity>,
    ) -> Result<()> {
        self.backend_mut()?.report_event(event, context, severity)
    }

    pub fn report_exception(
        &mut self,
        error: Option<&(dyn Error + 'static)>,
        msg: Option<&str>,
    ) -> Result<()> {
        self.backend_mut()?.report_exception(error, msg)
    }

    fn backend_mut(&mut self) -> Result<&mut Box<dyn Backend>> {
        self.backend.as_mut().ok_or(ReporterError::NotInitialized)
    }
}

/// One-time environment snapshot, emitted as plain events
fn report_environment(backend: &mut dyn Backend) -> Result<()> {
    backend.report_event(&format!("PID: {}", std::process::id()), None, None)?;
    backend.report_event("--------- Environment ---------", None, None)?;
    for (key, value) in std::env::vars() {
        backend.report_event(&format!("    {}: {}", key, value), None, None)?;
    }
    backend.report_event("-------------------------------", None, None)?;
    Ok(())
}
