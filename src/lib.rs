//! # Process Reporter
//!
//! A pluggable process-lifecycle and metrics-reporting facade. Application
//! code binds to a single logical reporter before the concrete backend is
//! known; the backend is resolved lazily through a process-wide registry
//! and every subsequent call is forwarded to it.
//!
//! ## Features
//!
//! - **Swappable Backends**: console logging, Graphite metrics push, or a
//!   remote observability API, selected by name at runtime
//! - **Lazy Resolution**: backends are constructed on first use, from the
//!   configuration section registered under their name
//! - **Asynchronous Batching**: the network backend coalesces queued
//!   samples into single writes on a dedicated worker thread
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use process_reporter::backends::register_builtin;
//! use process_reporter::prelude::*;
//!
//! # fn main() -> process_reporter::core::error::Result<()> {
//! let registry = Arc::new(RegistryContext::new());
//! register_builtin(&registry);
//!
//! let mut reporter = ReporterProxy::new(Arc::clone(&registry));
//! reporter.start_process("ingest", "starting ingest", None)?;
//! reporter.report_metric("tile latency", 3.5, Some(&Labels::from("tile: 3")))?;
//! reporter.end_process("all tiles processed", ExitCode::Success)?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod core;

pub mod prelude {
    pub use crate::backends::{
        ConsoleBackend, GraphiteBackend, MemoryBackend, RemoteApiBackend, ReportRecord,
    };
    pub use crate::core::{
        Backend, BackendConfig, BackendFactory, BatchSummary, ExitCode, Labels, MetricBatch,
        RegistryContext, ReporterConfig, ReporterError, ReporterProxy, Result, Severity,
        DEFAULT_BACKEND_NAME,
    };
}

pub use backends::{ConsoleBackend, GraphiteBackend, MemoryBackend, RemoteApiBackend};
pub use core::{
    Backend, BackendConfig, BackendFactory, BatchSummary, ExitCode, Labels, MetricBatch,
    RegistryContext, ReporterConfig, ReporterError, ReporterProxy, Result, Severity,
    DEFAULT_BACKEND_NAME,
};
