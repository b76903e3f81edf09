//! Core reporter types and traits

pub mod backend;
pub mod config;
pub mod error;
pub mod exit_code;
pub mod labels;
pub mod metric_batch;
pub mod proxy;
pub mod registry;
pub mod severity;

pub use backend::{format_error_chain, Backend};
pub use config::{BackendConfig, ReporterConfig};
pub use error::{ReporterError, Result};
pub use exit_code::ExitCode;
pub use labels::Labels;
pub use metric_batch::{unix_timestamp, BatchSummary, MetricBatch};
pub use proxy::ReporterProxy;
pub use registry::{BackendFactory, RegistryContext, DEFAULT_BACKEND_NAME};
pub use severity::Severity;
