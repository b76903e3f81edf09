//! In-memory capture backend
//!
//! Records every forwarded call into a shared vector. Meant for test
//! harnesses and for embedding the facade where reports are inspected
//! rather than shipped anywhere.

use crate::core::{
    format_error_chain, Backend, ExitCode, Labels, MetricBatch, Result, Severity,
};
use parking_lot::Mutex;
use std::error::Error;
use std::sync::Arc;

/// One captured capability call, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRecord {
    ProcessStarted {
        name: String,
        msg: String,
        args: Option<Labels>,
    },
    ProcessEnded {
        msg: String,
        exit_code: ExitCode,
    },
    Metric {
        name: String,
        value: f64,
        context: Option<Labels>,
    },
    MetricSeries {
        name: String,
        samples: Vec<(f64, f64)>,
        context: Option<Labels>,
    },
    Event {
        event: String,
        context: Option<Labels>,
        severity: Severity,
    },
    Exception {
        message: String,
    },
}

#[derive(Debug)]
pub struct MemoryBackend {
    process_name: String,
    records: Arc<Mutex<Vec<ReportRecord>>>,
}

impl MemoryBackend {
    pub fn new(process_name: impl Into<String>) -> Self {
        Self::with_records(process_name, Arc::new(Mutex::new(Vec::new())))
    }

    /// Capture into storage owned by the caller
    ///
    /// Lets a factory closure hand the storage out before the backend is
    /// boxed behind the registry.
    pub fn with_records(
        process_name: impl Into<String>,
        records: Arc<Mutex<Vec<ReportRecord>>>,
    ) -> Self {
        Self {
            process_name: process_name.into(),
            records,
        }
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// Snapshot of everything captured so far
    pub fn records(&self) -> Vec<ReportRecord> {
        self.records.lock().clone()
    }

    pub fn handle(&self) -> Arc<Mutex<Vec<ReportRecord>>> {
        Arc::clone(&self.records)
    }

    fn push(&self, record: ReportRecord) {
        self.records.lock().push(record);
    }
}

impl Backend for MemoryBackend {
    fn start_process(&mut self, name: &str, msg: &str, args: Option<&Labels>) -> Result<()> {
        self.push(ReportRecord::ProcessStarted {
            name: name.to_string(),
            msg: msg.to_string(),
            args: args.cloned(),
        });
        Ok(())
    }

    fn end_process(&mut self, msg: &str, exit_code: ExitCode) -> Result<()> {
        self.push(ReportRecord::ProcessEnded {
            msg: msg.to_string(),
            exit_code,
        });
        Ok(())
    }

    fn report_metric(&mut self, name: &str, value: f64, context: Option<&Labels>) -> Result<()> {
        self.push(ReportRecord::Metric {
            name: name.to_string(),
            value,
            context: context.cloned(),
        });
        Ok(())
    }

    fn report_metrics(
        &mut self,
        name: &str,
        batch: &MetricBatch,
        context: Option<&Labels>,
    ) -> Result<()> {
        self.push(ReportRecord::MetricSeries {
            name: name.to_string(),
            samples: batch.samples().to_vec(),
            context: context.cloned(),
        });
        Ok(())
    }

    fn report_event(
        &mut self,
        event: &str,
        context: Option<&Labels>,
        severity: Option<Severity>,
    ) -> Result<()> {
        self.push(ReportRecord::Event {
            event: event.to_string(),
            context: context.cloned(),
            severity: severity.unwrap_or_default(),
        });
        Ok(())
    }

    fn report_exception(
        &mut self,
        error: Option<&(dyn Error + 'static)>,
        msg: Option<&str>,
    ) -> Result<()> {
        let message = match (error, msg) {
            (Some(error), Some(msg)) => format!("{}\n{}", msg, format_error_chain(error)),
            (Some(error), None) => format_error_chain(error),
            (None, Some(msg)) => msg.to_string(),
            (None, None) => "exception reported with no detail".to_string(),
        };
        self.push(ReportRecord::Exception { message });
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
