//! Backend capability trait
//!
//! Every reporting destination implements [`Backend`]. Semantics are
//! uniform across backends even though formatting and destination differ;
//! see the individual implementations for their delivery and batching
//! choices.

use super::{
    error::Result, exit_code::ExitCode, labels::Labels, metric_batch::MetricBatch,
    severity::Severity,
};
use std::error::Error;

pub trait Backend: Send + std::fmt::Debug {
    /// Report the start of a process
    ///
    /// `args` carries whatever differentiates this instantiation of the
    /// process from others running the same code.
    fn start_process(&mut self, name: &str, msg: &str, args: Option<&Labels>) -> Result<()>;

    /// Report the end of a process
    ///
    /// This is the shutdown trigger: backends with background work flush
    /// their queues and close their connections here.
    fn end_process(&mut self, msg: &str, exit_code: ExitCode) -> Result<()>;

    /// Report one scalar sample
    fn report_metric(&mut self, name: &str, value: f64, context: Option<&Labels>) -> Result<()>;

    /// Submit an entire batch in one call
    ///
    /// Bulk-capable backends deliver the batch in a single round trip.
    /// Backends limited to scalar reporting may summarize instead; that
    /// lossy behavior is documented on the implementation.
    fn report_metrics(
        &mut self,
        name: &str,
        batch: &MetricBatch,
        context: Option<&Labels>,
    ) -> Result<()>;

    /// Report a discrete occurrence; `severity` defaults to info
    fn report_event(
        &mut self,
        event: &str,
        context: Option<&Labels>,
        severity: Option<Severity>,
    ) -> Result<()>;

    /// Report a caught fault
    ///
    /// With no fault object the message stands alone; with no message the
    /// fault's own rendering is used.
    fn report_exception(
        &mut self,
        error: Option<&(dyn Error + 'static)>,
        msg: Option<&str>,
    ) -> Result<()>;

    fn name(&self) -> &str;
}

/// Render an error and its source chain into a multi-line text body
pub fn format_error_chain(error: &(dyn Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str("\ncaused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
