//! Console backend
//!
//! Synchronous local backend that formats reports as severity-colored,
//! timestamped lines. Warnings and above go to stderr, everything else to
//! stdout. Intended for informal debugging and as the `"default"` backend.
//!
//! This backend is limited to scalar reporting: `report_metrics`
//! summarizes a batch (sample count, running time, average, total) instead
//! of emitting each sample. That lossy choice applies to this backend
//! only.

use crate::core::{
    format_error_chain, Backend, BackendConfig, ExitCode, Labels, MetricBatch, Result, Severity,
};
use chrono::Utc;
use colored::Colorize;
use std::error::Error;

#[derive(Debug)]
pub struct ConsoleBackend {
    process_name: String,
    use_colors: bool,
}

impl ConsoleBackend {
    pub fn new(process_name: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
            use_colors: true,
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Construct from a configuration section
    ///
    /// Recognized keys: `colors` (bool, default true).
    pub fn from_config(process_name: &str, config: &BackendConfig) -> Self {
        Self::new(process_name).with_colors(config.get_bool("colors", true))
    }

    fn format_line(&self, severity: Severity, text: &str) -> String {
        let severity_str = if self.use_colors {
            format!("{:8}", severity.to_str())
                .color(severity.color_code())
                .to_string()
        } else {
            format!("{:8}", severity.to_str())
        };

        format!(
            "[{}] [{}] {} - {}",
            Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            severity_str,
            self.process_name,
            text
        )
    }

    fn emit(&self, severity: Severity, text: &str) {
        let line = self.format_line(severity, text);
        if severity.is_error_class() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn with_context(text: String, context: Option<&Labels>) -> String {
        match context {
            Some(labels) if !labels.is_empty() => format!("{} ({})", text, labels),
            _ => text,
        }
    }
}

impl Backend for ConsoleBackend {
    fn start_process(&mut self, _name: &str, msg: &str, args: Option<&Labels>) -> Result<()> {
        let text = match args {
            Some(args) if !args.is_empty() => format!("Starting process: {} ({})", msg, args),
            _ => format!("Starting process: {}", msg),
        };
        self.emit(Severity::Info, &text);
        Ok(())
    }

    fn end_process(&mut self, msg: &str, exit_code: ExitCode) -> Result<()> {
        self.emit(
            exit_code.severity(),
            &format!("Ending process: {}, exit code = {}", msg, exit_code),
        );
        Ok(())
    }

    fn report_metric(&mut self, name: &str, value: f64, context: Option<&Labels>) -> Result<()> {
        let text = Self::with_context(format!("Metric {}={}", name, value), context);
        self.emit(Severity::Info, &text);
        Ok(())
    }

    fn report_metrics(
        &mut self,
        name: &str,
        batch: &MetricBatch,
        context: Option<&Labels>,
    ) -> Result<()> {
        let text = match batch.summary() {
            Some(summary) => format!(
                "Metric {}: {} samples, running time = {:.4}, avg = {}, total = {}",
                name, summary.count, summary.elapsed, summary.mean, summary.total
            ),
            None => format!("Metric {}: empty series", name),
        };
        self.emit(Severity::Info, &Self::with_context(text, context));
        Ok(())
    }

    fn report_event(
        &mut self,
        event: &str,
        context: Option<&Labels>,
        severity: Option<Severity>,
    ) -> Result<()> {
        let text = Self::with_context(event.to_string(), context);
        self.emit(severity.unwrap_or_default(), &text);
        Ok(())
    }

    fn report_exception(
        &mut self,
        error: Option<&(dyn Error + 'static)>,
        msg: Option<&str>,
    ) -> Result<()> {
        let text = match (error, msg) {
            (Some(error), Some(msg)) => format!("{}\n{}", msg, format_error_chain(error)),
            (Some(error), None) => format_error_chain(error),
            (None, Some(msg)) => msg.to_string(),
            (None, None) => "exception reported with no detail".to_string(),
        };
        self.emit(Severity::Error, &text);
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
