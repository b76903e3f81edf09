//! Remote API backend
//!
//! Submits events and metrics to a third-party observability service. The
//! service itself is out of scope and modeled as the opaque [`ApiSink`]
//! contract; this backend owns the mapping from reporter semantics to
//! sink payloads: severities become alert types, exit codes become
//! success/error events, batches become one multi-point series, and
//! exceptions become an error event plus an `exception` counter.
//!
//! Construction requires `api-key` and `app-key` in the backend's
//! configuration section; a missing credential is a configuration error
//! surfaced at `start_process` time. Sink delivery failures propagate to
//! the caller as delivery errors and are not retried.

use crate::core::{
    format_error_chain, unix_timestamp, Backend, BackendConfig, ExitCode, Labels, MetricBatch,
    ReporterError, Result, Severity,
};
use serde::Serialize;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Info,
    Success,
    Warning,
    Error,
}

impl AlertType {
    fn from_severity(severity: Option<Severity>) -> Self {
        match severity.unwrap_or_default() {
            Severity::Debug | Severity::Info => AlertType::Info,
            Severity::Warning => AlertType::Warning,
            Severity::Error | Severity::Critical => AlertType::Error,
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertType::Info => "info",
            AlertType::Success => "success",
            AlertType::Warning => "warning",
            AlertType::Error => "error",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiEvent {
    pub title: String,
    pub text: String,
    pub alert_type: AlertType,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiMetric {
    pub metric: String,
    pub points: Vec<(f64, f64)>,
    pub host: String,
    pub tags: Vec<String>,
}

/// Opaque submission contract for the remote service
pub trait ApiSink: Send {
    fn send_event(&mut self, event: ApiEvent) -> Result<()>;
    fn send_metric(&mut self, metric: ApiMetric) -> Result<()>;
}

pub struct RemoteApiBackend {
    process_name: String,
    sink: Box<dyn ApiSink>,
}

impl fmt::Debug for RemoteApiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteApiBackend")
            .field("process_name", &self.process_name)
            .field("sink", &"<dyn ApiSink>")
            .finish()
    }
}

impl RemoteApiBackend {
    /// Validate credentials and wrap the sink
    ///
    /// The sink is constructed by bootstrap code (it knows which service
    /// and client library to use); this backend only checks that the
    /// section carries the credentials the service will demand.
    pub fn new(process_name: &str, config: &BackendConfig, sink: Box<dyn ApiSink>) -> Result<Self> {
        for key in ["api-key", "app-key"] {
            if config.get(key).is_none() {
                return Err(ReporterError::configuration(
                    "remote-api",
                    format!("'{}' is missing from the backend configuration section", key),
                ));
            }
        }
        Ok(Self {
            process_name: process_name.to_string(),
            sink,
        })
    }

    fn tags(&self, extra: &[&str], context: Option<&Labels>) -> Vec<String> {
        let mut tags = vec![self.process_name.clone()];
        tags.extend(extra.iter().map(|s| s.to_string()));
        if let Some(labels) = context {
            tags.extend(labels.to_tags());
        }
        tags
    }
}

impl Backend for RemoteApiBackend {
    fn start_process(&mut self, _name: &str, msg: &str, args: Option<&Labels>) -> Result<()> {
        self.sink.send_event(ApiEvent {
            title: format!("{} starting", self.process_name),
            text: msg.to_string(),
            alert_type: AlertType::Info,
            tags: self.tags(&["startup"], args),
        })
    }

    fn end_process(&mut self, msg: &str, exit_code: ExitCode) -> Result<()> {
        let event = if exit_code.is_success() {
            ApiEvent {
                title: format!("{} exiting", self.process_name),
                text: msg.to_string(),
                alert_type: AlertType::Success,
                tags: self.tags(&["success"], None),
            }
        } else {
            ApiEvent {
                title: format!("{} exiting with error", self.process_name),
                text: msg.to_string(),
                alert_type: AlertType::Error,
                tags: self.tags(&["error", exit_code.as_str()], None),
            }
        };
        self.sink.send_event(event)
    }

    fn report_metric(&mut self, name: &str, value: f64, context: Option<&Labels>) -> Result<()> {
        self.sink.send_metric(ApiMetric {
            metric: name.to_string(),
            points: vec![(unix_timestamp(), value)],
            host: self.process_name.clone(),
            tags: self.tags(&[], context),
        })
    }

    /// Sends every sample as one multi-point series
    fn report_metrics(
        &mut self,
        name: &str,
        batch: &MetricBatch,
        context: Option<&Labels>,
    ) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.sink.send_metric(ApiMetric {
            metric: name.to_string(),
            points: batch.samples().to_vec(),
            host: self.process_name.clone(),
            tags: self.tags(&[], context),
        })
    }

    fn report_event(
        &mut self,
        event: &str,
        context: Option<&Labels>,
        severity: Option<Severity>,
    ) -> Result<()> {
        self.sink.send_event(ApiEvent {
            title: event.to_string(),
            text: event.to_string(),
            alert_type: AlertType::from_severity(severity),
            tags: self.tags(&[], context),
        })
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
        let tags = self.tags(&["exception"], None);

        self.sink.send_event(ApiEvent {
            title: "Exception report".to_string(),
            text,
            alert_type: AlertType::Error,
            tags: tags.clone(),
        })?;
        self.sink.send_metric(ApiMetric {
            metric: "exception".to_string(),
            points: vec![(unix_timestamp(), 1.0)],
            host: self.process_name.clone(),
            tags,
        })
    }

    fn name(&self) -> &str {
        "remote-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorded {
        events: Vec<ApiEvent>,
        metrics: Vec<ApiMetric>,
    }

    struct RecordingSink(Arc<Mutex<Recorded>>);

    impl ApiSink for RecordingSink {
        fn send_event(&mut self, event: ApiEvent) -> Result<()> {
            self.0.lock().events.push(event);
            Ok(())
        }

        fn send_metric(&mut self, metric: ApiMetric) -> Result<()> {
            self.0.lock().metrics.push(metric);
            Ok(())
        }
    }

    fn credentials() -> BackendConfig {
        BackendConfig::new()
            .with_value("api-key", "k")
            .with_value("app-key", "a")
    }

    fn backend() -> (RemoteApiBackend, Arc<Mutex<Recorded>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let sink = RecordingSink(Arc::clone(&recorded));
        let backend =
            RemoteApiBackend::new("job1", &credentials(), Box::new(sink)).expect("credentials ok");
        (backend, recorded)
    }

    #[test]
    fn test_missing_credentials_rejected() {
        struct NullSink;
        impl ApiSink for NullSink {
            fn send_event(&mut self, _: ApiEvent) -> Result<()> {
                Ok(())
            }
            fn send_metric(&mut self, _: ApiMetric) -> Result<()> {
                Ok(())
            }
        }

        let config = BackendConfig::new().with_value("api-key", "k");
        let err = RemoteApiBackend::new("job1", &config, Box::new(NullSink)).unwrap_err();
        match err {
            ReporterError::Configuration { message, .. } => assert!(message.contains("app-key")),
            other => panic!("expected Configuration, got {:?}", other),
        }
    }

    #[test]
    fn test_start_event_tags() {
        let (mut backend, recorded) = backend();
        let args = Labels::from(["bar", "baz"].as_slice());
        backend.start_process("job1", "hello", Some(&args)).unwrap();

        let recorded = recorded.lock();
        let event = &recorded.events[0];
        assert_eq!(event.title, "job1 starting");
        assert_eq!(event.alert_type, AlertType::Info);
        assert_eq!(event.tags, vec!["job1", "startup", "bar", "baz"]);
    }

    #[test]
    fn test_end_process_alerts() {
        let (mut backend, recorded) = backend();
        backend.end_process("bye", ExitCode::Success).unwrap();
        backend.end_process("oops", ExitCode::IoError).unwrap();

        let recorded = recorded.lock();
        assert_eq!(recorded.events[0].alert_type, AlertType::Success);
        assert_eq!(recorded.events[1].alert_type, AlertType::Error);
        assert_eq!(recorded.events[1].tags, vec!["job1", "error", "io_error"]);
    }

    #[test]
    fn test_severity_to_alert_mapping() {
        let (mut backend, recorded) = backend();
        for severity in [
            None,
            Some(Severity::Debug),
            Some(Severity::Warning),
            Some(Severity::Critical),
        ] {
            backend.report_event("e", None, severity).unwrap();
        }

        let recorded = recorded.lock();
        let alerts: Vec<AlertType> = recorded.events.iter().map(|e| e.alert_type).collect();
        assert_eq!(
            alerts,
            vec![
                AlertType::Info,
                AlertType::Info,
                AlertType::Warning,
                AlertType::Error
            ]
        );
    }

    #[test]
    fn test_batch_is_single_series() {
        let (mut backend, recorded) = backend();
        let mut batch = MetricBatch::new();
        batch.record_at(1.0, 10.0);
        batch.record_at(2.0, 20.0);
        backend.report_metrics("throughput", &batch, None).unwrap();

        let recorded = recorded.lock();
        assert_eq!(recorded.metrics.len(), 1);
        assert_eq!(recorded.metrics[0].points, vec![(1.0, 10.0), (2.0, 20.0)]);
    }

    #[test]
    fn test_exception_event_and_counter() {
        let (mut backend, recorded) = backend();
        let fault = std::io::Error::new(std::io::ErrorKind::Other, "kaboom");
        backend
            .report_exception(Some(&fault), Some("while frobbing"))
            .unwrap();

        let recorded = recorded.lock();
        let event = &recorded.events[0];
        assert_eq!(event.title, "Exception report");
        assert!(event.text.contains("while frobbing"));
        assert!(event.text.contains("kaboom"));
        assert!(event.tags.contains(&"exception".to_string()));

        assert_eq!(recorded.metrics[0].metric, "exception");
        assert_eq!(recorded.metrics[0].points[0].1, 1.0);
    }

    #[test]
    fn test_sink_failure_propagates() {
        struct FailingSink;
        impl ApiSink for FailingSink {
            fn send_event(&mut self, _: ApiEvent) -> Result<()> {
                Err(ReporterError::delivery("remote-api", "503 from service"))
            }
            fn send_metric(&mut self, _: ApiMetric) -> Result<()> {
                Err(ReporterError::delivery("remote-api", "503 from service"))
            }
        }

        let mut backend =
            RemoteApiBackend::new("job1", &credentials(), Box::new(FailingSink)).unwrap();
        let err = backend.report_event("e", None, None).unwrap_err();
        assert!(matches!(err, ReporterError::Delivery { .. }));
    }
}
