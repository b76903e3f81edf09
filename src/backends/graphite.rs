//! Graphite backend
//!
//! Pushes metrics to a Carbon/Graphite endpoint over TCP using the
//! plaintext protocol, one `"<path> <value> <unix-timestamp>\n"` line per
//! sample. Events, lifecycle, and exceptions delegate to an embedded
//! [`ConsoleBackend`]; only metrics travel the wire.
//!
//! The backend owns an unbounded queue and exactly one worker thread.
//! Producer calls serialize their samples and enqueue them without ever
//! blocking on network I/O. The worker blocks for a message, greedily
//! drains everything else already queued, and sends the coalesced payload
//! in a single write, which amortizes system-call and round-trip overhead
//! under bursty load. `end_process` enqueues a shutdown sentinel and joins
//! the worker: every message enqueued before the sentinel is written
//! before the connection closes.
//!
//! Write failures are not retried. The worker parks the error and it
//! surfaces as a [`Delivery`](crate::core::ReporterError::Delivery) error
//! on the next producer call or at `end_process`.
//!
//! Configuration keys: `host` (default `127.0.0.1`), `port` (default
//! `2003`).

use super::console::ConsoleBackend;
use crate::core::{
    unix_timestamp, Backend, BackendConfig, ExitCode, Labels, MetricBatch, ReporterError, Result,
    Severity,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::error::Error;
use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 2003;

/// Queue entries are fully formatted wire payloads; serialization happens
/// on the producer side so the worker does pure I/O.
enum WireMessage {
    Lines(String),
    Shutdown,
}

#[derive(Debug)]
pub struct GraphiteBackend {
    inner: ConsoleBackend,
    process_name: String,
    sender: Sender<WireMessage>,
    worker: Option<thread::JoinHandle<()>>,
    last_error: Arc<Mutex<Option<String>>>,
}

impl GraphiteBackend {
    /// Connect to the configured Carbon endpoint and start the worker
    ///
    /// The connection is opened eagerly; a refused connection is fatal to
    /// backend creation and propagates out of the registry factory.
    pub fn new(process_name: &str, config: &BackendConfig) -> Result<Self> {
        let host = config.get_str("host").unwrap_or(DEFAULT_HOST);
        let port = config.get_port("port", "graphite")?.unwrap_or(DEFAULT_PORT);

        let stream = TcpStream::connect((host, port))?;
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(Duration::from_secs(5)))?;

        let (sender, receiver) = unbounded();
        let last_error = Arc::new(Mutex::new(None));
        let worker_error = Arc::clone(&last_error);
        let worker = thread::Builder::new()
            .name("graphite-reporter".to_string())
            .spawn(move || run_worker(stream, receiver, worker_error))?;

        Ok(Self {
            inner: ConsoleBackend::new(process_name),
            process_name: process_name.to_string(),
            sender,
            worker: Some(worker),
            last_error,
        })
    }

    /// The dotted metric path sent on the wire
    ///
    /// The plaintext protocol is space-delimited, so spaces in either
    /// component are replaced with underscores.
    pub fn metric_path(process: &str, metric: &str) -> String {
        format!("{}.{}", process.replace(' ', "_"), metric.replace(' ', "_"))
    }

    fn wire_line(&self, name: &str, value: f64, timestamp: f64) -> String {
        format!(
            "{} {} {}\n",
            Self::metric_path(&self.process_name, name),
            value,
            timestamp
        )
    }

    /// Surface a write failure parked by the worker
    fn check_delivery(&self) -> Result<()> {
        match self.last_error.lock().take() {
            Some(message) => Err(ReporterError::delivery("graphite", message)),
            None => Ok(()),
        }
    }

    fn enqueue(&self, payload: String) -> Result<()> {
        self.check_delivery()?;
        self.sender
            .send(WireMessage::Lines(payload))
            .map_err(|_| ReporterError::delivery("graphite", "worker thread is not running"))
    }
}

fn run_worker(
    mut stream: TcpStream,
    receiver: Receiver<WireMessage>,
    last_error: Arc<Mutex<Option<String>>>,
) {
    loop {
        // Block for at least one message, then coalesce everything
        // already queued into a single write.
        let mut payload = match receiver.recv() {
            Ok(WireMessage::Lines(lines)) => lines,
            Ok(WireMessage::Shutdown) | Err(_) => break,
        };

        let mut draining = false;
        while let Ok(next) = receiver.try_recv() {
            match next {
                WireMessage::Lines(lines) => payload.push_str(&lines),
                WireMessage::Shutdown => {
                    draining = true;
                    break;
                }
            }
        }

        if let Err(err) = stream.write_all(payload.as_bytes()) {
            *last_error.lock() = Some(err.to_string());
        }

        if draining {
            break;
        }
    }

    let _ = stream.shutdown(Shutdown::Both);
}

impl Backend for GraphiteBackend {
    fn start_process(&mut self, name: &str, msg: &str, args: Option<&Labels>) -> Result<()> {
        self.inner.start_process(name, msg, args)
    }

    /// Reports the end locally, then drains and closes the connection
    ///
    /// Does not return until the worker has written every message
    /// enqueued before the sentinel and exited.
    fn end_process(&mut self, msg: &str, exit_code: ExitCode) -> Result<()> {
        self.inner.end_process(msg, exit_code)?;

        let _ = self.sender.send(WireMessage::Shutdown);
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| ReporterError::delivery("graphite", "worker thread panicked"))?;
        }
        self.check_delivery()
    }

    fn report_metric(&mut self, name: &str, value: f64, _context: Option<&Labels>) -> Result<()> {
        let line = self.wire_line(name, value, unix_timestamp());
        self.enqueue(line)
    }

    /// Sends the whole batch as one queue entry, hence one network write
    fn report_metrics(
        &mut self,
        name: &str,
        batch: &MetricBatch,
        _context: Option<&Labels>,
    ) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let payload: String = batch
            .samples()
            .iter()
            .map(|(timestamp, value)| self.wire_line(name, *value, *timestamp))
            .collect();
        self.enqueue(payload)
    }

    fn report_event(
        &mut self,
        event: &str,
        context: Option<&Labels>,
        severity: Option<Severity>,
    ) -> Result<()> {
        self.inner.report_event(event, context, severity)
    }

    fn report_exception(
        &mut self,
        error: Option<&(dyn Error + 'static)>,
        msg: Option<&str>,
    ) -> Result<()> {
        self.inner.report_exception(error, msg)
    }

    fn name(&self) -> &str {
        "graphite"
    }
}

impl Drop for GraphiteBackend {
    fn drop(&mut self) {
        // end_process is the designed teardown path; this covers a
        // process that never reported its end.
        if self.worker.is_some() {
            let _ = self.sender.send(WireMessage::Shutdown);
            if let Some(worker) = self.worker.take() {
                let _ = worker.join();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;

    /// Accepts one connection and returns everything read until EOF
    fn sink_listener() -> (u16, thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            let (mut socket, _) = listener.accept().expect("accept");
            let mut received = Vec::new();
            socket.read_to_end(&mut received).expect("read");
            received
        });
        (port, handle)
    }

    fn backend_for(port: u16) -> GraphiteBackend {
        let config = BackendConfig::new()
            .with_value("host", "127.0.0.1")
            .with_value("port", port);
        GraphiteBackend::new("unit test", &config).expect("connect")
    }

    #[test]
    fn test_metric_path_sanitizes_spaces() {
        assert_eq!(
            GraphiteBackend::metric_path("my proc", "Rand score"),
            "my_proc.Rand_score"
        );
        assert_eq!(GraphiteBackend::metric_path("p", "m"), "p.m");
    }

    #[test]
    fn test_construction_fails_without_listener() {
        // Bind then drop a listener so the port is known to be closed
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let config = BackendConfig::new()
            .with_value("host", "127.0.0.1")
            .with_value("port", port);

        let result = GraphiteBackend::new("job", &config);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_port_is_configuration_error() {
        let config = BackendConfig::new().with_value("port", "twenty");
        let err = GraphiteBackend::new("job", &config).unwrap_err();
        assert!(matches!(err, ReporterError::Configuration { .. }));
    }

    #[test]
    fn test_metrics_reach_sink_before_close() {
        let (port, sink) = sink_listener();
        let mut backend = backend_for(port);

        backend.report_metric("alpha", 1.0, None).unwrap();
        backend.report_metric("beta", 2.5, None).unwrap();
        backend.end_process("done", ExitCode::Success).unwrap();

        let received = String::from_utf8(sink.join().expect("sink")).expect("utf8");
        assert!(received.contains("unit_test.alpha 1 "));
        assert!(received.contains("unit_test.beta 2.5 "));
        assert_eq!(received.matches('\n').count(), 2);
    }

    #[test]
    fn test_batch_is_one_queue_entry() {
        let (port, sink) = sink_listener();
        let mut backend = backend_for(port);

        let mut batch = MetricBatch::new();
        batch.record_at(100.0, 1.0);
        batch.record_at(101.0, 2.0);
        batch.record_at(102.0, 3.0);
        backend.report_metrics("series", &batch, None).unwrap();
        backend.end_process("done", ExitCode::Success).unwrap();

        let received = String::from_utf8(sink.join().expect("sink")).expect("utf8");
        assert_eq!(received.matches('\n').count(), 3);
        assert!(received.contains("unit_test.series 1 100"));
        assert!(received.contains("unit_test.series 3 102"));
    }

    #[test]
    fn test_empty_batch_skips_wire() {
        let (port, sink) = sink_listener();
        let mut backend = backend_for(port);

        backend
            .report_metrics("series", &MetricBatch::new(), None)
            .unwrap();
        backend.end_process("done", ExitCode::Success).unwrap();

        let received = sink.join().expect("sink");
        assert!(received.is_empty());
    }
}
