//! Error types for the reporting facade

pub type Result<T> = std::result::Result<T, ReporterError>;

#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    /// Backend resolution found zero working factories
    #[error("no reporting backend available under name '{name}'")]
    NoBackendAvailable { name: String },

    /// Proxy used before `start_process`
    #[error("reporter used before start_process was called")]
    NotInitialized,

    /// `start_process` called on an already-initialized proxy
    #[error("start_process called twice: process '{process}' is already started")]
    DoubleInitialization { process: String },

    /// Required configuration key missing or malformed
    #[error("invalid configuration for backend '{backend}': {message}")]
    Configuration { backend: String, message: String },

    /// A backend could not complete delivery to its destination
    #[error("delivery failed on backend '{backend}': {message}")]
    Delivery { backend: String, message: String },

    /// IO error (connection setup, worker spawn)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReporterError {
    /// Create a resolution failure naming the requested backend
    pub fn no_backend(name: impl Into<String>) -> Self {
        ReporterError::NoBackendAvailable { name: name.into() }
    }

    /// Create a configuration error for a backend section
    pub fn configuration(backend: impl Into<String>, message: impl Into<String>) -> Self {
        ReporterError::Configuration {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a delivery error for a backend
    pub fn delivery(backend: impl Into<String>, message: impl Into<String>) -> Self {
        ReporterError::Delivery {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ReporterError::no_backend("carbon");
        assert!(matches!(err, ReporterError::NoBackendAvailable { .. }));

        let err = ReporterError::configuration("datadog", "api-key is missing");
        assert!(matches!(err, ReporterError::Configuration { .. }));

        let err = ReporterError::delivery("graphite", "connection reset");
        assert!(matches!(err, ReporterError::Delivery { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = ReporterError::no_backend("nonexistent");
        assert_eq!(
            err.to_string(),
            "no reporting backend available under name 'nonexistent'"
        );

        let err = ReporterError::DoubleInitialization {
            process: "job1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "start_process called twice: process 'job1' is already started"
        );

        let err = ReporterError::delivery("graphite", "broken pipe");
        assert_eq!(
            err.to_string(),
            "delivery failed on backend 'graphite': broken pipe"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: ReporterError = io_err.into();
        assert!(matches!(err, ReporterError::Io(_)));
        assert!(err.to_string().contains("refused"));
    }
}
