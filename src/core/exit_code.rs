//! Process exit classification
//!
//! A small closed taxonomy of how a process terminated. Every backend
//! consumes it when reporting `end_process` to pick a severity or tag.

use super::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum ExitCode {
    /// Process completed successfully
    #[default]
    Success = 0,
    /// Process exiting because of bad input data
    PreconditionError = 1,
    /// Process exiting because of an I/O or network error
    IoError = 2,
    /// Process exiting because of an internal error
    InternalError = 3,
}

impl ExitCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitCode::Success => "success",
            ExitCode::PreconditionError => "precondition_error",
            ExitCode::IoError => "io_error",
            ExitCode::InternalError => "internal_error",
        }
    }

    /// Numeric process exit status
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// The severity backends attach to an end-of-process report
    pub fn severity(&self) -> Severity {
        if self.is_success() {
            Severity::Info
        } else {
            Severity::Error
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_codes() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::PreconditionError.code(), 1);
        assert_eq!(ExitCode::IoError.code(), 2);
        assert_eq!(ExitCode::InternalError.code(), 3);
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(ExitCode::Success.severity(), Severity::Info);
        assert_eq!(ExitCode::PreconditionError.severity(), Severity::Error);
        assert_eq!(ExitCode::IoError.severity(), Severity::Error);
        assert_eq!(ExitCode::InternalError.severity(), Severity::Error);
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::Success.to_string(), "success");
        assert_eq!(ExitCode::IoError.to_string(), "io_error");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let json = serde_json::to_string(&ExitCode::PreconditionError).expect("serialize");
        let back: ExitCode = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, ExitCode::PreconditionError);
    }
}
