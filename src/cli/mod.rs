//! CLI module
//!
//! Provides:
//! - Argument parsing (flags, environment overrides, time parsing)
//! - Logging setup
//! - Run dispatch: assemble, submit, wait, report

pub mod args;
pub mod dispatch;
pub mod logging;

// Re-exports
pub use args::{parse_args, Args};
pub use dispatch::{run_cli, ExitCode};
pub use logging::init_logging;

use crate::monitor::SubmissionError;
use canary_adhoc_core::AssemblyError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::InvalidArgs(_) => EXIT_FAILURE,
            Error::Assembly(_) | Error::Submission(_) | Error::Io(_) => EXIT_FATAL,
        }
    }
}

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::InvalidArgs("x".into()).exit_code(), EXIT_FAILURE);
        assert_eq!(
            Error::from(AssemblyError::InvalidConfig("scope".into())).exit_code(),
            EXIT_FATAL
        );
        let err = Error::from(SubmissionError::from(TransportError::Network(
            "refused".into(),
        )));
        assert_eq!(err.exit_code(), EXIT_FATAL);
        assert_eq!(
            err.to_string(),
            "Unable to complete POST request, reason: Network error: refused"
        );
    }
}
