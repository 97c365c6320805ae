use crate::error::{CleanupFailure, DriverError};
use std::io::{self, Write};
use std::process::ExitCode;

/// Outcome of a run once the registry has been released.
///
/// A pipeline failure is always the primary cause. A cleanup failure from
/// the same run is kept as a secondary diagnostic; on its own it becomes the
/// primary cause.
#[derive(Debug)]
pub enum FinalStatus {
    Success,
    Failed {
        primary: DriverError,
        cleanup: Option<CleanupFailure>,
    },
}

impl FinalStatus {
    pub fn resolve(pipeline: Option<DriverError>, cleanup: Option<CleanupFailure>) -> Self {
        match (pipeline, cleanup) {
            (None, None) => FinalStatus::Success,
            (Some(primary), cleanup) => FinalStatus::Failed { primary, cleanup },
            (None, Some(cleanup)) => FinalStatus::Failed {
                primary: DriverError::Cleanup(cleanup),
                cleanup: None,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FinalStatus::Success)
    }

    /// Code of the primary cause, `None` on success.
    pub fn code(&self) -> Option<i32> {
        match self {
            FinalStatus::Success => None,
            FinalStatus::Failed { primary, .. } => Some(primary.code()),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    /// Writes one line per failure, primary cause first.
    pub fn write_diagnostics<W: Write>(&self, err: &mut W) -> io::Result<()> {
        let FinalStatus::Failed { primary, cleanup } = self else {
            return Ok(());
        };
        match primary {
            DriverError::Cleanup(failure) => write_cleanup_line(err, failure)?,
            other => write_line(err, "Error", other.code(), other.message().as_deref())?,
        }
        if let Some(failure) = cleanup {
            write_cleanup_line(err, failure)?;
        }
        Ok(())
    }
}

fn write_cleanup_line<W: Write>(err: &mut W, failure: &CleanupFailure) -> io::Result<()> {
    write_line(
        err,
        "Error during cleanup",
        failure.code(),
        Some(&failure.message()),
    )
}

fn write_line<W: Write>(
    err: &mut W,
    label: &str,
    code: i32,
    message: Option<&str>,
) -> io::Result<()> {
    match message {
        Some(message) => writeln!(err, "{label} (code {code}): {message}"),
        None => writeln!(err, "{label} (code {code})"),
    }
}
