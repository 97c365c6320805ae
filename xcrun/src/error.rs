//! Failure kinds a run can end with.

use crate::app::Stage;
use crate::options::OptionKind;
use thiserror::Error;
use xcgrid::{ResourceKind, Status};

/// Code reported when an option string is not a member of its enumeration.
pub const INVALID_OPTION_CODE: i32 = 1;
/// Code reported when the input file or the model is absent.
pub const MISSING_ARGUMENT_CODE: i32 = 2;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("missing required argument: {0}")]
    MissingRequiredArgument(&'static str),

    #[error("invalid {option} '{value}' for {}", .option.flag())]
    InvalidOption { option: OptionKind, value: String },

    /// A backend construction or evaluation call failed.
    #[error("{stage} stage failed: {status}")]
    Backend { stage: Stage, status: Status },

    #[error(transparent)]
    Cleanup(#[from] CleanupFailure),
}

impl DriverError {
    pub fn code(&self) -> i32 {
        match self {
            DriverError::MissingRequiredArgument(_) => MISSING_ARGUMENT_CODE,
            DriverError::InvalidOption { .. } => INVALID_OPTION_CODE,
            DriverError::Backend { status, .. } => status.code().get(),
            DriverError::Cleanup(failure) => failure.code(),
        }
    }

    /// Text for the operator diagnostic. Backend messages pass through
    /// unchanged and may be absent.
    pub fn message(&self) -> Option<String> {
        match self {
            DriverError::Backend { status, .. } => status.message().map(str::to_string),
            DriverError::Cleanup(failure) => Some(failure.message()),
            other => Some(other.to_string()),
        }
    }
}

/// One release call that reported a failure.
#[derive(Debug, Clone, Error)]
#[error("releasing {kind} {id}{}", release_detail(.status))]
pub struct ReleaseFailure {
    pub kind: ResourceKind,
    pub id: u64,
    pub status: Status,
}

fn release_detail(status: &Status) -> String {
    match status.message() {
        Some(message) => format!(": {message}"),
        None => format!(" (code {})", status.code()),
    }
}

/// Every release failure of a teardown pass, in the order they occurred.
#[derive(Debug, Clone, Error)]
#[error("cleanup failed: {}", self.message())]
pub struct CleanupFailure {
    first: ReleaseFailure,
    rest: Vec<ReleaseFailure>,
}

impl CleanupFailure {
    /// Returns `None` when nothing failed.
    pub fn from_failures(failures: Vec<ReleaseFailure>) -> Option<Self> {
        let mut failures = failures.into_iter();
        let first = failures.next()?;
        Some(Self {
            first,
            rest: failures.collect(),
        })
    }

    /// Code of the first failed release.
    pub fn code(&self) -> i32 {
        self.first.status.code().get()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReleaseFailure> {
        std::iter::once(&self.first).chain(&self.rest)
    }

    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    pub fn message(&self) -> String {
        self.failures()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
