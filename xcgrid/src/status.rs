//! Failure status returned by every backend operation.

use std::fmt;
use std::num::NonZeroI32;
use thiserror::Error;

/// Non-zero numeric code attached to a failed backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(NonZeroI32);

const fn code(value: i32) -> StatusCode {
    match NonZeroI32::new(value) {
        Some(v) => StatusCode(v),
        None => panic!("status codes are non-zero"),
    }
}

impl StatusCode {
    /// Input file could not be opened or read.
    pub const FILE_ACCESS: StatusCode = code(10);
    /// Requested record is absent from the input file.
    pub const RECORD_MISSING: StatusCode = code(11);
    /// Record exists but its payload does not match the expected layout.
    pub const RECORD_MALFORMED: StatusCode = code(12);
    /// Handle is unknown, already released, or of the wrong kind.
    pub const INVALID_HANDLE: StatusCode = code(13);
    /// Feature not provided by this backend.
    pub const UNSUPPORTED: StatusCode = code(14);
    /// Matrix shapes disagree with the basis.
    pub const DIMENSION_MISMATCH: StatusCode = code(15);
    pub const UNKNOWN_FUNCTIONAL: StatusCode = code(16);
    pub const UNKNOWN_MODEL: StatusCode = code(17);
    /// Operation issued before the resources it relies on were prepared.
    pub const PRECONDITION: StatusCode = code(18);
    /// Physically meaningless input (unknown element, bad exponent, ...).
    pub const INVALID_INPUT: StatusCode = code(19);

    /// Returns `None` for zero, which is reserved for success.
    pub fn new(value: i32) -> Option<Self> {
        NonZeroI32::new(value).map(StatusCode)
    }

    pub fn get(self) -> i32 {
        self.0.get()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failed outcome of a backend call.
///
/// Success is the `Ok` side of the surrounding `Result`, so a `Status` value
/// always denotes failure and the message can only exist alongside one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("code {code}{}", message_suffix(.message))]
pub struct Status {
    code: StatusCode,
    message: Option<String>,
}

impl Status {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    /// A failure that carries no diagnostic text.
    pub fn bare(code: StatusCode) -> Self {
        Self {
            code,
            message: None,
        }
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}
