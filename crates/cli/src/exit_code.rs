//! Exit code definitions for the gdc CLI
//!
//! Scripts depend on these values. Changing an existing code is a breaking
//! change and needs a version bump and a CHANGELOG entry.

use gdc_core::Error;

/// Exit codes for the gdc CLI application.
///
/// These codes follow a consistent convention to allow scripts and automation
/// to handle different error scenarios appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// User input error: invalid arguments, forbidden path operation, bad config
    UsageError = 2,

    /// Transport error: timeout, connection reset, server error, bad response
    NetworkError = 3,

    /// Authentication or permission failure
    AuthError = 4,

    /// A path does not resolve
    NotFound = 5,

    /// File given where a folder is required, or the reverse
    WrongType = 6,

    /// The drive cannot perform this operation (folder copy, native export)
    UnsupportedOperation = 7,

    /// Local file missing, unreadable or unwritable
    LocalIoError = 8,

    /// Operation was interrupted (e.g., Ctrl+C)
    Interrupted = 130,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            6 => Some(Self::WrongType),
            7 => Some(Self::UnsupportedOperation),
            8 => Some(Self::LocalIoError),
            130 => Some(Self::Interrupted),
            _ => None,
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or path",
            Self::NetworkError => "Network error",
            Self::AuthError => "Authentication or permission failure",
            Self::NotFound => "Path not found",
            Self::WrongType => "Wrong node type (file vs. folder)",
            Self::UnsupportedOperation => "Operation not supported by the drive",
            Self::LocalIoError => "Local file error",
            Self::Interrupted => "Operation interrupted",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(error: &Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
