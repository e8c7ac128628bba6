//! Error types for gdc-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for gdc-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gdc-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid path or a path operation that is never allowed
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A path segment has no matching child
    #[error("Not found: {0}")]
    NotFound(String),

    /// A folder was required but the node is a file
    #[error("Not a folder: {0}")]
    NotAFolder(String),

    /// A file was required but the node is a folder
    #[error("Not a file: {0}")]
    NotAFile(String),

    /// Operation the remote model cannot perform
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Local filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Network or server error reported by the drive
    #[error("Network error: {0}")]
    Network(String),

    /// The drive answered with something we cannot interpret
    #[error("Unexpected response: {0}")]
    Protocol(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::Config(_) => 2, // UsageError
            Error::Network(_) | Error::Protocol(_) => 3,   // NetworkError
            Error::Auth(_) => 4,                           // AuthError
            Error::NotFound(_) => 5,                       // NotFound
            Error::NotAFolder(_) | Error::NotAFile(_) => 6, // WrongType
            Error::UnsupportedOperation(_) => 7,           // UnsupportedOperation
            Error::Io(_) => 8,                             // LocalIoError
            _ => 1,                                        // GeneralError
        }
    }

    /// Whether this error came from the remote side (auth, network, bad payload)
    pub const fn is_transport(&self) -> bool {
        matches!(self, Error::Auth(_) | Error::Network(_) | Error::Protocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidPath("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Protocol("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::NotAFolder("test".into()).exit_code(), 6);
        assert_eq!(Error::NotAFile("test".into()).exit_code(), 6);
        assert_eq!(Error::UnsupportedOperation("test".into()).exit_code(), 7);
        assert_eq!(Error::Io(std::io::Error::other("disk")).exit_code(), 8);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("/Projects/missing".into());
        assert_eq!(err.to_string(), "Not found: /Projects/missing");

        let err = Error::NotAFolder("/notes.txt".into());
        assert_eq!(err.to_string(), "Not a folder: /notes.txt");
    }

    #[test]
    fn test_transport_class() {
        assert!(Error::Auth("expired".into()).is_transport());
        assert!(Error::Network("503".into()).is_transport());
        assert!(Error::Protocol("missing id".into()).is_transport());
        assert!(!Error::NotFound("/x".into()).is_transport());
    }
}
