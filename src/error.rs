//! Error types for ferro-vep
//!
//! Errors fall into four groups, each with its own code range:
//! - Fetch errors (E1xxx): transient, consumed by the retry loop
//! - Classification errors (E2xxx): upstream contract violations, fatal to a run
//! - Input and configuration errors (E3xxx): fatal at startup
//! - IO errors (E9xxx): reader, sink and filesystem failures

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Fetch errors (E1xxx)
    /// Transport-level HTTP failure
    TransportFailed = 1001,
    /// Annotation service answered with a non-200 status
    UnexpectedStatus = 1002,
    /// Response body was not a JSON array of payloads
    InvalidPayload = 1003,
    /// All retry attempts failed
    RetriesExhausted = 1004,

    // Classification errors (E2xxx)
    /// Required payload field missing
    MissingField = 2001,
    /// Indel subtype outside ins/del/unknown
    UnknownIndelSubtype = 2002,
    /// Record reports zero total depth
    ZeroDepth = 2003,
    /// Derived value is NaN or infinite
    NonFiniteValue = 2004,
    /// Required INFO key missing from the record
    MissingInfo = 2005,
    /// INFO value has the wrong shape
    InvalidInfo = 2006,
    /// Record has no alternate allele
    MissingAllele = 2007,

    // Input and configuration errors (E3xxx)
    /// Input file does not exist
    InputNotFound = 3001,
    /// Output directory is missing or read-only
    OutputNotWritable = 3002,
    /// Configuration file could not be used
    InvalidConfig = 3003,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::TransportFailed => "HTTP transport failure",
            ErrorCode::UnexpectedStatus => "unexpected HTTP status",
            ErrorCode::InvalidPayload => "invalid annotation payload",
            ErrorCode::RetriesExhausted => "retry attempts exhausted",
            ErrorCode::MissingField => "required payload field missing",
            ErrorCode::UnknownIndelSubtype => "unknown indel subtype",
            ErrorCode::ZeroDepth => "zero total depth",
            ErrorCode::NonFiniteValue => "non-finite derived value",
            ErrorCode::MissingInfo => "required INFO field missing",
            ErrorCode::InvalidInfo => "invalid INFO value",
            ErrorCode::MissingAllele => "missing alternate allele",
            ErrorCode::InputNotFound => "file not found",
            ErrorCode::OutputNotWritable => "directory not writable",
            ErrorCode::InvalidConfig => "invalid configuration",
            ErrorCode::IoError => "file I/O error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for ferro-vep operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VepError {
    /// The HTTP request could not be completed
    #[error("HTTP request to {url} failed: {msg}")]
    Transport { url: String, msg: String },

    /// The annotation service answered with something other than 200
    #[error("HTTP {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// A 200 response whose body could not be decoded
    #[error("Invalid annotation payload from {url}: {msg}")]
    InvalidPayload { url: String, msg: String },

    /// Every attempt failed; `last` is the final attempt's error
    #[error("Gave up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: Box<VepError>,
    },

    /// A field the annotation payload must carry is absent
    #[error("Annotation payload is missing required field '{field}'")]
    MissingField { field: String },

    /// Indel subtype outside the ins/del/unknown lookup
    #[error("Unknown indel subtype '{subtype}' at {location}")]
    UnknownIndelSubtype { location: String, subtype: String },

    /// Total depth of zero makes every frequency undefined
    #[error("Total depth is zero at {location}")]
    ZeroDepth { location: String },

    /// A derived numeric field came out NaN or infinite
    #[error("Non-finite {field} at {location}")]
    NonFiniteValue { location: String, field: String },

    /// The record lacks an INFO key the annotation needs
    #[error("Missing INFO field {key} at {location}")]
    MissingInfo { location: String, key: String },

    /// The INFO key is present but not usable as an integer
    #[error("Invalid INFO field {key} at {location}: {msg}")]
    InvalidInfo {
        location: String,
        key: String,
        msg: String,
    },

    /// The record has no alternate allele to annotate
    #[error("No alternate allele at {location}")]
    MissingAllele { location: String },

    /// Input path does not name an existing file
    #[error("File not found: {path}")]
    InputNotFound { path: String },

    /// Output directory is missing or cannot be written to
    #[error("Directory {path} does not exist or is unwritable")]
    OutputNotWritable { path: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {msg}")]
    Config { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },
}

impl VepError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            VepError::Transport { .. } => ErrorCode::TransportFailed,
            VepError::UnexpectedStatus { .. } => ErrorCode::UnexpectedStatus,
            VepError::InvalidPayload { .. } => ErrorCode::InvalidPayload,
            VepError::RetriesExhausted { .. } => ErrorCode::RetriesExhausted,
            VepError::MissingField { .. } => ErrorCode::MissingField,
            VepError::UnknownIndelSubtype { .. } => ErrorCode::UnknownIndelSubtype,
            VepError::ZeroDepth { .. } => ErrorCode::ZeroDepth,
            VepError::NonFiniteValue { .. } => ErrorCode::NonFiniteValue,
            VepError::MissingInfo { .. } => ErrorCode::MissingInfo,
            VepError::InvalidInfo { .. } => ErrorCode::InvalidInfo,
            VepError::MissingAllele { .. } => ErrorCode::MissingAllele,
            VepError::InputNotFound { .. } => ErrorCode::InputNotFound,
            VepError::OutputNotWritable { .. } => ErrorCode::OutputNotWritable,
            VepError::Config { .. } => ErrorCode::InvalidConfig,
            VepError::Io { .. } => ErrorCode::IoError,
        }
    }

    /// Whether another attempt at the same request could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            VepError::Transport { .. }
                | VepError::UnexpectedStatus { .. }
                | VepError::InvalidPayload { .. }
        )
    }

    /// Whether this error is a per-record fetch failure rather than a run failure
    pub fn is_fetch_failure(&self) -> bool {
        self.is_transient() || matches!(self, VepError::RetriesExhausted { .. })
    }

    /// Format as `[E1234] message`
    pub fn detailed_message(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

impl From<std::io::Error> for VepError {
    fn from(err: std::io::Error) -> Self {
        VepError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<csv::Error> for VepError {
    fn from(err: csv::Error) -> Self {
        VepError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for VepError {
    fn from(err: toml::de::Error) -> Self {
        VepError::Config {
            msg: err.to_string(),
        }
    }
}
