use std::str::Utf8Error;

use thiserror::Error;

/// Result type used across this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// `ipmi_monitoring_init` reported a failure. No context can be used.
    #[error("failed to initialize libipmimonitoring: {message}")]
    Init {
        /// Message from `ipmi_monitoring_ctx_strerror`.
        message: String,
    },

    /// `ipmi_monitoring_ctx_create` returned a null handle.
    #[error("failed to create IPMI monitoring context")]
    ContextCreation,

    /// A context setter rejected its argument. The context stays usable.
    #[error("failed to set {operation}: {message}")]
    Configuration {
        /// The setter that failed.
        operation: &'static str,
        /// Message from `ipmi_monitoring_ctx_errormsg`.
        message: String,
    },

    /// A sensor enumeration call failed.
    #[error("failed to read sensor data: {message}")]
    Read {
        /// Message from `ipmi_monitoring_ctx_errormsg`.
        message: String,
    },

    /// The library returned an integer outside a known enumeration.
    #[error("unknown {kind} value: {raw}")]
    UnknownEnumValue {
        /// Name of the enumeration.
        kind: &'static str,
        /// Raw integer returned by the library.
        raw: i64,
    },

    /// A foreign string was not valid UTF-8.
    #[error("invalid utf-8 in foreign string: {0}")]
    Decoding(#[from] Utf8Error),

    /// The context has already been released.
    #[error("ipmi monitoring context is closed")]
    Closed,

    /// The shared library or one of its symbols could not be loaded.
    #[error("failed to load libipmimonitoring: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// Invalid caller-supplied argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A string did not name a member of an enumeration.
    #[error("invalid {kind} '{input}' (expected an integer or one of: {expected})")]
    ParseEnum {
        /// Name of the enumeration.
        kind: &'static str,
        /// The rejected input.
        input: String,
        /// Comma separated list of valid names.
        expected: String,
    },
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
